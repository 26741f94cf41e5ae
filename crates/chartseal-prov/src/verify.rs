//! Verify workflow.
//!
//! The package digest is compared with the one recorded in `<package>.prov`
//! before the signer is consulted, so a tampered package is reported as a
//! checksum mismatch without touching any key material.

use crate::document::extract_checksum;
use crate::error::ProvError;
use crate::package::Package;
use chartseal_hash::Checksum;
use chartseal_signer::Signer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Result of a successful verify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub checksum: Checksum,
    pub provenance_path: PathBuf,
}

/// Check raw provenance content against a package checksum, then its signature.
pub fn verify_provenance(
    checksum: &Checksum,
    provenance: &[u8],
    signer: &dyn Signer,
) -> Result<(), ProvError> {
    let text = String::from_utf8_lossy(provenance);
    let recorded = extract_checksum(&text)?;
    if !checksum.matches(&recorded) {
        return Err(ProvError::ChecksumMismatch {
            expected: recorded,
            actual: checksum.to_string(),
        });
    }
    debug!(%checksum, "package checksum matches provenance");

    signer
        .verify(provenance)
        .map_err(ProvError::SignatureInvalid)
}

/// Run the full verify workflow for the package at `package_path`.
pub fn verify_package(package_path: &Path, signer: &dyn Signer) -> Result<VerifyOutcome, ProvError> {
    let package = Package::open(package_path)?;
    let checksum = package.checksum();
    debug!(package = %package_path.display(), %checksum, "computed package checksum");

    let provenance_path = package.provenance_path();
    let provenance = fs::read(&provenance_path)
        .map_err(|err| ProvError::io("read provenance file", &provenance_path, err))?;

    verify_provenance(&checksum, &provenance, signer)?;
    info!(package = %package_path.display(), "package verified");
    Ok(VerifyOutcome {
        checksum,
        provenance_path,
    })
}
