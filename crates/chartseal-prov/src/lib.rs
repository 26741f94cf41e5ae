//! Provenance files for packaged Helm charts.
//!
//! Signing hashes a chart package, embeds the digest together with the
//! chart's `Chart.yaml` in a provenance document, signs that document and
//! stores it as `<package>.prov`. Verifying recomputes the digest, compares it
//! with the recorded one and then checks the signature.
//!
//! # Example
//!
//! ```no_run
//! use chartseal_prov::{sign_package, verify_package, Output};
//! use chartseal_signer::Ed25519Signer;
//! use std::path::Path;
//!
//! let signer = Ed25519Signer::from_secret_bytes(&[7u8; 32]);
//! let package = Path::new("demo-1.0.0.tgz");
//!
//! sign_package(package, &signer, Output::ProvenanceFile).unwrap();
//! verify_package(package, &signer).unwrap();
//! ```

mod archive;
mod document;
mod error;
mod package;
mod sign;
mod verify;

pub use archive::{extract_chart_metadata, METADATA_FILE};
pub use document::{escape_list_markers, extract_checksum, ProvenanceDocument, DELIMITER};
pub use error::{FormatError, ProvError};
pub use package::{provenance_path, Package, PROVENANCE_SUFFIX};
pub use sign::{sign, sign_package, write_provenance_file, Output, SignedProvenance};
pub use verify::{verify_package, verify_provenance, VerifyOutcome};
