//! Sign workflow: package in, signed provenance out.
//!
//! 1. Read the package
//! 2. Hash its raw bytes
//! 3. Extract `Chart.yaml` from the same bytes
//! 4. Build the provenance document
//! 5. Sign it
//! 6. Write it to stdout or atomically to `<package>.prov`

use crate::document::ProvenanceDocument;
use crate::error::ProvError;
use crate::package::Package;
use chartseal_hash::Checksum;
use chartseal_signer::Signer;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the signed provenance goes.
pub enum Output<'a> {
    /// `<package>.prov` beside the package.
    ProvenanceFile,
    /// Any writer, typically stdout. No file is touched.
    Writer(&'a mut dyn Write),
}

/// Result of a successful sign run.
#[derive(Debug, Clone)]
pub struct SignedProvenance {
    pub checksum: Checksum,
    pub document: ProvenanceDocument,
    pub signed: Vec<u8>,
    /// Set when the provenance was written to disk.
    pub written_to: Option<PathBuf>,
}

/// Build and sign the provenance document of an already loaded package.
pub fn sign(package: &Package, signer: &dyn Signer) -> Result<SignedProvenance, ProvError> {
    let checksum = package.checksum();
    debug!(package = %package.path().display(), %checksum, "computed package checksum");

    let metadata = package.metadata()?;
    let document = ProvenanceDocument::build(&metadata, &package.basename(), &checksum);
    debug!(bytes = document.as_bytes().len(), "built provenance document");

    let signed = signer.sign(document.as_bytes()).map_err(ProvError::Sign)?;
    Ok(SignedProvenance {
        checksum,
        document,
        signed,
        written_to: None,
    })
}

/// Run the full sign workflow for the package at `package_path`.
pub fn sign_package(
    package_path: &Path,
    signer: &dyn Signer,
    output: Output<'_>,
) -> Result<SignedProvenance, ProvError> {
    let package = Package::open(package_path)?;
    let mut signed = sign(&package, signer)?;

    match output {
        Output::Writer(writer) => {
            writer
                .write_all(&signed.signed)
                .and_then(|()| writer.flush())
                .map_err(|err| ProvError::io("write signed provenance to", "<stdout>", err))?;
        }
        Output::ProvenanceFile => {
            let target = package.provenance_path();
            write_provenance_file(&target, &signed.signed)?;
            signed.written_to = Some(target);
        }
    }

    info!(package = %package_path.display(), checksum = %signed.checksum, "signed package");
    Ok(signed)
}

/// Replace `target` with `contents` via a temporary file in the same directory.
///
/// The final file is readable by everyone and writable by the owner only.
pub fn write_provenance_file(target: &Path, contents: &[u8]) -> Result<(), ProvError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".chartseal-")
        .suffix(".prov.tmp")
        .tempfile_in(dir)
        .map_err(|err| ProvError::io("create temporary file in", dir, err))?;
    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| ProvError::io("write", tmp.path(), err))?;
    set_readable_mode(tmp.as_file()).map_err(|err| ProvError::io("set permissions on", target, err))?;

    tmp.persist(target)
        .map_err(|err| ProvError::io("write provenance file", target, err.error))?;
    debug!(path = %target.display(), "wrote provenance file");
    Ok(())
}

#[cfg(unix)]
fn set_readable_mode(file: &File) -> std::io::Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable_mode(_file: &File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tgz_chart;
    use chartseal_signer::Ed25519Signer;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("demo.tgz.prov");
        fs::write(&target, "stale").unwrap();

        write_provenance_file(&target, b"fresh").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "fresh");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_0644() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("demo.tgz.prov");
        write_provenance_file(&target, b"x").unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("demo.tgz.prov");
        assert!(matches!(
            write_provenance_file(&target, b"x"),
            Err(ProvError::Io { .. })
        ));
    }

    #[test]
    fn sign_rejects_package_without_metadata() {
        let package = Package::from_bytes("demo.tgz", b"not an archive".to_vec());
        let signer = Ed25519Signer::from_secret_bytes(&[3u8; 32]);
        assert!(matches!(
            sign(&package, &signer),
            Err(ProvError::Format(_))
        ));
    }

    #[test]
    fn sign_without_private_key_is_sign_error() {
        let package = Package::from_bytes("demo.tgz", tgz_chart(b"name: demo"));
        let public = Ed25519Signer::from_secret_bytes(&[3u8; 32])
            .public_key_bytes()
            .unwrap();
        let verifier = Ed25519Signer::from_public_bytes(&public).unwrap();
        assert!(matches!(
            sign(&package, &verifier),
            Err(ProvError::Sign(_))
        ));
    }

    #[test]
    fn sign_to_writer_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo-1.0.0.tgz");
        fs::write(&path, tgz_chart(b"name: demo")).unwrap();
        let signer = Ed25519Signer::from_secret_bytes(&[3u8; 32]);

        let mut out = Vec::new();
        let signed = sign_package(&path, &signer, Output::Writer(&mut out)).unwrap();

        assert_eq!(out, signed.signed);
        assert!(signed.written_to.is_none());
        assert!(!crate::provenance_path(&path).exists());
    }
}
