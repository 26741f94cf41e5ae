//! Error types for the sign and verify workflows.

use chartseal_signer::SignerError;
use std::path::PathBuf;
use thiserror::Error;

/// The package or provenance file is not in the expected shape.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("package is not a valid gzip stream")]
    Gzip(#[source] std::io::Error),

    #[error("package is not a valid tar archive")]
    Tar(#[source] std::io::Error),

    #[error("no Chart.yaml found in package")]
    MissingMetadata,

    #[error("Chart.yaml in package is empty")]
    EmptyMetadata,

    #[error("no sha256 checksum line in provenance file")]
    MissingChecksum,

    #[error("invalid checksum line in provenance file: {0:?}")]
    InvalidChecksumLine(String),
}

/// Errors that abort a sign or verify run.
#[derive(Debug, Error)]
pub enum ProvError {
    #[error("could not {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("checksum mismatch: package has {actual}, provenance file records {expected}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("could not sign provenance file")]
    Sign(#[source] SignerError),

    #[error("could not verify signature")]
    SignatureInvalid(#[source] SignerError),
}

impl ProvError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
