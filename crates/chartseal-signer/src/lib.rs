//! Pluggable signing backends for provenance documents.
//!
//! A [`Signer`] turns arbitrary text into a self-contained cleartext envelope
//! and checks such envelopes later. The provenance workflows only ever see the
//! trait; which backend sits behind it is decided once, from a
//! [`SignerConfig`].
//!
//! Two backends exist: [`PgpSigner`] (the default) writes OpenPGP cleartext
//! signatures, [`Ed25519Signer`] writes a compact chartseal envelope over a
//! raw Ed25519 key.
//!
//! # Example
//!
//! ```
//! use chartseal_signer::{Ed25519Signer, Signer};
//!
//! let signer = Ed25519Signer::from_secret_bytes(&[7u8; 32]);
//! let signed = signer.sign(b"name: demo\n...").unwrap();
//! signer.verify(&signed).unwrap();
//! ```

mod config;
mod ed25519;
pub mod envelope;
mod openpgp;

pub use config::{ConfigError, KeyConfig, SignerConfig, SignerKind};
pub use ed25519::Ed25519Signer;
pub use envelope::Envelope;
pub use openpgp::PgpSigner;

use thiserror::Error;

/// Errors raised by a backend while signing or verifying.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("no {0} key configured")]
    MissingKey(&'static str),

    #[error("message is not valid UTF-8 text")]
    NotText,

    #[error("malformed signed envelope: {0}")]
    Envelope(String),

    #[error("envelope was signed by key {found}, expected {expected}")]
    WrongKey { expected: String, found: String },

    #[error("unsupported signature algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("signature does not match the signed text")]
    BadSignature,

    #[error("signature was not made by any configured key")]
    NoMatchingKey,

    #[error("OpenPGP operation failed")]
    Pgp(#[source] ::pgp::errors::Error),
}

/// Sign and verify capability shared by all backends.
pub trait Signer {
    /// Wrap `message` into a signed envelope that embeds it verbatim.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;

    /// Check the signature of an envelope produced by [`Signer::sign`].
    fn verify(&self, signed_message: &[u8]) -> Result<(), SignerError>;
}

impl<S: Signer + ?Sized> Signer for Box<S> {
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        (**self).sign(message)
    }

    fn verify(&self, signed_message: &[u8]) -> Result<(), SignerError> {
        (**self).verify(signed_message)
    }
}
