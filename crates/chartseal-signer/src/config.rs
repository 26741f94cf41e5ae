//! Backend selection and key loading.

use crate::ed25519::Ed25519Signer;
use crate::openpgp::PgpSigner;
use crate::Signer;
use pgp::{Deserializable, SignedPublicKey, SignedSecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Errors raised while turning configuration into a signer.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported signer: {0}")]
    UnsupportedSigner(String),

    #[error("could not read key file {}", path.display())]
    KeyIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key in {}: {reason}", path.display())]
    InvalidKey { path: PathBuf, reason: String },

    #[error("public key in {} does not belong to the private key", path.display())]
    KeyMismatch { path: PathBuf },

    #[error("the {0} signer does not support passphrase-protected keys")]
    PassphraseUnsupported(SignerKind),
}

/// Available signing backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerKind {
    #[default]
    Pgp,
    Ed25519,
}

impl SignerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerKind::Pgp => "pgp",
            SignerKind::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "pgp" => Ok(SignerKind::Pgp),
            "ed25519" => Ok(SignerKind::Ed25519),
            other => Err(ConfigError::UnsupportedSigner(other.to_string())),
        }
    }
}

/// Key material for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Path to the private key file.
    pub private_key: Option<PathBuf>,
    /// Passphrase for the private key.
    pub passphrase: Option<String>,
    /// Path to the public key file.
    pub public_key: Option<PathBuf>,
}

/// Signer selection as it appears in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Backend type. Defaults to `pgp`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub pgp: KeyConfig,
    pub ed25519: KeyConfig,
}

impl SignerConfig {
    /// Resolve the configured backend type.
    pub fn kind(&self) -> Result<SignerKind, ConfigError> {
        self.kind.as_deref().unwrap_or_default().parse()
    }

    /// Key settings of the selected backend. An unknown type selects the
    /// `pgp` section; [`SignerConfig::build`] reports the bad type.
    pub fn keys_mut(&mut self) -> &mut KeyConfig {
        match self.kind() {
            Ok(SignerKind::Ed25519) => &mut self.ed25519,
            Ok(SignerKind::Pgp) | Err(_) => &mut self.pgp,
        }
    }

    /// Build the configured backend.
    pub fn build(&self) -> Result<Box<dyn Signer>, ConfigError> {
        let kind = self.kind()?;
        debug!(signer = %kind, "building signer");
        match kind {
            SignerKind::Pgp => Ok(Box::new(build_pgp(&self.pgp)?)),
            SignerKind::Ed25519 => Ok(Box::new(build_ed25519(&self.ed25519)?)),
        }
    }
}

fn build_pgp(keys: &KeyConfig) -> Result<PgpSigner, ConfigError> {
    let secret = keys
        .private_key
        .as_deref()
        .map(read_armored::<SignedSecretKey>)
        .transpose()?;
    let public = keys
        .public_key
        .as_deref()
        .map(read_armored::<SignedPublicKey>)
        .transpose()?;
    let passphrase = keys.passphrase.clone().unwrap_or_default();
    Ok(PgpSigner::new(secret, passphrase, public))
}

/// Read an ASCII-armored OpenPGP key and check its self-signatures.
fn read_armored<K: Deserializable + VerifiedKey>(path: &Path) -> Result<K, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::KeyIo {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |err: pgp::errors::Error| ConfigError::InvalidKey {
        path: path.to_path_buf(),
        reason: err.to_string(),
    };
    let (key, _headers) = K::from_string(&content).map_err(invalid)?;
    key.check().map_err(invalid)?;
    Ok(key)
}

trait VerifiedKey {
    fn check(&self) -> pgp::errors::Result<()>;
}

impl VerifiedKey for SignedSecretKey {
    fn check(&self) -> pgp::errors::Result<()> {
        self.verify()
    }
}

impl VerifiedKey for SignedPublicKey {
    fn check(&self) -> pgp::errors::Result<()> {
        self.verify()
    }
}

fn build_ed25519(keys: &KeyConfig) -> Result<Ed25519Signer, ConfigError> {
    if keys.passphrase.as_deref().is_some_and(|p| !p.is_empty()) {
        return Err(ConfigError::PassphraseUnsupported(SignerKind::Ed25519));
    }

    let secret = keys
        .private_key
        .as_deref()
        .map(|path| read_key(path, "private_key"))
        .transpose()?;
    let public = keys
        .public_key
        .as_deref()
        .map(|path| read_key(path, "public_key").map(|key| (path, key)))
        .transpose()?;

    let signer = match (secret, public) {
        (Some(secret), Some((path, public))) => {
            let signer = Ed25519Signer::from_secret_bytes(&secret);
            if signer.public_key_bytes() != Some(public) {
                return Err(ConfigError::KeyMismatch {
                    path: path.to_path_buf(),
                });
            }
            signer
        }
        (Some(secret), None) => Ed25519Signer::from_secret_bytes(&secret),
        (None, Some((path, public))) => Ed25519Signer::from_public_bytes(&public)
            .map_err(|reason| ConfigError::InvalidKey {
                path: path.to_path_buf(),
                reason,
            })?,
        (None, None) => Ed25519Signer::unconfigured(),
    };
    Ok(signer)
}

/// Read a 32-byte key from either a JSON keypair file or a bare hex string.
///
/// A JSON file must be an object holding the key under `field`
/// (`private_key` or `public_key`) as hex.
fn read_key(path: &Path, field: &str) -> Result<[u8; 32], ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::KeyIo {
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| ConfigError::InvalidKey {
        path: path.to_path_buf(),
        reason,
    };

    let trimmed = content.trim();
    let hex_key = if trimmed.starts_with('{') {
        let value: serde_json::Value =
            serde_json::from_str(trimmed).map_err(|err| invalid(err.to_string()))?;
        value
            .get(field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| invalid(format!("missing string field {field:?}")))?
            .to_string()
    } else {
        trimmed.to_string()
    };

    let bytes = hex::decode(&hex_key).map_err(|err| invalid(format!("not hex: {err}")))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| invalid(format!("expected 32 bytes, got {}", bytes.len())))
}
