//! Run configuration: an optional TOML file overlaid with command-line flags.
//!
//! ```toml
//! package = "demo-1.0.0.tgz"
//! stdout = false
//!
//! [signer]
//! type = "pgp"
//!
//! [signer.pgp]
//! private_key = "keys/secring.asc"
//! passphrase = "hunter2"
//! public_key = "keys/pubring.asc"
//! ```
//!
//! Key flags land in the section of the selected signer type.

use chartseal_signer::SignerConfig;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("package is required")]
    MissingPackage,

    #[error(transparent)]
    Signer(#[from] chartseal_signer::ConfigError),
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// TOML config file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Location of the packaged Helm chart (.tgz)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub package: Option<PathBuf>,

    /// Write the signed provenance only to stdout
    #[arg(long, global = true)]
    pub stdout: bool,

    /// Signer backend: pgp or ed25519 [default: pgp]
    #[arg(long = "signer-type", global = true, value_name = "TYPE")]
    pub signer_type: Option<String>,

    /// Path to the private key file
    #[arg(long, global = true, value_name = "FILE")]
    pub private_key: Option<PathBuf>,

    /// Passphrase for the private key
    #[arg(long, global = true)]
    pub passphrase: Option<String>,

    /// Path to the public key file
    #[arg(long, global = true, value_name = "FILE")]
    pub public_key: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub package: Option<PathBuf>,
    pub stdout: bool,
    pub signer: SignerConfig,
}

impl Config {
    /// Read the config file named by `--config` (if any), then apply the flags.
    pub fn load(args: &ConfigArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(args);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Flags win over file values; a flag that was not given leaves the file value alone.
    pub fn apply(&mut self, args: &ConfigArgs) {
        if let Some(package) = &args.package {
            self.package = Some(package.clone());
        }
        if args.stdout {
            self.stdout = true;
        }
        if let Some(kind) = &args.signer_type {
            self.signer.kind = Some(kind.clone());
        }
        let keys = self.signer.keys_mut();
        if let Some(path) = &args.private_key {
            keys.private_key = Some(path.clone());
        }
        if let Some(passphrase) = &args.passphrase {
            keys.passphrase = Some(passphrase.clone());
        }
        if let Some(path) = &args.public_key {
            keys.public_key = Some(path.clone());
        }
    }

    pub fn package(&self) -> Result<&Path, ConfigError> {
        self.package
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingPackage)
    }
}
