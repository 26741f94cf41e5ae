//! Package checksums.
//!
//! Every provenance file binds a package to the SHA-256 digest of its raw
//! bytes. The same routine is used when signing and when verifying, so a
//! package that changed after signing yields a different string.

use sha2::{Digest, Sha256};
use std::fmt;

type HashState = Sha256;

/// Algorithm label used in provenance checksum lines.
pub const ALGORITHM: &str = "sha256";

/// Length of a hex-encoded digest.
pub const HEX_LEN: usize = 64;

/// A lowercase hex SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Hash the given bytes.
    pub fn compute(bytes: &[u8]) -> Self {
        Checksum(sha256_hex(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare against a checksum string read from elsewhere.
    ///
    /// The comparison is exact: no trimming, no case folding.
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Checksum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = HashState::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
