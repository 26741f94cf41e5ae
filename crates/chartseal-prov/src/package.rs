//! Packaged chart loaded from disk.

use crate::archive::extract_chart_metadata;
use crate::error::{FormatError, ProvError};
use chartseal_hash::Checksum;
use std::ffi::OsString;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Extension appended to the package path for its provenance file.
pub const PROVENANCE_SUFFIX: &str = ".prov";

/// The raw bytes of a packaged chart and where they came from.
#[derive(Debug, Clone)]
pub struct Package {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl Package {
    /// Read the whole package into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProvError> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|err| ProvError::io("open package", path, err))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|err| ProvError::io("read package", path, err))?;
        Ok(Self::from_bytes(path, bytes))
    }

    pub fn from_bytes<P: Into<PathBuf>>(path: P, bytes: Vec<u8>) -> Self {
        Package {
            path: path.into(),
            bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Last path segment, as referenced by the checksum line.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::compute(&self.bytes)
    }

    /// The chart's `Chart.yaml`, read from the same bytes that get hashed.
    pub fn metadata(&self) -> Result<Vec<u8>, FormatError> {
        extract_chart_metadata(self.bytes.as_slice())
    }

    pub fn provenance_path(&self) -> PathBuf {
        provenance_path(&self.path)
    }
}

/// `<package>.prov`, next to the package.
pub fn provenance_path(package: &Path) -> PathBuf {
    let mut path = OsString::from(package.as_os_str());
    path.push(PROVENANCE_SUFFIX);
    PathBuf::from(path)
}
