//! Provenance document construction and checksum-line lookup.
//!
//! An unsigned provenance document is the chart metadata followed by a
//! `files:` section mapping the package basename to its digest:
//!
//! ```text
//! name: demo
//! version: 1.0.0
//! ...
//! files:
//!   demo-1.0.0.tgz: sha256:<64 hex chars>
//! ```

use crate::error::FormatError;
use chartseal_hash::{Checksum, ALGORITHM};

/// Line separating the metadata from the files section.
pub const DELIMITER: &str = "...";

/// The canonical, escaped text that gets signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvenanceDocument {
    text: String,
}

impl ProvenanceDocument {
    /// Assemble and escape a document.
    ///
    /// `metadata` is copied as-is (decoded lossily if it is not UTF-8), and
    /// `basename` must already be the last path segment of the package.
    pub fn build(metadata: &[u8], basename: &str, checksum: &Checksum) -> Self {
        let metadata = String::from_utf8_lossy(metadata);
        let mut text = String::with_capacity(metadata.len() + basename.len() + 96);
        text.push_str(&metadata);
        text.push('\n');
        text.push_str(DELIMITER);
        text.push_str("\nfiles:\n");
        text.push_str(&format!("  {basename}: {ALGORITHM}:{checksum}"));

        ProvenanceDocument {
            text: escape_list_markers(&text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Rewrite every `"- "` as `" - - "` in a single pass over the text.
pub fn escape_list_markers(text: &str) -> String {
    text.replace("- ", " - - ")
}

/// Find the package checksum recorded in a provenance file.
///
/// Every line mentioning `sha256:` has to split on `:` into exactly three
/// fields; the third field of the last such line is returned.
pub fn extract_checksum(provenance: &str) -> Result<String, FormatError> {
    let marker = format!("{ALGORITHM}:");
    let mut found = None;
    for line in provenance.lines().filter(|line| line.contains(&marker)) {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.as_slice() {
            [_, _, checksum] => found = Some((*checksum).to_string()),
            _ => return Err(FormatError::InvalidChecksumLine(line.to_string())),
        }
    }
    found.ok_or(FormatError::MissingChecksum)
}
