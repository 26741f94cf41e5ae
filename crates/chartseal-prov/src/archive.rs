//! Chart metadata extraction from packaged `.tgz` archives.

use crate::error::FormatError;
use flate2::read::MultiGzDecoder;
use std::io::{Cursor, Read};
use tracing::debug;

/// Name suffix identifying the chart descriptor inside a package.
pub const METADATA_FILE: &str = "Chart.yaml";

/// Return the contents of the first archive entry whose name ends with
/// [`METADATA_FILE`].
///
/// The whole gzip stream, including any concatenated members, is
/// decompressed before the tar entries are scanned. Later entries with the
/// same suffix are ignored.
pub fn extract_chart_metadata<R: Read>(reader: R) -> Result<Vec<u8>, FormatError> {
    let mut decompressed = Vec::new();
    MultiGzDecoder::new(reader)
        .read_to_end(&mut decompressed)
        .map_err(FormatError::Gzip)?;

    let mut archive = tar::Archive::new(Cursor::new(decompressed));
    for entry in archive.entries().map_err(FormatError::Tar)? {
        let mut entry = entry.map_err(FormatError::Tar)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if !name.ends_with(METADATA_FILE) {
            continue;
        }

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(FormatError::Tar)?;
        debug!(entry = %name, bytes = content.len(), "found chart metadata");
        if content.is_empty() {
            return Err(FormatError::EmptyMetadata);
        }
        return Ok(content);
    }

    Err(FormatError::MissingMetadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tgz;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn finds_chart_yaml_after_other_entries() {
        let package = tgz(&[
            ("templates/x.yaml", "kind: Service"),
            ("Chart.yaml", "name: demo\nversion: 1.0.0"),
        ]);
        let metadata = extract_chart_metadata(package.as_slice()).unwrap();
        assert_eq!(metadata, b"name: demo\nversion: 1.0.0");
    }

    #[test]
    fn matches_by_suffix_inside_chart_directory() {
        let package = tgz(&[
            ("demo/values.yaml", "replicas: 1"),
            ("demo/Chart.yaml", "name: demo"),
        ]);
        assert_eq!(
            extract_chart_metadata(package.as_slice()).unwrap(),
            b"name: demo"
        );
    }

    #[test]
    fn first_match_wins() {
        let package = tgz(&[
            ("demo/Chart.yaml", "name: demo"),
            ("demo/charts/sub/Chart.yaml", "name: sub"),
        ]);
        assert_eq!(
            extract_chart_metadata(package.as_slice()).unwrap(),
            b"name: demo"
        );
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        let package = tgz(&[("demo/chart.yaml", "name: demo")]);
        assert!(matches!(
            extract_chart_metadata(package.as_slice()),
            Err(FormatError::MissingMetadata)
        ));
    }

    #[test]
    fn missing_chart_yaml_is_format_error() {
        let package = tgz(&[("templates/x.yaml", "kind: Service")]);
        assert!(matches!(
            extract_chart_metadata(package.as_slice()),
            Err(FormatError::MissingMetadata)
        ));
    }

    #[test]
    fn empty_chart_yaml_is_format_error() {
        let package = tgz(&[("demo/Chart.yaml", "")]);
        assert!(matches!(
            extract_chart_metadata(package.as_slice()),
            Err(FormatError::EmptyMetadata)
        ));
    }

    #[test]
    fn plain_bytes_are_not_gzip() {
        assert!(matches!(
            extract_chart_metadata(&b"definitely not a gzip stream"[..]),
            Err(FormatError::Gzip(_))
        ));
    }

    fn tar_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, data.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn reads_across_concatenated_gzip_members() {
        let raw = tar_bytes(&[
            ("demo/values.yaml", "replicas: 1"),
            ("demo/Chart.yaml", "name: demo"),
        ]);
        // The second header starts at 1024, so Chart.yaml lives in the second member.
        let mut package = gzip(&raw[..1024]);
        package.extend(gzip(&raw[1024..]));

        assert_eq!(
            extract_chart_metadata(package.as_slice()).unwrap(),
            b"name: demo"
        );
    }

    #[test]
    fn corrupt_tar_header_is_tar_error() {
        let mut raw = tar_bytes(&[("demo/Chart.yaml", "name: demo")]);
        raw[0] ^= 0x01;
        assert!(matches!(
            extract_chart_metadata(gzip(&raw).as_slice()),
            Err(FormatError::Tar(_))
        ));
    }
}
