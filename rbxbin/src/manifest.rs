//! Package manifest (`rbxPkgManifest.txt`) parsing.
//!
//! The manifest is a CRLF-separated text file:
//!
//! ```text
//! v0
//! <name>
//! <checksum>
//! <zip size>
//! <size>
//! ...
//! <empty line>
//! ```
//!
//! Every record is exactly four lines. The source system appends a CRLF after
//! the last record, which shows up as a trailing empty line.

use tracing::debug;

use crate::error::{DeployError, DeployResult};

/// File name of the package manifest on a mirror.
pub const MANIFEST_FILENAME: &str = "rbxPkgManifest.txt";

/// The only manifest version with a known layout.
pub const MANIFEST_VERSION: &str = "v0";

const LINE_SEPARATOR: &str = "\r\n";
const LINES_PER_RECORD: usize = 4;

/// A single package listed in a deployment's manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    /// Package file name (e.g. `RobloxApp.zip`).
    pub name: String,

    /// Content hash of the package archive, kept opaque.
    pub checksum: String,

    /// Uncompressed size in bytes.
    pub size: i64,

    /// Compressed (archive) size in bytes.
    pub zip_size: i64,
}

/// Sum of the uncompressed sizes of all records.
pub fn total_size(records: &[PackageRecord]) -> i64 {
    records.iter().map(|r| r.size).sum()
}

/// Sum of the compressed sizes of all records.
pub fn total_zip_size(records: &[PackageRecord]) -> i64 {
    records.iter().map(|r| r.zip_size).sum()
}

/// Parse a package manifest into its records, in manifest order.
///
/// The whole manifest is rejected if any part of it is invalid; a partial
/// list is never returned.
///
/// # Example
///
/// ```
/// use rbxbin::parse_manifest;
///
/// let raw = b"v0\r\nRobloxApp.zip\r\nabc\r\n10\r\n20\r\n";
/// let records = parse_manifest(raw).unwrap();
///
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].zip_size, 10);
/// assert_eq!(records[0].size, 20);
/// ```
pub fn parse_manifest(raw: &[u8]) -> DeployResult<Vec<PackageRecord>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| DeployError::MalformedManifest(format!("not valid UTF-8: {}", e)))?;
    let lines: Vec<&str> = text.split(LINE_SEPARATOR).collect();

    // Version line plus the trailing empty line.
    let body_lines = lines.len().checked_sub(2).ok_or_else(|| {
        DeployError::MalformedManifest(format!("only {} line(s)", lines.len()))
    })?;
    if body_lines % LINES_PER_RECORD != 0 {
        return Err(DeployError::MalformedManifest(format!(
            "{} record lines is not a multiple of {}",
            body_lines, LINES_PER_RECORD
        )));
    }

    if lines[0] != MANIFEST_VERSION {
        return Err(DeployError::UnsupportedManifestVersion(lines[0].to_string()));
    }

    let records = lines[1..=body_lines]
        .chunks_exact(LINES_PER_RECORD)
        .enumerate()
        .map(|(index, chunk)| -> DeployResult<PackageRecord> {
            let line = 2 + index * LINES_PER_RECORD;
            Ok(PackageRecord {
                name: chunk[0].to_string(),
                checksum: chunk[1].to_string(),
                zip_size: parse_size(chunk[2], line + 2)?,
                size: parse_size(chunk[3], line + 3)?,
            })
        })
        .collect::<DeployResult<Vec<_>>>()?;

    debug!(packages = records.len(), "Parsed package manifest");
    Ok(records)
}

/// Parse a size field. `line` is 1-based, for error messages.
fn parse_size(field: &str, line: usize) -> DeployResult<i64> {
    let value = field.parse::<i64>().map_err(|e| {
        DeployError::MalformedManifest(format!("line {}: invalid size {:?}: {}", line, field, e))
    })?;

    if value < 0 {
        return Err(DeployError::MalformedManifest(format!(
            "line {}: negative size {}",
            line, value
        )));
    }

    Ok(value)
}

/// Serialize records into the `v0` manifest format.
///
/// The output parses back to the same records.
pub fn serialize_manifest(records: &[PackageRecord]) -> String {
    let mut out = String::from(MANIFEST_VERSION);
    out.push_str(LINE_SEPARATOR);

    for record in records {
        for field in [
            record.name.clone(),
            record.checksum.clone(),
            record.zip_size.to_string(),
            record.size.to_string(),
        ] {
            out.push_str(&field);
            out.push_str(LINE_SEPARATOR);
        }
    }

    out
}
