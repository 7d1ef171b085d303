//! Package directory map extraction from installer executables.
//!
//! The installer carries a JSON object mapping package names to their
//! install directories as a null-terminated string literal in its `.rdata`
//! section. There is no index or length prefix, so the map is located by
//! sniffing null-byte boundaries:
//!
//! ```text
//! ... \0 {"RobloxApp.zip":"", "content-fonts.zip":"content\\fonts\\"} \0 ...
//!        ^ start                                                     ^ end
//! ```
//!
//! The boundary heuristic is not exact: other null-delimited JSON-like
//! literals may precede the real map. [`CandidateSpans`] only finds
//! boundaries; [`scan_directory_map`] decodes each candidate in turn and
//! keeps the first one that is a valid string-to-string object.

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::{debug, trace};

use crate::error::{DeployError, DeployResult};

/// Package name → install path relative to the version directory.
///
/// Paths always use forward slashes and are lexically cleaned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryMap {
    entries: BTreeMap<String, String>,
}

impl DirectoryMap {
    /// Build a map from raw installer entries, normalizing every path.
    pub fn from_raw(raw: BTreeMap<String, String>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(package, dir)| (package, normalize_path(&dir)))
            .collect();
        Self { entries }
    }

    /// Install path for the named package.
    pub fn get(&self, package: &str) -> Option<&str> {
        self.entries.get(package).map(String::as_str)
    }

    /// Iterate over `(package, path)` pairs in package name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the map, returning the underlying entries.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.entries
    }
}

/// Lazy search over null-delimited `{"` ... `"}` spans in a byte buffer.
///
/// Each yielded range excludes the surrounding null bytes. Iteration resumes
/// immediately after the terminating null byte of the previous span, with no
/// start marker carried over.
#[derive(Debug, Clone)]
pub struct CandidateSpans<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> CandidateSpans<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_start(&self, i: usize) -> bool {
        let b = self.data;
        i >= 1 && i + 1 < b.len() && b[i - 1] == 0 && b[i] == b'{' && b[i + 1] == b'"'
    }

    fn is_end(&self, i: usize) -> bool {
        let b = self.data;
        i >= 2 && b[i] == 0 && b[i - 1] == b'}' && b[i - 2] == b'"'
    }
}

impl Iterator for CandidateSpans<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut start = None;

        while self.pos < self.data.len() {
            let i = self.pos;
            self.pos += 1;

            // A later start supersedes an unterminated earlier one.
            if self.is_start(i) {
                start = Some(i);
            }

            if let Some(s) = start {
                if self.is_end(i) {
                    return Some(s..i);
                }
            }
        }

        None
    }
}

/// Locate and decode the package directory map in an installer's `.rdata`
/// section.
///
/// The first candidate that decodes as a JSON object of strings wins.
///
/// # Example
///
/// ```
/// use rbxbin::scan_directory_map;
///
/// let section = b"\0{\"RobloxApp.zip\":\"\",\"shaders.zip\":\"shaders\\\\\"}\0";
/// let map = scan_directory_map(section).unwrap();
///
/// assert_eq!(map.get("RobloxApp.zip"), Some("."));
/// assert_eq!(map.get("shaders.zip"), Some("shaders"));
/// ```
pub fn scan_directory_map(section: &[u8]) -> DeployResult<DirectoryMap> {
    for span in CandidateSpans::new(section) {
        match serde_json::from_slice::<BTreeMap<String, String>>(&section[span.clone()]) {
            Ok(raw) => {
                debug!(
                    offset = span.start,
                    entries = raw.len(),
                    "Found package directory map"
                );
                return Ok(DirectoryMap::from_raw(raw));
            }
            Err(e) => {
                trace!(offset = span.start, error = %e, "Discarding directory map candidate");
            }
        }
    }

    Err(DeployError::DirectoryMapNotFound)
}

/// Convert backslashes to slashes and lexically clean the result.
pub fn normalize_path(path: &str) -> String {
    clean_path(&path.replace('\\', "/"))
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated separators, removes `.` segments and resolves `..`
/// against the preceding segment. A `..` that cannot be resolved is kept for
/// relative paths and dropped at the root. The empty path cleans to `.`.
pub fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
