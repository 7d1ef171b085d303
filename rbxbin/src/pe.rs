//! Section access for Windows PE executables.

use goblin::pe::PE;
use tracing::debug;

use crate::error::{DeployError, DeployResult};

/// Read-only initialized data section, where the installer keeps its
/// directory map.
pub const RDATA_SECTION: &str = ".rdata";

/// Reads a named section out of an executable image.
pub trait SectionReader: Send + Sync {
    /// Return the raw bytes of section `name` in `image`.
    fn section(&self, image: &[u8], name: &str) -> DeployResult<Vec<u8>>;
}

/// [`SectionReader`] for PE images, backed by goblin.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeSectionReader;

impl SectionReader for PeSectionReader {
    fn section(&self, image: &[u8], name: &str) -> DeployResult<Vec<u8>> {
        let pe = PE::parse(image).map_err(|e| DeployError::InvalidExecutable(e.to_string()))?;

        let section = pe
            .sections
            .iter()
            .find(|s| s.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| DeployError::SectionNotFound {
                name: name.to_string(),
            })?;

        // The file-backed part of the section; virtual padding is not stored.
        let start = section.pointer_to_raw_data as usize;
        let end = start
            .checked_add(section.size_of_raw_data as usize)
            .filter(|&end| end <= image.len())
            .ok_or_else(|| {
                DeployError::InvalidExecutable(format!(
                    "section {} extends past end of image",
                    name
                ))
            })?;

        debug!(section = %name, offset = start, size = end - start, "Read PE section");
        Ok(image[start..end].to_vec())
    }
}
