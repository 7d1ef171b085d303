//! Error types for deployment resolution and package metadata retrieval.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::binary::BinaryVariant;

const TOO_MANY_REQUESTS: u16 = 429;

/// Result type for deployment operations.
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while resolving a deployment or reading its metadata.
///
/// Parsing and decoding failures are always fatal to the call: no partial
/// manifest or directory map is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum DeployError {
    /// The deployment channel does not exist or is out of the caller's
    /// permission scope.
    #[error("deployment channel {channel:?} is invalid or unauthorized")]
    BadChannel { channel: String },

    /// The current user's channel could not be determined.
    #[error("failed to look up user channel for {variant}")]
    UserChannelLookupFailed {
        variant: BinaryVariant,
        #[source]
        source: Box<DeployError>,
    },

    /// Every candidate mirror failed its liveness probe.
    #[error("no accessible deploy mirror found ({tried} tried)")]
    NoMirrorAvailable { tried: usize },

    /// The package manifest does not have the expected shape.
    #[error("package manifest is invalid: {0}")]
    MalformedManifest(String),

    /// The package manifest uses a version tag other than `v0`.
    #[error("unhandled package manifest version: {0:?}")]
    UnsupportedManifestVersion(String),

    /// No decodable directory map was found in the installer.
    #[error("could not locate package directory map in installer")]
    DirectoryMapNotFound,

    /// The named section is absent from the executable.
    #[error("section {name} not found in executable")]
    SectionNotFound { name: String },

    /// The executable could not be parsed as a PE image.
    #[error("invalid executable: {0}")]
    InvalidExecutable(String),

    /// The API answered with a structured error.
    #[error("API error {code} from {url} (HTTP {status}): {message}")]
    Api {
        url: String,
        status: u16,
        code: i64,
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// A response body could not be decoded.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("failed to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeployError {
    /// Whether the caller should ask for a different channel rather than retry.
    pub fn is_bad_channel(&self) -> bool {
        matches!(self, Self::BadChannel { .. })
    }

    /// Whether the failure may go away on retry, possibly against another mirror.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::NoMirrorAvailable { .. } => true,
            Self::HttpStatus { status, .. } | Self::Api { status, .. } => {
                *status >= 500 || *status == TOO_MANY_REQUESTS
            }
            Self::UserChannelLookupFailed { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
