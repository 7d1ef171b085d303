//! Error type for CLI commands.

use std::fmt;

use rbxbin::DeployError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    Config(String),

    /// A deployment operation failed.
    Deploy(DeployError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Deploy(e) if e.is_bad_channel() => 3,
            CliError::Deploy(e) if e.is_transient() => 4,
            CliError::Deploy(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Deploy(DeployError::BadChannel { channel }) => write!(
                f,
                "Channel {:?} does not exist or you do not have access to it; pick another channel",
                channel
            ),
            CliError::Deploy(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Deploy(e) => Some(e),
            CliError::Config(_) => None,
        }
    }
}

impl From<DeployError> for CliError {
    fn from(e: DeployError) -> Self {
        match e {
            DeployError::InvalidConfig(msg) => CliError::Config(msg),
            e @ DeployError::ConfigRead { .. } => CliError::Config(e.to_string()),
            e => CliError::Deploy(e),
        }
    }
}
