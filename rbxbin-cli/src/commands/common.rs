//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use rbxbin::{
    BinaryVariant, ClientSettingsApi, Config, Deployment, DeploymentResolver, ReqwestClient,
};

use crate::error::CliError;

/// Deployment selection shared by commands that operate on a deployment.
#[derive(Debug, Clone, Args)]
pub struct DeploymentArgs {
    /// Binary variant: player, studio, mac-player, mac-studio
    #[arg(value_parser = parse_variant)]
    pub variant: BinaryVariant,

    /// Deployment channel (defaults to the current user's channel)
    #[arg(long, short, default_value = "")]
    pub channel: String,
}

fn parse_variant(s: &str) -> Result<BinaryVariant, String> {
    s.parse()
}

/// Loaded configuration and HTTP client for a command run.
pub struct CommandContext {
    pub config: Config,
    pub client: ReqwestClient,
}

impl CommandContext {
    /// Load configuration from the given path, or the default location.
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => Config::load(&path)?,
            None => match Config::default_path() {
                Some(path) => Config::load_or_default(&path)?,
                None => Config::default(),
            },
        };

        let client = ReqwestClient::with_timeout(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Resolve the deployment selected on the command line.
    pub fn resolve(&self, args: &DeploymentArgs) -> Result<Deployment, CliError> {
        let api = ClientSettingsApi::with_base_url(&self.client, &self.config.client_settings_url);
        let resolver = DeploymentResolver::new(api.clone(), api);
        Ok(resolver.resolve(args.variant, &args.channel)?)
    }
}

/// Format a byte count for display.
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
