//! rbxbin CLI - Command-line interface
//!
//! Resolves Roblox deployments and inspects their package metadata.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommandContext, DeploymentArgs};
use error::CliError;

#[derive(Parser)]
#[command(name = "rbxbin")]
#[command(version, about = "Resolve Roblox deployments and inspect their packages", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.rbxbin/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the first reachable deploy mirror
    Mirror,

    /// Resolve the latest deployment of a binary
    Resolve(DeploymentArgs),

    /// List the packages of a deployment
    Packages(DeploymentArgs),

    /// Show where each package of a deployment is installed
    Dirs(DeploymentArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = CommandContext::load(cli.config)?;

    match &cli.command {
        Commands::Mirror => commands::run_mirror(&ctx),
        Commands::Resolve(args) => commands::run_resolve(&ctx, args),
        Commands::Packages(args) => commands::run_packages(&ctx, args),
        Commands::Dirs(args) => commands::run_dirs(&ctx, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_packages_command() {
        let cli = Cli::parse_from(["rbxbin", "packages", "studio", "--channel", "ZCanary"]);
        match cli.command {
            Commands::Packages(args) => {
                assert_eq!(args.variant, rbxbin::BinaryVariant::WindowsStudio64);
                assert_eq!(args.channel, "ZCanary");
            }
            _ => panic!("expected packages command"),
        }
    }

    #[test]
    fn test_default_channel_is_empty() {
        let cli = Cli::parse_from(["rbxbin", "-v", "resolve", "player"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Resolve(args) => assert!(args.channel.is_empty()),
            _ => panic!("expected resolve command"),
        }
    }

    #[test]
    fn test_invalid_variant_rejected() {
        assert!(Cli::try_parse_from(["rbxbin", "dirs", "linux"]).is_err());
    }
}
