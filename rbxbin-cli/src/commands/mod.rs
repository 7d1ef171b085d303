//! CLI command handlers.
//!
//! Each handler loads its [`CommandContext`], performs one deployment
//! operation and prints the result to stdout. Diagnostics go through
//! `tracing` to stderr.

mod common;

pub use common::{CommandContext, DeploymentArgs};

use rbxbin::manifest::{total_size, total_zip_size};
use rbxbin::{select_mirror, DeploymentAccessor, PeSectionReader};

use crate::error::CliError;
use common::format_bytes;

/// Print the first reachable mirror.
pub fn run_mirror(ctx: &CommandContext) -> Result<(), CliError> {
    let mirror = select_mirror(&ctx.client, &ctx.config.mirrors)?;
    println!("{}", mirror);
    Ok(())
}

/// Print the resolved deployment.
pub fn run_resolve(ctx: &CommandContext, args: &DeploymentArgs) -> Result<(), CliError> {
    let deployment = ctx.resolve(args)?;

    println!("Variant:  {}", deployment.variant());
    println!("Channel:  {}", deployment.display_channel());
    println!("Version:  {}", deployment.version());
    println!(
        "Token:    {}",
        if deployment.token().is_some() {
            "yes"
        } else {
            "no"
        }
    );
    Ok(())
}

/// Print the deployment's package manifest.
pub fn run_packages(ctx: &CommandContext, args: &DeploymentArgs) -> Result<(), CliError> {
    let deployment = ctx.resolve(args)?;
    let mirror = select_mirror(&ctx.client, &ctx.config.mirrors)?;
    let accessor = DeploymentAccessor::new(mirror, &ctx.client, PeSectionReader);

    let packages = accessor.packages(&deployment)?;

    println!("{:<40} {:>12} {:>12}  CHECKSUM", "PACKAGE", "ZIP", "SIZE");
    for package in &packages {
        println!(
            "{:<40} {:>12} {:>12}  {}",
            package.name,
            format_bytes(package.zip_size),
            format_bytes(package.size),
            package.checksum
        );
    }
    println!();
    println!(
        "{} packages, {} compressed, {} uncompressed",
        packages.len(),
        format_bytes(total_zip_size(&packages)),
        format_bytes(total_size(&packages))
    );
    Ok(())
}

/// Print the deployment's package directory map.
pub fn run_dirs(ctx: &CommandContext, args: &DeploymentArgs) -> Result<(), CliError> {
    let deployment = ctx.resolve(args)?;
    let mirror = select_mirror(&ctx.client, &ctx.config.mirrors)?;
    let accessor = DeploymentAccessor::new(mirror, &ctx.client, PeSectionReader);

    let dirs = accessor.directories(&deployment)?;
    for (package, path) in dirs.iter() {
        println!("{:<40} {}", package, path);
    }
    Ok(())
}
