//! rbxbin - Roblox binary deployment resolution
//!
//! This library resolves which build of a Roblox binary a client should
//! install and extracts the metadata needed to download and lay out its
//! files:
//!
//! - [`DeploymentResolver`] turns a [`BinaryVariant`] and channel into a
//!   [`Deployment`]
//! - [`select_mirror`] finds a reachable deploy [`Mirror`]
//! - [`DeploymentAccessor`] fetches the package manifest and the package
//!   directory map of a deployment from a mirror
//!
//! HTTP, user-channel lookup and PE section reading sit behind the
//! [`HttpClient`], [`UserChannelLookup`] and [`SectionReader`] traits.
//!
//! # Example
//!
//! ```no_run
//! use rbxbin::{
//!     select_mirror, BinaryVariant, ClientSettingsApi, Config, DeploymentAccessor,
//!     DeploymentResolver, PeSectionReader, ReqwestClient,
//! };
//!
//! # fn main() -> rbxbin::DeployResult<()> {
//! let config = Config::default();
//! let client = ReqwestClient::with_timeout(config.timeout)?;
//! let api = ClientSettingsApi::with_base_url(&client, &config.client_settings_url);
//! let resolver = DeploymentResolver::new(api.clone(), api);
//!
//! let deployment = resolver.resolve(BinaryVariant::WindowsPlayer, "")?;
//! let mirror = select_mirror(&client, &config.mirrors)?;
//!
//! let accessor = DeploymentAccessor::new(mirror, &client, PeSectionReader);
//! for package in accessor.packages(&deployment)? {
//!     println!("{} ({} bytes)", package.name, package.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod binary;
pub mod config;
pub mod deployment;
pub mod directories;
pub mod error;
pub mod http;
pub mod manifest;
pub mod mirror;
pub mod pe;

pub use accessor::DeploymentAccessor;
pub use binary::BinaryVariant;
pub use config::Config;
pub use deployment::{
    canonical_channel, ClientSettingsApi, ClientVersion, Deployment, DeploymentResolver,
    UserChannel, UserChannelLookup,
};
pub use directories::{scan_directory_map, CandidateSpans, DirectoryMap};
pub use error::{DeployError, DeployResult};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use manifest::{parse_manifest, serialize_manifest, PackageRecord};
pub use mirror::{select_mirror, Mirror, MirrorList};
pub use pe::{PeSectionReader, SectionReader};
