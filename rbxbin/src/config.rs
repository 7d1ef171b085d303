//! Configuration for deployment resolution.
//!
//! Configuration can be built in code or loaded from an INI file:
//!
//! ```ini
//! [mirrors]
//! candidates = https://setup.rbxcdn.com, https://roblox-setup.cachefly.net
//!
//! [api]
//! client_settings = https://clientsettings.roblox.com
//!
//! [http]
//! timeout_secs = 30
//! ```
//!
//! Missing sections and keys fall back to the defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use crate::deployment::DEFAULT_CLIENT_SETTINGS_URL;
use crate::error::{DeployError, DeployResult};
use crate::http::DEFAULT_TIMEOUT_SECS;
use crate::mirror::{Mirror, MirrorList};

/// Name of the configuration directory under the user's home.
pub const CONFIG_DIR_NAME: &str = ".rbxbin";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Configuration for deployment resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Mirror candidates, in priority order.
    pub mirrors: MirrorList,

    /// Base URL of the client-settings API.
    pub client_settings_url: String,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mirrors: MirrorList::default(),
            client_settings_url: DEFAULT_CLIENT_SETTINGS_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Default configuration file path (`~/.rbxbin/config.ini`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from an INI file.
    pub fn load(path: &Path) -> DeployResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| DeployError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> DeployResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from INI text.
    pub fn parse(content: &str) -> DeployResult<Self> {
        let ini = Ini::load_from_str(content)
            .map_err(|e| DeployError::InvalidConfig(e.to_string()))?;
        let mut config = Self::default();

        if let Some(candidates) = ini.get_from(Some("mirrors"), "candidates") {
            let mirrors: MirrorList = candidates
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Mirror::new)
                .collect();
            if mirrors.is_empty() {
                return Err(DeployError::InvalidConfig(
                    "mirrors.candidates must list at least one mirror".to_string(),
                ));
            }
            config.mirrors = mirrors;
        }

        if let Some(url) = ini.get_from(Some("api"), "client_settings") {
            let url = url.trim();
            if url.is_empty() {
                return Err(DeployError::InvalidConfig(
                    "api.client_settings must not be empty".to_string(),
                ));
            }
            config.client_settings_url = url.to_string();
        }

        if let Some(secs) = ini.get_from(Some("http"), "timeout_secs") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DeployError::InvalidConfig(format!("http.timeout_secs: invalid number {:?}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Add a mirror candidate with the lowest priority.
    pub fn with_mirror(mut self, mirror: impl Into<String>) -> Self {
        let mut mirrors = self.mirrors.as_slice().to_vec();
        mirrors.push(Mirror::new(mirror));
        self.mirrors = MirrorList::new(mirrors);
        self
    }

    /// Replace the mirror candidates.
    pub fn with_mirrors(mut self, mirrors: MirrorList) -> Self {
        self.mirrors = mirrors;
        self
    }

    /// Set the client-settings API base URL.
    pub fn with_client_settings_url(mut self, url: impl Into<String>) -> Self {
        self.client_settings_url = url.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
