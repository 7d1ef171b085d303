//! Deployment resolution.
//!
//! In all things related to the client-settings API the default channel is
//! empty, or `LIVE`/`live`. It is stored here as the empty string; every
//! other channel is stored lower-cased, since the CDN paths that embed the
//! channel name are case-sensitive while the API is not.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, info};

use crate::binary::BinaryVariant;
use crate::error::{DeployError, DeployResult};
use crate::http::{auth_headers, HttpClient};

/// Default base URL of the client-settings API.
pub const DEFAULT_CLIENT_SETTINGS_URL: &str = "https://clientsettings.roblox.com";

/// API error code for a channel that does not exist or that the caller may
/// not access.
pub const BAD_CHANNEL_CODE: i64 = 5;

/// Canonical form of a channel name: lower case, with the default channel
/// (`""`, `live`, `LIVE`) as the empty string.
pub fn canonical_channel(channel: &str) -> String {
    let channel = channel.trim().to_lowercase();
    if channel == "live" {
        String::new()
    } else {
        channel
    }
}

/// A resolved binary deployment.
///
/// Deployments carry no network handle: fetches made on behalf of a
/// deployment must re-supply its [`token`](Self::token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    variant: BinaryVariant,
    channel: String,
    version: String,
    token: Option<String>,
}

impl Deployment {
    /// Create a deployment. The channel is canonicalized and an empty token
    /// is treated as no token.
    pub fn new(
        variant: BinaryVariant,
        channel: impl AsRef<str>,
        version: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            variant,
            channel: canonical_channel(channel.as_ref()),
            version: version.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn variant(&self) -> BinaryVariant {
        self.variant
    }

    /// Canonical channel name; empty for the default channel.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Opaque version identifier (e.g. `version-0123456789abcdef`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Access token for a private channel.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_default_channel(&self) -> bool {
        self.channel.is_empty()
    }

    /// Channel name for display: `live` for the default channel.
    pub fn display_channel(&self) -> &str {
        if self.is_default_channel() {
            "live"
        } else {
            &self.channel
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.variant,
            self.version,
            self.display_channel()
        )
    }
}

/// The channel a user is currently assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChannel {
    pub channel: String,
    pub token: Option<String>,
}

/// Looks up the caller's current channel for a binary variant.
///
/// Implementations typically sit on top of an authenticated session; an
/// unauthenticated lookup reports the default channel.
pub trait UserChannelLookup: Send + Sync {
    fn user_channel(&self, variant: BinaryVariant) -> DeployResult<UserChannel>;
}

impl<T: UserChannelLookup + ?Sized> UserChannelLookup for &T {
    fn user_channel(&self, variant: BinaryVariant) -> DeployResult<UserChannel> {
        (**self).user_channel(variant)
    }
}

/// Version metadata for a deployment, as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientVersion {
    /// Human-readable version (e.g. `0.615.0.6150637`).
    pub version: String,

    /// Version identifier used in mirror paths.
    pub client_version_upload: String,

    #[serde(default)]
    pub bootstrapper_version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserChannelResponse {
    channel_name: String,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Client for the client-settings API.
#[derive(Debug, Clone)]
pub struct ClientSettingsApi<H> {
    client: H,
    base_url: String,
}

impl<H: HttpClient> ClientSettingsApi<H> {
    pub fn new(client: H) -> Self {
        Self::with_base_url(client, DEFAULT_CLIENT_SETTINGS_URL)
    }

    pub fn with_base_url(client: H, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the version metadata for a variant and canonical channel.
    pub fn client_version_url(&self, variant: BinaryVariant, channel: &str) -> String {
        if channel.is_empty() {
            format!("{}/v2/client-version/{}", self.base_url, variant)
        } else {
            format!(
                "{}/v2/client-version/{}/channel/{}",
                self.base_url, variant, channel
            )
        }
    }

    /// Fetch version metadata, authenticating with the channel token if any.
    pub fn client_version(
        &self,
        variant: BinaryVariant,
        channel: &str,
        token: Option<&str>,
    ) -> DeployResult<ClientVersion> {
        let url = self.client_version_url(variant, channel);
        self.get_json(&url, token)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: Option<&str>,
    ) -> DeployResult<T> {
        debug!(url = %url, "Fetching client settings");
        let response = self.client.get(url, &auth_headers(token))?;

        if !response.is_success() {
            return Err(api_error(url, response.status, &response.body));
        }

        serde_json::from_slice(&response.body).map_err(|e| DeployError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl<H: HttpClient> UserChannelLookup for ClientSettingsApi<H> {
    fn user_channel(&self, variant: BinaryVariant) -> DeployResult<UserChannel> {
        let url = format!("{}/v2/user-channel?binaryType={}", self.base_url, variant);
        let response: UserChannelResponse = self.get_json(&url, None)?;

        Ok(UserChannel {
            channel: response.channel_name,
            token: response.token.filter(|t| !t.is_empty()),
        })
    }
}

/// Classify a non-success response, preferring the structured error body.
fn api_error(url: &str, status: u16, body: &[u8]) -> DeployError {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let first = &parsed.errors[0];
            DeployError::Api {
                url: url.to_string(),
                status,
                code: first.code,
                message: first.message.clone(),
            }
        }
        _ => DeployError::HttpStatus {
            url: url.to_string(),
            status,
        },
    }
}

/// Resolves binary variants and channels into [`Deployment`]s.
pub struct DeploymentResolver<H, L> {
    api: ClientSettingsApi<H>,
    lookup: L,
}

impl<H: HttpClient, L: UserChannelLookup> DeploymentResolver<H, L> {
    pub fn new(api: ClientSettingsApi<H>, lookup: L) -> Self {
        Self { api, lookup }
    }

    /// Resolve the latest deployment of `variant` on `channel`.
    ///
    /// An empty channel resolves the caller's current channel through the
    /// user-channel lookup, which may be private and carry an access token.
    /// A non-empty channel is used as given, without a lookup.
    ///
    /// A channel that does not exist or that the caller cannot access
    /// surfaces as [`DeployError::BadChannel`].
    pub fn resolve(&self, variant: BinaryVariant, channel: &str) -> DeployResult<Deployment> {
        let (channel, token) = if channel.is_empty() {
            let user = self.lookup.user_channel(variant).map_err(|e| {
                DeployError::UserChannelLookupFailed {
                    variant,
                    source: Box::new(e),
                }
            })?;
            debug!(variant = %variant, channel = %user.channel, "Resolved user channel");
            (canonical_channel(&user.channel), user.token)
        } else {
            (canonical_channel(channel), None)
        };

        match self.api.client_version(variant, &channel, token.as_deref()) {
            Ok(version) => {
                let deployment =
                    Deployment::new(variant, &channel, version.client_version_upload, token);
                info!(deployment = %deployment, "Resolved deployment");
                Ok(deployment)
            }
            Err(DeployError::Api { code, .. }) if code == BAD_CHANNEL_CODE => {
                Err(DeployError::BadChannel { channel })
            }
            Err(e) => Err(e),
        }
    }
}
