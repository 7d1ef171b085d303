//! Deployment mirrors and mirror selection.
//!
//! Mirrors may go down or be blocked by ISPs, so the reachable mirror is
//! re-evaluated on every [`select_mirror`] call rather than cached.

use std::fmt;

use tracing::{debug, info, warn};

use crate::deployment::{canonical_channel, Deployment};
use crate::error::{DeployError, DeployResult};
use crate::http::{auth_headers, HttpClient};

/// Path probed on each mirror to check liveness.
pub const PROBE_PATH: &str = "version";

/// The default deployment mirror, for situations where mirror fallbacks are
/// undesired.
pub const DEFAULT_MIRROR: &str = "https://setup.rbxcdn.com";

// As of 2024-02-03:
//   setup-cfly.rbxcdn.com = roblox-setup.cachefly.net
//   setup.rbxcdn.com = setup-ns1.rbxcdn.com = setup-ak.rbxcdn.com
//   setup-hw.rbxcdn.com = setup-ll.rbxcdn.com = does not exist
const DEFAULT_CANDIDATES: [&str; 3] = [
    DEFAULT_MIRROR,
    "https://roblox-setup.cachefly.net",
    "https://s3.amazonaws.com/setup.roblox.com",
];

/// Base URL of a deployment mirror.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mirror(String);

impl Mirror {
    /// Create a mirror from its base URL. A trailing slash is stripped.
    pub fn new(base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        Self(url.trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL for channel-scoped metadata.
    ///
    /// The default channel (empty or `live` in any case) maps to the mirror
    /// root; every other channel maps to `<mirror>/channel/<channel>` with
    /// the channel name lower-cased.
    ///
    /// # Example
    ///
    /// ```
    /// use rbxbin::Mirror;
    ///
    /// let mirror = Mirror::new("https://setup.rbxcdn.com");
    /// assert_eq!(mirror.channel_url("LIVE"), "https://setup.rbxcdn.com");
    /// assert_eq!(
    ///     mirror.channel_url("ZCanary"),
    ///     "https://setup.rbxcdn.com/channel/zcanary"
    /// );
    /// ```
    pub fn channel_url(&self, channel: &str) -> String {
        let channel = canonical_channel(channel);
        if channel.is_empty() {
            self.0.clone()
        } else {
            format!("{}/channel/{}", self.0, channel)
        }
    }

    /// URL of a package blob for the given deployment.
    ///
    /// Package blobs live under `channel/common` for every channel, private
    /// or public.
    pub fn package_url(&self, deployment: &Deployment, package: &str) -> String {
        format!(
            "{}/channel/common/{}-{}",
            self.0,
            deployment.version(),
            package
        )
    }

    fn probe_url(&self) -> String {
        format!("{}/{}", self.0, PROBE_PATH)
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new(DEFAULT_MIRROR)
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Mirror {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Ordered mirror candidates. Earlier entries have priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorList(Vec<Mirror>);

impl MirrorList {
    pub fn new(mirrors: Vec<Mirror>) -> Self {
        Self(mirrors)
    }

    pub fn as_slice(&self) -> &[Mirror] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MirrorList {
    fn default() -> Self {
        Self(DEFAULT_CANDIDATES.iter().map(|&url| Mirror::new(url)).collect())
    }
}

impl FromIterator<Mirror> for MirrorList {
    fn from_iter<I: IntoIterator<Item = Mirror>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Return the first candidate whose `version` endpoint answers with a
/// success status.
///
/// Transport failures and non-success statuses skip the candidate. Each
/// candidate is probed exactly once.
pub fn select_mirror<H: HttpClient>(
    client: &H,
    candidates: &MirrorList,
) -> DeployResult<Mirror> {
    let headers = auth_headers(None);

    for mirror in candidates.as_slice() {
        let url = mirror.probe_url();
        debug!(mirror = %mirror, "Probing mirror");

        match client.head(&url, &headers) {
            Ok(response) if response.is_success() => {
                info!(mirror = %mirror, "Selected deploy mirror");
                return Ok(mirror.clone());
            }
            Ok(response) => {
                warn!(
                    mirror = %mirror,
                    status = response.status,
                    "Mirror probe returned non-success status"
                );
            }
            Err(e) => {
                warn!(mirror = %mirror, error = %e, "Mirror unreachable");
            }
        }
    }

    Err(DeployError::NoMirrorAvailable {
        tried: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryVariant;
    use crate::http::tests::MockHttpClient;

    fn mirrors(urls: &[&str]) -> MirrorList {
        urls.iter().map(|&u| Mirror::new(u)).collect()
    }

    #[test]
    fn test_default_candidates_order() {
        let list = MirrorList::default();
        assert_eq!(list.len(), 3);
        assert_eq!(list.as_slice()[0], Mirror::default());
        assert_eq!(list.as_slice()[1].as_str(), "https://roblox-setup.cachefly.net");
    }

    #[test]
    fn test_select_first_reachable() {
        let client = MockHttpClient::new()
            .fail("https://a.example/version", "connection refused")
            .respond("https://b.example/version", 503, Vec::new())
            .respond("https://c.example/version", 200, Vec::new())
            .respond("https://d.example/version", 200, Vec::new());
        let list = mirrors(&[
            "https://a.example",
            "https://b.example",
            "https://c.example",
            "https://d.example",
        ]);

        let selected = select_mirror(&client, &list).unwrap();
        assert_eq!(selected.as_str(), "https://c.example");

        // d is never probed once c succeeds.
        let probed: Vec<_> = client.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            probed,
            vec![
                "https://a.example/version",
                "https://b.example/version",
                "https://c.example/version",
            ]
        );
        assert!(client.requests().iter().all(|r| r.method == "HEAD"));
    }

    #[test]
    fn test_select_none_available() {
        let client = MockHttpClient::new()
            .respond("https://a.example/version", 404, Vec::new())
            .fail("https://b.example/version", "timed out");
        let list = mirrors(&["https://a.example", "https://b.example"]);

        match select_mirror(&client, &list) {
            Err(DeployError::NoMirrorAvailable { tried }) => assert_eq!(tried, 2),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn test_select_empty_list() {
        let client = MockHttpClient::new();
        assert!(matches!(
            select_mirror(&client, &MirrorList::new(Vec::new())),
            Err(DeployError::NoMirrorAvailable { tried: 0 })
        ));
    }

    #[test]
    fn test_channel_url_default() {
        let mirror = Mirror::new("https://setup.rbxcdn.com/");
        assert_eq!(mirror.channel_url(""), "https://setup.rbxcdn.com");
        assert_eq!(mirror.channel_url("LIVE"), "https://setup.rbxcdn.com");
        assert_eq!(mirror.channel_url("live"), "https://setup.rbxcdn.com");
    }

    #[test]
    fn test_channel_url_case_insensitive() {
        let mirror = Mirror::default();
        assert_eq!(
            mirror.channel_url("Production"),
            mirror.channel_url("production")
        );
        assert_eq!(
            mirror.channel_url("Production"),
            "https://setup.rbxcdn.com/channel/production"
        );
    }

    #[test]
    fn test_package_url_uses_common() {
        let mirror = Mirror::default();
        let deployment = Deployment::new(
            BinaryVariant::WindowsPlayer,
            "zCanary",
            "version-0123456789abcdef",
            None,
        );

        assert_eq!(
            mirror.package_url(&deployment, "rbxPkgManifest.txt"),
            "https://setup.rbxcdn.com/channel/common/version-0123456789abcdef-rbxPkgManifest.txt"
        );
    }
}
