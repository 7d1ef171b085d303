//! Mirror-side access to a resolved deployment's files.

use tracing::debug;

use crate::deployment::Deployment;
use crate::directories::{scan_directory_map, DirectoryMap};
use crate::error::DeployResult;
use crate::http::{auth_headers, HttpClient};
use crate::manifest::{parse_manifest, PackageRecord, MANIFEST_FILENAME};
use crate::mirror::Mirror;
use crate::pe::{SectionReader, RDATA_SECTION};

/// Fetches a deployment's package manifest and directory map from a mirror.
///
/// Every fetch carries the deployment's channel token, if it has one.
pub struct DeploymentAccessor<H, S> {
    mirror: Mirror,
    client: H,
    sections: S,
}

impl<H: HttpClient, S: SectionReader> DeploymentAccessor<H, S> {
    pub fn new(mirror: Mirror, client: H, sections: S) -> Self {
        Self {
            mirror,
            client,
            sections,
        }
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// URL of a package blob for the deployment on this accessor's mirror.
    pub fn package_url(&self, deployment: &Deployment, package: &str) -> String {
        self.mirror.package_url(deployment, package)
    }

    /// Download and parse the deployment's package manifest.
    pub fn packages(&self, deployment: &Deployment) -> DeployResult<Vec<PackageRecord>> {
        let body = self.fetch(deployment, MANIFEST_FILENAME)?;
        parse_manifest(&body)
    }

    /// Download the deployment's installer and extract its package
    /// directory map.
    pub fn directories(&self, deployment: &Deployment) -> DeployResult<DirectoryMap> {
        let installer = self.fetch(deployment, &deployment.variant().installer_name())?;
        let rdata = self.sections.section(&installer, RDATA_SECTION)?;
        scan_directory_map(&rdata)
    }

    /// GET a deployment file, failing on any non-success status.
    pub fn fetch(&self, deployment: &Deployment, file: &str) -> DeployResult<Vec<u8>> {
        let url = self.package_url(deployment, file);
        debug!(url = %url, "Fetching deployment file");

        self.client
            .get(&url, &auth_headers(deployment.token()))?
            .into_success_body(&url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinaryVariant;
    use crate::error::DeployError;
    use crate::http::tests::MockHttpClient;
    use crate::http::CHANNEL_TOKEN_HEADER;
    use crate::pe::tests::MockSectionReader;

    const MIRROR: &str = "https://setup.test";

    fn deployment(token: Option<&str>) -> Deployment {
        Deployment::new(
            BinaryVariant::WindowsPlayer,
            "zprivate",
            "version-abc",
            token.map(str::to_string),
        )
    }

    fn url(file: &str) -> String {
        format!("{}/channel/common/version-abc-{}", MIRROR, file)
    }

    #[test]
    fn test_packages_with_token() {
        let client = MockHttpClient::new().respond(
            &url("rbxPkgManifest.txt"),
            200,
            b"v0\r\nRobloxApp.zip\r\nabc\r\n1\r\n2\r\n".to_vec(),
        );
        let accessor =
            DeploymentAccessor::new(Mirror::new(MIRROR), &client, MockSectionReader::default());

        let packages = accessor.packages(&deployment(Some("secret"))).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "RobloxApp.zip");
        assert_eq!(
            client.requests()[0].header(CHANNEL_TOKEN_HEADER),
            Some("secret")
        );
    }

    #[test]
    fn test_packages_missing_manifest() {
        let client = MockHttpClient::new().respond(&url("rbxPkgManifest.txt"), 403, Vec::new());
        let accessor =
            DeploymentAccessor::new(Mirror::new(MIRROR), &client, MockSectionReader::default());

        match accessor.packages(&deployment(None)) {
            Err(DeployError::HttpStatus { url: failed, status }) => {
                assert_eq!(status, 403);
                assert_eq!(failed, url("rbxPkgManifest.txt"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(client.requests()[0].header(CHANNEL_TOKEN_HEADER), None);
    }

    #[test]
    fn test_directories_from_installer() {
        let client =
            MockHttpClient::new().respond(&url("RobloxPlayerInstaller.exe"), 200, b"MZ".to_vec());
        let rdata = [
            &b"\x00garbage\x00"[..],
            br#"{"RobloxApp.zip":"","content-sky.zip":"content\\sky\\"}"#,
            b"\x00",
        ]
        .concat();
        let sections = MockSectionReader::default().with_section(".rdata", rdata);
        let accessor = DeploymentAccessor::new(Mirror::new(MIRROR), &client, sections);

        let dirs = accessor.directories(&deployment(None)).unwrap();
        assert_eq!(dirs.get("RobloxApp.zip"), Some("."));
        assert_eq!(dirs.get("content-sky.zip"), Some("content/sky"));
    }

    #[test]
    fn test_directories_missing_section() {
        let client =
            MockHttpClient::new().respond(&url("RobloxPlayerInstaller.exe"), 200, b"MZ".to_vec());
        let accessor =
            DeploymentAccessor::new(Mirror::new(MIRROR), &client, MockSectionReader::default());

        assert!(matches!(
            accessor.directories(&deployment(None)),
            Err(DeployError::SectionNotFound { .. })
        ));
    }

    #[test]
    fn test_directories_not_found() {
        let client =
            MockHttpClient::new().respond(&url("RobloxPlayerInstaller.exe"), 200, b"MZ".to_vec());
        let sections =
            MockSectionReader::default().with_section(".rdata", b"\x00\x00\x00".to_vec());
        let accessor = DeploymentAccessor::new(Mirror::new(MIRROR), &client, sections);

        assert!(matches!(
            accessor.directories(&deployment(None)),
            Err(DeployError::DirectoryMapNotFound)
        ));
    }
}
