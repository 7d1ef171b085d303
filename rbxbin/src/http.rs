//! HTTP client abstraction for testability.

use std::time::Duration;

use tracing::debug;

use crate::error::{DeployError, DeployResult};

/// Header carrying the access token of a private channel.
pub const CHANNEL_TOKEN_HEADER: &str = "Roblox-Channel-Token";

/// Client identifier sent as `User-Agent` with every request.
pub const USER_AGENT: &str = concat!("rbxbin/v", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A request header as a name/value pair.
pub type Header = (&'static str, String);

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return the body, or an [`DeployError::HttpStatus`] naming the URL if
    /// the status is not a success.
    pub fn into_success_body(self, url: &str) -> DeployResult<Vec<u8>> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(DeployError::HttpStatus {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

/// Trait for HTTP client operations.
///
/// Transport failures are returned as [`DeployError::Transport`]; any
/// response, successful or not, is returned as an [`HttpResponse`] so that
/// callers can decide how to treat the status.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and reads the full body.
    fn get(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse>;

    /// Performs an HTTP HEAD request. The returned body is empty.
    fn head(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse>;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        (**self).get(url, headers)
    }

    fn head(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        (**self).head(url, headers)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    fn get(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        (**self).get(url, headers)
    }

    fn head(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        (**self).head(url, headers)
    }
}

/// Headers attached to every authenticated request.
///
/// The channel token header is only present when the token is non-empty.
pub fn auth_headers(token: Option<&str>) -> Vec<Header> {
    let mut headers = Vec::with_capacity(2);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push((CHANNEL_TOKEN_HEADER, token.to_string()));
    }
    headers.push(("User-Agent", USER_AGENT.to_string()));
    headers
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> DeployResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout: Duration) -> DeployResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DeployError::InvalidConfig(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout })
    }

    /// The configured request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
        url: &str,
        headers: &[Header],
        read_body: bool,
    ) -> DeployResult<HttpResponse> {
        let request = headers
            .iter()
            .fold(request, |req, (name, value)| req.header(*name, value));

        let response = request.send().map_err(|e| DeployError::Transport {
            url: url.to_string(),
            reason: if e.is_timeout() {
                format!("timed out after {}s", self.timeout.as_secs())
            } else {
                e.to_string()
            },
        })?;

        let status = response.status().as_u16();
        debug!(url = %url, status, "HTTP response");

        // The body is consumed (or dropped) here on every path, releasing the
        // connection back to the pool.
        let body = if read_body {
            response
                .bytes()
                .map(|b| b.to_vec())
                .map_err(|e| DeployError::Transport {
                    url: url.to_string(),
                    reason: format!("failed to read response: {}", e),
                })?
        } else {
            Vec::new()
        };

        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        self.send(self.client.get(url), url, headers, true)
    }

    fn head(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
        self.send(self.client.head(url), url, headers, false)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A request observed by [`MockHttpClient`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub headers: Vec<Header>,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Mock HTTP client for testing.
    ///
    /// Responses are keyed by URL; unknown URLs fail with a transport error.
    #[derive(Default)]
    pub struct MockHttpClient {
        responses: HashMap<String, Result<HttpResponse, String>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
            self.responses
                .insert(url.to_string(), Ok(HttpResponse::new(status, body)));
            self
        }

        pub fn fail(mut self, url: &str, reason: &str) -> Self {
            self.responses
                .insert(url.to_string(), Err(reason.to_string()));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn handle(
            &self,
            method: &'static str,
            url: &str,
            headers: &[Header],
        ) -> DeployResult<HttpResponse> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                headers: headers.to_vec(),
            });

            match self.responses.get(url) {
                Some(Ok(response)) => Ok(response.clone()),
                Some(Err(reason)) => Err(DeployError::Transport {
                    url: url.to_string(),
                    reason: reason.clone(),
                }),
                None => Err(DeployError::Transport {
                    url: url.to_string(),
                    reason: "no route".to_string(),
                }),
            }
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
            self.handle("GET", url, headers)
        }

        fn head(&self, url: &str, headers: &[Header]) -> DeployResult<HttpResponse> {
            self.handle("HEAD", url, headers).map(|r| HttpResponse {
                status: r.status,
                body: Vec::new(),
            })
        }
    }

    #[test]
    fn test_auth_headers_without_token() {
        let headers = auth_headers(None);
        assert_eq!(headers, vec![("User-Agent", USER_AGENT.to_string())]);

        let headers = auth_headers(Some(""));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_auth_headers_with_token() {
        let headers = auth_headers(Some("secret"));
        assert_eq!(headers[0], (CHANNEL_TOKEN_HEADER, "secret".to_string()));
        assert_eq!(headers[1].0, "User-Agent");
    }

    #[test]
    fn test_into_success_body() {
        let ok = HttpResponse::new(200, b"body".to_vec());
        assert_eq!(ok.into_success_body("u").unwrap(), b"body");

        let missing = HttpResponse::new(404, Vec::new());
        match missing.into_success_body("https://example.com/x") {
            Err(DeployError::HttpStatus { url, status }) => {
                assert_eq!(url, "https://example.com/x");
                assert_eq!(status, 404);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_mock_client_records_requests() {
        let mock = MockHttpClient::new().respond("http://example.com", 200, vec![1, 2, 3]);

        let response = mock.get("http://example.com", &auth_headers(Some("t"))).unwrap();
        assert_eq!(response.body, vec![1, 2, 3]);

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].header(CHANNEL_TOKEN_HEADER), Some("t"));
    }

    #[test]
    fn test_mock_client_error() {
        let mock = MockHttpClient::new().fail("http://example.com", "refused");
        assert!(matches!(
            mock.head("http://example.com", &[]),
            Err(DeployError::Transport { .. })
        ));
    }

    #[test]
    fn test_reqwest_client_timeout() {
        let client = ReqwestClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }
}
