// AiStrip API HTTP client
//
// Wraps `reqwest::Client` with URL construction, status handling and body
// decoding. Endpoint methods live in `devices.rs` as inherent methods to
// keep this module focused on transport mechanics.

use std::time::Duration;

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::{TransportConfig, auth_headers};

/// Production endpoint of the FamilyAsyst cloud.
pub const DEFAULT_BASE_URL: &str = "https://asia-east1.tiscservice.com/api/fa2";

/// Raw HTTP client for the AiStrip cloud API.
///
/// Cheap to share behind an `Arc`: the credential and base URL are fixed at
/// construction and never mutated afterwards.
#[derive(Debug)]
pub struct AiStripClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl AiStripClient {
    /// Create a client that sends `key` as the `Authorization` header on
    /// every request.
    pub fn new(
        base_url: Url,
        key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let headers = auth_headers(key)?;
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for the default headers. `timeout` must be
    /// the one `http` was built with; it is only used to report timeouts.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            timeout,
        }
    }

    /// The service base URL (e.g. `https://host/api/fa2`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout applied by the underlying client.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Append path segments to the base URL.
    ///
    /// Segments are percent-encoded, so a device id can never escape its
    /// position in the path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.decode(resp).await
    }

    /// Send a POST request with JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.decode(resp).await
    }

    /// Reject non-2xx statuses, then parse the body as `T`.
    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.send_error(e))?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}
