// Shared transport configuration for building reqwest::Client instances.
//
// Every request to the service carries the same two headers, so they are
// installed once as client defaults instead of per request.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Per-request timeout used by the service's own mobile client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("aistrip/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` with additional default headers.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// Headers attached to every call: JSON content type and the raw key as
/// `Authorization` (the service takes the key verbatim, no scheme prefix).
pub fn auth_headers(key: &SecretString) -> Result<HeaderMap, Error> {
    let mut auth = HeaderValue::from_str(key.expose_secret())
        .map_err(|e| Error::InvalidCredential(e.to_string()))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn auth_headers_carry_key_verbatim() {
        let key = SecretString::from("abc123".to_string());
        let headers = auth_headers(&key).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "abc123");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn auth_headers_reject_control_characters() {
        let key = SecretString::from("bad\nkey".to_string());
        assert!(matches!(
            auth_headers(&key),
            Err(Error::InvalidCredential(_))
        ));
    }

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(10));
    }
}
