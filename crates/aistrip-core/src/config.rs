// ── Runtime platform configuration ──
//
// Describes how the bridge talks to the cloud service. Carries the
// credential but never touches disk: `aistrip-config` builds one of these
// from the TOML file and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use aistrip_api::transport::{DEFAULT_TIMEOUT, TransportConfig};
use aistrip_api::DEFAULT_BASE_URL;

use crate::error::CoreError;
use crate::registry::PluginKey;

/// Plugin identifier used when talking to the accessory registry.
pub const PLUGIN_NAME: &str = "homebridge-familyasyst-aistrip";

/// Platform identifier used when talking to the accessory registry.
pub const PLATFORM_NAME: &str = "FamilyAsystAiStrip";

/// Read-only configuration shared by every component of one platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// Display name of the platform instance.
    pub name: String,
    /// Value sent verbatim as the `Authorization` header.
    pub key: SecretString,
    /// Service base URL, `https://<host>/api/fa2`.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Re-run discovery this often after launch (seconds). 0 = startup only.
    pub refresh_interval_secs: u64,
}

impl PlatformConfig {
    /// Configuration against the production service with default tuning.
    pub fn new(name: impl Into<String>, key: SecretString) -> Result<Self, CoreError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default base URL: {e}"),
        })?;
        Ok(Self {
            name: name.into(),
            key,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            refresh_interval_secs: 0,
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_refresh_interval(mut self, secs: u64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.timeout)
    }

    /// Registry key for this plugin/platform pair.
    pub fn plugin_key(&self) -> PluginKey {
        PluginKey::new(PLUGIN_NAME, PLATFORM_NAME)
    }
}
