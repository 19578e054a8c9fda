// ── Core error types ──
//
// Each remote operation gets its own variant so the caller can apply the
// right recovery (skip a reconcile cycle, keep a cached state) without
// inspecting transport details. The wrapped `aistrip_api::Error` is kept
// as the source for logging.

use thiserror::Error;

/// Hint appended to every remote-failure log line.
pub const KEY_HINT: &str = "please check your key";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote operations ────────────────────────────────────────────
    #[error("Failed to get device list")]
    DirectoryFetch {
        #[source]
        source: aistrip_api::Error,
    },

    #[error("Failed to get state of device {device_id}")]
    StateFetch {
        device_id: String,
        #[source]
        source: aistrip_api::Error,
    },

    #[error("Device {device_id} reported an unreadable state: {value:?}")]
    MalformedState {
        device_id: String,
        value: Option<String>,
    },

    #[error("Failed to control device {device_id}")]
    Control {
        device_id: String,
        #[source]
        source: aistrip_api::Error,
    },

    // ── Host registry ────────────────────────────────────────────────
    #[error("Accessory registry error: {message}")]
    Registry { message: String },

    #[error("Accessories cannot be registered before the host finished launching")]
    NotLaunched,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The transport-layer error behind a remote failure, if any.
    pub fn api_error(&self) -> Option<&aistrip_api::Error> {
        match self {
            Self::DirectoryFetch { source }
            | Self::StateFetch { source, .. }
            | Self::Control { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Registry {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Registry {
            message: format!("invalid registry data: {err}"),
        }
    }
}
