//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use aistrip_config::ConfigError;
use aistrip_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the AiStrip service")]
    #[diagnostic(
        code(aistrip::connection_failed),
        help(
            "Check your network connection and the configured base URL.\n\
             Override it with: aistrip --base-url <URL> ..."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Device discovery was skipped: {reason}")]
    #[diagnostic(
        code(aistrip::discovery_skipped),
        help("The accessory registry was left untouched. Please check your key.")
    )]
    DiscoverySkipped { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("The service rejected the configured key")]
    #[diagnostic(
        code(aistrip::auth_failed),
        help(
            "Please check your key.\n\
             Store a new one with: aistrip config set-key"
        )
    )]
    AuthFailed,

    #[error("No key configured for platform '{name}'")]
    #[diagnostic(
        code(aistrip::no_credentials),
        help(
            "Configure a key with: aistrip config init\n\
             Or set the AISTRIP_KEY environment variable, or pass --key."
        )
    )]
    NoCredentials { name: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(aistrip::not_found),
        help("Run: aistrip {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(aistrip::api_error))]
    ApiError { message: String },

    #[error("Accessory registry error: {message}")]
    #[diagnostic(
        code(aistrip::registry),
        help("Check the accessory cache file, or point --registry at another path.")
    )]
    Registry { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aistrip::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(aistrip::config),
        help("Inspect the effective settings with: aistrip config show")
    )]
    Config { message: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(aistrip::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(aistrip::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(aistrip::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::DiscoverySkipped { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<aistrip_api::Error> for CliError {
    fn from(err: aistrip_api::Error) -> Self {
        if err.is_auth_rejected() {
            return CliError::AuthFailed;
        }
        match err {
            aistrip_api::Error::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            aistrip_api::Error::Transport(e) => CliError::ConnectionFailed {
                source: Box::new(e),
            },
            aistrip_api::Error::InvalidUrl(e) => CliError::Validation {
                field: "base_url".into(),
                reason: e.to_string(),
            },
            aistrip_api::Error::InvalidBaseUrl(reason) => CliError::Validation {
                field: "base_url".into(),
                reason,
            },
            aistrip_api::Error::InvalidCredential(reason) => CliError::Validation {
                field: "key".into(),
                reason,
            },
            other => CliError::ApiError {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DirectoryFetch { source }
            | CoreError::StateFetch { source, .. }
            | CoreError::Control { source, .. } => source.into(),

            malformed @ CoreError::MalformedState { .. } => CliError::ApiError {
                message: malformed.to_string(),
            },

            CoreError::Registry { message } => CliError::Registry { message },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::NotLaunched => CliError::ApiError {
                message: "platform used before launch".into(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { name } => CliError::NoCredentials { name },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_rejection_maps_to_auth_exit_code() {
        let err: CliError = CoreError::DirectoryFetch {
            source: aistrip_api::Error::Status {
                status: 401,
                body: String::new(),
            },
        }
        .into();
        assert!(matches!(err, CliError::AuthFailed));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn timeout_keeps_its_duration() {
        let err: CliError = CoreError::Control {
            device_id: "x1".into(),
            source: aistrip_api::Error::Timeout { timeout_secs: 10 },
        }
        .into();
        assert!(matches!(err, CliError::Timeout { seconds: 10 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn missing_key_maps_to_auth_exit_code() {
        let err: CliError = ConfigError::NoCredentials {
            name: "AiStrip".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
