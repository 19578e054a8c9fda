use thiserror::Error;

/// Top-level error type for the `aistrip-api` crate.
///
/// Covers every failure mode of the three remote endpoints: transport,
/// HTTP status, the `{ ok, error }` envelope, and body decoding.
/// `aistrip-core` wraps these into operation-specific errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {0}")]
    InvalidBaseUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The credential could not be encoded as a header value.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Building the underlying `reqwest::Client` failed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Remote service ──────────────────────────────────────────────
    /// Non-2xx status from the service.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The envelope reported failure (`ok` not true, or `error` set).
    #[error("API error: {message}")]
    Api { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the service refused the credential.
    pub fn is_auth_rejected(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(status, 401 | 403),
            Self::Transport(e) => matches!(
                e.status(),
                Some(reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN)
            ),
            _ => false,
        }
    }
}
