//! Error types for the Rivet domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The taxonomy mirrors
//! how failures surface: configuration problems abort startup, provider
//! problems abort the current turn, and tool problems never escape the
//! tool boundary at all — they become error entries in the tool's own
//! result text so the model can see and react to them.

use thiserror::Error;

/// The top-level error type for all Rivet operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Fatal at construction: bad model string, unknown provider, missing key.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Fatal for the current turn: network failure, API error, bad response.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a provider adapter. No automatic retry anywhere:
/// every variant is fatal for the turn that triggered it.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Network error: {0}")]
    Network(String),
}
