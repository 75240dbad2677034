//! Bridge error types.
//!
//! Every failure mode has a named variant. No stringly-typed errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("API key not configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("prompt placeholder '{0}' was left unresolved")]
    UnresolvedPlaceholder(String),

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("narrative service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("narrative service returned HTTP {status}: {body}")]
    ServiceStatus {
        status: u16,
        body: String,
    },

    #[error("narrative service returned an empty completion")]
    EmptyCompletion,

    #[error("narrative service failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: usize,
        last_error: String,
    },

    #[error("response contains no JSON object")]
    MissingJson,

    #[error("response failed validation: {0}")]
    InvalidResponse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
