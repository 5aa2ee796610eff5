//! SDK error types.
//!
//! [`SdkError`] is returned by every fallible operation of the lister. The
//! variants keep "the listing was rejected on every attempt" apart from
//! terminal failures and from a successful empty listing.

use hostwatch_models::ModelError;
use reqwest::StatusCode;

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid configuration, e.g. an HTTP client that cannot be built.
    #[error("configuration error: {0}")]
    Config(String),

    /// The identity endpoint refused the credentials or failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The identity response parsed but lacked a usable token or tenant.
    #[error("unusable identity response: {0}")]
    Credential(#[from] ModelError),

    /// Transport-level failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body was not the expected JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The compute API answered with a status that is neither success nor
    /// a re-authentication trigger.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Status code returned by the compute API.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },

    /// Every attempt was rejected with a re-authentication status.
    #[error("listing rejected after {attempts} attempt(s)")]
    RetriesExhausted {
        /// Number of rejected attempts.
        attempts: u32,
    },
}

impl SdkError {
    /// Whether the error is the exhausted-retries outcome.
    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// Whether the error is a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
