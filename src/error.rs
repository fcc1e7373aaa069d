//! Error taxonomy for the resolution engine.
//!
//! Two classes of failure end a `resolve` call: malformed input (never
//! retried) and transport trouble (caller may retry with backoff; the engine
//! performs zero automatic retries to keep latency predictable). "No data
//! found" is not an error, it is `Resolution::NotFound`.

use thiserror::Error;

/// Failure while talking to an upstream HTTP API
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {endpoint}")]
    Status {
        status: reqwest::StatusCode,
        endpoint: String,
    },

    #[error("undecodable response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

/// Terminal failure of one resolution call
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport failure: {0}")]
    Transport(#[from] NetworkError),
}

impl ResolveError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ResolveError::Transport(_))
    }
}
