//! Source error types.

use thiserror::Error;

/// Errors that can occur while fetching a question bank.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing exists at the given location.
    #[error("question bank not found: {0}. Check the path or URL and try again")]
    NotFound(String),

    /// The server answered with an error status.
    #[error("server returned HTTP {status} for {url}. Try again later")]
    Http { status: u16, url: String },

    /// The server could not be reached.
    #[error("network error: {0}. Check your connection and try again")]
    Network(String),

    /// The request took too long.
    #[error("request timed out after {0}s. Try again")]
    Timeout(u64),

    /// The response was not a usable question bank.
    #[error("could not read question bank: {0}")]
    Parse(String),
}
