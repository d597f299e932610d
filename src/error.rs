// Error types shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Internal failures of a puzzle tier. Never returned to callers of the generator.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("no templates for category '{0}'")]
    CategoryNotFound(String),
    #[error("external generation failed: {0}")]
    ExternalService(#[from] LlmError),
}

/// Failures talking to the hosted language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(reqwest::Error),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    /// Drops the request URL from the error.
    fn from(e: reqwest::Error) -> Self {
        LlmError::Http(e.without_url())
    }
}

/// Failures loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
