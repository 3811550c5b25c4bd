// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

/// Raised by the classifier when a transaction cannot be labelled
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTransactionError {
    #[error("token transfers were not merged into the transaction")]
    MissingTokenTransfers,

    #[error("transaction is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unrecognized token type: {0}")]
    UnrecognizedTokenType(String),

    #[error("token transfer carries no token type")]
    MissingTokenType,
}

/// Failures talking to the block explorer
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("explorer request timed out")]
    Timeout,

    #[error("explorer rate limit exceeded")]
    RateLimited,

    #[error("explorer returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode explorer response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid explorer URL: {0}")]
    InvalidUrl(String),
}

impl ExplorerError {
    /// Transport failures, timeouts, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExplorerError::Http(e) => e.is_connect() || e.is_request() || e.is_body(),
            ExplorerError::Timeout | ExplorerError::RateLimited => true,
            ExplorerError::Status { status, .. } => status.is_server_error(),
            ExplorerError::Decode(_) | ExplorerError::InvalidUrl(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),

    #[error(transparent)]
    InvalidTransaction(#[from] InvalidTransactionError),
}
