use reqwest::StatusCode;
use thiserror::Error;

/// Every way a month fetch can fail. None of these leave the crate through
/// the query engine; they are logged and folded into a conservative answer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid endpoint {0}")]
    InvalidEndpoint(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("network response was not ok: {0}")]
    Status(StatusCode),

    #[error("malformed holiday payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream returned result code {code}: {message}")]
    Upstream { code: String, message: String },

    #[error("holiday payload has no response body")]
    MissingBody
}
