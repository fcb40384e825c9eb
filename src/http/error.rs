use polars::error::PolarsError;
use thiserror::Error;

/// Why a provider request produced no usable body.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Network request failed")]
    Network(#[source] reqwest::Error),

    #[error("Provider answered with status {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Provider reported an error: {0}")]
    Provider(String),

    #[error("Response body is malformed: {0}")]
    MalformedBody(String),

    #[error("Response body is not valid JSON")]
    Json(#[source] serde_json::Error),

    #[error("Response body is not valid CSV")]
    Csv(#[source] PolarsError),

    #[error("Failed to buffer response body")]
    Buffer(#[source] std::io::Error),
}
