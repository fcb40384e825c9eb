use crate::http::error::UpstreamError;
use crate::types::lifecycle::Lifecycle;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlmMetError>;

#[derive(Debug, Error)]
pub enum GlmMetError {
    #[error("{provider} API '{api}' expects a {expected} location")]
    InvalidLocationMode {
        provider: &'static str,
        api: &'static str,
        expected: &'static str,
    },

    #[error("Coordinate out of range: longitude {longitude}, latitude {latitude}")]
    InvalidLocation { longitude: f64, latitude: f64 },

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("No variables selected for the {0} request")]
    EmptyVariables(&'static str),

    #[error("Cannot {operation} while adapter is {stage}")]
    PreconditionNotMet {
        operation: &'static str,
        stage: Lifecycle,
    },

    #[error("{provider} does not support conversion to GLM format: {reason}")]
    UnsupportedConversion {
        provider: &'static str,
        reason: &'static str,
    },

    #[error("{provider} cannot write GLM output as {output}")]
    UnsupportedOutput {
        provider: &'static str,
        output: String,
    },

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Request to {url} failed")]
    UpstreamRequestFailed {
        url: String,
        #[source]
        source: UpstreamError,
    },

    #[error("Expected column '{column}' missing from {provider} data")]
    SchemaMismatch {
        provider: &'static str,
        column: String,
    },

    #[error("Malformed {provider} metadata: {message}")]
    MetadataParse {
        provider: &'static str,
        message: String,
    },

    #[error("Unrecognised timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Failed processing DataFrame")]
    Frame(#[from] PolarsError),

    #[error("Failed to encode metadata as JSON")]
    Json(#[from] serde_json::Error),

    #[error("Output file name '{0}' must not contain path components")]
    InvalidOutputName(String),

    #[error("I/O error writing '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to write archive '{0}'")]
    Archive(PathBuf, #[source] zip::result::ZipError),
}

impl GlmMetError {
    pub(crate) fn upstream(url: &str, source: UpstreamError) -> Self {
        GlmMetError::UpstreamRequestFailed {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn missing_column(provider: &'static str, column: &str) -> Self {
        GlmMetError::SchemaMismatch {
            provider,
            column: column.to_string(),
        }
    }
}
