use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API returned no items for {0}")]
    EmptyResponse(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Error body: `{"response":{"errors":[{"code":..,"message":..}]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub response: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ErrorItem {
    /// Some endpoints report a missing object as 400 with a *_DOESNT_EXIST code
    pub fn is_not_found(&self) -> bool {
        self.code.ends_with("DOESNT_EXIST") || self.code.ends_with("NOT_FOUND")
    }
}
