//! Error types for the estimation pipeline

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Configuration is incomplete or out of bounds.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Weather source unreachable or answered with a non-success status.
    #[error("{}", fetch_message(.status, .message))]
    Fetch { status: Option<u16>, message: String },

    /// Weather source answered, but not with the expected daily series.
    #[error("unexpected weather response shape: {0}")]
    Shape(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("export error: {0}")]
    Export(String),
}

fn fetch_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("weather request failed ({}). {}", code, message),
        None => format!("weather request failed. {}", message),
    }
}

pub type Result<T> = std::result::Result<T, EstimatorError>;

impl From<reqwest::Error> for EstimatorError {
    fn from(err: reqwest::Error) -> Self {
        EstimatorError::Fetch {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
