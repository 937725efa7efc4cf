use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    Decode,
}

/// Why a submission did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("submit request failed: {0}")]
    Transport(String),
    #[error("submit response was not valid JSON: {0}")]
    Decode(String),
}

impl SubmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmitError::Transport(_) => ErrorCode::Transport,
            SubmitError::Decode(_) => ErrorCode::Decode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&SubmitError> for ErrorReport {
    fn from(value: &SubmitError) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}
