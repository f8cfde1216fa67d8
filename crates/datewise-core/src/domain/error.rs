//! Domain-level error taxonomy for datewise.

use std::path::PathBuf;

use datewise_calendar::CalendarError;
use datewise_llm::LlmError;

use crate::protocol::ProtocolError;

/// Datewise domain errors.
#[derive(Debug, thiserror::Error)]
pub enum DatewiseError {
    #[error("Missing input_text or anchor_date")]
    MissingField,

    #[error("prompt file not found: {path}")]
    PromptNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dataset {path}: {reason}")]
    InvalidDataset { path: PathBuf, reason: String },

    #[error("reasoning engine error: {0}")]
    Engine(#[from] LlmError),

    #[error("calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for datewise domain operations.
pub type Result<T> = std::result::Result<T, DatewiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_matches_record_error() {
        assert_eq!(
            DatewiseError::MissingField.to_string(),
            "Missing input_text or anchor_date"
        );
    }

    #[test]
    fn prompt_not_found_names_path() {
        let err = DatewiseError::PromptNotFound {
            path: PathBuf::from("prompts/t1_cot.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("prompts/t1_cot.txt"));
    }

    #[test]
    fn engine_error_converts() {
        let err: DatewiseError = LlmError::EmptyResponse.into();
        assert!(err.to_string().contains("reasoning engine error"));
    }
}
