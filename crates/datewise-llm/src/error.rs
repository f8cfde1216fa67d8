//! Error types for datewise-llm

use thiserror::Error;

/// Errors that can occur while talking to the reasoning engine
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key configured
    #[error("API key is not set (expected {0})")]
    MissingApiKey(&'static str),

    /// Transport-level failure (connect, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the chat-completions shape
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Response carried no choices / no message content
    #[error("response contained no message content")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

/// Result type for reasoning-engine calls.
pub type Result<T> = std::result::Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = LlmError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("rate limited"));
    }

    #[test]
    fn missing_key_names_variable() {
        let err = LlmError::MissingApiKey("UPSTAGE_API_KEY");
        assert!(err.to_string().contains("UPSTAGE_API_KEY"));
    }
}
