//! Chat request/response types shared by every reasoning engine.

use serde::{Deserialize, Serialize};

/// Role tag of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask the engine to produce a JSON object.
    pub json_mode: bool,
    pub temperature: f32,
}

impl ChatRequest {
    /// Request with the given messages, plain text output, temperature 0.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            json_mode: false,
            temperature: 0.0,
        }
    }

    /// System prompt + single user turn, the shape every datewise call uses.
    pub fn from_prompt(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Content of the last user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Assistant reply plus token usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    /// Total tokens reported by the endpoint, when present.
    pub total_tokens: Option<u64>,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>, total_tokens: Option<u64>) -> Self {
        Self {
            content: content.into(),
            total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_prompt_builds_system_then_user() {
        let req = ChatRequest::from_prompt("sys", "hello").json();
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, ChatRole::System);
        assert_eq!(req.messages[1].role, ChatRole::User);
        assert!(req.json_mode);
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.user_content(), Some("hello"));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("x")).expect("serialize");
        assert_eq!(json, r#"{"role":"system","content":"x"}"#);
    }
}
