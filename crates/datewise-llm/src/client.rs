//! OpenAI-compatible chat-completions client
//!
//! Talks to any endpoint exposing `POST {base_url}/chat/completions`
//! (Upstage Solar by default).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse};
use crate::ReasoningEngine;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "UPSTAGE_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.upstage.ai/v1";
const DEFAULT_MODEL: &str = "solar-pro2";

/// Chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Bearer token
    pub api_key: Option<String>,
    /// Optional per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: std::env::var("DATEWISE_LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            model: std::env::var("DATEWISE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific endpoint
    pub fn new(base_url: &str, model: &str) -> Self {
        LlmConfig {
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Reasoning engine backed by an HTTP chat-completions endpoint
pub struct ChatCompletionsClient {
    config: LlmConfig,
    http_client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a new client
    pub fn new(config: LlmConfig) -> Self {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "datewise-llm/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        ChatCompletionsClient {
            config,
            http_client,
        }
    }

    /// Create client from environment variables
    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn request_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if request.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: Option<u64>,
}

#[async_trait]
impl ReasoningEngine for ChatCompletionsClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(API_KEY_ENV))?;

        let response = self
            .http_client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .json(&self.request_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: CompletionBody = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;
        let total_tokens = body.usage.and_then(|u| u.total_tokens);

        debug!(
            model = %self.config.model,
            json_mode = request.json_mode,
            total_tokens = ?total_tokens,
            "chat completion received"
        );

        Ok(ChatResponse {
            content: content.trim().to_string(),
            total_tokens,
        })
    }
}
