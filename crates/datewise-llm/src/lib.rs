//! datewise-llm: reasoning-engine interface
//!
//! Every prompt datewise sends (decision, continuation, CoT answer,
//! search lookup, simulated tool) goes through [`ReasoningEngine`].
//! Production code uses [`ChatCompletionsClient`]; tests use
//! [`fakes::ScriptedEngine`].

pub mod client;
pub mod error;
pub mod fakes;
pub mod types;

use async_trait::async_trait;

pub use client::{ChatCompletionsClient, LlmConfig, API_KEY_ENV};
pub use error::{LlmError, Result};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatRole};

/// Chat-style reasoning engine.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Send one request and wait for the assistant reply.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}

#[async_trait]
impl<T: ReasoningEngine + ?Sized> ReasoningEngine for std::sync::Arc<T> {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        (**self).complete(request).await
    }
}
