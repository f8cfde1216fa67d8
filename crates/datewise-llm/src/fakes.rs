//! In-memory reasoning engines (testing only)
//!
//! `ScriptedEngine` replays a fixed queue of replies or delegates to a
//! responder closure, and records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::types::{ChatRequest, ChatResponse};
use crate::ReasoningEngine;

type Responder = dyn Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync;

enum Script {
    Queue(Mutex<VecDeque<Result<ChatResponse>>>),
    Responder(Box<Responder>),
}

/// Reasoning engine that answers from a script.
pub struct ScriptedEngine {
    script: Script,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedEngine {
    /// Replay `replies` in order; once drained every call fails with
    /// [`LlmError::EmptyResponse`].
    pub fn new(replies: Vec<Result<ChatResponse>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(replies.into())),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replay plain-text replies, each reporting `tokens` of usage.
    pub fn with_texts<I, S>(texts: I, tokens: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| Ok(ChatResponse::new(t, Some(tokens))))
                .collect(),
        )
    }

    /// Answer every request through `responder`.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<ChatResponse> + Send + Sync + 'static,
    {
        Self {
            script: Script::Responder(Box::new(responder)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyResponse)),
            Script::Responder(responder) => responder(&request),
        }
    }
}
