//! Single-shot chain-of-thought runner.

use std::sync::Arc;

use datewise_llm::{ChatRequest, ReasoningEngine};
use serde_json::{json, Value};

use crate::domain::{ItemInput, Outcome};
use crate::engine::ask;
use crate::protocol::Answer;
use crate::react::pretty;

const THOUGHT_NOT_FOUND: &str = "Thought key not found";
const PREDICTION_NOT_FOUND: &str = "Prediction key not found";
const INVALID_JSON_THOUGHT: &str = "N/A due to invalid JSON response";

pub struct CotRunner {
    engine: Arc<dyn ReasoningEngine>,
    system_prompt: String,
}

impl CotRunner {
    pub fn new(engine: Arc<dyn ReasoningEngine>, system_prompt: impl Into<String>) -> Self {
        Self {
            engine,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn run(&self, input: ItemInput<'_>) -> Outcome {
        let user = pretty(&json!({
            "input_text": input.input_text,
            "anchor_date": input.anchor_date,
        }));
        let request = ChatRequest::from_prompt(self.system_prompt.as_str(), user).json();

        let reply = match ask(self.engine.as_ref(), request).await {
            Ok(reply) => reply,
            Err(e) => {
                return Outcome {
                    prediction: Some(Value::String(format!("Error: {e}"))),
                    ..Outcome::default()
                }
            }
        };

        let (prediction, thought) = match Answer::parse(&reply.content) {
            Ok(answer) => (
                answer.prediction.unwrap_or_else(|| json!(PREDICTION_NOT_FOUND)),
                answer.thought.unwrap_or_else(|| json!(THOUGHT_NOT_FOUND)),
            ),
            Err(_) => (
                Value::String(format!("Error: Invalid JSON response: {}", reply.content)),
                json!(INVALID_JSON_THOUGHT),
            ),
        };

        Outcome {
            prediction: Some(prediction),
            thought: Some(thought),
            latency: None,
            tokens: reply.total_tokens,
            ..Outcome::default()
        }
    }
}
