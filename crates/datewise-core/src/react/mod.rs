//! ReAct runners: tool-augmented reasoning over one dataset item.
//!
//! - [`SingleStep`]: decide, run at most one tool, answer
//! - [`TurnLoop`]: bounded think/act/observe state machine

pub mod multi_turn;
pub mod single_step;

use std::sync::Arc;

use datewise_llm::{ChatRequest, ReasoningEngine};
use serde_json::Value;

use crate::domain::{ItemInput, Outcome};
use crate::engine::ask;
use crate::prompts::ReactVariant;
use crate::protocol::ProtocolError;
use crate::tools::Dispatcher;

pub use multi_turn::{Episode, State, TurnLoop, DEFAULT_MAX_TURNS};
pub use single_step::SingleStep;

/// Why a ReAct run stopped without an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Transport failure or unusable engine JSON.
    Engine(String),
    /// Continuation reply whose `status` was not `[decision, payload]`.
    InvalidStatus(Value),
    /// Turn budget used up; carries the budget.
    Exhausted(usize),
}

impl FailureReason {
    /// The prediction text recorded for the item.
    pub fn prediction(&self) -> String {
        match self {
            Self::Engine(reason) => format!("Error: {reason}"),
            Self::InvalidStatus(raw) => {
                format!("Error: Invalid status format from observation: {raw}")
            }
            Self::Exhausted(turns) => {
                format!("Error: Reached max turns ({turns}) without finishing.")
            }
        }
    }
}

/// One JSON-mode engine call, parsed with `parse`. Tokens are added to
/// `tokens` even when parsing fails.
pub(crate) async fn ask_json<T>(
    engine: &dyn ReasoningEngine,
    system: &str,
    user: String,
    tokens: &mut u64,
    parse: fn(&str) -> Result<T, ProtocolError>,
) -> Result<T, FailureReason> {
    let reply = ask(engine, ChatRequest::from_prompt(system, user).json())
        .await
        .map_err(|e| FailureReason::Engine(e.to_string()))?;
    *tokens += reply.total_tokens.unwrap_or(0);
    parse(&reply.content).map_err(|e| FailureReason::Engine(e.to_string()))
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Configured ReAct runner for one task.
pub struct ReactRunner {
    engine: Arc<dyn ReasoningEngine>,
    dispatcher: Dispatcher,
    thought_prompt: String,
    observation_prompt: String,
    variant: ReactVariant,
    max_turns: usize,
}

impl ReactRunner {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        dispatcher: Dispatcher,
        thought_prompt: impl Into<String>,
        observation_prompt: impl Into<String>,
        variant: ReactVariant,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            thought_prompt: thought_prompt.into(),
            observation_prompt: observation_prompt.into(),
            variant,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Turn budget for the multi-turn variant (minimum 1).
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub async fn run(&self, input: ItemInput<'_>) -> Outcome {
        match self.variant {
            ReactVariant::SingleStep => {
                SingleStep::new(
                    self.engine.as_ref(),
                    &self.dispatcher,
                    &self.thought_prompt,
                    &self.observation_prompt,
                )
                .run(input)
                .await
            }
            ReactVariant::MultiTurn => {
                TurnLoop::new(
                    self.engine.as_ref(),
                    &self.dispatcher,
                    &self.thought_prompt,
                    &self.observation_prompt,
                )
                .with_max_turns(self.max_turns)
                .run(input)
                .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_predictions() {
        assert_eq!(
            FailureReason::Exhausted(10).prediction(),
            "Error: Reached max turns (10) without finishing."
        );
        assert_eq!(
            FailureReason::InvalidStatus(json!(["finish"])).prediction(),
            r#"Error: Invalid status format from observation: ["finish"]"#
        );
        assert_eq!(
            FailureReason::Engine("boom".into()).prediction(),
            "Error: boom"
        );
    }
}
