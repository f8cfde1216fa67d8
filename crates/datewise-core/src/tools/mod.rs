//! Tool dispatch: `calculator`, `calendar_db`, `search`, `finish`.
//!
//! [`Dispatcher::dispatch`] never fails; every error becomes observation
//! text the reasoning engine reads on the next step.

pub mod calendar;
pub mod search;
pub mod simulated;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use datewise_calendar::CalendarSource;
use datewise_llm::ReasoningEngine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::calculator;
use crate::domain::{ToolInvocation, ToolName};
use crate::metrics::METRICS;

/// Observation logged when the engine picks `finish` directly.
pub const FINISH_OBSERVATION: &str = "No tool needed. Directly providing the answer.";

pub const UNKNOWN_TOOL_OBSERVATION: &str = "Error: Unknown tool selected or tool not provided.";

/// Where `calculator`, `calendar_db` and `search` are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolBackend {
    /// Deterministic calculator, calendar service and engine-backed search.
    #[default]
    Live,
    /// The reasoning engine plays every tool.
    Simulated,
}

impl fmt::Display for ToolBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Simulated => "simulated",
        })
    }
}

impl FromStr for ToolBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "simulated" => Ok(Self::Simulated),
            other => Err(format!("unknown tool backend '{other}' (expected live|simulated)")),
        }
    }
}

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Observation(String),
    /// Terminal: the payload is the final answer.
    Finish(Value),
}

/// A dispatch result plus the engine tokens the tool itself spent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub outcome: ToolOutcome,
    pub tokens: u64,
}

impl ToolOutput {
    pub fn observation(text: impl Into<String>, tokens: Option<u64>) -> Self {
        Self {
            outcome: ToolOutcome::Observation(text.into()),
            tokens: tokens.unwrap_or(0),
        }
    }

    /// Text to log for this outcome; `finish` gets the fixed note.
    pub fn observation_text(&self) -> &str {
        match &self.outcome {
            ToolOutcome::Observation(text) => text,
            ToolOutcome::Finish(_) => FINISH_OBSERVATION,
        }
    }
}

/// Routes tool invocations to their backends.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<dyn ReasoningEngine>,
    calendar: Arc<dyn CalendarSource>,
    backend: ToolBackend,
}

impl Dispatcher {
    pub fn new(
        engine: Arc<dyn ReasoningEngine>,
        calendar: Arc<dyn CalendarSource>,
        backend: ToolBackend,
    ) -> Self {
        Self {
            engine,
            calendar,
            backend,
        }
    }

    pub async fn dispatch(&self, invocation: &ToolInvocation) -> ToolOutput {
        METRICS.inc_tool_calls();
        debug!(tool = %invocation.tool, backend = %self.backend, "dispatching tool");

        let output = match (&invocation.tool, self.backend) {
            (ToolName::Finish, _) => ToolOutput {
                outcome: ToolOutcome::Finish(invocation.input.clone()),
                tokens: 0,
            },
            (ToolName::Unknown(_), _) => ToolOutput::observation(UNKNOWN_TOOL_OBSERVATION, None),
            (tool, ToolBackend::Simulated) => {
                simulated::execute(self.engine.as_ref(), tool, &invocation.input).await
            }
            (ToolName::Calculator, ToolBackend::Live) => {
                ToolOutput::observation(calculator::calculate(&invocation.input_text()), None)
            }
            (ToolName::CalendarDb, ToolBackend::Live) => ToolOutput::observation(
                calendar::lookup(self.calendar.as_ref(), &invocation.input).await,
                None,
            ),
            (ToolName::Search, ToolBackend::Live) => {
                search::lookup(self.engine.as_ref(), &invocation.input_text()).await
            }
        };

        debug!(
            tool = %invocation.tool,
            observation = %output.observation_text(),
            "tool finished"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datewise_calendar::fakes::MemoryCalendar;
    use datewise_llm::fakes::ScriptedEngine;
    use serde_json::json;

    fn dispatcher(engine: ScriptedEngine, backend: ToolBackend) -> (Dispatcher, Arc<ScriptedEngine>) {
        let engine = Arc::new(engine);
        let d = Dispatcher::new(engine.clone(), Arc::new(MemoryCalendar::new()), backend);
        (d, engine)
    }

    #[tokio::test]
    async fn calculator_runs_locally() {
        let (d, engine) = dispatcher(ScriptedEngine::new(vec![]), ToolBackend::Live);
        let out = d
            .dispatch(&ToolInvocation::new(
                ToolName::Calculator,
                json!("2025-11-21 + 3 weeks"),
            ))
            .await;
        assert_eq!(out.outcome, ToolOutcome::Observation("2025-12-12".into()));
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn calculator_errors_are_observations() {
        let (d, _) = dispatcher(ScriptedEngine::new(vec![]), ToolBackend::Live);
        let out = d
            .dispatch(&ToolInvocation::new(ToolName::Calculator, json!({"x": 1})))
            .await;
        assert_eq!(
            out.observation_text(),
            r#"Error: Cannot parse calculator input '{"x":1}'"#
        );
    }

    #[tokio::test]
    async fn finish_is_terminal() {
        let (d, _) = dispatcher(ScriptedEngine::new(vec![]), ToolBackend::Simulated);
        let out = d
            .dispatch(&ToolInvocation::new(ToolName::Finish, json!(["2025-11-28"])))
            .await;
        assert_eq!(out.outcome, ToolOutcome::Finish(json!(["2025-11-28"])));
        assert_eq!(out.observation_text(), FINISH_OBSERVATION);
    }

    #[tokio::test]
    async fn unknown_tools_get_fixed_observation() {
        let (d, engine) = dispatcher(ScriptedEngine::new(vec![]), ToolBackend::Simulated);
        for tool in [ToolName::Unknown(None), ToolName::Unknown(Some("weather".into()))] {
            let out = d.dispatch(&ToolInvocation::new(tool, json!("x"))).await;
            assert_eq!(out.observation_text(), UNKNOWN_TOOL_OBSERVATION);
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[tokio::test]
    async fn simulated_backend_asks_engine_even_for_calculator() {
        let (d, engine) =
            dispatcher(ScriptedEngine::with_texts(["2025-12-12"], 11), ToolBackend::Simulated);
        let out = d
            .dispatch(&ToolInvocation::new(
                ToolName::Calculator,
                json!("2025-11-21 + 3 weeks"),
            ))
            .await;
        assert_eq!(out.observation_text(), "2025-12-12");
        assert_eq!(out.tokens, 11);
        assert_eq!(engine.call_count(), 1);
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("LIVE".parse::<ToolBackend>(), Ok(ToolBackend::Live));
        assert_eq!("simulated".parse::<ToolBackend>(), Ok(ToolBackend::Simulated));
        assert!("remote".parse::<ToolBackend>().is_err());
        assert_eq!(ToolBackend::default().to_string(), "live");
    }
}
