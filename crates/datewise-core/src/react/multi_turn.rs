//! Multi-turn ReAct as an explicit state machine.
//!
//! ```text
//! Thinking ──► Acting ──► Observing ──► Thinking (turn + 1)
//!    │            │           ├──► Done
//!    └──► Failed  └──► Done   └──► Failed
//! ```
//!
//! The rolling summary lives in `Thinking`; every transition consumes the
//! current state and returns the next one.

use datewise_llm::ReasoningEngine;
use serde_json::{json, Value};

use super::{ask_json, pretty, FailureReason};
use crate::domain::{ItemInput, Outcome, ReactTrace, ToolInvocation, TurnLogEntry};
use crate::obs;
use crate::protocol::{Continuation, Decision, Status};
use crate::tools::{Dispatcher, ToolOutcome};

pub const DEFAULT_MAX_TURNS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Thinking {
        turn: usize,
        summary: String,
    },
    Acting {
        turn: usize,
        invocation: ToolInvocation,
    },
    /// The turn's entry is already in the episode log.
    Observing {
        turn: usize,
    },
    Done {
        prediction: Value,
        thought: Option<String>,
    },
    Failed {
        reason: FailureReason,
        summary: Option<String>,
    },
}

impl State {
    pub fn initial() -> Self {
        Self::Thinking {
            turn: 1,
            summary: String::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }
}

/// Per-item data accumulated across turns.
#[derive(Debug, Clone)]
pub struct Episode<'i> {
    input: ItemInput<'i>,
    turn_log: Vec<TurnLogEntry>,
    tokens: u64,
}

impl<'i> Episode<'i> {
    pub fn new(input: ItemInput<'i>) -> Self {
        Self {
            input,
            turn_log: Vec::new(),
            tokens: 0,
        }
    }

    pub fn turn_log(&self) -> &[TurnLogEntry] {
        &self.turn_log
    }

    pub fn tokens(&self) -> u64 {
        self.tokens
    }

    /// Fold a terminal state into the item outcome.
    fn into_outcome(self, state: State) -> Outcome {
        let (prediction, thought) = match state {
            State::Done {
                prediction,
                thought,
            } => (prediction, thought),
            State::Failed { reason, summary } => (Value::String(reason.prediction()), summary),
            other => (
                Value::String(format!("Error: loop stopped in non-terminal state {other:?}")),
                None,
            ),
        };
        Outcome {
            prediction: Some(prediction),
            thought: thought.map(Value::String),
            latency: None,
            tokens: Some(self.tokens),
            trace: ReactTrace::MultiTurn(self.turn_log),
        }
    }
}

/// Drives one item through the turn state machine.
pub struct TurnLoop<'a> {
    engine: &'a dyn ReasoningEngine,
    dispatcher: &'a Dispatcher,
    thought_prompt: &'a str,
    observation_prompt: &'a str,
    max_turns: usize,
}

impl<'a> TurnLoop<'a> {
    pub fn new(
        engine: &'a dyn ReasoningEngine,
        dispatcher: &'a Dispatcher,
        thought_prompt: &'a str,
        observation_prompt: &'a str,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            thought_prompt,
            observation_prompt,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub async fn run(&self, input: ItemInput<'_>) -> Outcome {
        let mut episode = Episode::new(input);
        let mut state = State::initial();
        while !state.is_terminal() {
            state = self.step(&mut episode, state).await;
        }
        episode.into_outcome(state)
    }

    /// One transition. Terminal states are returned unchanged.
    pub async fn step(&self, episode: &mut Episode<'_>, state: State) -> State {
        match state {
            State::Thinking { turn, summary } => self.think(episode, turn, summary).await,
            State::Acting { turn, invocation } => self.act(episode, turn, invocation).await,
            State::Observing { turn } => self.observe(episode, turn).await,
            terminal @ (State::Done { .. } | State::Failed { .. }) => terminal,
        }
    }

    async fn think(&self, episode: &mut Episode<'_>, turn: usize, summary: String) -> State {
        let user = pretty(&json!({
            "user_query": episode.input.input_text,
            "anchor_date": episode.input.anchor_date,
            "current_summary_thought": summary,
        }));
        match ask_json(
            self.engine,
            self.thought_prompt,
            user,
            &mut episode.tokens,
            Decision::parse,
        )
        .await
        {
            Ok(decision) => State::Acting {
                turn,
                invocation: decision.invocation(),
            },
            Err(reason) => State::Failed {
                reason,
                summary: None,
            },
        }
    }

    async fn act(&self, episode: &mut Episode<'_>, turn: usize, invocation: ToolInvocation) -> State {
        let output = self.dispatcher.dispatch(&invocation).await;
        episode.tokens += output.tokens;

        let entry = TurnLogEntry::new(&invocation, output.observation_text());
        obs::emit_turn_completed(turn, &invocation.tool.to_string(), entry.observation.len());
        episode.turn_log.push(entry);

        match output.outcome {
            ToolOutcome::Finish(prediction) => State::Done {
                prediction,
                thought: invocation.thought,
            },
            ToolOutcome::Observation(_) => State::Observing { turn },
        }
    }

    async fn observe(&self, episode: &mut Episode<'_>, turn: usize) -> State {
        let user = pretty(&json!({
            "input_text": episode.input.input_text,
            "tool_log": &episode.turn_log,
        }));
        let continuation = match ask_json(
            self.engine,
            self.observation_prompt,
            user,
            &mut episode.tokens,
            Continuation::parse,
        )
        .await
        {
            Ok(c) => c,
            Err(reason) => {
                return State::Failed {
                    reason,
                    summary: None,
                }
            }
        };

        match continuation.status {
            Status::Finish(prediction) => State::Done {
                prediction,
                thought: continuation.thought,
            },
            Status::Continue if turn >= self.max_turns => State::Failed {
                reason: FailureReason::Exhausted(self.max_turns),
                summary: continuation.thought,
            },
            Status::Continue => State::Thinking {
                turn: turn + 1,
                summary: continuation.thought.unwrap_or_default(),
            },
            Status::Malformed(raw) => State::Failed {
                reason: FailureReason::InvalidStatus(raw),
                summary: continuation.thought,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToolName;
    use crate::tools::ToolBackend;
    use datewise_calendar::fakes::MemoryCalendar;
    use datewise_llm::fakes::ScriptedEngine;
    use std::sync::Arc;

    const INPUT: ItemInput<'static> = ItemInput {
        input_text: "3주 뒤 금요일",
        anchor_date: "2025-11-21",
    };

    fn live_dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(ScriptedEngine::new(vec![])),
            Arc::new(MemoryCalendar::new()),
            ToolBackend::Live,
        )
    }

    #[tokio::test]
    async fn thinking_moves_to_acting() {
        let engine = ScriptedEngine::with_texts(
            [r#"{"thought": "add weeks", "tool": "calculator", "tool_input": "2025-11-21 + 3 weeks"}"#],
            5,
        );
        let dispatcher = live_dispatcher();
        let lp = TurnLoop::new(&engine, &dispatcher, "think", "observe");
        let mut episode = Episode::new(INPUT);

        let next = lp.step(&mut episode, State::initial()).await;
        match next {
            State::Acting { turn, invocation } => {
                assert_eq!(turn, 1);
                assert_eq!(invocation.tool, ToolName::Calculator);
                assert_eq!(invocation.thought.as_deref(), Some("add weeks"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(episode.tokens(), 5);

        let request = &engine.requests()[0];
        assert!(request.json_mode);
        let user: Value =
            serde_json::from_str(request.user_content().expect("user")).expect("json");
        assert_eq!(user["current_summary_thought"], "");
        assert_eq!(user["user_query"], "3주 뒤 금요일");
    }

    #[tokio::test]
    async fn acting_logs_observation() {
        let engine = ScriptedEngine::new(vec![]);
        let dispatcher = live_dispatcher();
        let lp = TurnLoop::new(&engine, &dispatcher, "think", "observe");
        let mut episode = Episode::new(INPUT);

        let next = lp
            .step(
                &mut episode,
                State::Acting {
                    turn: 1,
                    invocation: ToolInvocation::new(
                        ToolName::Calculator,
                        json!("2025-11-21 + 3 weeks"),
                    ),
                },
            )
            .await;
        assert_eq!(next, State::Observing { turn: 1 });
        assert_eq!(episode.turn_log()[0].observation, "2025-12-12");
    }

    #[tokio::test]
    async fn continuation_replaces_summary() {
        let engine = ScriptedEngine::with_texts(
            [r#"{"thought": "got 2025-12-12, need friday", "status": ["continue", null]}"#],
            1,
        );
        let dispatcher = live_dispatcher();
        let lp = TurnLoop::new(&engine, &dispatcher, "think", "observe");
        let mut episode = Episode::new(INPUT);

        let next = lp.step(&mut episode, State::Observing { turn: 2 }).await;
        assert_eq!(
            next,
            State::Thinking {
                turn: 3,
                summary: "got 2025-12-12, need friday".into()
            }
        );
    }

    #[tokio::test]
    async fn engine_failure_fails_the_loop() {
        let engine = ScriptedEngine::with_texts(["not json at all"], 2);
        let dispatcher = live_dispatcher();
        let lp = TurnLoop::new(&engine, &dispatcher, "think", "observe");
        let mut episode = Episode::new(INPUT);

        let next = lp.step(&mut episode, State::initial()).await;
        assert!(matches!(
            next,
            State::Failed {
                reason: FailureReason::Engine(_),
                ..
            }
        ));
        assert_eq!(episode.tokens(), 2);
    }

    #[tokio::test]
    async fn terminal_states_are_fixed_points() {
        let engine = ScriptedEngine::new(vec![]);
        let dispatcher = live_dispatcher();
        let lp = TurnLoop::new(&engine, &dispatcher, "think", "observe");
        let mut episode = Episode::new(INPUT);
        let done = State::Done {
            prediction: json!("x"),
            thought: None,
        };
        assert_eq!(lp.step(&mut episode, done.clone()).await, done);
        assert_eq!(engine.call_count(), 0);
    }
}
