//! Single-step ReAct: one decision, at most one tool, one final answer.

use datewise_llm::ReasoningEngine;
use serde_json::{json, Value};

use super::{ask_json, pretty};
use crate::domain::{ItemInput, Outcome, ReactTrace};
use crate::obs;
use crate::protocol::{Answer, Decision};
use crate::tools::{Dispatcher, ToolOutcome};

pub struct SingleStep<'a> {
    engine: &'a dyn ReasoningEngine,
    dispatcher: &'a Dispatcher,
    decision_prompt: &'a str,
    answer_prompt: &'a str,
}

impl<'a> SingleStep<'a> {
    pub fn new(
        engine: &'a dyn ReasoningEngine,
        dispatcher: &'a Dispatcher,
        decision_prompt: &'a str,
        answer_prompt: &'a str,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            decision_prompt,
            answer_prompt,
        }
    }

    pub async fn run(&self, input: ItemInput<'_>) -> Outcome {
        let mut tokens = 0;

        let user = json!({
            "input_text": input.input_text,
            "anchor_date": input.anchor_date,
        })
        .to_string();
        let decision = match ask_json(
            self.engine,
            self.decision_prompt,
            user,
            &mut tokens,
            Decision::parse,
        )
        .await
        {
            Ok(decision) => decision,
            Err(reason) => {
                return Outcome {
                    prediction: Some(Value::String(reason.prediction())),
                    tokens: Some(tokens),
                    trace: ReactTrace::SingleStep {
                        step1_output: None,
                        observation: None,
                    },
                    ..Outcome::default()
                }
            }
        };

        let output = self.dispatcher.dispatch(&decision.invocation()).await;
        tokens += output.tokens;
        let observation = output.observation_text().to_string();
        obs::emit_turn_completed(1, &decision.tool.to_string(), observation.len());

        let (prediction, thought) = match output.outcome {
            ToolOutcome::Finish(answer) => (answer, decision.thought.clone().map(Value::String)),
            ToolOutcome::Observation(_) => {
                let user = pretty(&json!({
                    "input_text": input.input_text,
                    "anchor_date": input.anchor_date,
                    "tool_log": {
                        "tool": decision.tool.as_wire(),
                        "input": &decision.tool_input,
                        "observation": &observation,
                    },
                }));
                match ask_json(
                    self.engine,
                    self.answer_prompt,
                    user,
                    &mut tokens,
                    Answer::parse,
                )
                .await
                {
                    Ok(answer) => (
                        answer.prediction.unwrap_or(Value::Null),
                        Some(answer.thought.unwrap_or(Value::Null)),
                    ),
                    Err(reason) => (Value::String(reason.prediction()), None),
                }
            }
        };

        Outcome {
            prediction: Some(prediction),
            thought,
            latency: None,
            tokens: Some(tokens),
            trace: ReactTrace::SingleStep {
                step1_output: Some(decision.raw),
                observation: Some(observation),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolBackend, FINISH_OBSERVATION, UNKNOWN_TOOL_OBSERVATION};
    use datewise_calendar::fakes::MemoryCalendar;
    use datewise_llm::fakes::ScriptedEngine;
    use std::sync::Arc;

    const INPUT: ItemInput<'static> = ItemInput {
        input_text: "다음 주 금요일",
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
    async fn tool_then_final_answer() {
        let engine = ScriptedEngine::with_texts(
            [
                r#"{"thought": "next friday", "tool": "calculator", "tool_input": "2025-11-21 next friday"}"#,
                r#"{"thought": "it is the 28th", "prediction": ["2025-11-28"]}"#,
            ],
            10,
        );
        let dispatcher = live_dispatcher();
        let out = SingleStep::new(&engine, &dispatcher, "decide", "answer")
            .run(INPUT)
            .await;

        assert_eq!(out.prediction, Some(json!(["2025-11-28"])));
        assert_eq!(out.thought, Some(json!("it is the 28th")));
        assert_eq!(out.tokens, Some(20));
        match &out.trace {
            ReactTrace::SingleStep {
                step1_output,
                observation,
            } => {
                assert_eq!(step1_output.as_ref().expect("step1")["tool"], "calculator");
                assert_eq!(observation.as_deref(), Some("2025-11-28"));
            }
            other => panic!("unexpected trace {other:?}"),
        }

        let requests = engine.requests();
        let first = requests[0].user_content().expect("user");
        assert!(!first.contains('\n'), "decision input is compact");
        let second: Value =
            serde_json::from_str(requests[1].user_content().expect("user")).expect("json");
        assert_eq!(second["tool_log"]["observation"], "2025-11-28");
        assert_eq!(second["tool_log"]["tool"], "calculator");
    }

    #[tokio::test]
    async fn finish_skips_final_call() {
        let engine = ScriptedEngine::with_texts(
            [r#"{"thought": "obvious", "tool": "finish", "tool_input": ["2025-11-21"]}"#],
            4,
        );
        let dispatcher = live_dispatcher();
        let out = SingleStep::new(&engine, &dispatcher, "decide", "answer")
            .run(INPUT)
            .await;

        assert_eq!(engine.call_count(), 1);
        assert_eq!(out.prediction, Some(json!(["2025-11-21"])));
        assert_eq!(out.thought, Some(json!("obvious")));
        assert_eq!(
            out.trace,
            ReactTrace::SingleStep {
                step1_output: Some(
                    json!({"thought": "obvious", "tool": "finish", "tool_input": ["2025-11-21"]})
                ),
                observation: Some(FINISH_OBSERVATION.into()),
            }
        );
    }

    #[tokio::test]
    async fn unknown_tool_still_asks_for_answer() {
        let engine = ScriptedEngine::with_texts(
            [
                r#"{"thought": "?", "tool": "weather", "tool_input": "seoul"}"#,
                r#"{"prediction": "2025-11-28"}"#,
            ],
            1,
        );
        let dispatcher = live_dispatcher();
        let out = SingleStep::new(&engine, &dispatcher, "decide", "answer")
            .run(INPUT)
            .await;
        assert_eq!(out.prediction, Some(json!("2025-11-28")));
        assert_eq!(out.thought, Some(Value::Null));
        match out.trace {
            ReactTrace::SingleStep { observation, .. } => {
                assert_eq!(observation.as_deref(), Some(UNKNOWN_TOOL_OBSERVATION))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn decision_failure_is_an_error_prediction() {
        let engine = ScriptedEngine::new(vec![]);
        let dispatcher = live_dispatcher();
        let out = SingleStep::new(&engine, &dispatcher, "decide", "answer")
            .run(INPUT)
            .await;
        let prediction = out.prediction.expect("prediction");
        assert!(prediction.as_str().expect("text").starts_with("Error: "));
        assert_eq!(out.tokens, Some(0));
    }
}
