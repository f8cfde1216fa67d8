//! Structured replies expected from the reasoning engine.
//!
//! | phase         | keys                       |
//! |---------------|----------------------------|
//! | decision      | `thought`, `tool`, `tool_input` |
//! | continuation  | `thought`, `status: [decision, payload]` |
//! | answer (CoT / single-step final) | `thought`, `prediction` |

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{ToolInvocation, ToolName};

/// Malformed engine output.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProtocolError {
    #[error("invalid JSON response: {reason}")]
    InvalidJson { reason: String, raw: String },

    #[error("expected a JSON object, got: {0}")]
    NotAnObject(String),
}

/// Parse engine text as a JSON object.
pub fn parse_object(text: &str) -> Result<Map<String, Value>, ProtocolError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ProtocolError::NotAnObject(other.to_string())),
        Err(e) => Err(ProtocolError::InvalidJson {
            reason: e.to_string(),
            raw: text.to_string(),
        }),
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Tool-selection reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub thought: Option<String>,
    pub tool: ToolName,
    pub tool_input: Value,
    /// The whole reply, kept for the persisted trace.
    pub raw: Value,
}

impl Decision {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let map = parse_object(text)?;
        let thought = text_field(&map, "thought");
        let tool = ToolName::parse(map.get("tool").and_then(Value::as_str));
        let tool_input = map.get("tool_input").cloned().unwrap_or(Value::Null);
        Ok(Self {
            thought,
            tool,
            tool_input,
            raw: Value::Object(map),
        })
    }

    pub fn invocation(&self) -> ToolInvocation {
        ToolInvocation {
            tool: self.tool.clone(),
            input: self.tool_input.clone(),
            thought: self.thought.clone(),
        }
    }
}

/// What the continuation step decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Continue,
    Finish(Value),
    /// `status` absent, not a two-element array, or an unknown decision word.
    Malformed(Value),
}

/// Continue/finish reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    /// The new rolling summary.
    pub thought: Option<String>,
    pub status: Status,
}

impl Continuation {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let map = parse_object(text)?;
        let thought = text_field(&map, "thought");
        let raw_status = map.get("status").cloned().unwrap_or(Value::Null);

        let status = match &raw_status {
            Value::Array(items) if items.len() == 2 => {
                match items[0].as_str().map(str::to_ascii_lowercase).as_deref() {
                    Some("finish") => Status::Finish(items[1].clone()),
                    Some("continue") => Status::Continue,
                    _ => Status::Malformed(raw_status.clone()),
                }
            }
            _ => Status::Malformed(raw_status.clone()),
        };

        Ok(Self { thought, status })
    }
}

/// Final `{thought, prediction}` reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub thought: Option<Value>,
    pub prediction: Option<Value>,
}

impl Answer {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let map = parse_object(text)?;
        Ok(Self {
            thought: map.get("thought").cloned(),
            prediction: map.get("prediction").cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decision_parses_mapping_input() {
        let d = Decision::parse(
            r#"{"thought": "need holidays", "tool": "calendar_db", "tool_input": {"year": "2025", "month": "all"}}"#,
        )
        .expect("decision");
        assert_eq!(d.tool, ToolName::CalendarDb);
        assert_eq!(d.tool_input["month"], "all");
        assert_eq!(d.thought.as_deref(), Some("need holidays"));
        assert_eq!(d.raw["tool"], "calendar_db");
    }

    #[test]
    fn decision_without_tool_is_unknown() {
        let d = Decision::parse(r#"{"thought": "hmm"}"#).expect("decision");
        assert_eq!(d.tool, ToolName::Unknown(None));
        assert_eq!(d.tool_input, Value::Null);
    }

    #[test]
    fn invalid_json_is_a_protocol_error() {
        let err = Decision::parse("not json").expect_err("invalid");
        assert!(matches!(err, ProtocolError::InvalidJson { .. }));
        let err = Decision::parse("[1, 2]").expect_err("array");
        assert!(matches!(err, ProtocolError::NotAnObject(_)));
    }

    #[test]
    fn continuation_status_shapes() {
        let c = Continuation::parse(r#"{"thought": "s", "status": ["finish", ["2025-11-28"]]}"#)
            .expect("parse");
        assert_eq!(c.status, Status::Finish(json!(["2025-11-28"])));
        assert_eq!(c.thought.as_deref(), Some("s"));

        let c = Continuation::parse(r#"{"thought": "s", "status": ["Continue", null]}"#)
            .expect("parse");
        assert_eq!(c.status, Status::Continue);

        let c = Continuation::parse(r#"{"thought": "s"}"#).expect("parse");
        assert_eq!(c.status, Status::Malformed(Value::Null));

        let c = Continuation::parse(r#"{"status": ["finish"]}"#).expect("parse");
        assert_eq!(c.status, Status::Malformed(json!(["finish"])));

        let c = Continuation::parse(r#"{"status": ["maybe", 1]}"#).expect("parse");
        assert!(matches!(c.status, Status::Malformed(_)));
    }

    #[test]
    fn answer_keeps_missing_keys_as_none() {
        let a = Answer::parse(r#"{"prediction": "2025-11-28"}"#).expect("answer");
        assert_eq!(a.prediction, Some(json!("2025-11-28")));
        assert_eq!(a.thought, None);
    }
}
