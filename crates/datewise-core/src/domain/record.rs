//! Evaluation records: one dataset item plus its outcome.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

use super::error::DatewiseError;
use super::tool::TurnLogEntry;

/// Per-item ReAct trace persisted next to the prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ReactTrace {
    #[default]
    None,
    /// Single-tool variant: raw decision JSON and the one observation.
    SingleStep {
        step1_output: Option<Value>,
        observation: Option<String>,
    },
    /// Multi-turn variant: one entry per turn, persisted as `react_turn_N`.
    MultiTurn(Vec<TurnLogEntry>),
}

/// Outcome fields written once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub prediction: Option<Value>,
    pub thought: Option<Value>,
    /// Seconds.
    pub latency: Option<f64>,
    pub tokens: Option<u64>,
    pub trace: ReactTrace,
}

impl Outcome {
    fn entries(&self) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        if let Some(prediction) = &self.prediction {
            out.push(("prediction".to_string(), prediction.clone()));
        }
        if let Some(thought) = &self.thought {
            out.push(("thought".to_string(), thought.clone()));
        }
        if let Some(latency) = self.latency {
            out.push(("latency".to_string(), json!(latency)));
        }
        if let Some(tokens) = self.tokens {
            out.push(("tokens".to_string(), json!(tokens)));
        }
        match &self.trace {
            ReactTrace::None => {}
            ReactTrace::SingleStep {
                step1_output,
                observation,
            } => {
                if let Some(step1) = step1_output {
                    out.push(("react_step1_output".to_string(), step1.clone()));
                }
                if let Some(observation) = observation {
                    out.push(("react_observation".to_string(), json!(observation)));
                }
            }
            ReactTrace::MultiTurn(turns) => {
                for (i, turn) in turns.iter().enumerate() {
                    out.push((format!("react_turn_{}", i + 1), json!(turn)));
                }
            }
        }
        out
    }
}

/// One dataset item. Dataset fields are kept verbatim; outcome fields are
/// merged over them on serialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct EvaluationRecord {
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub outcome: Outcome,
}

/// The required inputs of a record that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemInput<'a> {
    pub input_text: &'a str,
    pub anchor_date: &'a str,
}

impl EvaluationRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            outcome: Outcome::default(),
        }
    }

    /// The record's `id`, or `null`.
    pub fn id(&self) -> &Value {
        self.fields.get("id").unwrap_or(&Value::Null)
    }

    fn required_text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Both required fields, or [`DatewiseError::MissingField`].
    pub fn input(&self) -> Result<ItemInput<'_>, DatewiseError> {
        match (
            self.required_text("input_text"),
            self.required_text("anchor_date"),
        ) {
            (Some(input_text), Some(anchor_date)) => Ok(ItemInput {
                input_text,
                anchor_date,
            }),
            _ => Err(DatewiseError::MissingField),
        }
    }

    /// Mark the record as rejected by input validation.
    pub fn mark_missing_field(&mut self) {
        self.outcome = Outcome {
            prediction: Some(json!({"error": DatewiseError::MissingField.to_string()})),
            ..Outcome::default()
        };
    }

    /// Whether the prediction is an error marker.
    pub fn is_error(&self) -> bool {
        match &self.outcome.prediction {
            Some(Value::String(s)) => s.starts_with("Error:"),
            Some(Value::Object(obj)) => obj.contains_key("error"),
            _ => false,
        }
    }

    /// Dataset fields with outcome fields merged on top.
    pub fn to_value(&self) -> Value {
        let mut merged = self.fields.clone();
        for (key, value) in self.outcome.entries() {
            merged.insert(key, value);
        }
        Value::Object(merged)
    }
}

impl Serialize for EvaluationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
