//! Tool names, invocations, and turn-log entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed tool set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToolName {
    Calculator,
    CalendarDb,
    Search,
    Finish,
    /// Anything else the engine produced; `None` when no tool was named.
    Unknown(Option<String>),
}

impl ToolName {
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            Some("calculator") => Self::Calculator,
            Some("calendar_db") => Self::CalendarDb,
            Some("search") => Self::Search,
            Some("finish") => Self::Finish,
            other => Self::Unknown(other.map(str::to_string)),
        }
    }

    /// The name as the engine spelled it (`None` if it named nothing).
    pub fn as_wire(&self) -> Option<&str> {
        match self {
            Self::Calculator => Some("calculator"),
            Self::CalendarDb => Some("calendar_db"),
            Self::Search => Some("search"),
            Self::Finish => Some("finish"),
            Self::Unknown(name) => name.as_deref(),
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire().unwrap_or("<none>"))
    }
}

/// One tool call chosen by the reasoning engine. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool: ToolName,
    /// A string, a `{year, month, category}` mapping, or whatever the engine sent.
    pub input: Value,
    pub thought: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool: ToolName, input: Value) -> Self {
        Self {
            tool,
            input,
            thought: None,
        }
    }

    /// Input as text: strings verbatim, everything else JSON-encoded.
    pub fn input_text(&self) -> String {
        value_text(&self.input)
    }
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One orchestrator turn, as persisted and replayed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub thought: Option<String>,
    pub tool: Option<String>,
    pub input: Value,
    pub observation: String,
}

impl TurnLogEntry {
    pub fn new(invocation: &ToolInvocation, observation: impl Into<String>) -> Self {
        Self {
            thought: invocation.thought.clone(),
            tool: invocation.tool.as_wire().map(str::to_string),
            input: invocation.input.clone(),
            observation: observation.into(),
        }
    }
}
