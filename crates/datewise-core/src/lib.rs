//! datewise-core: relative-date evaluation harness
//!
//! - [`calculator`]: deterministic date-expression evaluation
//! - [`tools`]: `calculator` / `calendar_db` / `search` / `finish` dispatch
//! - [`react`]: single-step and multi-turn ReAct runners
//! - [`cot`]: single-shot chain-of-thought runner
//! - [`batch`]: dataset-wide driver with per-item latency and tokens
//! - [`obs`], [`metrics`], [`telemetry`]: logging and counters

pub mod batch;
pub mod calculator;
pub mod cot;
pub mod dataset;
pub mod domain;
mod engine;
pub mod metrics;
pub mod obs;
pub mod prompts;
pub mod protocol;
pub mod react;
pub mod reporting;
pub mod telemetry;
pub mod tools;

pub use batch::{BatchDriver, BatchReport, BatchSummary, ItemStatus, ProgressHook, Runner};
pub use calculator::{calculate, evaluate, CalcError, DateExpression, ResolvedDate};
pub use cot::CotRunner;
pub use dataset::Dataset;
pub use domain::{
    DatewiseError, EvaluationRecord, ItemInput, Outcome, ReactTrace, Result, ToolInvocation,
    ToolName, TurnLogEntry,
};
pub use metrics::METRICS;
pub use prompts::{Method, PromptSet, ReactVariant, Task, TaskProfile};
pub use react::{FailureReason, ReactRunner, State, TurnLoop, DEFAULT_MAX_TURNS};
pub use reporting::{summary_file_name, write_results_json, write_summary_json};
pub use telemetry::init_tracing;
pub use tools::{Dispatcher, ToolBackend, ToolOutcome, ToolOutput};
