//! Domain models for datewise.
//!
//! - `EvaluationRecord`: one dataset item plus its outcome
//! - `ToolInvocation` / `TurnLogEntry`: what the engine asked for and what it saw
//! - `DatewiseError`: domain error taxonomy

pub mod error;
pub mod record;
pub mod tool;

pub use error::{DatewiseError, Result};
pub use record::{EvaluationRecord, ItemInput, Outcome, ReactTrace};
pub use tool::{ToolInvocation, ToolName, TurnLogEntry};
