//! Results and summary files.

use std::path::Path;

use anyhow::{Context, Result};

use crate::batch::BatchSummary;
use crate::domain::EvaluationRecord;

/// Write the records as a pretty JSON array (non-ASCII kept as-is).
pub fn write_results_json(path: &Path, records: &[EvaluationRecord]) -> Result<()> {
    let content = serde_json::to_string_pretty(records).context("serialize results")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Write the batch summary next to the results.
pub fn write_summary_json(path: &Path, summary: &BatchSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary).context("serialize batch summary")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// `t1_react_results.json` → `t1_react_results.summary.json`.
pub fn summary_file_name(results_file_name: &str) -> String {
    match results_file_name.strip_suffix(".json") {
        Some(stem) => format!("{stem}.summary.json"),
        None => format!("{results_file_name}.summary.json"),
    }
}
