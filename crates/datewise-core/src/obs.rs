//! Structured lifecycle events for batch runs.
//!
//! Batch, item and turn events. Batch events carry the run id; everything
//! emitted while a batch runs also sits inside its `datewise.batch` span.
//! Turns are logged at `debug!`, the rest at `info!` or `warn!`.

use tracing::{debug, info, warn};

pub fn emit_batch_started(run_id: &str, items: usize, dataset_digest: &str) {
    info!(
        event = "batch.started",
        run_id = %run_id,
        items = items,
        dataset_digest = %dataset_digest,
    );
}

pub fn emit_item_finished(index: usize, id: &serde_json::Value, latency_secs: f64, failed: bool) {
    info!(
        event = "item.finished",
        index = index,
        id = %id,
        latency_secs = latency_secs,
        failed = failed,
    );
}

pub fn emit_item_skipped(index: usize, id: &serde_json::Value, reason: &dyn std::fmt::Display) {
    warn!(event = "item.skipped", index = index, id = %id, reason = %reason);
}

/// One ReAct turn: which tool ran and how long its observation was.
pub fn emit_turn_completed(turn: usize, tool: &str, observation_len: usize) {
    debug!(
        event = "react.turn_completed",
        turn = turn,
        tool = %tool,
        observation_len = observation_len,
    );
}

pub fn emit_batch_finished(run_id: &str, duration_ms: u64, completed: usize, failed: usize) {
    info!(
        event = "batch.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        completed = completed,
        failed = failed,
    );
}
