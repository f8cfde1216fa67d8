//! Batch driver: validate, run, time and summarise every dataset item.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::cot::CotRunner;
use crate::dataset::Dataset;
use crate::domain::{EvaluationRecord, ItemInput, Outcome};
use crate::metrics::METRICS;
use crate::obs;
use crate::prompts::Method;
use crate::react::ReactRunner;

/// The per-item runner a batch uses.
pub enum Runner {
    Cot(CotRunner),
    React(ReactRunner),
}

impl Runner {
    pub fn method(&self) -> Method {
        match self {
            Self::Cot(_) => Method::Cot,
            Self::React(_) => Method::React,
        }
    }

    async fn run(&self, input: ItemInput<'_>) -> Outcome {
        match self {
            Self::Cot(runner) => runner.run(input).await,
            Self::React(runner) => runner.run(input).await,
        }
    }
}

/// How a single item ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Completed,
    /// Ran, but the prediction is an error marker.
    Failed,
    MissingField,
}

/// Called once per finished item, in completion order.
pub type ProgressHook = Arc<dyn Fn(&EvaluationRecord) + Send + Sync>;

/// End-of-batch totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub run_id: String,
    pub method: Method,
    pub dataset_digest: String,
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub missing_field: usize,
    pub total_tokens: u64,
    /// Mean over items that have a latency.
    pub mean_latency_secs: Option<f64>,
    pub duration_ms: u64,
}

impl BatchSummary {
    fn tally(
        run_id: String,
        method: Method,
        dataset_digest: String,
        items: &[(EvaluationRecord, ItemStatus)],
        duration_ms: u64,
    ) -> Self {
        let count = |status: ItemStatus| items.iter().filter(|(_, s)| *s == status).count();
        let latencies: Vec<f64> = items
            .iter()
            .filter_map(|(r, _)| r.outcome.latency)
            .collect();
        let mean_latency_secs = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
        };

        Self {
            run_id,
            method,
            dataset_digest,
            generated_at: Utc::now(),
            total: items.len(),
            completed: count(ItemStatus::Completed),
            failed: count(ItemStatus::Failed),
            missing_field: count(ItemStatus::MissingField),
            total_tokens: items.iter().filter_map(|(r, _)| r.outcome.tokens).sum(),
            mean_latency_secs,
            duration_ms,
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "run {} ({})", self.run_id, self.method)?;
        writeln!(
            f,
            "  items: {} total, {} completed, {} failed, {} missing fields",
            self.total, self.completed, self.failed, self.missing_field
        )?;
        writeln!(f, "  tokens: {}", self.total_tokens)?;
        match self.mean_latency_secs {
            Some(mean) => write!(f, "  mean latency: {mean:.2}s"),
            None => write!(f, "  mean latency: n/a"),
        }
    }
}

/// Records in input order plus their summary.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub records: Vec<EvaluationRecord>,
    pub summary: BatchSummary,
}

pub struct BatchDriver {
    runner: Runner,
    concurrency: usize,
    progress: Option<ProgressHook>,
}

impl BatchDriver {
    pub fn new(runner: Runner) -> Self {
        Self {
            runner,
            concurrency: 1,
            progress: None,
        }
    }

    /// Items in flight at once (minimum 1). Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    #[instrument(
        name = "datewise.batch",
        skip_all,
        fields(run_id = tracing::field::Empty, method = %self.runner.method())
    )]
    pub async fn run(&self, dataset: Dataset) -> BatchReport {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        let started = Instant::now();
        obs::emit_batch_started(&run_id, dataset.len(), &dataset.digest);

        let items: Vec<(EvaluationRecord, ItemStatus)> =
            stream::iter(dataset.records.into_iter().enumerate())
                .map(|(index, record)| self.process(index, record))
                .buffered(self.concurrency)
                .collect()
                .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        let summary = BatchSummary::tally(
            run_id,
            self.runner.method(),
            dataset.digest,
            &items,
            duration_ms,
        );
        obs::emit_batch_finished(
            &summary.run_id,
            duration_ms,
            summary.completed,
            summary.failed + summary.missing_field,
        );
        METRICS.flush();

        BatchReport {
            records: items.into_iter().map(|(r, _)| r).collect(),
            summary,
        }
    }

    async fn process(
        &self,
        index: usize,
        mut record: EvaluationRecord,
    ) -> (EvaluationRecord, ItemStatus) {
        let started = Instant::now();
        let outcome = match record.input() {
            Ok(input) => Some(self.runner.run(input).await),
            Err(e) => {
                obs::emit_item_skipped(index, record.id(), &e);
                None
            }
        };

        let status = match outcome {
            Some(mut outcome) => {
                let latency = started.elapsed().as_secs_f64();
                outcome.latency = Some(latency);
                record.outcome = outcome;
                let failed = record.is_error();
                obs::emit_item_finished(index, record.id(), latency, failed);
                if failed {
                    ItemStatus::Failed
                } else {
                    ItemStatus::Completed
                }
            }
            None => {
                record.mark_missing_field();
                ItemStatus::MissingField
            }
        };

        match status {
            ItemStatus::Completed => METRICS.inc_items_completed(),
            ItemStatus::Failed | ItemStatus::MissingField => METRICS.inc_items_failed(),
        }
        if let Some(hook) = &self.progress {
            (**hook)(&record);
        }
        (record, status)
    }
}
