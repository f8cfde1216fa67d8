//! End-to-end batch runs: dataset file in, results file out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use datewise_calendar::fakes::MemoryCalendar;
use datewise_core::{
    write_results_json, BatchDriver, CotRunner, Dataset, Dispatcher, EvaluationRecord, Method,
    PromptSet, ReactRunner, Runner, Task, TaskProfile,
};
use datewise_llm::fakes::ScriptedEngine;
use datewise_llm::{ChatRequest, ChatResponse, ReasoningEngine};
use serde_json::{json, Value};

/// Answers CoT requests after a delay that shrinks with the item id, so
/// later items finish first.
struct SlowEcho;

#[async_trait]
impl ReasoningEngine for SlowEcho {
    async fn complete(&self, request: ChatRequest) -> datewise_llm::Result<ChatResponse> {
        let user: Value = serde_json::from_str(request.user_content().unwrap_or("{}"))
            .unwrap_or(Value::Null);
        let text = user["input_text"].as_str().unwrap_or_default().to_string();
        let delay = 40u64.saturating_sub(text.len() as u64 * 10);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(ChatResponse::new(
            json!({"thought": "echo", "prediction": text}).to_string(),
            Some(1),
        ))
    }
}

fn write_dataset(dir: &std::path::Path, name: &str, records: Value) -> Dataset {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string(&records).expect("json")).expect("write");
    Dataset::load(&path).expect("load")
}

#[tokio::test]
async fn concurrency_preserves_input_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let dataset = write_dataset(
        dir.path(),
        "T1_dataset.json",
        json!([
            {"id": 1, "input_text": "a", "anchor_date": "2025-01-01"},
            {"id": 2, "input_text": "bb", "anchor_date": "2025-01-01"},
            {"id": 3, "input_text": "ccc", "anchor_date": "2025-01-01"},
            {"id": 4, "anchor_date": "2025-01-01"},
        ]),
    );

    let finished = Arc::new(AtomicUsize::new(0));
    let counter = finished.clone();
    let driver = BatchDriver::new(Runner::Cot(CotRunner::new(Arc::new(SlowEcho), "cot")))
        .with_concurrency(4)
        .with_progress(Arc::new(move |_: &EvaluationRecord| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    let report = driver.run(dataset).await;

    let ids: Vec<Value> = report.records.iter().map(|r| r.id().clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(4)]);
    let predictions: Vec<Value> = report
        .records
        .iter()
        .map(|r| r.to_value()["prediction"].clone())
        .collect();
    assert_eq!(predictions[0], "a");
    assert_eq!(predictions[2], "ccc");
    assert_eq!(
        predictions[3],
        json!({"error": "Missing input_text or anchor_date"})
    );
    assert_eq!(finished.load(Ordering::SeqCst), 4);
    assert_eq!(report.summary.missing_field, 1);
    assert_eq!(report.summary.total_tokens, 3);
}

#[tokio::test]
async fn single_step_task_writes_results_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let prompt_dir = dir.path().join("prompts");
    std::fs::create_dir(&prompt_dir).expect("mkdir");
    std::fs::write(prompt_dir.join("t1_react_thought.txt"), "decide").expect("write");
    std::fs::write(prompt_dir.join("t1_react_observation.txt"), "answer").expect("write");

    let profile = TaskProfile::for_task(Task::T1);
    let dataset = write_dataset(
        dir.path(),
        profile.dataset_file,
        json!([{"id": "a1", "input_text": "다음 주 금요일", "anchor_date": "2025-11-21", "label": "2025-11-28"}]),
    );
    let PromptSet::React {
        thought,
        observation,
    } = PromptSet::load(&prompt_dir, &profile, Method::React).expect("prompts")
    else {
        panic!("react prompts expected");
    };

    let engine = Arc::new(ScriptedEngine::with_texts(
        [
            r#"{"thought": "weekday math", "tool": "calculator", "tool_input": "2025-11-21 next friday"}"#,
            r#"{"thought": "friday after anchor", "prediction": ["2025-11-28"]}"#,
        ],
        15,
    ));
    let dispatcher = Dispatcher::new(engine.clone(), Arc::new(MemoryCalendar::new()), profile.backend);
    let runner = ReactRunner::new(engine, dispatcher, thought, observation, profile.variant);
    let report = BatchDriver::new(Runner::React(runner)).run(dataset).await;

    let out_path = dir.path().join(profile.results_file_name(Method::React));
    write_results_json(&out_path, &report.records).expect("write results");
    assert!(out_path.ends_with("t1_react_results.json"));

    let written: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(&out_path).expect("read")).expect("json");
    let item = &written[0];
    assert_eq!(item["label"], "2025-11-28");
    assert_eq!(item["prediction"], json!(["2025-11-28"]));
    assert_eq!(item["react_observation"], "2025-11-28");
    assert_eq!(item["react_step1_output"]["tool"], "calculator");
    assert_eq!(item["tokens"], 30);
    assert!(item["latency"].is_number());
    assert!(item.get("react_turn_1").is_none());
}
