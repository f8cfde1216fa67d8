//! Simulated tool backend: the reasoning engine plays the tool.

use datewise_llm::{ChatRequest, ReasoningEngine};
use serde_json::Value;

use super::ToolOutput;
use crate::domain::ToolName;
use crate::engine::ask;

const TOOL_EXECUTOR_PROMPT: &str = "\
You are an expert tool executor. Your task is to act as a specific tool and provide only the direct output for the given input. Do not provide any explanations, apologies, or extra text. Just return the result.

- If the tool is 'calculator', perform the date calculation and return the date string 'YYYY-MM-DD'.
- If the tool is 'calendar_db', act like a database query. Return a JSON array of holidays for the given year/month, or return the exact string \"No special days found.\" if there are none.
- If the tool is 'search', act like a search engine and provide a concise, one-sentence factual answer.
";

fn tool_request(tool: &ToolName, input: &Value) -> ChatRequest {
    ChatRequest::from_prompt(
        TOOL_EXECUTOR_PROMPT,
        format!("Tool: [{tool}]\nInput: {input}"),
    )
}

pub async fn execute(engine: &dyn ReasoningEngine, tool: &ToolName, input: &Value) -> ToolOutput {
    match ask(engine, tool_request(tool, input)).await {
        Ok(reply) => ToolOutput::observation(reply.content.trim(), reply.total_tokens),
        Err(e) => ToolOutput::observation(format!("LLM-based tool execution error: {e}"), None),
    }
}
