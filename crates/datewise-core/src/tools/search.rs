//! `search`: general-knowledge lookup answered by the reasoning engine.

use datewise_llm::{ChatRequest, ReasoningEngine};

use super::ToolOutput;
use crate::engine::ask;

const SEARCH_SYSTEM_PROMPT: &str = "You are a helpful assistant that provides concise, factual answers based on the user's query, as if you were a search engine.";

fn search_request(query: &str) -> ChatRequest {
    ChatRequest::from_prompt(
        SEARCH_SYSTEM_PROMPT,
        format!(
            "For the query '{query}', provide a direct and factual answer, summarizing the key information within 150 characters."
        ),
    )
}

pub async fn lookup(engine: &dyn ReasoningEngine, query: &str) -> ToolOutput {
    match ask(engine, search_request(query)).await {
        Ok(reply) => ToolOutput::observation(reply.content.trim(), reply.total_tokens),
        Err(e) => ToolOutput::observation(format!("Search tool error: {e}"), None),
    }
}
