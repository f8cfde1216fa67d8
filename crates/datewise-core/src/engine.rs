//! Counted, logged access to the reasoning engine.

use datewise_llm::{ChatRequest, ChatResponse, ReasoningEngine};
use tracing::debug;

use crate::metrics::METRICS;

/// Send one request, counting it in [`METRICS`].
pub(crate) async fn ask(
    engine: &dyn ReasoningEngine,
    request: ChatRequest,
) -> datewise_llm::Result<ChatResponse> {
    METRICS.inc_engine_calls();
    let reply = engine.complete(request).await;
    match &reply {
        Ok(r) => debug!(tokens = ?r.total_tokens, chars = r.content.len(), "engine replied"),
        Err(e) => debug!(error = %e, "engine call failed"),
    }
    reply
}
