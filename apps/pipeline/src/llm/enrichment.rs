//! Enrichment service boundary: optional collaborator that turns the
//! extracted record plus timeline statistics into advisory output. Failure
//! here is recoverable by design — the orchestrator degrades to a twin
//! with no enrichment half.

use async_trait::async_trait;

use crate::llm::prompts::{ENRICHMENT_PROMPT, ENRICHMENT_SYSTEM};
use crate::llm::{LlmClient, LlmError, RetryPolicy};
use crate::models::{CvRecord, EnrichmentRecord};
use crate::timeline::TimelineStats;

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(
        &self,
        record: &CvRecord,
        stats: &TimelineStats,
        language: &str,
    ) -> Result<EnrichmentRecord, LlmError>;
}

/// Live enrichment over the chat-completions API. The record travels as
/// JSON — re-sending raw text would waste tokens on data the extraction
/// call already structured.
pub struct LlmEnricher {
    client: LlmClient,
    model: String,
    retry: RetryPolicy,
}

impl LlmEnricher {
    pub fn new(client: LlmClient, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry,
        }
    }
}

#[async_trait]
impl Enricher for LlmEnricher {
    async fn enrich(
        &self,
        record: &CvRecord,
        stats: &TimelineStats,
        language: &str,
    ) -> Result<EnrichmentRecord, LlmError> {
        let record_json = serde_json::to_string(record)?;
        let stats_json = serde_json::to_string(stats)?;

        let prompt = ENRICHMENT_PROMPT
            .replace("{language}", language)
            .replace("{record}", &record_json)
            .replace("{stats}", &stats_json);

        self.client
            .call_json::<EnrichmentRecord>(&self.model, ENRICHMENT_SYSTEM, &prompt, &self.retry)
            .await
    }
}
