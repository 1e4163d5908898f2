//! Extraction service boundary: mandatory collaborator that turns prepared
//! text into a `CvRecord`. The trait keeps the orchestrator testable
//! without a network; the live implementation rides `LlmClient`.

use async_trait::async_trait;

use crate::etl::sections::SectionLabel;
use crate::llm::prompts::{EXTRACTION_PROMPT, EXTRACTION_SYSTEM};
use crate::llm::{LlmClient, LlmError, RetryPolicy};
use crate::models::CvRecord;

/// What the orchestrator hands to the extraction service. `truncated`
/// marks the deliberate lossy cut at the size ceiling — the text itself is
/// already at or below the ceiling.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub text: String,
    pub language: String,
    pub truncated: bool,
    /// Section labels found by the segmenter, in document order. Sent as a
    /// layout hint; the full text still goes with them.
    pub section_hints: Vec<SectionLabel>,
}

#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<CvRecord, LlmError>;
}

/// Live extraction over the chat-completions API.
pub struct LlmExtractor {
    client: LlmClient,
    model: String,
    retry: RetryPolicy,
}

impl LlmExtractor {
    pub fn new(client: LlmClient, model: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry,
        }
    }
}

#[async_trait]
impl Extractor for LlmExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<CvRecord, LlmError> {
        let hints = request
            .section_hints
            .iter()
            .map(|label| format!("{label:?}").to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");

        let prompt = EXTRACTION_PROMPT
            .replace("{hints}", &hints)
            .replace("{language}", &request.language)
            .replace("{text}", &request.text);

        self.client
            .call_json::<CvRecord>(&self.model, EXTRACTION_SYSTEM, &prompt, &self.retry)
            .await
    }
}
