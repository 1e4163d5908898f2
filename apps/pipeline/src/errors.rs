//! Pipeline-level error type.
//!
//! Only two things can stop a run: the admission check turning the input
//! away, and the extraction service failing after retries. Everything else
//! (enrichment failure, date recovery finding nothing, a low layout score)
//! degrades the output instead of failing the run.

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Terminal triage verdict. Expected outcome for non-résumé input, not
    /// an operational fault.
    #[error("input rejected: {reason}")]
    Rejected { reason: String },

    /// The mandatory extraction call failed after all retry attempts. A
    /// partial record is never synthesized in its place.
    #[error("extraction failed after {attempts} attempts: {source}")]
    Extraction {
        attempts: u32,
        #[source]
        source: LlmError,
    },
}

impl PipelineError {
    /// Rejections are the caller's business logic; extraction failures are
    /// operational faults worth alerting on.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PipelineError::Rejected { .. })
    }
}
