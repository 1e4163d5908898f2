//! The orchestrator: one run of the résumé pipeline, front to back.
//!
//! Expressed as an explicit state machine rather than nested branching so
//! every transition (and its failure handling) is visible in the logs and
//! independently testable. Terminal states are `Rejected`,
//! `ExtractionFailed`, and `Completed`; everything in between is linear.
//!
//! The runner owns no mutable state across runs. Configuration is borrowed
//! read-only and the service handles are `&self`, so concurrent runs with
//! different settings are safe.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::etl::{audit, cleaner, dates, recovery, sections, skills, triage};
use crate::llm::enrichment::Enricher;
use crate::llm::extraction::{ExtractionRequest, Extractor};
use crate::models::TwinResult;
use crate::timeline;

/// Pipeline run states, in transition order. Logged at every transition;
/// the data itself flows through `run` as locals, not through the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Audited,
    Triaged,
    Rejected,
    Normalized,
    Segmented,
    Extracting,
    ExtractionFailed,
    Extracted,
    DateRecovered,
    Enriching,
    Enriched,
    EnrichmentSkipped,
    Completed,
}

pub struct PipelineRunner<'a> {
    config: &'a PipelineConfig,
    extractor: &'a dyn Extractor,
    enricher: &'a dyn Enricher,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        extractor: &'a dyn Extractor,
        enricher: &'a dyn Enricher,
    ) -> Self {
        Self {
            config,
            extractor,
            enricher,
        }
    }

    /// Processes one raw text blob into a twin result. The only failure
    /// paths are a triage rejection and an exhausted extraction call;
    /// everything downstream degrades instead of failing.
    pub async fn run(&self, raw: &str) -> Result<TwinResult, PipelineError> {
        let mut state = RunState::Received;
        transition(&mut state, RunState::Audited);
        let layout_report = audit::audit(raw, &self.config.layout);
        debug!(score = layout_report.score, "layout audit complete");

        // Triage reads normalized text so glyph noise cannot mask keywords.
        let normalized = cleaner::normalize(raw);

        transition(&mut state, RunState::Triaged);
        let verdict = triage::triage(&normalized, self.config);
        let (language, name_hint, email_hint) = match verdict {
            triage::TriageVerdict::Rejected { reason } => {
                transition(&mut state, RunState::Rejected);
                info!(%reason, "input rejected at triage");
                return Err(PipelineError::Rejected { reason });
            }
            triage::TriageVerdict::Accepted {
                language,
                name_hint,
                email_hint,
            } => (language, name_hint, email_hint),
        };
        let language = if language == "unknown" {
            self.config.default_language.clone()
        } else {
            language
        };
        transition(&mut state, RunState::Normalized);

        transition(&mut state, RunState::Segmented);
        let segments = sections::segment(&normalized, &self.config.vocabulary);
        let section_hints: Vec<sections::SectionLabel> = segments
            .iter()
            .map(|s| s.label)
            .filter(|l| *l != sections::SectionLabel::Unknown)
            .collect();

        // Size ceiling: a deliberate lossy cut, never a rejection.
        let char_count = normalized.chars().count();
        let truncated = char_count > self.config.max_input_chars;
        let text = if truncated {
            warn!(
                chars = char_count,
                ceiling = self.config.max_input_chars,
                "input exceeds ceiling, truncating"
            );
            normalized
                .chars()
                .take(self.config.max_input_chars)
                .collect()
        } else {
            normalized.clone()
        };

        transition(&mut state, RunState::Extracting);
        let request = ExtractionRequest {
            text,
            language: language.clone(),
            truncated,
            section_hints,
        };
        let mut record = match self.extractor.extract(&request).await {
            Ok(record) => record,
            Err(source) => {
                transition(&mut state, RunState::ExtractionFailed);
                return Err(PipelineError::Extraction {
                    attempts: self.config.retry_max_attempts,
                    source,
                });
            }
        };
        transition(&mut state, RunState::Extracted);
        let id = Uuid::new_v4();

        // Triage hints backfill identity fields the model left empty.
        if record.email.is_none() {
            record.email = email_hint;
        }
        if record.full_name.is_empty() {
            if let Some(name) = name_hint {
                record.full_name = name;
            }
        }
        record.layout_audit = Some(layout_report);

        transition(&mut state, RunState::DateRecovered);
        let hints = dates::scan_dates(&normalized);
        recovery::recover_dates(&mut record, &normalized, &hints);

        if record.skills.hard_skills.is_empty() {
            record.skills.hard_skills = skills::extract_skills(&normalized);
            if !record.skills.hard_skills.is_empty() {
                debug!(
                    count = record.skills.hard_skills.len(),
                    "hard skills backfilled from keyword sweep"
                );
            }
        }

        timeline::sort_reverse_chronological(&mut record);
        let stats = timeline::analyze(&record);

        transition(&mut state, RunState::Enriching);
        let enrichment = match self.enricher.enrich(&record, &stats, &language).await {
            Ok(mut enrichment) => {
                enrichment.target_cv_id = id;
                enrichment.timeline = Some(stats);
                transition(&mut state, RunState::Enriched);
                Some(enrichment)
            }
            Err(e) => {
                // Advisory output is optional by contract.
                warn!(error = %e, "enrichment failed, continuing without it");
                transition(&mut state, RunState::EnrichmentSkipped);
                None
            }
        };

        transition(&mut state, RunState::Completed);
        info!(
            cv_id = %id,
            experience_entries = record.experience.len(),
            enriched = enrichment.is_some(),
            "pipeline run completed"
        );
        Ok(TwinResult {
            id,
            source: record,
            enrichment,
        })
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = ?state, to = ?next, "pipeline transition");
    *state = next;
}
