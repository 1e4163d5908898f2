//! Data contract for the advisory half of the twin output.
//!
//! `target_cv_id` ties the insights back to the factual record; the
//! orchestrator overwrites whatever the model returned with the run id so
//! the linkage can never drift.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timeline::TimelineStats;

/// Hard market signals: detected stack, tooling, and plausible role fits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSignals {
    #[serde(default)]
    pub stack_detected: Vec<String>,
    #[serde(default)]
    pub tools_detected: Vec<String>,
    #[serde(default)]
    pub role_fit_scenarios: Vec<String>,
}

/// Soft advisory output: what is missing for the next level and how to
/// improve the document itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachFeedback {
    #[serde(default)]
    pub missing_critical_skills: Vec<String>,
    #[serde(default)]
    pub recommended_certifications: Vec<String>,
    #[serde(default)]
    pub improvement_tips: Vec<String>,
}

/// Advisory record produced by the enrichment service. Optional end to end:
/// its absence never invalidates the extracted record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    #[serde(default = "Uuid::nil")]
    pub target_cv_id: Uuid,
    #[serde(default)]
    pub market_signals: MarketSignals,
    #[serde(default)]
    pub coach_feedback: CoachFeedback,
    /// Deterministic tenure/gap statistics computed locally, echoed into the
    /// advisory record so it is self-contained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineStats>,
}
