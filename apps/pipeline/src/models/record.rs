//! Data contract for the factual half of the twin output.
//!
//! Everything here is serde-validated on the way in from the extraction
//! service and serialized as-is on the way out. Fields the model may omit
//! carry `#[serde(default)]` so a sparse but well-formed response still
//! deserializes; a response that breaks the shape itself is a
//! `MalformedResponse` and handled by the retry layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::etl::audit::LayoutReport;
use crate::models::enrichment::EnrichmentRecord;

/// Confidence attached to a heuristically recovered date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateConfidence {
    High,
    Medium,
    Low,
}

/// Where a date field came from. `Model` means the extraction service
/// produced it; `Recovered` means the date-recovery pass filled it in from
/// a positional pattern match and downstream consumers should weight it
/// accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateProvenance {
    #[default]
    Model,
    Recovered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills_used: Vec<String>,
    #[serde(default)]
    pub impact_metrics: Vec<String>,
    #[serde(default)]
    pub date_provenance: DateProvenance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_confidence: Option<DateConfidence>,
    /// Raw line the recovered date came from, kept for user review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_date_line: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub date_provenance: DateProvenance,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillSection {
    #[serde(default)]
    pub hard_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
}

/// AI-inferred read on the candidate, isolated from the factual fields so
/// callers can tell opinion from extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    #[serde(default)]
    pub seniority: String,
    #[serde(default)]
    pub writing_style: String,
    #[serde(default)]
    pub llm_summary: String,
    #[serde(default)]
    pub tags_hidden: Vec<String>,
}

/// Structured facts extracted from one résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CvRecord {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub metadata: AnalysisMetadata,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: SkillSection,
    #[serde(default)]
    pub languages: Vec<String>,
    /// Layout audit of the raw input, attached by the orchestrator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_audit: Option<LayoutReport>,
}

/// Final composite output: one identifier, two records.
///
/// `source` holds the facts and is always present when a run completes;
/// `enrichment` is advisory and may be absent when the enrichment service
/// failed. Callers may persist the halves separately — the shared `id` is
/// the linkage contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwinResult {
    pub id: Uuid,
    pub source: CvRecord,
    pub enrichment: Option<EnrichmentRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_extraction_response_deserializes() {
        let json = r#"{
            "full_name": "Juan Perez",
            "experience": [
                {"title": "Software Engineer", "company": "Acme Corp"}
            ]
        }"#;
        let record: CvRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_name, "Juan Perez");
        assert_eq!(record.experience.len(), 1);
        assert!(record.experience[0].start_date.is_none());
        assert_eq!(record.experience[0].date_provenance, DateProvenance::Model);
        assert!(record.skills.hard_skills.is_empty());
    }

    #[test]
    fn test_date_provenance_default_is_model() {
        assert_eq!(DateProvenance::default(), DateProvenance::Model);
    }

    #[test]
    fn test_recovered_provenance_round_trips() {
        let entry = ExperienceEntry {
            title: "Dev".into(),
            company: "Acme".into(),
            start_date: Some("2019".into()),
            end_date: Some("2022".into()),
            description: String::new(),
            skills_used: vec![],
            impact_metrics: vec![],
            date_provenance: DateProvenance::Recovered,
            date_confidence: Some(DateConfidence::High),
            original_date_line: Some("2019 - 2022".into()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"recovered\""));
        let back: ExperienceEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.date_provenance, DateProvenance::Recovered);
        assert_eq!(back.date_confidence, Some(DateConfidence::High));
    }
}
