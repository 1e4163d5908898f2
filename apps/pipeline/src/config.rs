//! Pipeline configuration.
//!
//! One value assembled at startup (defaults + environment overrides) and
//! passed by reference into each run. Read-only for the run's duration, so
//! concurrent runs can carry different settings and tests can inject
//! fixtures without touching process state.

use anyhow::{Context, Result};

use crate::etl::sections::SectionLabel;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Character ceiling for the text sent to extraction. Oversized input
    /// is cut to exactly this many characters and flagged, never rejected.
    pub max_input_chars: usize,
    /// Inputs shorter than this are rejected outright.
    pub hard_min_chars: usize,
    /// Below this, input passes triage only when keyword-dense.
    pub min_viable_chars: usize,
    /// Résumé vocabulary hits required by the triage classifier.
    pub min_keyword_matches: usize,
    /// Language used when detection comes back `unknown`.
    pub default_language: String,
    /// Retry attempts per external call.
    pub retry_max_attempts: u32,
    /// Base backoff between retries, doubled per attempt.
    pub retry_base_backoff_ms: u64,
    pub layout: LayoutWeights,
    pub vocabulary: SectionVocabulary,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 32_000,
            hard_min_chars: 20,
            min_viable_chars: 50,
            min_keyword_matches: 2,
            default_language: "es".to_string(),
            retry_max_attempts: 3,
            retry_base_backoff_ms: 1000,
            layout: LayoutWeights::default(),
            vocabulary: SectionVocabulary::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads environment overrides on top of the defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = optional_env("PIPELINE_MAX_INPUT_CHARS")? {
            config.max_input_chars = v;
        }
        if let Some(v) = optional_env("PIPELINE_MIN_VIABLE_CHARS")? {
            config.min_viable_chars = v;
        }
        if let Some(v) = optional_env("PIPELINE_RETRY_MAX_ATTEMPTS")? {
            config.retry_max_attempts = v;
        }
        if let Some(v) = optional_env("PIPELINE_RETRY_BASE_BACKOFF_MS")? {
            config.retry_base_backoff_ms = v;
        }
        if let Ok(lang) = std::env::var("PIPELINE_DEFAULT_LANGUAGE") {
            config.default_language = lang;
        }
        Ok(config)
    }
}

/// Penalty weights for the layout audit.
#[derive(Debug, Clone)]
pub struct LayoutWeights {
    pub emoji_penalty: u32,
    pub bullet_threshold: usize,
    pub bullet_penalty: u32,
    pub multicolumn_ratio: f32,
    pub multicolumn_penalty: u32,
    pub missing_experience_penalty: u32,
    pub missing_education_penalty: u32,
    pub missing_skills_penalty: u32,
}

impl Default for LayoutWeights {
    fn default() -> Self {
        Self {
            emoji_penalty: 2,
            bullet_threshold: 5,
            bullet_penalty: 10,
            multicolumn_ratio: 0.25,
            multicolumn_penalty: 15,
            missing_experience_penalty: 20,
            missing_education_penalty: 10,
            missing_skills_penalty: 10,
        }
    }
}

/// Section-heading vocabulary (ES/EN), lowercase. The segmenter matches
/// candidate heading lines against these entries.
#[derive(Debug, Clone)]
pub struct SectionVocabulary {
    pub summary: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    pub skills: Vec<String>,
}

impl SectionVocabulary {
    pub fn labeled_entries(&self) -> [(SectionLabel, &[String]); 4] {
        [
            (SectionLabel::Summary, self.summary.as_slice()),
            (SectionLabel::Experience, self.experience.as_slice()),
            (SectionLabel::Education, self.education.as_slice()),
            (SectionLabel::Skills, self.skills.as_slice()),
        ]
    }
}

impl Default for SectionVocabulary {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            summary: owned(&[
                "resumen",
                "perfil",
                "perfil profesional",
                "profile",
                "summary",
                "professional summary",
                "objetivo",
                "about me",
                "sobre mí",
                "sobre mi",
            ]),
            experience: owned(&[
                "experiencia",
                "experiencia laboral",
                "experiencia profesional",
                "experience",
                "work experience",
                "professional experience",
                "historial laboral",
                "work history",
                "trayectoria",
            ]),
            education: owned(&[
                "educación",
                "educacion",
                "education",
                "formación",
                "formacion",
                "formación académica",
                "estudios",
                "academic background",
            ]),
            skills: owned(&[
                "habilidades",
                "skills",
                "technical skills",
                "competencias",
                "tecnologías",
                "tecnologias",
                "conocimientos",
                "tech stack",
            ]),
        }
    }
}

fn optional_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => {
            let parsed = raw
                .parse::<T>()
                .with_context(|| format!("'{key}' has an invalid value: {raw}"))?;
            Ok(Some(parsed))
        }
        Err(_) => Ok(None),
    }
}

/// Credentials and endpoints for the two external services. Separate from
/// `PipelineConfig` because the pipeline core never reads these — only
/// `main` does, to build the live clients.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_key: String,
    pub extraction_model: String,
    pub enrichment_model: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Self {
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            api_key: require_env("OPENAI_API_KEY")?,
            extraction_model: std::env::var("MODEL_EXTRACTION")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            enrichment_model: std::env::var("MODEL_ENRICHMENT")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_ordered() {
        let config = PipelineConfig::default();
        assert!(config.hard_min_chars < config.min_viable_chars);
        assert!(config.min_viable_chars < config.max_input_chars);
        assert!(config.retry_max_attempts >= 1);
    }

    #[test]
    fn test_vocabulary_covers_all_labeled_sections() {
        let vocab = SectionVocabulary::default();
        for (_, entries) in vocab.labeled_entries() {
            assert!(!entries.is_empty());
        }
    }
}
