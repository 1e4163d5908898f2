//! Triage: admission control in front of the expensive extraction call.
//!
//! Cheap, deterministic checks only — keyword density, a stopword-based
//! language guess, and opportunistic name/email hints for indexing. A
//! rejection here is terminal for the run: no external service is invoked
//! afterwards.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;

lazy_static! {
    static ref RE_EMAIL: Regex = Regex::new(r"[\w.\-+]+@[\w\-]+(?:\.[\w\-]+)+").unwrap();
    static ref RE_WORD: Regex = Regex::new(r"[\p{L}]+").unwrap();
    static ref RE_YEAR: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
}

/// Mixed ES/EN domain vocabulary: section headers, job titles, institution
/// markers. Two hits (a year pattern counts as one) make the document
/// plausibly a résumé.
const CV_KEYWORDS: &[&str] = &[
    // Section headers
    "experiencia",
    "educación",
    "education",
    "experience",
    "skills",
    "habilidades",
    "resumé",
    "curriculum",
    "cv",
    "perfil",
    "profile",
    "laboral",
    "professional",
    "academy",
    // Job titles
    "engineer",
    "developer",
    "manager",
    "analyst",
    "consultant",
    "ingenier",
    "desarrollador",
    "gerente",
    "analista",
    // Institution markers
    "university",
    "universidad",
    "institute",
    "instituto",
];

/// Banner lines that are not names even though they sit on top.
const GENERIC_TITLES: &[&str] = &["curriculum vitae", "resume", "resumé", "cv", "hoja de vida", "curriculum"];

const ES_STOPWORDS: &[&str] = &[
    "de", "la", "el", "en", "y", "que", "los", "las", "con", "para", "por", "una", "del", "como",
];
const EN_STOPWORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "with", "for", "on", "at", "is", "as", "from",
];

/// Outcome of the admission check. `Rejected` is a valid terminal state,
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum TriageVerdict {
    Accepted {
        language: String,
        name_hint: Option<String>,
        email_hint: Option<String>,
    },
    Rejected {
        reason: String,
    },
}

impl TriageVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TriageVerdict::Accepted { .. })
    }
}

/// Classifies normalized text. Deterministic: identical input yields an
/// identical verdict.
pub fn triage(text: &str, config: &PipelineConfig) -> TriageVerdict {
    let char_count = text.chars().count();
    if char_count < config.hard_min_chars {
        return TriageVerdict::Rejected {
            reason: format!(
                "input too short ({char_count} chars, minimum {})",
                config.hard_min_chars
            ),
        };
    }

    let matches = keyword_matches(text);
    if matches < config.min_keyword_matches {
        // Borderline-length input only survives when keyword-dense, and it
        // is not; favor the more specific reason.
        if char_count < config.min_viable_chars {
            return TriageVerdict::Rejected {
                reason: format!(
                    "input too short ({char_count} chars) and not recognizably a résumé"
                ),
            };
        }
        return TriageVerdict::Rejected {
            reason: format!(
                "not a résumé: {matches} of {} required section keywords found",
                config.min_keyword_matches
            ),
        };
    }

    let language = detect_language(text);
    let (name_hint, email_hint) = fast_extract_meta(text);

    TriageVerdict::Accepted {
        language,
        name_hint,
        email_hint,
    }
}

fn keyword_matches(text: &str) -> usize {
    let lower = text.to_lowercase();
    let keyword_hits = CV_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    // A plausible year is a weak but real résumé signal.
    let date_hit = usize::from(RE_YEAR.is_match(text));
    keyword_hits + date_hit
}

/// Stopword-frequency language guess over ES/EN. Short keyword-dense input
/// with no stopwords at all comes back as `unknown`; the orchestrator maps
/// that to the configured default.
pub fn detect_language(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut es = 0usize;
    let mut en = 0usize;
    for word in RE_WORD.find_iter(&lower) {
        let w = word.as_str();
        if ES_STOPWORDS.contains(&w) {
            es += 1;
        }
        if EN_STOPWORDS.contains(&w) {
            en += 1;
        }
    }
    if es == 0 && en == 0 {
        "unknown".to_string()
    } else if es >= en {
        "es".to_string()
    } else {
        "en".to_string()
    }
}

/// Regex-level identity hints. Both optional: triage never requires them.
fn fast_extract_meta(text: &str) -> (Option<String>, Option<String>) {
    let email = RE_EMAIL.find(text).map(|m| m.as_str().to_string());

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut name = lines
        .first()
        .filter(|l| l.split_whitespace().count() < 6)
        .map(|l| l.to_string());

    // If the first line is a generic banner, the name is usually next.
    if let Some(candidate) = &name {
        let normalized = candidate.to_lowercase().replace('.', "");
        if GENERIC_TITLES.contains(&normalized.as_str()) {
            name = lines
                .get(1)
                .filter(|l| l.split_whitespace().count() < 6)
                .map(|l| l.to_string());
        }
    }

    (name, email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_valid_cv_accepted() {
        let text = "Juan Perez\nExperience\nSenior Developer at Google.\nSkills\nPython, Java.";
        assert!(triage(text, &config()).is_accepted());
    }

    #[test]
    fn test_random_note_rejected() {
        let text = "This is just a random note about grocery shopping. Milk, eggs, bread.";
        let verdict = triage(text, &config());
        assert!(!verdict.is_accepted());
    }

    #[test]
    fn test_short_garbage_rejected() {
        let verdict = triage("lorem ipsum dolor sit amet", &config());
        match verdict {
            TriageVerdict::Rejected { reason } => {
                assert!(reason.contains("résumé") || reason.contains("short"))
            }
            _ => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_borderline_length_but_keyword_dense_passes() {
        // Below min_viable_chars but clearly résumé-shaped: favor accept.
        let text = "CV\nExperiencia\nSkills";
        assert!(text.chars().count() < config().min_viable_chars);
        assert!(triage(text, &config()).is_accepted());
    }

    #[test]
    fn test_single_line_with_title_and_dates_accepted() {
        // No section headers at all, but a job title plus a date range is
        // enough signal.
        let text = "Juan Perez, Software Engineer, Acme Corp 2019-2022, Python, AWS";
        assert!(triage(text, &config()).is_accepted());
    }

    #[test]
    fn test_triage_is_deterministic() {
        let text = "Juan Perez\nExperiencia\nDev\nHabilidades\nPython";
        let first = triage(text, &config());
        for _ in 0..5 {
            assert_eq!(triage(text, &config()), first);
        }
    }

    #[test]
    fn test_detect_language_es() {
        let text = "Hola, esto es un texto en español para probar la detección de idioma.";
        assert_eq!(detect_language(text), "es");
    }

    #[test]
    fn test_detect_language_en() {
        let text = "Hello, this is an English text used for testing the language detection.";
        assert_eq!(detect_language(text), "en");
    }

    #[test]
    fn test_meta_extraction_skips_generic_banner() {
        let text = "Curriculum Vitae\nMaria Gonzalez\nEmail: maria.gonzalez@example.com\n\nExperiencia en desarrollo";
        let verdict = triage(text, &config());
        match verdict {
            TriageVerdict::Accepted {
                name_hint,
                email_hint,
                ..
            } => {
                assert_eq!(name_hint.as_deref(), Some("Maria Gonzalez"));
                assert_eq!(email_hint.as_deref(), Some("maria.gonzalez@example.com"));
            }
            TriageVerdict::Rejected { reason } => panic!("unexpected rejection: {reason}"),
        }
    }
}
