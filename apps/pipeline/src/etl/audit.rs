//! Layout audit: how machine-parsable is the raw text?
//!
//! Weighted penalty model starting at 100. The score is advisory — it is
//! computed before triage so even rejected input carries a quality signal,
//! but the triage verdict never depends on it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::LayoutWeights;
use crate::etl::cleaner::is_emoji;

lazy_static! {
    /// Non-standard bullet glyphs that typically break ATS parsers.
    static ref RE_WEIRD_BULLETS: Regex =
        Regex::new(r"[\u{27A4}\u{27A2}\u{2794}\u{279C}\u{21D2}\u{25BA}\u{25CF}\u{25A0}\u{25C6}\u{25AA}\u{25AB}]").unwrap();
    /// Interior runs of three or more spaces: residue of columnar layouts
    /// flattened to plain text.
    static ref RE_COLUMN_GAP: Regex = Regex::new(r"\S {3,}\S").unwrap();
}

const EXPERIENCE_MARKERS: &[&str] = &[
    "experiencia",
    "experience",
    "historial",
    "career",
    "trayectoria",
];
const EDUCATION_MARKERS: &[&str] = &["educaci", "education", "formacion", "académic", "academic"];
const SKILL_MARKERS: &[&str] = &["skill", "habilidad", "competencia", "tecnolog", "stack"];

/// A single detected defect. `tag` is a stable machine-readable identifier;
/// `detail` is the human-readable explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutIssue {
    pub tag: String,
    pub detail: String,
}

/// Structural parseability report for one raw input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutReport {
    /// 0..=100, higher is cleaner.
    pub score: u8,
    /// Defects in detection order.
    pub issues: Vec<LayoutIssue>,
    pub missing_sections: Vec<String>,
    pub parsable: bool,
}

/// Audits raw (pre-normalization) text. Never fails; pathological input
/// simply bottoms out at score 0.
pub fn audit(text: &str, weights: &LayoutWeights) -> LayoutReport {
    let mut issues = Vec::new();
    let mut missing_sections = Vec::new();
    let mut penalty: u32 = 0;

    // Emoji density. Dingbat bullets are excluded here: they already carry
    // the flat bullet penalty below.
    let emoji_count = text
        .chars()
        .filter(|&c| is_emoji(c) && !is_bullet_glyph(c))
        .count() as u32;
    if emoji_count > 0 {
        issues.push(LayoutIssue {
            tag: "emoji-found".into(),
            detail: format!("Found {emoji_count} emoji/icons; ATS systems cannot read these."),
        });
        penalty += emoji_count * weights.emoji_penalty;
    }

    // Decorative bullet glyph density.
    let weird_bullets = RE_WEIRD_BULLETS.find_iter(text).count();
    if weird_bullets > weights.bullet_threshold {
        issues.push(LayoutIssue {
            tag: "decorative-bullets".into(),
            detail: format!(
                "Excessive non-standard bullet glyphs ({weird_bullets}); use a plain dash."
            ),
        });
        penalty += weights.bullet_penalty;
    }

    // Multi-column artifacts: wide interior space runs across many lines,
    // corroborated by irregular line lengths.
    if detect_multi_column(text, weights.multicolumn_ratio) {
        issues.push(LayoutIssue {
            tag: "multi-column-artifact".into(),
            detail: "Line structure suggests a flattened multi-column layout.".into(),
        });
        penalty += weights.multicolumn_penalty;
    }

    // Missing standard section headers.
    let lower = text.to_lowercase();
    let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));
    if !has(EXPERIENCE_MARKERS) {
        missing_sections.push("experience".into());
        issues.push(missing_issue("experience"));
        penalty += weights.missing_experience_penalty;
    }
    if !has(EDUCATION_MARKERS) {
        missing_sections.push("education".into());
        issues.push(missing_issue("education"));
        penalty += weights.missing_education_penalty;
    }
    if !has(SKILL_MARKERS) {
        missing_sections.push("skills".into());
        issues.push(missing_issue("skills"));
        penalty += weights.missing_skills_penalty;
    }

    let score = 100u32.saturating_sub(penalty) as u8;
    LayoutReport {
        score,
        issues,
        missing_sections,
        parsable: score > 40,
    }
}

/// The glyphs `RE_WEIRD_BULLETS` matches. `is_emoji`'s dingbat range
/// overlaps them, so the emoji count must skip these to keep the two
/// penalties disjoint.
fn is_bullet_glyph(c: char) -> bool {
    matches!(
        c,
        '\u{27A4}'
            | '\u{27A2}'
            | '\u{2794}'
            | '\u{279C}'
            | '\u{21D2}'
            | '\u{25BA}'
            | '\u{25CF}'
            | '\u{25A0}'
            | '\u{25C6}'
            | '\u{25AA}'
            | '\u{25AB}'
    )
}

fn missing_issue(section: &str) -> LayoutIssue {
    LayoutIssue {
        tag: format!("missing-section:{section}"),
        detail: format!("No recognizable {section} header found."),
    }
}

fn detect_multi_column(text: &str, ratio_threshold: f32) -> bool {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 6 {
        return false;
    }
    let gapped = lines
        .iter()
        .filter(|l| RE_COLUMN_GAP.is_match(l))
        .count();
    let ratio = gapped as f32 / lines.len() as f32;
    if ratio > ratio_threshold {
        return true;
    }

    // Secondary signal: wildly irregular line lengths without explicit gap
    // runs, typical of interleaved column reads.
    let lengths: Vec<f32> = lines.iter().map(|l| l.chars().count() as f32).collect();
    let mean = lengths.iter().sum::<f32>() / lengths.len() as f32;
    if mean <= 0.0 {
        return false;
    }
    let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f32>() / lengths.len() as f32;
    variance.sqrt() / mean > 0.9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights() -> LayoutWeights {
        LayoutWeights::default()
    }

    const CLEAN_CV: &str = "Juan Perez\nExperience\nDeveloper at Acme\nSkills\nJava\nEducation\nBS Computer Science";

    #[test]
    fn test_clean_cv_scores_100() {
        let report = audit(CLEAN_CV, &weights());
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert!(report.parsable);
    }

    #[test]
    fn test_emoji_penalized_per_occurrence() {
        let text = format!("{CLEAN_CV}\nDeveloper 🚀🔥");
        let report = audit(&text, &weights());
        assert_eq!(report.score, 96);
        assert_eq!(report.issues[0].tag, "emoji-found");
    }

    #[test]
    fn test_weird_bullets_flat_penalty() {
        let text = format!("{CLEAN_CV}\n➤ a\n➤ b\n➤ c\n➤ d\n➤ e\n➤ f");
        let report = audit(&text, &weights());
        assert!(report.issues.iter().any(|i| i.tag == "decorative-bullets"));
        assert_eq!(report.score, 90);
    }

    #[test]
    fn test_dingbat_bullets_not_double_counted_as_emoji() {
        // ➤ sits in the Unicode dingbat block; it must cost only the flat
        // bullet penalty, never the per-glyph emoji penalty on top.
        let text = format!("{CLEAN_CV}\n➤ a\n➤ b\n➤ c\n➤ d\n➤ e\n➤ f");
        let report = audit(&text, &weights());
        assert!(!report.issues.iter().any(|i| i.tag == "emoji-found"));
        assert_eq!(report.score, 90);
    }

    #[test]
    fn test_missing_sections_penalized() {
        let report = audit("Just a name and nothing else.", &weights());
        assert_eq!(report.missing_sections.len(), 3);
        assert_eq!(report.score, 60);
    }

    #[test]
    fn test_score_never_negative() {
        let mut text = String::from("no sections here at all.");
        for _ in 0..60 {
            text.push('🚀');
        }
        let report = audit(&text, &weights());
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_multi_column_artifact_detected() {
        let text = "Experience          Education\nAcme Corp           MIT\nDeveloper           BS CS\n2019 - 2022         2015\nSkills              Languages\nPython              Spanish\nAWS and cloud infrastructure work across three teams";
        let report = audit(text, &weights());
        assert!(report
            .issues
            .iter()
            .any(|i| i.tag == "multi-column-artifact"));
    }

    #[test]
    fn test_score_bounds_hold_for_arbitrary_input() {
        for text in ["", "a", CLEAN_CV, "🚀🚀🚀", "\n\n\n"] {
            let report = audit(text, &weights());
            assert!(report.score <= 100);
        }
    }
}
