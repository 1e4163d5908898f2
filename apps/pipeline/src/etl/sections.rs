//! Section segmentation: splits normalized text into labeled logical blocks.
//!
//! Heuristic, not semantic: short heading-like lines matched against a
//! closed ES/EN vocabulary open a new segment; everything else flows into
//! the current one. The output only bounds the context shown to the
//! extraction call — a creative résumé that defeats the heuristic degrades
//! to one `Unknown` segment, never an error.

use serde::{Deserialize, Serialize};

use crate::config::SectionVocabulary;

/// Heading lines longer than this are treated as prose, not headers.
const MAX_HEADING_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Summary,
    Experience,
    Education,
    Skills,
    Unknown,
}

/// A contiguous labeled span of the normalized text. Ordinals follow
/// document order; the heading line stays inside its own segment so that
/// joining all segment texts with `\n` reproduces the input exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub label: SectionLabel,
    pub text: String,
    pub ordinal: usize,
}

/// Splits normalized text into ordered labeled segments. Total function:
/// input with no recognizable headings yields a single `Unknown` segment.
pub fn segment(text: &str, vocabulary: &SectionVocabulary) -> Vec<Segment> {
    if text.is_empty() {
        return vec![Segment {
            label: SectionLabel::Unknown,
            text: String::new(),
            ordinal: 0,
        }];
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut segments: Vec<(SectionLabel, Vec<&str>)> = Vec::new();
    let mut current: (SectionLabel, Vec<&str>) = (SectionLabel::Unknown, Vec::new());
    let mut saw_heading = false;

    for line in lines {
        if let Some(label) = match_heading(line, vocabulary) {
            if saw_heading || !current.1.is_empty() {
                segments.push(current);
            }
            current = (label, vec![line]);
            saw_heading = true;
        } else {
            current.1.push(line);
        }
    }
    segments.push(current);

    segments
        .into_iter()
        .enumerate()
        .map(|(ordinal, (label, lines))| Segment {
            label,
            text: lines.join("\n"),
            ordinal,
        })
        .collect()
}

/// Matches a line against the heading vocabulary. A heading is short, and
/// either equals a vocabulary entry (optionally with a trailing colon) or
/// starts with one followed by more words ("Experiencia Profesional").
/// When several entries match the same line, the longest wins.
fn match_heading(line: &str, vocabulary: &SectionVocabulary) -> Option<SectionLabel> {
    let clean = line.trim().trim_end_matches(':').trim().to_lowercase();
    if clean.is_empty() || clean.split_whitespace().count() > MAX_HEADING_WORDS {
        return None;
    }

    let mut best: Option<(usize, SectionLabel)> = None;
    for (label, entries) in vocabulary.labeled_entries() {
        for entry in entries {
            let matches = clean == *entry
                || (clean.starts_with(entry.as_str())
                    && clean[entry.len()..].starts_with(' '));
            if matches {
                let len = entry.len();
                if best.map_or(true, |(best_len, _)| len > best_len) {
                    best = Some((len, label));
                }
            }
        }
    }
    best.map(|(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> SectionVocabulary {
        SectionVocabulary::default()
    }

    const CV: &str = "Juan Perez\njuan@example.com\nExperiencia\nDev at Acme\n2019 - 2022\nEducación\nBS Computer Science\nHabilidades\nPython, AWS";

    #[test]
    fn test_segments_follow_document_order() {
        let segments = segment(CV, &vocab());
        let labels: Vec<SectionLabel> = segments.iter().map(|s| s.label).collect();
        assert_eq!(
            labels,
            vec![
                SectionLabel::Unknown,
                SectionLabel::Experience,
                SectionLabel::Education,
                SectionLabel::Skills
            ]
        );
        for (i, s) in segments.iter().enumerate() {
            assert_eq!(s.ordinal, i);
        }
    }

    #[test]
    fn test_concatenation_reconstructs_input() {
        for text in [
            CV,
            "no headings at all\njust prose",
            "Experience\nfirst\nExperience\nsecond",
        ] {
            let segments = segment(text, &vocab());
            let joined: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
            assert_eq!(joined.join("\n"), text);
        }
    }

    #[test]
    fn test_preamble_is_unknown() {
        let segments = segment(CV, &vocab());
        assert_eq!(segments[0].label, SectionLabel::Unknown);
        assert!(segments[0].text.contains("Juan Perez"));
    }

    #[test]
    fn test_no_headings_degrades_to_single_unknown_segment() {
        let text = "completely freeform text\nwith no structure whatsoever";
        let segments = segment(text, &vocab());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, SectionLabel::Unknown);
        assert_eq!(segments[0].text, text);
    }

    #[test]
    fn test_heading_with_colon_and_extra_words() {
        let segments = segment("Experiencia Profesional:\nDev at Acme", &vocab());
        assert_eq!(segments[0].label, SectionLabel::Experience);
    }

    #[test]
    fn test_long_sentence_mentioning_section_is_not_heading() {
        let text = "Summary\nMy experience in Java spans many years and several employers overall";
        let segments = segment(text, &vocab());
        // The prose line stays inside the summary segment.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].label, SectionLabel::Summary);
    }

    #[test]
    fn test_longest_vocabulary_match_wins() {
        // "historial laboral" must resolve as experience even though
        // shorter entries could also prefix-match.
        let segments = segment("Historial Laboral\nDev", &vocab());
        assert_eq!(segments[0].label, SectionLabel::Experience);
    }

    #[test]
    fn test_empty_input_yields_one_empty_unknown() {
        let segments = segment("", &vocab());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "");
    }
}
