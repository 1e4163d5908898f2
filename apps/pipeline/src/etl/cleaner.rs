//! Text normalization: chaotic copy-paste input to a stable canonical form.
//!
//! The whole pass is total and idempotent — `normalize(normalize(x)) ==
//! normalize(x)` — because every downstream stage (triage, segmentation,
//! date recovery) keys off this output and must see the same text the
//! extraction service sees.

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Fancy designer bullets collapsed to a standard ASCII dash.
    static ref RE_BULLETS: Regex =
        Regex::new(r"[\u{2022}\u{2023}\u{25E6}\u{2043}\u{2219}\u{2212}\u{25AA}\u{25CF}\u{25A0}\u{25C6}\u{27A2}\u{27A4}\u{25B6}\u{25BA}]").unwrap();
    /// Asterisk/plus list markers at line start.
    static ref RE_ASCII_BULLET: Regex = Regex::new(r"(?m)^\s*[*+] ").unwrap();
    /// Horizontal whitespace runs.
    static ref RE_HSPACE: Regex = Regex::new(r"[ \t]+").unwrap();
    /// Paragraph breaks standardized to exactly one blank line.
    static ref RE_VSPACE: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Emoji and pictograph ranges. ATS-hostile and semantically empty, so the
/// normalizer drops them and the layout auditor counts them.
pub fn is_emoji(c: char) -> bool {
    matches!(c,
        '\u{1F300}'..='\u{1FAFF}'
        | '\u{1F1E6}'..='\u{1F1FF}'
        | '\u{2600}'..='\u{26FF}'
        | '\u{2700}'..='\u{27BF}'
        | '\u{FE00}'..='\u{FE0F}'
        | '\u{2B00}'..='\u{2BFF}'
    )
}

/// Box-drawing and block-element glyphs, typical residue of ASCII-art
/// layouts and table borders.
pub fn is_box_drawing(c: char) -> bool {
    matches!(c, '\u{2500}'..='\u{259F}')
}

/// Normalizes raw résumé text. Total function: never fails, empty in means
/// empty out.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    // Unicode canonical form first so the regex stages see one
    // representation per character.
    let text: String = text.nfkc().collect();

    let text = RE_BULLETS.replace_all(&text, "-");
    let text = RE_ASCII_BULLET.replace_all(&text, "- ");

    // Decorative glyphs carry no meaning for extraction; U+FFFD is an
    // encoding casualty.
    let text: String = text
        .chars()
        .filter(|&c| !is_emoji(c) && !is_box_drawing(c) && c != '\u{FFFD}')
        .collect();

    let text = RE_HSPACE.replace_all(&text, " ");
    // Newlines are preserved: they carry the document structure the
    // segmenter depends on.
    let text = RE_VSPACE.replace_all(&text, "\n\n");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "Juan Perez\n\n\n  Experiencia  \n• Dev @ Acme\t2019",
            "➤ item one\n* item two\n+ item three",
            "Hello 🚀 world \u{FFFD} done",
            "",
            "   \n\n\t\n   ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_bullets_standardized_to_dash() {
        let text = "• First\n‣ Second\n➤ Third\n* Fourth";
        let clean = normalize(text);
        assert_eq!(clean, "- First\n- Second\n- Third\n- Fourth");
    }

    #[test]
    fn test_emoji_and_box_drawing_stripped() {
        let clean = normalize("Developer 🚀🔥\n│ sidebar │");
        assert!(!clean.contains('🚀'));
        assert!(!clean.contains('│'));
    }

    #[test]
    fn test_whitespace_collapsed_but_newlines_kept() {
        let clean = normalize("Name    Surname\n\n\n\nNext   paragraph");
        assert_eq!(clean, "Name Surname\n\nNext paragraph");
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_nfkc_applied() {
        // Fullwidth letters decompose to ASCII under NFKC.
        assert_eq!(normalize("ＡＢＣ"), "ABC");
    }
}
