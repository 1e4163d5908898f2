//! Date pattern detection and normalization (ES/EN).
//!
//! Everything temporal funnels through here: the pre-extraction scan that
//! maps line numbers to date hints, and the normalizer that turns chaotic
//! human formats ("Enero 2022", "03/2019", "2020 - Present") into
//! `YYYY-MM`, `YYYY`, or `Present`.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::DateConfidence;

lazy_static! {
    /// "Enero 2022 - Presente", "Jan 2020 - Dec 2021".
    static ref RE_FULL_RANGE: Regex = Regex::new(
        r"(?i)([a-záéíóú]{3,10})\.?\s*(\d{4})\s*[-\u{2013}\u{2014}]\s*(present|presente|actualidad|current|now|[a-záéíóú]{3,10})\.?\s*(\d{4})?"
    )
    .unwrap();
    /// "2022 - 2024", "2022 - Present".
    static ref RE_YEAR_RANGE: Regex = Regex::new(
        r"(?i)(\d{4})\s*[-\u{2013}\u{2014}]\s*(present|presente|actualidad|current|now|\d{4})"
    )
    .unwrap();
    /// Standalone "Marzo 2019".
    static ref RE_SINGLE_DATE: Regex =
        Regex::new(r"(?i)([a-záéíóú]{3,10})\.?\s*(\d{4})").unwrap();
    /// Loose month-or-number plus year, used by range extraction.
    static ref RE_ANY_DATE: Regex =
        Regex::new(r"(?i)([a-záéíóú]{3,10}|\d{1,2})?[ \-/]*(\d{4})").unwrap();
    static ref RE_MM_YYYY: Regex = Regex::new(r"(\d{1,2})[/\-](\d{4})").unwrap();
    static ref RE_YYYY_MM: Regex = Regex::new(r"(\d{4})[/\-](\d{1,2})").unwrap();
    static ref RE_YEAR_ONLY: Regex = Regex::new(r"\d{4}").unwrap();
}

const PRESENT_MARKERS: &[&str] = &["present", "presente", "actualidad", "ahora", "current", "now"];

/// An extracted date range with a confidence level, keyed to the line it
/// came from so recovery can match it back to an entry by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateHint {
    pub start: Option<String>,
    pub end: Option<String>,
    pub confidence: DateConfidence,
    /// Original line, kept for user review of low-confidence fills.
    pub raw_line: String,
}

/// Scans every line for date patterns. Returns only lines where a start
/// date was found, keyed by zero-based line number in document order.
pub fn scan_dates(text: &str) -> BTreeMap<usize, DateHint> {
    let mut hints = BTreeMap::new();
    for (line_num, line) in text.split('\n').enumerate() {
        if let Some(hint) = extract_from_line(line) {
            hints.insert(line_num, hint);
        }
    }
    hints
}

/// Tries the patterns in descending order of confidence.
fn extract_from_line(line: &str) -> Option<DateHint> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    // Full month-year range.
    if let Some(caps) = RE_FULL_RANGE.captures(line) {
        let start = normalize(&format!("{} {}", &caps[1], &caps[2]));
        let end = match caps.get(4) {
            Some(year) => normalize(&format!("{} {}", &caps[3], year.as_str())),
            None => normalize(&caps[3]),
        };
        return Some(DateHint {
            start: Some(start),
            end: Some(end),
            confidence: DateConfidence::High,
            raw_line: line.to_string(),
        });
    }

    // Bare year range.
    if let Some(caps) = RE_YEAR_RANGE.captures(line) {
        return Some(DateHint {
            start: Some(caps[1].to_string()),
            end: Some(normalize(&caps[2])),
            confidence: DateConfidence::High,
            raw_line: line.to_string(),
        });
    }

    // Single month-year.
    if let Some(caps) = RE_SINGLE_DATE.captures(line) {
        if month_number(&caps[1]).is_some() {
            return Some(DateHint {
                start: Some(normalize(&format!("{} {}", &caps[1], &caps[2]))),
                end: None,
                confidence: DateConfidence::Medium,
                raw_line: line.to_string(),
            });
        }
    }

    // Last resort: any year at all.
    if RE_YEAR_ONLY.is_match(line) {
        let (start, end) = extract_range(line);
        if start.is_some() {
            return Some(DateHint {
                start,
                end,
                confidence: DateConfidence::Low,
                raw_line: line.to_string(),
            });
        }
    }

    None
}

/// Normalizes one date segment to `YYYY-MM`, `YYYY`, or `Present`. Returns
/// the input unchanged when nothing matches, to avoid data loss.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let clean = raw.to_lowercase();
    let clean = clean.trim();

    if PRESENT_MARKERS.iter().any(|m| clean.contains(m)) {
        return "Present".to_string();
    }

    if let Some(caps) = RE_MM_YYYY.captures(clean) {
        let month: u32 = caps[1].parse().unwrap_or(0);
        if (1..=12).contains(&month) {
            return format!("{}-{:02}", &caps[2], month);
        }
    }
    if let Some(caps) = RE_YYYY_MM.captures(clean) {
        let month: u32 = caps[2].parse().unwrap_or(0);
        if (1..=12).contains(&month) {
            return format!("{}-{:02}", &caps[1], month);
        }
    }

    if let Some(caps) = RE_ANY_DATE.captures(clean) {
        let year = caps[2].to_string();
        if let Some(part) = caps.get(1) {
            let key = part.as_str().trim_end_matches('.');
            if let Some(month) = month_number(key) {
                return format!("{year}-{month}");
            }
            if let Ok(m) = key.parse::<u32>() {
                if (1..=12).contains(&m) {
                    return format!("{year}-{m:02}");
                }
            }
        }
        return year;
    }

    raw.to_string()
}

/// Splits "Mar 2023 - Ago 2025" into two normalized dates.
pub fn extract_range(text: &str) -> (Option<String>, Option<String>) {
    let matches: Vec<regex::Match> = RE_ANY_DATE.find_iter(text).collect();

    match matches.len() {
        0 => (None, None),
        1 => {
            let start = normalize(matches[0].as_str());
            let lower = text.to_lowercase();
            let end = PRESENT_MARKERS
                .iter()
                .any(|m| lower.contains(m))
                .then(|| "Present".to_string());
            (Some(start), end)
        }
        _ => {
            let start = normalize(matches[0].as_str());
            let tail = text[matches[0].end()..].to_lowercase();
            let end = if PRESENT_MARKERS.iter().any(|m| tail.contains(m)) {
                "Present".to_string()
            } else {
                normalize(matches[1].as_str())
            };
            (Some(start), Some(end))
        }
    }
}

/// ES/EN month name (full or abbreviated) to a zero-padded month number.
fn month_number(name: &str) -> Option<&'static str> {
    let key = name.to_lowercase();
    let month = match key.as_str() {
        "ene" | "enero" | "jan" | "january" => "01",
        "feb" | "febrero" | "february" => "02",
        "mar" | "marzo" | "march" => "03",
        "abr" | "abril" | "apr" | "april" => "04",
        "may" | "mayo" => "05",
        "jun" | "junio" | "june" => "06",
        "jul" | "julio" | "july" => "07",
        "ago" | "agosto" | "aug" | "august" => "08",
        "sep" | "septiembre" | "september" => "09",
        "oct" | "octubre" | "october" => "10",
        "nov" | "noviembre" | "november" => "11",
        "dic" | "diciembre" | "dec" | "december" => "12",
        _ => return None,
    };
    Some(month)
}
