//! Deterministic temporal statistics over the extracted experience list.
//!
//! Computed locally (no model involved) and shipped with the enrichment
//! request so the advisory service reasons over real numbers instead of
//! re-deriving dates from text. Also sorts the experience list so the most
//! recent role leads.

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::etl::dates;
use crate::models::{CvRecord, ExperienceEntry};

/// Anything beyond this between consecutive roles counts as a gap.
const GAP_THRESHOLD_MONTHS: i32 = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineStats {
    pub total_years_experience: f64,
    pub avg_tenure_months: i32,
    pub detected_gaps: Vec<String>,
    pub job_hopping_risk: bool,
    /// 1..=10, heuristic: gaps and short tenures pull it down.
    pub stability_score: u8,
}

/// Computes tenure and gap statistics. Entries without a parseable start
/// date are ignored; an empty list yields zeroed stats.
pub fn analyze(record: &CvRecord) -> TimelineStats {
    analyze_at(record, Utc::now().date_naive())
}

/// `today` is injected so tests are stable across wall-clock time.
fn analyze_at(record: &CvRecord, today: NaiveDate) -> TimelineStats {
    let mut dated: Vec<(NaiveDate, NaiveDate)> = record
        .experience
        .iter()
        .filter_map(|exp| {
            let start = parse_date(exp.start_date.as_deref()?)?;
            let end = end_date(exp.end_date.as_deref(), today);
            Some((start, end))
        })
        .collect();

    if dated.is_empty() {
        return TimelineStats {
            stability_score: 1,
            ..TimelineStats::default()
        };
    }
    dated.sort_by_key(|(start, _)| *start);

    // Overall span: first start to last end.
    let first_start = dated[0].0;
    let last_end = dated.iter().map(|(_, end)| *end).max().unwrap_or(today);
    let total_months = months_between(first_start, last_end).max(0);
    let total_years = (f64::from(total_months) / 12.0 * 10.0).round() / 10.0;

    // Per-role tenure and inter-role gaps.
    let mut total_role_months = 0i32;
    let mut gaps = Vec::new();
    let mut last_role_end: Option<NaiveDate> = None;

    for (start, end) in &dated {
        if let Some(prev_end) = last_role_end {
            if *start > prev_end {
                let gap = months_between(prev_end, *start);
                if gap > GAP_THRESHOLD_MONTHS {
                    gaps.push(format!(
                        "Gap detected: {} – {} ({gap} months)",
                        prev_end.format("%b %Y"),
                        start.format("%b %Y"),
                    ));
                }
            }
        }
        if last_role_end.map_or(true, |prev| *end > prev) {
            last_role_end = Some(*end);
        }
        total_role_months += months_between(*start, *end).max(1);
    }

    let role_count = dated.len() as i32;
    let avg_tenure_months = total_role_months / role_count;
    let job_hopping_risk = avg_tenure_months < 12 && role_count > 2;

    let mut score: i32 = 10;
    if job_hopping_risk {
        score -= 3;
    }
    score -= gaps.len() as i32 * 2;

    TimelineStats {
        total_years_experience: total_years,
        avg_tenure_months,
        detected_gaps: gaps,
        job_hopping_risk,
        stability_score: score.clamp(1, 10) as u8,
    }
}

/// Sorts experience latest-first: primary key the end date (`Present`
/// counts as today), secondary the start date.
pub fn sort_reverse_chronological(record: &mut CvRecord) {
    let today = Utc::now().date_naive();
    record.experience.sort_by_key(|exp| {
        let key = sort_key(exp, today);
        std::cmp::Reverse(key)
    });
}

fn sort_key(exp: &ExperienceEntry, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = exp
        .start_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(NaiveDate::MIN);
    let end = end_date(exp.end_date.as_deref(), today);
    (end, start)
}

fn months_between(a: NaiveDate, b: NaiveDate) -> i32 {
    (b.year() - a.year()) * 12 + (b.month() as i32 - a.month() as i32)
}

/// Parses a (possibly un-normalized) date string to the first of its month.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let normalized = dates::normalize(raw);
    if normalized == "Present" {
        return None;
    }
    if normalized.len() == 7 {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{normalized}-01"), "%Y-%m-%d") {
            return Some(d);
        }
    }
    if normalized.len() == 4 {
        if let Ok(year) = normalized.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    None
}

/// `Present`, missing, or unparseable end dates resolve to today.
fn end_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    match raw {
        None => today,
        Some(s) => {
            if dates::normalize(s) == "Present" {
                today
            } else {
                parse_date(s).unwrap_or(today)
            }
        }
    }
}
