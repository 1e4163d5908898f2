//! Date recovery: post-extraction repair pass for missing dates.
//!
//! Works only on entries whose dates came back empty. Two passes:
//! proximity (find the entry's title/company line, take a date hint from
//! that line or the next two) and, for whatever is still unmatched, a
//! pairwise zip of dateless entries against unused hints in document order.
//! The zip leans on the reverse-chronological convention of both lists and
//! is known to be fallible on complex layouts, so everything it fills is
//! stamped `Recovered` with low confidence. Populated fields are never
//! touched and no date is ever invented without a pattern match.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::etl::dates::DateHint;
use crate::models::{CvRecord, DateConfidence, DateProvenance};

/// How many lines below the matched title/company line may still hold the
/// entry's date.
const PROXIMITY_WINDOW: usize = 2;

/// Fills empty date fields on `record` from positional matches in `text`.
/// `hints` must come from `dates::scan_dates` over the same text.
pub fn recover_dates(record: &mut CvRecord, text: &str, hints: &BTreeMap<usize, DateHint>) {
    if hints.is_empty() {
        return;
    }

    let lines: Vec<String> = text.split('\n').map(|l| l.to_lowercase()).collect();
    let mut used: BTreeSet<usize> = BTreeSet::new();

    // Pass 1: proximity match per entry.
    for exp in &mut record.experience {
        if exp.start_date.is_some() {
            continue;
        }
        let title = exp.title.to_lowercase();
        let company = exp.company.to_lowercase();

        let anchor = lines.iter().position(|line| {
            (!title.is_empty() && line.contains(&title))
                || (!company.is_empty() && line.contains(&company))
        });
        let Some(anchor) = anchor else { continue };

        for offset in 0..=PROXIMITY_WINDOW {
            let key = anchor + offset;
            if used.contains(&key) {
                continue;
            }
            if let Some(hint) = hints.get(&key) {
                apply_hint(exp, hint, hint.confidence);
                used.insert(key);
                debug!(
                    company = %exp.company,
                    line = key,
                    "recovered dates by proximity"
                );
                break;
            }
        }
    }

    // Pass 2: zip the leftovers in document order. Both the entries and the
    // date lines are assumed to follow the same reading order.
    let remaining: Vec<(usize, &DateHint)> = hints
        .iter()
        .filter(|(key, _)| !used.contains(*key))
        .map(|(key, hint)| (*key, hint))
        .collect();
    let mut remaining = remaining.into_iter();
    for exp in &mut record.experience {
        if exp.start_date.is_some() {
            continue;
        }
        let Some((key, hint)) = remaining.next() else { break };
        apply_hint(exp, hint, DateConfidence::Low);
        used.insert(key);
        debug!(company = %exp.company, "recovered dates by document-order pairing");
    }

    // Education: proximity only, against the institution name.
    for edu in &mut record.education {
        if edu.year.is_some() {
            continue;
        }
        let institution = edu.institution.to_lowercase();
        if institution.is_empty() {
            continue;
        }
        let Some(anchor) = lines.iter().position(|line| line.contains(&institution)) else {
            continue;
        };
        for offset in 0..=PROXIMITY_WINDOW {
            let key = anchor + offset;
            if used.contains(&key) {
                continue;
            }
            if let Some(hint) = hints.get(&key) {
                edu.year = hint.start.clone();
                edu.date_provenance = DateProvenance::Recovered;
                used.insert(key);
                break;
            }
        }
    }
}

fn apply_hint(
    exp: &mut crate::models::ExperienceEntry,
    hint: &DateHint,
    confidence: DateConfidence,
) {
    exp.start_date = hint.start.clone();
    if exp.end_date.is_none() {
        exp.end_date = hint.end.clone();
    }
    exp.date_provenance = DateProvenance::Recovered;
    exp.date_confidence = Some(confidence);
    exp.original_date_line = Some(hint.raw_line.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::dates::scan_dates;
    use crate::models::ExperienceEntry;

    fn entry(title: &str, company: &str) -> ExperienceEntry {
        ExperienceEntry {
            title: title.into(),
            company: company.into(),
            start_date: None,
            end_date: None,
            description: String::new(),
            skills_used: vec![],
            impact_metrics: vec![],
            date_provenance: DateProvenance::Model,
            date_confidence: None,
            original_date_line: None,
        }
    }

    fn record_with(experience: Vec<ExperienceEntry>) -> CvRecord {
        CvRecord {
            full_name: "Juan Perez".into(),
            email: None,
            phone: None,
            linkedin: None,
            location: None,
            summary: String::new(),
            metadata: Default::default(),
            experience,
            education: vec![],
            skills: Default::default(),
            languages: vec![],
            layout_audit: None,
        }
    }

    #[test]
    fn test_proximity_fill_from_following_line() {
        let text = "Experience\nSoftware Engineer at Acme Corp\n2019 - 2022\n- shipped things";
        let hints = scan_dates(text);
        let mut record = record_with(vec![entry("Software Engineer", "Acme Corp")]);

        recover_dates(&mut record, text, &hints);

        let exp = &record.experience[0];
        assert_eq!(exp.start_date.as_deref(), Some("2019"));
        assert_eq!(exp.end_date.as_deref(), Some("2022"));
        assert_eq!(exp.date_provenance, DateProvenance::Recovered);
        assert_eq!(exp.date_confidence, Some(DateConfidence::High));
        assert_eq!(exp.original_date_line.as_deref(), Some("2019 - 2022"));
    }

    #[test]
    fn test_populated_dates_never_overwritten() {
        let text = "Acme Corp\n2019 - 2022";
        let hints = scan_dates(text);
        let mut exp = entry("Dev", "Acme Corp");
        exp.start_date = Some("2010".into());
        exp.end_date = Some("2012".into());
        let mut record = record_with(vec![exp]);

        recover_dates(&mut record, text, &hints);

        let exp = &record.experience[0];
        assert_eq!(exp.start_date.as_deref(), Some("2010"));
        assert_eq!(exp.end_date.as_deref(), Some("2012"));
        assert_eq!(exp.date_provenance, DateProvenance::Model);
    }

    #[test]
    fn test_no_pattern_leaves_field_empty() {
        let text = "Software Engineer at Acme Corp\n- no dates anywhere";
        let hints = scan_dates(text);
        let mut record = record_with(vec![entry("Software Engineer", "Acme Corp")]);

        recover_dates(&mut record, text, &hints);

        assert!(record.experience[0].start_date.is_none());
        assert_eq!(record.experience[0].date_provenance, DateProvenance::Model);
    }

    #[test]
    fn test_pairwise_fallback_in_document_order() {
        // Entries whose headers cannot be located in the text fall back to
        // zip order: first dateless entry gets the first unused hint.
        let text = "Experience\n2022 - Present\nsome description\n2019 - 2021\nolder role";
        let hints = scan_dates(text);
        let mut record = record_with(vec![
            entry("Lead", "NewCo"),
            entry("Dev", "OldCo"),
        ]);

        recover_dates(&mut record, text, &hints);

        assert_eq!(record.experience[0].start_date.as_deref(), Some("2022"));
        assert_eq!(record.experience[0].end_date.as_deref(), Some("Present"));
        assert_eq!(
            record.experience[0].date_confidence,
            Some(DateConfidence::Low)
        );
        assert_eq!(record.experience[1].start_date.as_deref(), Some("2019"));
        assert_eq!(record.experience[1].end_date.as_deref(), Some("2021"));
    }

    #[test]
    fn test_proximity_consumes_hint_before_pairwise() {
        let text = "Dev at Acme\n2019 - 2021\nGhost role\n2015 - 2016";
        let hints = scan_dates(text);
        let mut record = record_with(vec![entry("Dev", "Acme"), entry("Unfindable", "Nowhere")]);

        recover_dates(&mut record, text, &hints);

        assert_eq!(record.experience[0].start_date.as_deref(), Some("2019"));
        // The second entry gets the remaining hint, not the consumed one.
        assert_eq!(record.experience[1].start_date.as_deref(), Some("2015"));
    }

    #[test]
    fn test_pairwise_hint_not_reused_for_education() {
        // One date line, claimed by the document-order zip for an anchorless
        // experience entry. The education pass must not take it a second
        // time.
        let text = "Ghost role text\nUniversidad de Chile\n2015 - 2019";
        let hints = scan_dates(text);
        let mut record = record_with(vec![entry("Unfindable", "Nowhere")]);
        record.education.push(crate::models::EducationEntry {
            degree: "BS".into(),
            institution: "Universidad de Chile".into(),
            year: None,
            date_provenance: DateProvenance::Model,
        });

        recover_dates(&mut record, text, &hints);

        assert_eq!(record.experience[0].start_date.as_deref(), Some("2015"));
        assert!(record.education[0].year.is_none());
        assert_eq!(record.education[0].date_provenance, DateProvenance::Model);
    }

    #[test]
    fn test_education_year_recovered_by_institution() {
        let text = "Education\nUniversidad de Chile\n2015 - 2019";
        let hints = scan_dates(text);
        let mut record = record_with(vec![]);
        record.education.push(crate::models::EducationEntry {
            degree: "BS".into(),
            institution: "Universidad de Chile".into(),
            year: None,
            date_provenance: DateProvenance::Model,
        });

        recover_dates(&mut record, text, &hints);

        assert_eq!(record.education[0].year.as_deref(), Some("2015"));
        assert_eq!(
            record.education[0].date_provenance,
            DateProvenance::Recovered
        );
    }
}
