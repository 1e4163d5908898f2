//! Skill fallback extraction.
//!
//! Runs after extraction and only when the model returned an empty
//! hard-skill list: a skills-section scan plus a known-technology keyword
//! sweep. Fills gaps, never overrides model output.

use std::collections::BTreeSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SKILL_HEADER: Regex = Regex::new(
        r"(?i)\b(skills|habilidades|competencias|tecnolog[íi]as|technical\s*skills|tech\s*stack)\b"
    )
    .unwrap();
    static ref RE_ITEM_SEP: Regex = Regex::new(r"[,;|\-]+").unwrap();
}

/// Technologies worth catching even when buried in prose.
const KNOWN_SKILLS: &[&str] = &[
    // Languages
    "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "go", "rust", "php",
    "swift", "kotlin",
    // Frameworks
    "django", "flask", "fastapi", "react", "angular", "vue", "node", "nodejs", "express",
    "spring", "laravel",
    // Cloud / DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "k8s", "terraform", "jenkins", "ci/cd",
    "gitlab", "github",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "dynamodb", "oracle",
    // Tools
    "git", "linux", "bash", "jira", "confluence", "slack", "figma", "postman",
    // AI / ML
    "tensorflow", "pytorch", "keras", "scikit-learn", "pandas", "numpy", "machine learning",
    // Web
    "html", "css", "sass", "rest", "graphql", "microservices", "websocket",
];

/// Extracts hard skills from raw text. Sorted and deduplicated so the
/// output is stable across runs.
pub fn extract_skills(text: &str) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();
    found.extend(extract_from_section(text));
    found.extend(extract_by_keywords(text));
    found.into_iter().collect()
}

/// Items listed under a skills header, split on common separators, until a
/// blank line or the next header-like line.
fn extract_from_section(text: &str) -> BTreeSet<String> {
    let mut skills = BTreeSet::new();
    let mut in_section = false;

    for line in text.split('\n') {
        if RE_SKILL_HEADER.is_match(line) && line.trim().split_whitespace().count() <= 3 {
            in_section = true;
            continue;
        }
        if in_section {
            let trimmed = line.trim();
            if trimmed.is_empty() || (trimmed.len() < 30 && trimmed.ends_with(':')) {
                in_section = false;
                continue;
            }
            for item in RE_ITEM_SEP.split(trimmed) {
                let item = item.trim();
                if item.len() > 1 && item.split_whitespace().count() <= 4 {
                    skills.insert(item.to_string());
                }
            }
        }
    }
    skills
}

/// Word-boundary sweep for the known-technology table.
fn extract_by_keywords(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .filter(|skill| {
            // `\b` misbehaves next to symbols ("c++", "c#"), so those fall
            // back to plain substring matching.
            if skill.chars().all(|c| c.is_alphanumeric() || c == ' ') {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(skill));
                Regex::new(&pattern).map(|re| re.is_match(&lower)).unwrap_or(false)
            } else {
                lower.contains(*skill)
            }
        })
        .map(|skill| display_case(skill))
        .collect()
}

fn display_case(skill: &str) -> String {
    if skill.len() <= 3 && !skill.contains(' ') {
        return skill.to_uppercase();
    }
    let mut chars = skill.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_found_in_prose() {
        let skills = extract_skills("Built services in Python on AWS with Docker.");
        assert!(skills.contains(&"Python".to_string()));
        assert!(skills.contains(&"AWS".to_string()));
        assert!(skills.contains(&"Docker".to_string()));
    }

    #[test]
    fn test_section_items_extracted() {
        let text = "Habilidades\nExcel avanzado, Atención al cliente; SAP\n\nExperiencia\n...";
        let skills = extract_skills(text);
        assert!(skills.contains(&"Excel avanzado".to_string()));
        assert!(skills.contains(&"SAP".to_string()));
    }

    #[test]
    fn test_no_skills_yields_empty() {
        assert!(extract_skills("nothing technical here at all").is_empty());
    }

    #[test]
    fn test_output_is_sorted_and_unique() {
        let skills = extract_skills("Python python PYTHON and java");
        let mut sorted = skills.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(skills, sorted);
    }

    #[test]
    fn test_word_boundary_respected() {
        // "golang" must not fire the "go" keyword... but "go" alone does.
        let skills = extract_skills("We write golang services");
        assert!(!skills.contains(&"GO".to_string()));
    }
}
