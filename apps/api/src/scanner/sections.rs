//! Section Segmenter — splits a CV into regions keyed by canonical header.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::scanner::matcher::{Label, PatternMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionName {
    Experience,
    Education,
    Projects,
    Certifications,
    Summary,
}

impl SectionName {
    pub const ALL: [SectionName; 5] = [
        SectionName::Experience,
        SectionName::Education,
        SectionName::Projects,
        SectionName::Certifications,
        SectionName::Summary,
    ];

    /// Lowercase header word as it appears in the built-in patterns.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionName::Experience => "experience",
            SectionName::Education => "education",
            SectionName::Projects => "projects",
            SectionName::Certifications => "certifications",
            SectionName::Summary => "summary",
        }
    }

    /// Canonical (uppercase) header name.
    pub fn header(&self) -> &'static str {
        match self {
            SectionName::Experience => "EXPERIENCE",
            SectionName::Education => "EDUCATION",
            SectionName::Projects => "PROJECTS",
            SectionName::Certifications => "CERTIFICATIONS",
            SectionName::Summary => "SUMMARY",
        }
    }

    /// Matches surface text after upper-casing, so `Experience` and
    /// `EXPERIENCE` both resolve; anything else (e.g. `WORK EXPERIENCE`) does not.
    pub fn from_header(text: &str) -> Option<Self> {
        let upper = text.to_uppercase();
        Self::ALL.into_iter().find(|name| name.header() == upper)
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A region of the document starting at a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section<'a> {
    pub name: SectionName,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

pub type SectionMap<'a> = BTreeMap<SectionName, &'a str>;

/// Upper-cased copy of `text`, plus the originating byte offset in `text`
/// for every byte offset of the copy (and one trailing entry for the end).
/// Upper-casing can change byte lengths (`ﬁ` → `FI`), so offsets are mapped
/// char by char.
fn uppercase_with_origins(text: &str) -> (String, Vec<usize>) {
    let mut upper = String::with_capacity(text.len());
    let mut origins = Vec::with_capacity(text.len() + 1);
    for (idx, ch) in text.char_indices() {
        let before = upper.len();
        upper.extend(ch.to_uppercase());
        origins.resize(origins.len() + (upper.len() - before), idx);
    }
    origins.push(text.len());
    (upper, origins)
}

/// Every header region in offset order. Regions are contiguous: each ends
/// where the next begins and the last runs to the end of the text.
///
/// Headers are matched on an upper-cased copy, so case-sensitive rules in
/// the vocabulary cannot hide them; regions are sliced from `text` itself.
pub fn segment<'a>(text: &'a str, matcher: &PatternMatcher) -> Vec<Section<'a>> {
    let (upper, origins) = uppercase_with_origins(text);
    let headers: Vec<(usize, SectionName)> = matcher
        .find_labeled(&upper, &Label::Section)
        .into_iter()
        .filter_map(|e| SectionName::from_header(&e.text).map(|name| (origins[e.start], name)))
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, &(start, name))| {
            let end = headers.get(i + 1).map_or(text.len(), |&(next, _)| next);
            Section {
                name,
                start,
                end,
                text: &text[start..end],
            }
        })
        .collect()
}

/// Header → region. A header that occurs twice keeps its last region.
/// No headers gives an empty map.
pub fn extract_sections<'a>(text: &'a str, matcher: &PatternMatcher) -> SectionMap<'a> {
    segment(text, matcher)
        .into_iter()
        .map(|section| (section.name, section.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::patterns::{PatternRule, PatternVocabulary};

    const CV: &str = "Jane Doe\nSummary\nBackend engineer.\nExperience\nAcme: Rust, Kafka.\nEDUCATION\nBSc CS\nprojects\nA compiler";

    fn builtin() -> PatternMatcher {
        PatternMatcher::new(PatternVocabulary::builtin())
    }

    #[test]
    fn test_from_header_is_case_insensitive() {
        assert_eq!(SectionName::from_header("Experience"), Some(SectionName::Experience));
        assert_eq!(SectionName::from_header("SUMMARY"), Some(SectionName::Summary));
        assert_eq!(SectionName::from_header("Skills"), None);
    }

    #[test]
    fn test_regions_run_to_next_header() {
        let sections = extract_sections(CV, &builtin());
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[&SectionName::Summary], "Summary\nBackend engineer.\n");
        assert_eq!(sections[&SectionName::Experience], "Experience\nAcme: Rust, Kafka.\n");
        assert_eq!(sections[&SectionName::Education], "EDUCATION\nBSc CS\n");
        assert_eq!(sections[&SectionName::Projects], "projects\nA compiler");
        assert!(!sections.contains_key(&SectionName::Certifications));
    }

    #[test]
    fn test_regions_are_contiguous() {
        let regions = segment(CV, &builtin());
        let first = regions.first().unwrap().start;
        let joined: String = regions.iter().map(|s| s.text).collect();
        assert_eq!(joined, &CV[first..]);
        assert!(regions.windows(2).all(|w| w[0].end == w[1].start));
    }

    #[test]
    fn test_repeated_header_last_write_wins() {
        let text = "Experience first job Education school Experience second job";
        let sections = extract_sections(text, &builtin());
        assert_eq!(sections[&SectionName::Experience], "Experience second job");
        assert_eq!(sections[&SectionName::Education], "Education school ");
        assert_eq!(segment(text, &builtin()).len(), 3);
    }

    #[test]
    fn test_no_headers_gives_empty_map() {
        assert!(extract_sections("Just a plain paragraph.", &builtin()).is_empty());
        assert!(extract_sections("", &builtin()).is_empty());
    }

    #[test]
    fn test_non_canonical_section_labels_are_ignored() {
        let mut vocabulary = PatternVocabulary::default();
        vocabulary.push(PatternRule::phrase(Label::Section, "skills"));
        let matcher = PatternMatcher::new(vocabulary);
        assert!(extract_sections("Skills Rust Go", &matcher).is_empty());
    }

    #[test]
    fn test_skill_rule_shadowing_header_suppresses_section() {
        let vocabulary = PatternVocabulary::from_jsonl(
            r#"{"label": "SKILL", "pattern": "summary writing"}"#,
            std::path::Path::new("inline.jsonl"),
        )
        .unwrap();
        let matcher = PatternMatcher::new(vocabulary);
        let sections = extract_sections("Summary writing Experience Acme", &matcher);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&SectionName::Experience], "Experience Acme");
    }

    #[test]
    fn test_case_sensitive_skill_rule_does_not_hide_header() {
        let vocabulary = PatternVocabulary::from_jsonl(
            r#"{"label": "SKILL", "pattern": [{"ORTH": "Summary"}]}"#,
            std::path::Path::new("inline.jsonl"),
        )
        .unwrap();
        let matcher = PatternMatcher::new(vocabulary);
        let sections = extract_sections("Summary Backend dev. Experience Acme", &matcher);
        assert_eq!(
            sections.keys().copied().collect::<Vec<_>>(),
            vec![SectionName::Experience, SectionName::Summary]
        );
        assert_eq!(sections[&SectionName::Summary], "Summary Backend dev. ");
        assert_eq!(sections[&SectionName::Experience], "Experience Acme");
    }

    #[test]
    fn test_offsets_survive_length_changing_uppercase() {
        let text = "Proﬁle 1\nExperience Acme";
        let sections = extract_sections(text, &builtin());
        assert_eq!(sections[&SectionName::Experience], "Experience Acme");

        let (upper, origins) = uppercase_with_origins(text);
        // "ﬁ" (3 bytes) upper-cases to "FI" (2 bytes)
        assert_eq!(upper.len(), text.len() - 1);
        assert_eq!(origins.len(), upper.len() + 1);
        assert_eq!(origins[upper.len()], text.len());
    }
}
