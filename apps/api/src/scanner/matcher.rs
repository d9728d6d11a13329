//! Pattern Matcher — tags token spans with labels from a `PatternVocabulary`.
//!
//! Conflict policy, applied while scanning tokens left to right:
//! 1. the leftmost match wins (an entity is emitted as soon as any rule
//!    matches at the current token),
//! 2. among rules matching at that token, the longest match wins,
//! 3. among equally long matches, the rule added to the vocabulary first wins.
//!
//! Scanning resumes after the emitted span, so entities never overlap.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::scanner::patterns::PatternVocabulary;
use crate::scanner::tokenizer::{tokenize, Token};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Skill,
    Section,
    Other(String),
}

impl Label {
    pub fn as_str(&self) -> &str {
        match self {
            Label::Skill => "SKILL",
            Label::Section => "SECTION",
            Label::Other(label) => label,
        }
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        match label {
            "SKILL" => Label::Skill,
            "SECTION" => Label::Section,
            other => Label::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A labeled span. `start`/`end` are byte offsets into the scanned text and
/// `text == &scanned[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub label: Label,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug)]
pub struct PatternMatcher {
    vocabulary: PatternVocabulary,
    /// First-token key → rule indexes, ascending (= vocabulary order).
    index: HashMap<String, Vec<usize>>,
}

impl PatternMatcher {
    pub fn new(vocabulary: PatternVocabulary) -> Self {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, rule) in vocabulary.rules().iter().enumerate() {
            index.entry(rule.first_key()).or_default().push(idx);
        }
        Self { vocabulary, index }
    }

    pub fn vocabulary(&self) -> &PatternVocabulary {
        &self.vocabulary
    }

    /// All entities in `text`, sorted by start offset.
    pub fn find_entities(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let mut entities = Vec::new();
        let mut pos = 0;

        while pos < tokens.len() {
            match self.best_match(&tokens, pos) {
                Some((rule_idx, len)) => {
                    let start = tokens[pos].start;
                    let end = tokens[pos + len - 1].end;
                    entities.push(Entity {
                        label: self.vocabulary.rules()[rule_idx].label.clone(),
                        start,
                        end,
                        text: text[start..end].to_string(),
                    });
                    pos += len;
                }
                None => pos += 1,
            }
        }

        entities
    }

    pub fn find_labeled(&self, text: &str, label: &Label) -> Vec<Entity> {
        self.find_entities(text)
            .into_iter()
            .filter(|e| e.label == *label)
            .collect()
    }

    /// Returns `(rule index, token count)` of the winning rule at `pos`.
    fn best_match(&self, tokens: &[Token<'_>], pos: usize) -> Option<(usize, usize)> {
        let candidates = self.index.get(&tokens[pos].lower)?;
        let mut best: Option<(usize, usize)> = None;

        for &idx in candidates {
            let rule = &self.vocabulary.rules()[idx];
            let len = rule.tokens.len();
            if pos + len > tokens.len() {
                continue;
            }
            let matched = rule
                .tokens
                .iter()
                .zip(&tokens[pos..pos + len])
                .all(|(constraint, token)| constraint.matches(token));
            // strictly longer only: equal lengths keep the earlier rule
            if matched && best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((idx, len));
            }
        }

        best
    }
}
