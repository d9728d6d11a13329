//! Pattern vocabulary — token rules loaded from a JSON-lines file plus the
//! built-in section-header rules.
//!
//! File format, one object per line:
//!
//! ```text
//! {"label": "SKILL", "pattern": [{"LOWER": "machine"}, {"LOWER": "learning"}]}
//! {"label": "SKILL", "pattern": "Node.js"}
//! ```
//!
//! A string `pattern` is a phrase: it is tokenized and matched
//! case-insensitively token by token.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::scanner::matcher::Label;
use crate::scanner::sections::SectionName;
use crate::scanner::tokenizer::{tokenize_lower, Token};
use crate::scanner::ScannerError;

/// A single constraint on one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPredicate {
    /// Token lowercased equals the (lowercase) literal.
    Lower(String),
    /// Token surface form equals the literal exactly.
    Orth(String),
}

impl TokenPredicate {
    pub fn matches(&self, token: &Token<'_>) -> bool {
        match self {
            TokenPredicate::Lower(literal) => token.lower == *literal,
            TokenPredicate::Orth(literal) => token.text == literal,
        }
    }

    /// Lowercased literal. Any token satisfying the predicate has this as its
    /// lowercase form, which makes it usable as an index key.
    fn key(&self) -> String {
        match self {
            TokenPredicate::Lower(literal) => literal.clone(),
            TokenPredicate::Orth(literal) => literal.to_lowercase(),
        }
    }
}

/// All predicates must hold for the token to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRule {
    pub predicates: Vec<TokenPredicate>,
}

impl TokenRule {
    pub fn lower(literal: &str) -> Self {
        Self {
            predicates: vec![TokenPredicate::Lower(literal.to_lowercase())],
        }
    }

    pub fn matches(&self, token: &Token<'_>) -> bool {
        self.predicates.iter().all(|p| p.matches(token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    pub label: Label,
    pub tokens: Vec<TokenRule>,
}

impl PatternRule {
    pub fn new(label: Label, tokens: Vec<TokenRule>) -> Self {
        Self { label, tokens }
    }

    /// Convenience for phrase rules: `PatternRule::phrase(Label::Skill, "machine learning")`.
    pub fn phrase(label: Label, phrase: &str) -> Self {
        Self::new(
            label,
            tokenize_lower(phrase)
                .iter()
                .map(|t| TokenRule::lower(t))
                .collect(),
        )
    }

    /// Index key of the first token; rules are never empty.
    pub(crate) fn first_key(&self) -> String {
        self.tokens
            .first()
            .and_then(|t| t.predicates.first())
            .map(TokenPredicate::key)
            .unwrap_or_default()
    }
}

/// Ordered rule list. Order matters: it is the tie-break between rules
/// matching the same span.
#[derive(Debug, Clone, Default)]
pub struct PatternVocabulary {
    rules: Vec<PatternRule>,
}

#[derive(Debug, Deserialize)]
struct RawPattern {
    label: String,
    pattern: RawPatternBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPatternBody {
    Tokens(Vec<BTreeMap<String, serde_json::Value>>),
    Phrase(String),
}

impl PatternVocabulary {
    /// Only the five section-header rules.
    pub fn builtin() -> Self {
        let mut vocabulary = Self::default();
        vocabulary.push_section_rules();
        vocabulary
    }

    /// External patterns first, then the section-header rules.
    /// A missing file is not an error: the vocabulary just has no skills.
    pub fn load(path: &Path) -> Result<Self, ScannerError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Patterns file {} not found; continuing without skill patterns",
                    path.display()
                );
                return Ok(Self::builtin());
            }
            Err(e) => {
                return Err(ScannerError::PatternLoad {
                    path: path.to_path_buf(),
                    line: None,
                    message: e.to_string(),
                })
            }
        };
        Self::from_jsonl(&content, path)
    }

    /// Parses JSON-lines content. `origin` is only used in error messages.
    pub fn from_jsonl(content: &str, origin: &Path) -> Result<Self, ScannerError> {
        let mut vocabulary = Self::default();

        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let rule = parse_line(line).map_err(|message| ScannerError::PatternLoad {
                path: origin.to_path_buf(),
                line: Some(idx + 1),
                message: format!("line {}: {message}", idx + 1),
            })?;
            vocabulary.push(rule);
        }

        debug!(
            "Loaded {} patterns from {}",
            vocabulary.len(),
            origin.display()
        );
        vocabulary.push_section_rules();
        Ok(vocabulary)
    }

    pub fn push(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn count_label(&self, label: &Label) -> usize {
        self.rules.iter().filter(|r| r.label == *label).count()
    }

    fn push_section_rules(&mut self) {
        for name in SectionName::ALL {
            self.push(PatternRule::new(
                Label::Section,
                vec![TokenRule::lower(name.as_str())],
            ));
        }
    }
}

fn parse_line(line: &str) -> Result<PatternRule, String> {
    let raw: RawPattern = serde_json::from_str(line).map_err(|e| e.to_string())?;
    if raw.label.trim().is_empty() {
        return Err("empty label".to_string());
    }

    let tokens = match raw.pattern {
        RawPatternBody::Tokens(constraints) => constraints
            .iter()
            .map(token_rule)
            .collect::<Result<Vec<_>, _>>()?,
        RawPatternBody::Phrase(phrase) => tokenize_lower(&phrase)
            .iter()
            .map(|t| TokenRule::lower(t))
            .collect(),
    };
    if tokens.is_empty() {
        return Err("pattern has no tokens".to_string());
    }

    Ok(PatternRule::new(Label::from(raw.label.as_str()), tokens))
}

fn token_rule(raw: &BTreeMap<String, serde_json::Value>) -> Result<TokenRule, String> {
    if raw.is_empty() {
        return Err("empty token constraint".to_string());
    }

    let mut predicates = Vec::with_capacity(raw.len());
    for (attr, value) in raw {
        let literal = value
            .as_str()
            .ok_or_else(|| format!("token attribute '{attr}' must be a string"))?;
        let predicate = match attr.as_str() {
            "LOWER" => TokenPredicate::Lower(literal.to_lowercase()),
            "ORTH" | "TEXT" => TokenPredicate::Orth(literal.to_string()),
            other => return Err(format!("unsupported token attribute '{other}'")),
        };
        predicates.push(predicate);
    }
    Ok(TokenRule { predicates })
}
