// CV scanning core: PDF text extraction, token-pattern entity matching,
// section segmentation and skill-overlap scoring.
// Everything here is synchronous; callers on the async side wrap it in
// tokio::task::spawn_blocking.

#![allow(dead_code)]

pub mod extract;
pub mod features;
pub mod matcher;
pub mod model;
pub mod patterns;
pub mod report;
pub mod sections;
pub mod tokenizer;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub use features::{build_features, skills, FeatureVector, SkillSet};
pub use matcher::{Label, PatternMatcher};
pub use model::ModelArtifact;
pub use patterns::PatternVocabulary;
pub use report::MatchReport;

#[derive(Debug, Error)]
pub enum ScannerError {
    /// The document could not be opened or parsed as a PDF at all.
    #[error("Could not extract text from PDF: {0}")]
    Extraction(String),

    /// The patterns file exists but is not valid JSON-lines vocabulary.
    /// `line` is 1-based and absent when the file could not be read at all.
    #[error("Invalid pattern file {}: {message}", .path.display())]
    PatternLoad {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Degenerate numeric input, e.g. a zero-magnitude vector.
    #[error("Domain error: {0}")]
    Domain(String),
}

/// Read-only, process-wide scanning context.
///
/// Built once at startup and shared behind an `Arc`; nothing in here is
/// mutated after construction, so concurrent requests only ever read it.
#[derive(Debug)]
pub struct ScannerContext {
    matcher: PatternMatcher,
    model: Option<ModelArtifact>,
}

impl ScannerContext {
    pub fn new(vocabulary: PatternVocabulary, model: Option<ModelArtifact>) -> Self {
        Self {
            matcher: PatternMatcher::new(vocabulary),
            model,
        }
    }

    /// Loads the vocabulary (fatal on malformed content) and the optional
    /// model artifact (never fatal).
    pub fn load(patterns_path: &Path, model_path: &Path) -> Result<Self, ScannerError> {
        let vocabulary = PatternVocabulary::load(patterns_path)?;
        info!(
            "Pattern vocabulary ready: {} rules ({} skill)",
            vocabulary.len(),
            vocabulary.count_label(&Label::Skill)
        );
        let model = ModelArtifact::load_optional(model_path);
        Ok(Self::new(vocabulary, model))
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn model(&self) -> Option<&ModelArtifact> {
        self.model.as_ref()
    }

    pub fn skills(&self, text: &str) -> SkillSet {
        skills(text, &self.matcher)
    }

    pub fn build_features(&self, cv_text: &str, jd_text: &str) -> FeatureVector {
        build_features(cv_text, jd_text, &self.matcher)
    }

    pub fn match_report(&self, cv_text: &str, jd_text: &str) -> MatchReport {
        MatchReport::build(cv_text, jd_text, &self.matcher)
    }
}
