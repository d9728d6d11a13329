//! Skill sets, the CV/JD feature vector and cosine similarity.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::scanner::matcher::{Label, PatternMatcher};
use crate::scanner::sections::{extract_sections, SectionName};
use crate::scanner::ScannerError;

/// Lowercased skill names. Sorted iteration keeps reports deterministic.
pub type SkillSet = BTreeSet<String>;

/// `(overlap_ratio, experience_ratio, cv_skill_count)` — order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Share of JD skills also found in the CV, in [0, 1].
    pub overlap_ratio: f64,
    /// Share of the overlap that also appears in the EXPERIENCE section, in [0, 1].
    pub experience_ratio: f64,
    /// Number of distinct CV skills.
    pub cv_skill_count: f64,
}

impl FeatureVector {
    pub fn to_array(self) -> [f64; 3] {
        [self.overlap_ratio, self.experience_ratio, self.cv_skill_count]
    }
}

pub fn skills(text: &str, matcher: &PatternMatcher) -> SkillSet {
    matcher
        .find_labeled(text, &Label::Skill)
        .into_iter()
        .map(|e| e.text.to_lowercase())
        .collect()
}

/// `numerator / max(denominator, 1)`, so empty sets give 0 instead of NaN.
pub(crate) fn guarded_ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

pub fn build_features(cv_text: &str, jd_text: &str, matcher: &PatternMatcher) -> FeatureVector {
    let cv_sections = extract_sections(cv_text, matcher);
    let cv_skills = skills(cv_text, matcher);
    let jd_skills = skills(jd_text, matcher);
    let overlap: SkillSet = cv_skills.intersection(&jd_skills).cloned().collect();

    let experience_text = cv_sections
        .get(&SectionName::Experience)
        .copied()
        .unwrap_or("");
    let experience_skills = skills(experience_text, matcher);
    let experience_overlap = overlap.intersection(&experience_skills).count();

    FeatureVector {
        overlap_ratio: guarded_ratio(overlap.len(), jd_skills.len()),
        experience_ratio: guarded_ratio(experience_overlap, overlap.len()),
        cv_skill_count: cv_skills.len() as f64,
    }
}

/// `a·b / (|a|·|b|)`. Zero-magnitude or mismatched vectors are a
/// `ScannerError::Domain`, never NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, ScannerError> {
    if a.len() != b.len() {
        return Err(ScannerError::Domain(format!(
            "cosine similarity needs equal lengths, got {} and {}",
            a.len(),
            b.len()
        )));
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ScannerError::Domain(
            "cosine similarity is undefined for a zero-magnitude vector".to_string(),
        ));
    }

    Ok(dot / (norm_a * norm_b))
}
