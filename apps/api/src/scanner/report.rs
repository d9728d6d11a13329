use serde::{Deserialize, Serialize};

use crate::scanner::features::{guarded_ratio, skills, SkillSet};
use crate::scanner::matcher::PatternMatcher;

/// CV-vs-JD skill match returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// |cv ∩ jd| / |jd| × 100, rounded to 2 decimals; 0 when the JD has no skills.
    pub match_percentage: f64,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub total_cv_skills: usize,
    pub total_jd_skills: usize,
}

impl MatchReport {
    pub fn build(cv_text: &str, jd_text: &str, matcher: &PatternMatcher) -> Self {
        Self::from_skills(&skills(cv_text, matcher), &skills(jd_text, matcher))
    }

    pub fn from_skills(cv_skills: &SkillSet, jd_skills: &SkillSet) -> Self {
        let matching_skills: Vec<String> = cv_skills.intersection(jd_skills).cloned().collect();
        let missing_skills: Vec<String> = jd_skills.difference(cv_skills).cloned().collect();

        let match_percentage = if jd_skills.is_empty() {
            0.0
        } else {
            round2(guarded_ratio(matching_skills.len(), jd_skills.len()) * 100.0)
        };

        Self {
            match_percentage,
            matching_skills,
            missing_skills,
            total_cv_skills: cv_skills.len(),
            total_jd_skills: jd_skills.len(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
