use serde::Serialize;
use std::collections::BTreeSet;
use strum::Display;

pub const WEIGHT_RULE: f32 = 0.4;
pub const WEIGHT_SEMANTIC: f32 = 0.6;

pub fn combined_confidence(rule_confidence: f32, semantic_confidence: f32) -> f32 {
    rule_confidence * WEIGHT_RULE + semantic_confidence * WEIGHT_SEMANTIC
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InclusionScope {
    #[strum(serialize = "Broad")]
    Broad,
    #[strum(serialize = "Narrow")]
    Narrow,
    #[default]
    #[strum(serialize = "Unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[strum(serialize = "high")]
    High,
    #[strum(serialize = "medium")]
    Medium,
    #[strum(serialize = "low")]
    Low,
}

impl ConfidenceLevel {
    pub const HIGH_THRESHOLD: f32 = 0.70;
    pub const MEDIUM_THRESHOLD: f32 = 0.40;

    pub fn from_score(score: f32) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfidenceHistogram {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceHistogram {
    pub fn record(&mut self, level: ConfidenceLevel) {
        match level {
            ConfidenceLevel::High => self.high += 1,
            ConfidenceLevel::Medium => self.medium += 1,
            ConfidenceLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Per-SDG fusion state. The combined confidence is derived from the two
/// component scores on every read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub sdg_number: u8,
    pub sdg_name: String,
    pub rule_confidence: f32,
    pub semantic_confidence: f32,
    pub matched_keywords: BTreeSet<String>,
    pub excluded_keywords: BTreeSet<String>,
    pub inclusion_scope: InclusionScope,
}

impl MatchResult {
    pub fn new(sdg_number: u8, sdg_name: impl Into<String>) -> Self {
        Self {
            sdg_number,
            sdg_name: sdg_name.into(),
            rule_confidence: 0.0,
            semantic_confidence: 0.0,
            matched_keywords: BTreeSet::new(),
            excluded_keywords: BTreeSet::new(),
            inclusion_scope: InclusionScope::Unknown,
        }
    }

    pub fn combined_confidence(&self) -> f32 {
        combined_confidence(self.rule_confidence, self.semantic_confidence)
    }

    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.combined_confidence())
    }
}
