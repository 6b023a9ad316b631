use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::score::{ConfidenceHistogram, ConfidenceLevel, InclusionScope, MatchResult};
use super::semantic::SemanticMatch;

pub const TOP_K: usize = 3;
pub const MAX_EXPLANATION_KEYWORDS: usize = 5;
pub const MAX_REPORT_KEYWORDS: usize = 20;
pub const MISSING_KEYWORD_SUGGESTIONS: usize = 10;

pub const NO_SDGS_SUMMARY: &str = "No relevant SDGs detected in the document.";

// Suggestions only; not derived from what the document lacks.
const IMPORTANT_TERMS: &[&str] = &[
    "sustainable",
    "development",
    "poverty",
    "hunger",
    "health",
    "education",
    "gender",
    "water",
    "energy",
    "economic",
    "industry",
    "inequality",
    "cities",
    "consumption",
    "climate",
    "marine",
    "land",
    "peace",
    "partnership",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub sdg_number: u8,
    pub sdg_name: String,
    pub confidence_level: ConfidenceLevel,
    pub combined_confidence: f32,
    pub rule_confidence: f32,
    pub semantic_confidence: f32,
    pub matched_keywords: Vec<String>,
    pub excluded_keywords: Vec<String>,
    pub inclusion_scope: InclusionScope,
    pub detailed_explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub top_3_sdgs: Vec<Explanation>,
    pub overall_summary: String,
    pub confidence_levels: ConfidenceHistogram,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
}

fn explanation_template(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "Strong match with multiple relevant indicators and keywords",
        ConfidenceLevel::Medium => "Moderate match with some relevant indicators",
        ConfidenceLevel::Low => "Weak match, may require manual verification",
    }
}

fn detailed_explanation(result: &MatchResult, level: ConfidenceLevel) -> String {
    let mut parts = vec![explanation_template(level).to_string()];
    if !result.matched_keywords.is_empty() {
        let keywords: Vec<&str> = result
            .matched_keywords
            .iter()
            .take(MAX_EXPLANATION_KEYWORDS)
            .map(String::as_str)
            .collect();
        parts.push(format!("Matched keywords: {}", keywords.join(", ")));
    }
    parts.push(format!("Inclusion scope: {}", result.inclusion_scope));
    format!("{}.", parts.join(". "))
}

impl From<&MatchResult> for Explanation {
    fn from(result: &MatchResult) -> Self {
        let level = result.confidence_level();
        Self {
            sdg_number: result.sdg_number,
            sdg_name: result.sdg_name.clone(),
            confidence_level: level,
            combined_confidence: result.combined_confidence(),
            rule_confidence: result.rule_confidence,
            semantic_confidence: result.semantic_confidence,
            matched_keywords: result.matched_keywords.iter().cloned().collect(),
            excluded_keywords: result.excluded_keywords.iter().cloned().collect(),
            inclusion_scope: result.inclusion_scope,
            detailed_explanation: detailed_explanation(result, level),
        }
    }
}

/// Merges both score sources into one accumulator per goal and returns them
/// strongest first, lower goal number first on ties.
pub fn combine(
    rule_results: &[MatchResult],
    semantic_results: &[SemanticMatch],
) -> Vec<MatchResult> {
    let mut combined: BTreeMap<u8, MatchResult> = BTreeMap::new();

    for result in rule_results {
        combined
            .entry(result.sdg_number)
            .and_modify(|acc| {
                acc.rule_confidence = acc.rule_confidence.max(result.rule_confidence);
                acc.matched_keywords
                    .extend(result.matched_keywords.iter().cloned());
                acc.excluded_keywords
                    .extend(result.excluded_keywords.iter().cloned());
            })
            .or_insert_with(|| result.clone());
    }

    for result in semantic_results {
        if result.sdg_number == 0 {
            debug!("ignoring no-signal semantic result");
            continue;
        }
        let acc = combined
            .entry(result.sdg_number)
            .or_insert_with(|| MatchResult::new(result.sdg_number, result.sdg_name.clone()));
        acc.semantic_confidence = result.avg_similarity;
        acc.matched_keywords
            .extend(result.matched_keywords.iter().cloned());
    }

    let mut results: Vec<MatchResult> = combined.into_values().collect();
    results.sort_by(|a, b| {
        b.combined_confidence()
            .total_cmp(&a.combined_confidence())
            .then(a.sdg_number.cmp(&b.sdg_number))
    });
    results
}

fn overall_summary(top: &[Explanation]) -> String {
    if top.is_empty() {
        return NO_SDGS_SUMMARY.to_string();
    }

    let names: Vec<String> = top
        .iter()
        .map(|e| format!("SDG {}: {}", e.sdg_number, e.sdg_name))
        .collect();
    let scores: Vec<String> = top
        .iter()
        .map(|e| format!("{:.2}", e.combined_confidence))
        .collect();

    format!(
        "Top {} detected SDGs: {}. Confidence scores: {}. Analysis combines rule-based pattern matching and model-based classification.",
        top.len(),
        names.join(", "),
        scores.join(", ")
    )
}

pub fn fuse(rule_results: &[MatchResult], semantic_results: &[SemanticMatch]) -> AnalysisReport {
    let combined = combine(rule_results, semantic_results);

    let top_3_sdgs: Vec<Explanation> = combined.iter().take(TOP_K).map(Explanation::from).collect();

    let mut confidence_levels = ConfidenceHistogram::default();
    for explanation in &top_3_sdgs {
        confidence_levels.record(explanation.confidence_level);
    }

    let matched_keywords: Vec<String> = combined
        .iter()
        .flat_map(|r| r.matched_keywords.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_REPORT_KEYWORDS)
        .collect();

    let missing_keywords = if top_3_sdgs.is_empty() {
        Vec::new()
    } else {
        IMPORTANT_TERMS
            .iter()
            .take(MISSING_KEYWORD_SUGGESTIONS)
            .map(|t| t.to_string())
            .collect()
    };

    AnalysisReport {
        overall_summary: overall_summary(&top_3_sdgs),
        top_3_sdgs,
        confidence_levels,
        matched_keywords,
        missing_keywords,
    }
}
