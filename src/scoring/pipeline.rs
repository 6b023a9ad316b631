use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::categories::SdgCategory;
use super::classification::{MLHandle, Prediction};
use super::fusion::{fuse, AnalysisReport};
use super::relevance::score;
use super::score::MatchResult;
use super::semantic::{compute_similarities, SemanticMatch};
use crate::document::DocumentSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SdgAnalysisEntry {
    pub sdg_number: u8,
    pub sdg_name: String,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    pub explanation: String,
}

impl From<&Prediction> for SdgAnalysisEntry {
    fn from(prediction: &Prediction) -> Self {
        Self {
            sdg_number: prediction.sdg_number,
            sdg_name: prediction.sdg_name.clone(),
            confidence: prediction.confidence,
            matched_keywords: prediction.matched_keywords.clone(),
            explanation: prediction.explanation.clone(),
        }
    }
}

/// What callers serialize: the ranked goals plus the optional document
/// passthrough.
#[derive(Debug, Clone, Serialize)]
pub struct SdgAnalysis {
    pub sdg_analysis: Vec<SdgAnalysisEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub rule_results: Vec<MatchResult>,
    pub predictions: Vec<Prediction>,
    pub semantic_results: Vec<SemanticMatch>,
    pub report: AnalysisReport,
}

impl Analysis {
    pub fn no_signal(&self) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.is_no_signal())
    }

    /// The ranked goals, or the no-signal sentinel alone when nothing ranked.
    pub fn to_output(&self, document: Option<DocumentSummary>) -> SdgAnalysis {
        let sdg_analysis = if self.report.top_3_sdgs.is_empty() {
            self.no_signal()
                .map(|sentinel| vec![SdgAnalysisEntry::from(sentinel)])
                .unwrap_or_default()
        } else {
            self.report
                .top_3_sdgs
                .iter()
                .map(|e| SdgAnalysisEntry {
                    sdg_number: e.sdg_number,
                    sdg_name: e.sdg_name.clone(),
                    confidence: e.combined_confidence,
                    matched_keywords: e.matched_keywords.clone(),
                    explanation: e.detailed_explanation.clone(),
                })
                .collect()
        };

        SdgAnalysis {
            sdg_analysis,
            document,
        }
    }
}

pub struct Analyzer {
    categories: Arc<[SdgCategory]>,
    ml_handle: MLHandle,
    top_k: usize,
}

impl Analyzer {
    pub fn new(categories: Vec<SdgCategory>, ml_handle: MLHandle, top_k: usize) -> Self {
        Self {
            categories: categories.into(),
            ml_handle,
            top_k,
        }
    }

    pub async fn analyze(&self, text: &str) -> Analysis {
        // The model request goes out first so the worker infers while the
        // patterns are scored here.
        let (predictions, rule_results) = tokio::join!(
            self.ml_handle.predict(text.to_string(), self.top_k),
            async { score(text, &self.categories) },
        );

        let semantic_results = compute_similarities(&predictions);
        debug!(
            rule = rule_results.len(),
            semantic = semantic_results.len(),
            "fusing results"
        );
        let report = fuse(&rule_results, &semantic_results);

        Analysis {
            rule_results,
            predictions,
            semantic_results,
            report,
        }
    }
}
