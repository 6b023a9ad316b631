use serde::Serialize;

use super::classification::Prediction;

pub const SEMANTIC_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    pub indicator: String,
    pub similarity: f32,
}

/// Model output in the shape the fusion step consumes. Only one score per
/// goal is produced, so average and maximum similarity are the same value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticMatch {
    pub sdg_number: u8,
    pub sdg_name: String,
    pub avg_similarity: f32,
    pub max_similarity: f32,
    pub top_indicators: Vec<Indicator>,
    pub explanation: String,
    pub matched_keywords: Vec<String>,
}

impl From<&Prediction> for SemanticMatch {
    fn from(prediction: &Prediction) -> Self {
        Self {
            sdg_number: prediction.sdg_number,
            sdg_name: prediction.sdg_name.clone(),
            avg_similarity: prediction.confidence,
            max_similarity: prediction.confidence,
            top_indicators: vec![Indicator {
                indicator: "Model-based prediction".to_string(),
                similarity: prediction.confidence,
            }],
            explanation: prediction.explanation.clone(),
            matched_keywords: prediction.matched_keywords.clone(),
        }
    }
}

pub fn compute_similarities(predictions: &[Prediction]) -> Vec<SemanticMatch> {
    predictions.iter().map(SemanticMatch::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reshape_copies_confidence() {
        let prediction = Prediction {
            sdg_number: 6,
            sdg_name: "Clean Water and Sanitation".into(),
            confidence: 0.42,
            matched_keywords: vec!["water".into()],
            explanation: "Moderate match".into(),
        };

        let matches = compute_similarities(&[prediction]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].sdg_number, 6);
        assert_eq!(matches[0].avg_similarity, 0.42);
        assert_eq!(matches[0].max_similarity, 0.42);
        assert_eq!(matches[0].top_indicators[0].similarity, 0.42);
        assert_eq!(matches[0].matched_keywords, vec!["water"]);
    }

    #[test]
    fn test_sentinel_passes_through() {
        let matches = compute_similarities(&[Prediction::no_signal()]);
        assert_eq!(matches[0].sdg_number, 0);
        assert_eq!(matches[0].avg_similarity, 0.0);
    }
}
