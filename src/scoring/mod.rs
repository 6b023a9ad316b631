pub mod categories;
pub mod classification;
pub mod filters;
pub mod fusion;
mod linear;
pub mod pipeline;
pub mod relevance;
pub mod score;
pub mod semantic;
mod zero_shot;

pub use categories::{default_categories, load_categories, SdgCategory};
pub use classification::{
    detailed_analysis, fallback_prediction, Classifier, DetailedAnalysis, LabelNumbering,
    MLHandle, Prediction, ProbabilityModel, RelevanceModel, SdgModel,
};
pub use filters::{apply_filters, Filter, FilterResult};
pub use fusion::{fuse, AnalysisReport, Explanation};
pub use linear::LinearClassifier;
pub use pipeline::{Analysis, Analyzer, SdgAnalysis, SdgAnalysisEntry};
pub use relevance::score;
pub use score::{ConfidenceHistogram, ConfidenceLevel, InclusionScope, MatchResult};
pub use semantic::{compute_similarities, SemanticMatch};
pub use zero_shot::BartZeroShot;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::fusion::NO_SDGS_SUMMARY;

    fn confidences_in_range(report: &AnalysisReport) -> bool {
        report.top_3_sdgs.iter().all(|e| {
            [e.combined_confidence, e.rule_confidence, e.semantic_confidence]
                .iter()
                .all(|c| !c.is_nan() && (0.0..=1.0).contains(c))
        })
    }

    #[test]
    fn test_full_pass_without_model() {
        let text = "Our cooperative fights rural poverty and hunger. Malnutrition and food \
                    security programmes run alongside health clinics and forest restoration.";
        let categories = default_categories();
        let model = SdgModel::new(None, 1000, LabelNumbering::ParsedLabel);

        let rule_results = score(text, &categories);
        let semantic_results = compute_similarities(&model.predict(text, 5));
        let report = fuse(&rule_results, &semantic_results);

        assert_eq!(report.top_3_sdgs.len(), 3);
        assert_eq!(report.top_3_sdgs[0].sdg_number, 2);
        assert_eq!(report.confidence_levels.total(), 3);
        assert!(confidences_in_range(&report));
        assert!(report.top_3_sdgs.iter().all(|e| e.sdg_number != 0));
    }

    #[test]
    fn test_full_pass_zero_shot_mock() {
        struct Uniform;

        impl RelevanceModel for Uniform {
            fn predict_multilabel(
                &self,
                _text: &str,
                labels: &[&str],
            ) -> Result<Vec<(String, f32)>, crate::error::BackendError> {
                Ok(labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| (l.to_string(), 1.0 - i as f32 * 0.05))
                    .collect())
            }
        }

        let model = SdgModel::new(
            Some(Classifier::ZeroShot(Box::new(Uniform))),
            1000,
            LabelNumbering::ParsedLabel,
        );
        let predictions = model.predict("anything at all", 3);
        assert_eq!(predictions.len(), 3);
        assert_eq!(predictions[0].sdg_name, "No Poverty");

        let report = fuse(&[], &compute_similarities(&predictions));
        let numbers: Vec<u8> = report.top_3_sdgs.iter().map(|e| e.sdg_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(confidences_in_range(&report));
    }

    #[test]
    fn test_goal_name_matches_across_sources() {
        struct InfrastructureOnly;

        impl RelevanceModel for InfrastructureOnly {
            fn predict_multilabel(
                &self,
                _text: &str,
                labels: &[&str],
            ) -> Result<Vec<(String, f32)>, crate::error::BackendError> {
                Ok(vec![(labels[8].to_string(), 0.8)])
            }
        }

        let model = SdgModel::new(
            Some(Classifier::ZeroShot(Box::new(InfrastructureOnly))),
            1000,
            LabelNumbering::ParsedLabel,
        );
        let text = "New rail infrastructure and broadband for rural industrialization.";
        let semantic = compute_similarities(&model.predict(text, 3));

        let model_only = fuse(&[], &semantic);
        let combined = fuse(&score(text, &default_categories()), &semantic);

        let expected = "Industry, Innovation and Infrastructure";
        assert_eq!(model_only.top_3_sdgs[0].sdg_name, expected);
        assert_eq!(combined.top_3_sdgs[0].sdg_number, 9);
        assert_eq!(combined.top_3_sdgs[0].sdg_name, expected);
    }

    #[test]
    fn test_no_signal_document() {
        let text = "Minutes of the chess club annual meeting.";
        let model = SdgModel::new(None, 1000, LabelNumbering::ParsedLabel);
        let predictions = model.predict(text, 5);
        assert!(predictions[0].is_no_signal());

        let report = fuse(
            &score(text, &default_categories()),
            &compute_similarities(&predictions),
        );
        assert_eq!(report.overall_summary, NO_SDGS_SUMMARY);
    }
}
