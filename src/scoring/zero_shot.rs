use anyhow::Result;
use rust_bert::pipelines::zero_shot_classification::ZeroShotClassificationModel;

use super::classification::RelevanceModel;
use crate::error::BackendError;

const MAX_SEQUENCE_LENGTH: usize = 128;

/// Zero-shot NLI classifier (bart-large-mnli by default) scoring every label
/// independently.
pub struct BartZeroShot {
    model: ZeroShotClassificationModel,
    hypothesis_template: String,
}

impl BartZeroShot {
    pub fn new(hypothesis_template: impl Into<String>) -> Result<Self> {
        let model = ZeroShotClassificationModel::new(Default::default())?;
        Ok(Self {
            model,
            hypothesis_template: hypothesis_template.into(),
        })
    }
}

impl RelevanceModel for BartZeroShot {
    fn predict_multilabel(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Vec<(String, f32)>, BackendError> {
        let template = self.hypothesis_template.clone();
        let predictions = self.model.predict_multilabel(
            [text],
            labels,
            Some(Box::new(move |label: &str| template.replace("{}", label))),
            MAX_SEQUENCE_LENGTH,
        )?;

        let labels = predictions
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidOutput {
                reason: "no prediction for input".into(),
            })?;

        Ok(labels
            .into_iter()
            .map(|l| (l.text, l.score as f32))
            .collect())
    }
}
