use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::categories::SDG_COUNT;
use super::classification::ProbabilityModel;
use crate::error::BackendError;

pub const MODEL_FILE: &str = "sdg_classifier.ron";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassWeights {
    #[serde(default)]
    pub bias: f32,
    #[serde(default)]
    pub weights: HashMap<String, f32>,
}

/// Bag-of-words softmax classifier over the 17 goals, trained offline and
/// shipped as a RON artifact. Expects preprocessed text (lowercase letters and
/// single spaces).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub classes: Vec<ClassWeights>,
}

impl LinearClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let model: LinearClassifier =
            ron::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        ensure!(
            model.classes.len() == SDG_COUNT,
            "expected {} classes, found {}",
            SDG_COUNT,
            model.classes.len()
        );
        Ok(model)
    }

    fn logits(&self, text: &str) -> Vec<f32> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let norm = tokens.len().max(1) as f32;

        self.classes
            .iter()
            .map(|class| {
                let evidence: f32 = tokens
                    .iter()
                    .filter_map(|token| class.weights.get(*token))
                    .sum();
                class.bias + evidence / norm
            })
            .collect()
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

impl ProbabilityModel for LinearClassifier {
    fn predict_proba(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        if self.classes.is_empty() {
            return Err(BackendError::InvalidOutput {
                reason: "model has no classes".into(),
            });
        }
        Ok(softmax(&self.logits(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model_with(sdg: usize, word: &str, weight: f32) -> LinearClassifier {
        let mut classes = vec![ClassWeights::default(); SDG_COUNT];
        classes[sdg - 1].weights.insert(word.to_string(), weight);
        LinearClassifier { classes }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let model = model_with(13, "climate", 20.0);
        let probs = model.predict_proba("climate climate policy").unwrap();
        assert_eq!(probs.len(), SDG_COUNT);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-4);

        let best = probs
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(best, 12);
    }

    #[test]
    fn test_empty_text_is_uniform() {
        let model = model_with(1, "poverty", 5.0);
        let probs = model.predict_proba("").unwrap();
        assert!(probs.iter().all(|p| (p - 1.0 / SDG_COUNT as f32).abs() < 1e-6));
    }

    #[test]
    fn test_load_rejects_wrong_class_count() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(classes: [(bias: 0.0, weights: {{}})])").unwrap();
        assert!(LinearClassifier::load(file.path()).is_err());
    }

    #[test]
    fn test_load_round_trip() {
        let model = model_with(6, "sanitation", 3.0);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", ron::to_string(&model).unwrap()).unwrap();

        let loaded = LinearClassifier::load(file.path()).unwrap();
        assert_eq!(loaded.classes[5].weights.get("sanitation"), Some(&3.0));
    }
}
