use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;
use strum::Display;
use tracing::{debug, warn};

use super::categories::{sdg_name, SDG_COUNT, SDG_NAMES};
use super::linear::{LinearClassifier, MODEL_FILE};
use super::score::{ConfidenceHistogram, ConfidenceLevel};
use super::zero_shot::BartZeroShot;
use crate::error::BackendError;
use crate::settings::{BackendKind, ModelSettings};
use crate::utils::{log_fallback, log_ml_error, log_ml_model_loaded, log_ml_ready, log_ml_step};

pub const MIN_PROBABILITY: f32 = 0.1;
pub const MAX_LOOKUP_KEYWORDS: usize = 5;
pub const EXPLANATION_KEYWORDS: usize = 3;
pub const FALLBACK_WEIGHT: f32 = 0.3;
pub const FALLBACK_CAP: f32 = 0.9;
pub const DETAILED_TOP_K: usize = 3;
pub const MAX_SUMMARY_KEYWORDS: usize = 20;

pub const NO_SIGNAL_NAME: &str = "No SDGs Detected";

const FALLBACK_EXPLANATION: &str =
    "Fallback keyword prediction, no classifier backend produced a result";
const NO_SIGNAL_EXPLANATION: &str =
    "No relevant SDGs detected. Configure a classifier backend for model-based analysis.";

pub const ZERO_SHOT_LABELS: [&str; SDG_COUNT] = [
    "No Poverty - ending poverty in all forms",
    "Zero Hunger - food security and nutrition",
    "Good Health and Well-being - health and wellness",
    "Quality Education - inclusive education",
    "Gender Equality - women empowerment",
    "Clean Water and Sanitation - water access",
    "Affordable and Clean Energy - renewable energy",
    "Decent Work and Economic Growth - employment",
    "Industry Innovation and Infrastructure - technology",
    "Reduced Inequality - social equality",
    "Sustainable Cities and Communities - urban development",
    "Responsible Consumption and Production - sustainability",
    "Climate Action - climate change mitigation",
    "Life Below Water - ocean conservation",
    "Life on Land - biodiversity protection",
    "Peace Justice and Strong Institutions - governance",
    "Partnerships for the Goals - global cooperation",
];

const KEYWORD_LOOKUP: &[(u8, &[&str])] = &[
    (1, &["poverty", "poor", "low income", "financial hardship", "economic disadvantage"]),
    (2, &["hunger", "food security", "malnutrition", "famine", "agriculture", "crop"]),
    (3, &["health", "well-being", "disease", "medical", "healthcare", "hygiene", "mental health"]),
    (4, &["education", "school", "learning", "literacy", "educational", "student", "teacher"]),
    (5, &["gender", "equality", "women", "female", "discrimination", "empowerment"]),
    (6, &["water", "sanitation", "clean water", "hygiene", "wastewater", "water quality"]),
    (7, &["energy", "renewable", "solar", "wind", "electricity", "affordable energy"]),
    (8, &["employment", "decent work", "economic growth", "labour", "jobs"]),
    (9, &["infrastructure", "innovation", "industry", "technology", "manufacturing"]),
    (10, &["inequality", "inclusion", "discrimination", "migrants", "marginalized"]),
    (11, &["urban", "cities", "housing", "transport", "community"]),
    (12, &["consumption", "production", "recycling", "waste", "circular economy"]),
    (13, &["climate", "carbon", "emission", "global warming", "sustainability", "environmental"]),
    (14, &["ocean", "marine", "fisheries", "coastal", "coral"]),
    (15, &["forest", "biodiversity", "ecosystem", "wildlife", "conservation", "land"]),
    (16, &["peace", "justice", "governance", "corruption", "institutions"]),
    (17, &["partnership", "cooperation", "collaboration", "capacity building", "global"]),
];

const FALLBACK_KEYWORDS: &[(u8, &[&str])] = &[
    (1, &["poverty", "poor", "low income"]),
    (2, &["hunger", "food security", "malnutrition"]),
    (3, &["health", "medical", "disease", "well-being"]),
    (13, &["climate", "carbon", "emission", "global warming"]),
    (15, &["forest", "biodiversity", "ecosystem", "wildlife"]),
];

/// How zero-shot results get their goal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelNumbering {
    /// Recover the goal from the label text.
    #[default]
    ParsedLabel,
    /// Number results 1, 2, 3... by rank, whatever the label says.
    RankPosition,
}

pub trait ProbabilityModel {
    /// One probability per goal, index 0 being SDG 1.
    fn predict_proba(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}

pub trait RelevanceModel {
    /// An independent relevance score per label, in any order.
    fn predict_multilabel(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Vec<(String, f32)>, BackendError>;
}

#[derive(Display)]
pub enum Classifier {
    #[strum(to_string = "trained classifier")]
    Trained(Box<dyn ProbabilityModel>),
    #[strum(to_string = "zero-shot classifier")]
    ZeroShot(Box<dyn RelevanceModel>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub sdg_number: u8,
    pub sdg_name: String,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    pub explanation: String,
}

impl Prediction {
    pub fn no_signal() -> Self {
        Self {
            sdg_number: 0,
            sdg_name: NO_SIGNAL_NAME.to_string(),
            confidence: 0.0,
            matched_keywords: Vec::new(),
            explanation: NO_SIGNAL_EXPLANATION.to_string(),
        }
    }

    pub fn is_no_signal(&self) -> bool {
        self.sdg_number == 0
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lowercase letters and single spaces, matching what the trained classifier
/// saw at training time.
pub fn preprocess_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let letters: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Light cleanup for the zero-shot model: non-ASCII becomes a space and
/// whitespace runs collapse.
pub fn clean_text(text: &str) -> String {
    let ascii: String = text
        .chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn extract_keywords(text: &str, sdg_number: u8) -> Vec<String> {
    let text_lower = text.to_lowercase();
    KEYWORD_LOOKUP
        .iter()
        .find(|(number, _)| *number == sdg_number)
        .map(|(_, keywords)| {
            keywords
                .iter()
                .filter(|kw| text_lower.contains(*kw))
                .take(MAX_LOOKUP_KEYWORDS)
                .map(|kw| kw.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn explanation_template(level: ConfidenceLevel) -> &'static str {
    match level {
        ConfidenceLevel::High => "Strong match with relevant terminology and context",
        ConfidenceLevel::Medium => "Moderate match with some relevant indicators present",
        ConfidenceLevel::Low => "Weak match, may require manual verification",
    }
}

pub fn generate_explanation(confidence: f32, keywords: &[String]) -> String {
    let template = explanation_template(ConfidenceLevel::from_score(confidence));
    let key_terms = if keywords.is_empty() {
        "general terms".to_string()
    } else {
        keywords
            .iter()
            .take(EXPLANATION_KEYWORDS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{template}. Key terms: {key_terms}.")
}

fn model_prediction(text: &str, sdg_number: u8, sdg_name: String, confidence: f32) -> Prediction {
    let matched_keywords = extract_keywords(text, sdg_number);
    let explanation = generate_explanation(confidence, &matched_keywords);
    Prediction {
        sdg_number,
        sdg_name,
        confidence,
        matched_keywords,
        explanation,
    }
}

/// Deterministic keyword counting over a handful of core goals, used whenever
/// no backend result is available. Yields the no-signal sentinel when nothing
/// matches.
pub fn fallback_prediction(text: &str, top_k: usize) -> Vec<Prediction> {
    let text_lower = text.to_lowercase();

    let mut counts: Vec<(u8, Vec<&str>)> = FALLBACK_KEYWORDS
        .iter()
        .map(|(number, keywords)| {
            let found = keywords
                .iter()
                .copied()
                .filter(|kw| text_lower.contains(kw))
                .collect();
            (*number, found)
        })
        .collect();
    counts.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let results: Vec<Prediction> = counts
        .into_iter()
        .take(top_k)
        .filter(|(_, found)| !found.is_empty())
        .filter_map(|(number, found)| {
            let name = sdg_name(number)?;
            Some(Prediction {
                sdg_number: number,
                sdg_name: name.to_string(),
                confidence: (found.len() as f32 * FALLBACK_WEIGHT).min(FALLBACK_CAP),
                matched_keywords: found.into_iter().map(String::from).collect(),
                explanation: FALLBACK_EXPLANATION.to_string(),
            })
        })
        .collect();

    if results.is_empty() {
        vec![Prediction::no_signal()]
    } else {
        results
    }
}

fn check_score(score: f32) -> Result<f32, BackendError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(BackendError::InvalidOutput {
            reason: format!("score {score} outside [0, 1]"),
        })
    }
}

/// The model adapter: owns the optional backend and turns its raw output into
/// uniform predictions.
pub struct SdgModel {
    classifier: Option<Classifier>,
    max_input_chars: usize,
    label_numbering: LabelNumbering,
}

impl SdgModel {
    pub fn new(
        classifier: Option<Classifier>,
        max_input_chars: usize,
        label_numbering: LabelNumbering,
    ) -> Self {
        Self {
            classifier,
            max_input_chars,
            label_numbering,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn try_predict(&self, text: &str, top_k: usize) -> Result<Vec<Prediction>, BackendError> {
        let classifier = self.classifier.as_ref().ok_or(BackendError::Unavailable)?;
        let input = truncate_chars(text, self.max_input_chars);

        match classifier {
            Classifier::Trained(model) => self.predict_trained(model.as_ref(), input, text, top_k),
            Classifier::ZeroShot(model) => {
                self.predict_zero_shot(model.as_ref(), input, text, top_k)
            }
        }
    }

    /// Never fails: any backend problem resolves to the keyword fallback.
    pub fn predict(&self, text: &str, top_k: usize) -> Vec<Prediction> {
        match self.try_predict(text, top_k) {
            Ok(predictions) => predictions,
            Err(BackendError::Unavailable) => {
                debug!("no classifier loaded, using keyword fallback");
                fallback_prediction(text, top_k)
            }
            Err(e) => {
                warn!("{e}; using keyword fallback");
                fallback_prediction(text, top_k)
            }
        }
    }

    fn predict_trained(
        &self,
        model: &dyn ProbabilityModel,
        input: &str,
        original: &str,
        top_k: usize,
    ) -> Result<Vec<Prediction>, BackendError> {
        let probabilities = model.predict_proba(&preprocess_text(input))?;
        if probabilities.len() != SDG_COUNT {
            return Err(BackendError::InvalidOutput {
                reason: format!(
                    "expected {SDG_COUNT} probabilities, got {}",
                    probabilities.len()
                ),
            });
        }

        let mut ranked = probabilities
            .iter()
            .map(|p| check_score(*p))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .enumerate()
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(ranked
            .into_iter()
            .take(top_k)
            .filter(|(idx, prob)| {
                let keep = *prob >= MIN_PROBABILITY;
                if !keep {
                    debug!(sdg = idx + 1, prob, "skipping low-probability goal");
                }
                keep
            })
            .map(|(idx, prob)| {
                model_prediction(original, idx as u8 + 1, SDG_NAMES[idx].to_string(), prob)
            })
            .collect())
    }

    fn predict_zero_shot(
        &self,
        model: &dyn RelevanceModel,
        input: &str,
        original: &str,
        top_k: usize,
    ) -> Result<Vec<Prediction>, BackendError> {
        let mut scores = model.predict_multilabel(&clean_text(input), &ZERO_SHOT_LABELS)?;
        for (_, score) in &scores {
            check_score(*score)?;
        }
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        scores
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(rank, (label, score))| -> Result<Prediction, BackendError> {
                let label_name = label.split(" - ").next().unwrap_or(&label);
                let (number, name) = match self.label_numbering {
                    LabelNumbering::ParsedLabel => {
                        let number = parse_label_number(&label)?;
                        (number, sdg_name(number).unwrap_or(label_name))
                    }
                    LabelNumbering::RankPosition => (rank as u8 + 1, label_name),
                };
                Ok(model_prediction(original, number, name.to_string(), score))
            })
            .collect()
    }
}

fn parse_label_number(label: &str) -> Result<u8, BackendError> {
    ZERO_SHOT_LABELS
        .iter()
        .position(|l| *l == label)
        .map(|idx| idx as u8 + 1)
        .ok_or_else(|| BackendError::InvalidOutput {
            reason: format!("unknown label '{label}'"),
        })
}

pub fn load_classifier(settings: &ModelSettings) -> Result<Option<Classifier>> {
    match settings.backend {
        BackendKind::None => Ok(None),
        BackendKind::Trained => {
            let path = Path::new(&settings.model_path).join(MODEL_FILE);
            if !path.exists() {
                log_fallback(&format!("no trained model at {}", path.display()));
                return Ok(None);
            }
            let model = LinearClassifier::load(&path)?;
            Ok(Some(Classifier::Trained(Box::new(model))))
        }
        BackendKind::ZeroShot => {
            let model = BartZeroShot::new(settings.hypothesis_template.clone())?;
            Ok(Some(Classifier::ZeroShot(Box::new(model))))
        }
    }
}

/// The adapter's standalone view of its own top predictions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetailedAnalysis {
    pub top_3_sdgs: Vec<Prediction>,
    pub confidence_levels: ConfidenceHistogram,
    pub matched_keywords: Vec<String>,
    pub explanation: String,
}

pub fn detailed_analysis(predictions: &[Prediction]) -> DetailedAnalysis {
    let top: Vec<Prediction> = predictions
        .iter()
        .filter(|p| !p.is_no_signal())
        .take(DETAILED_TOP_K)
        .cloned()
        .collect();

    let mut confidence_levels = ConfidenceHistogram::default();
    for prediction in &top {
        confidence_levels.record(ConfidenceLevel::from_score(prediction.confidence));
    }

    let matched_keywords = top
        .iter()
        .flat_map(|p| p.matched_keywords.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .take(MAX_SUMMARY_KEYWORDS)
        .collect();

    let explanation = if top.is_empty() {
        "No SDGs detected with sufficient confidence.".to_string()
    } else {
        let names: Vec<String> = top
            .iter()
            .map(|p| format!("SDG {}: {}", p.sdg_number, p.sdg_name))
            .collect();
        let scores: Vec<String> = top.iter().map(|p| format!("{:.2}", p.confidence)).collect();
        format!(
            "Top SDGs detected: {}. Confidence scores: {}.",
            names.join(", "),
            scores.join(", ")
        )
    };

    DetailedAnalysis {
        top_3_sdgs: top,
        confidence_levels,
        matched_keywords,
        explanation,
    }
}

pub enum MLRequest {
    Predict {
        text: String,
        top_k: usize,
        response_tx: tokio::sync::oneshot::Sender<Vec<Prediction>>,
    },
}

/// Handle to the worker thread that owns the classifier backend. Backends are
/// loaded once on the worker and never leave it.
#[derive(Clone)]
pub struct MLHandle {
    request_tx: mpsc::Sender<MLRequest>,
}

impl MLHandle {
    pub fn spawn(settings: ModelSettings) -> Result<Self> {
        let load_settings = settings.clone();
        Self::spawn_with(settings, move || load_classifier(&load_settings))
    }

    pub fn spawn_with<F>(settings: ModelSettings, load: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Option<Classifier>> + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<MLRequest>();

        thread::Builder::new()
            .name("sdg-model".into())
            .spawn(move || run_ml_worker(request_rx, settings, load))?;

        Ok(Self { request_tx })
    }

    pub async fn predict(&self, text: String, top_k: usize) -> Vec<Prediction> {
        let (response_tx, response_rx) = tokio::sync::oneshot::channel();

        let request = MLRequest::Predict {
            text: text.clone(),
            top_k,
            response_tx,
        };
        if self.request_tx.send(request).is_err() {
            log_ml_error(&BackendError::WorkerClosed.to_string());
            return fallback_prediction(&text, top_k);
        }

        match response_rx.await {
            Ok(predictions) => predictions,
            Err(_) => {
                warn!("{}; using keyword fallback", BackendError::WorkerClosed);
                fallback_prediction(&text, top_k)
            }
        }
    }

    pub async fn detailed_analysis(&self, text: String) -> DetailedAnalysis {
        detailed_analysis(&self.predict(text, DETAILED_TOP_K).await)
    }
}

fn run_ml_worker<F>(request_rx: mpsc::Receiver<MLRequest>, settings: ModelSettings, load: F)
where
    F: FnOnce() -> Result<Option<Classifier>>,
{
    log_ml_step(&format!("Loading {} backend...", settings.backend));
    let start = Instant::now();
    let classifier = match load() {
        Ok(Some(classifier)) => {
            log_ml_model_loaded(&classifier.to_string(), start.elapsed().as_secs_f32());
            Some(classifier)
        }
        Ok(None) => {
            log_fallback("no classifier backend loaded, keyword fallback active");
            None
        }
        Err(e) => {
            log_ml_error(&format!("Failed to load classifier: {e}"));
            log_fallback("keyword fallback active");
            None
        }
    };

    let model = SdgModel::new(classifier, settings.max_input_chars, settings.label_numbering);
    log_ml_ready();

    for request in request_rx {
        let MLRequest::Predict {
            text,
            top_k,
            response_tx,
        } = request;
        let _ = response_tx.send(model.predict(&text, top_k));
    }
}
