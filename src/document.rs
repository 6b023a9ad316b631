use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Structured text handed over by the ingestion step (PDF extraction lives
/// outside this crate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub page_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub text_length: usize,
}

impl Document {
    pub fn from_plain_text(text: impl Into<String>) -> Self {
        Self {
            full_text: text.into(),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Reads a JSON bundle when the extension says so, plain text otherwise.
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            return Self::from_json_file(path);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::from_plain_text(text))
    }

    /// Title, abstract, keywords and body joined into the single text the
    /// engine scores.
    pub fn analysis_text(&self) -> String {
        let keywords = self.keywords.join(" ");
        [
            self.title.as_str(),
            self.abstract_text.as_str(),
            keywords.as_str(),
            self.full_text.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            title: self.title.clone(),
            abstract_text: self.abstract_text.clone(),
            keywords: self.keywords.clone(),
            text_length: self.full_text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_analysis_text_skips_empty_parts() {
        let doc = Document {
            title: "Ocean Health".into(),
            abstract_text: String::new(),
            keywords: vec!["coral reef".into(), "fisheries".into()],
            full_text: "  Body text.  ".into(),
            page_count: None,
        };
        assert_eq!(doc.analysis_text(), "Ocean Health coral reef fisheries Body text.");
        assert_eq!(Document::default().analysis_text(), "");
    }

    #[test]
    fn test_summary_counts_characters() {
        let doc = Document::from_plain_text("Éducation");
        assert_eq!(doc.summary().text_length, 9);
    }

    #[test]
    fn test_reads_json_bundle() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"title": "Solar Villages", "abstract": "Off-grid power.", "keywords": ["solar"], "full_text": "..."}}"#
        )
        .unwrap();

        let doc = Document::from_path(file.path()).unwrap();
        assert_eq!(doc.title, "Solar Villages");
        assert_eq!(doc.abstract_text, "Off-grid power.");
        assert_eq!(doc.page_count, None);

        let json = serde_json::to_value(doc.summary()).unwrap();
        assert_eq!(json["abstract"], "Off-grid power.");
        assert_eq!(json["text_length"], 3);
    }

    #[test]
    fn test_reads_plain_text() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "Plain body").unwrap();
        let doc = Document::from_path(file.path()).unwrap();
        assert_eq!(doc.full_text, "Plain body");
        assert!(doc.title.is_empty());
    }
}
