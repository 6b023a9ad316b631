use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use strum::Display;
use tracing::warn;

use crate::scoring::LabelNumbering;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: ModelSettings,
    pub categories: CategorySettings,
    pub input: InputSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[strum(serialize = "trained")]
    Trained,
    #[strum(serialize = "zero-shot")]
    ZeroShot,
    #[strum(serialize = "none")]
    None,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trained" => Some(Self::Trained),
            "zero_shot" | "zero-shot" | "zeroshot" => Some(Self::ZeroShot),
            "none" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub backend: BackendKind,
    pub model_path: String,
    pub max_input_chars: usize,
    pub top_k: usize,
    pub hypothesis_template: String,
    pub label_numbering: LabelNumbering,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Trained,
            model_path: "./models".to_string(),
            max_input_chars: 1000,
            top_k: 5,
            hypothesis_template: "This example is {}.".to_string(),
            label_numbering: LabelNumbering::ParsedLabel,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorySettings {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub min_text_length: usize,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            min_text_length: 50,
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(|| {
            let mut settings = Self::load_from_files(
                Path::new("settings.default.ron"),
                Path::new("settings.ron"),
            );
            settings.apply_env(|key| std::env::var(key).ok());
            settings
        })
    }

    fn read(path: &Path) -> Option<Settings> {
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("failed to read {}: {e}", path.display());
                return None;
            }
        };
        match ron::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!("failed to parse {}: {e}", path.display());
                None
            }
        }
    }

    fn load_from_files(default_path: &Path, override_path: &Path) -> Settings {
        let settings = Self::read(default_path).unwrap_or_default();
        Self::read(override_path).unwrap_or(settings)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("MODEL_PATH") {
            self.model.model_path = path;
        }
        if let Some(backend) = var("SDG_BACKEND") {
            match BackendKind::parse(&backend) {
                Some(kind) => self.model.backend = kind,
                None => warn!("ignoring unknown SDG_BACKEND '{backend}'"),
            }
        }
        if let Some(path) = var("SDG_CATEGORIES") {
            self.categories.path = Some(PathBuf::from(path));
        }
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.model.backend, BackendKind::Trained);
        assert_eq!(s.model.max_input_chars, 1000);
        assert_eq!(s.model.label_numbering, LabelNumbering::ParsedLabel);
        assert!(s.categories.path.is_none());
    }

    #[test]
    fn test_partial_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(model: (backend: zero_shot, label_numbering: rank_position), input: (min_text_length: 10))"#
        )
        .unwrap();

        let s = Settings::load_from_files(Path::new("missing.default.ron"), file.path());
        assert_eq!(s.model.backend, BackendKind::ZeroShot);
        assert_eq!(s.model.label_numbering, LabelNumbering::RankPosition);
        assert_eq!(s.model.max_input_chars, 1000);
        assert_eq!(s.input.min_text_length, 10);
    }

    #[test]
    fn test_unparseable_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not ron at all (").unwrap();
        let s = Settings::load_from_files(file.path(), Path::new("missing.ron"));
        assert_eq!(s.model.top_k, ModelSettings::default().top_k);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MODEL_PATH", "/srv/models"),
            ("SDG_BACKEND", "zero-shot"),
            ("SDG_CATEGORIES", "categories.ron"),
        ]);
        let mut s = Settings::default();
        s.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(s.model.model_path, "/srv/models");
        assert_eq!(s.model.backend, BackendKind::ZeroShot);
        assert_eq!(s.categories.path, Some(PathBuf::from("categories.ron")));

        let mut s = Settings::default();
        s.apply_env(|key| (key == "SDG_BACKEND").then(|| "gpt".to_string()));
        assert_eq!(s.model.backend, BackendKind::Trained);
    }
}
