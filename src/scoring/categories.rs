use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const SDG_COUNT: usize = 17;

pub const SDG_NAMES: [&str; SDG_COUNT] = [
    "No Poverty",
    "Zero Hunger",
    "Good Health and Well-being",
    "Quality Education",
    "Gender Equality",
    "Clean Water and Sanitation",
    "Affordable and Clean Energy",
    "Decent Work and Economic Growth",
    "Industry, Innovation and Infrastructure",
    "Reduced Inequality",
    "Sustainable Cities and Communities",
    "Responsible Consumption and Production",
    "Climate Action",
    "Life Below Water",
    "Life on Land",
    "Peace, Justice and Strong Institutions",
    "Partnerships for the Goals",
];

pub fn sdg_name(number: u8) -> Option<&'static str> {
    match number {
        1..=17 => Some(SDG_NAMES[number as usize - 1]),
        _ => None,
    }
}

/// One SDG with the patterns that count for and against it.
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdgCategory {
    pub number: u8,
    pub name: String,
    #[serde(default)]
    pub inclusion_keywords: Vec<String>,
    #[serde(default)]
    pub exclusion_keywords: Vec<String>,
}

impl SdgCategory {
    fn builtin(number: u8, inclusion: &[&str], exclusion: &[&str]) -> Self {
        Self {
            number,
            name: SDG_NAMES[number as usize - 1].to_string(),
            inclusion_keywords: inclusion.iter().map(|s| s.to_string()).collect(),
            exclusion_keywords: exclusion.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_categories() -> Vec<SdgCategory> {
    vec![
        SdgCategory::builtin(
            1,
            &[
                "poverty",
                "poor",
                "low income",
                "financial hardship",
                "economic disadvantage",
                "income inequality",
            ],
            &["rich", "wealthy", "high income", "luxury"],
        ),
        SdgCategory::builtin(
            2,
            &[
                "hunger",
                "food security",
                "malnutrition",
                "famine",
                "food shortage",
                "agriculture",
                "crop production",
            ],
            &["food waste", "overconsumption", "obesity"],
        ),
        SdgCategory::builtin(
            3,
            &[
                "health",
                "well-being",
                "disease prevention",
                "healthcare",
                "medical",
                "vaccination",
                "mental health",
                "hygiene",
            ],
            &["disease outbreak", "pandemic", "health crisis"],
        ),
        SdgCategory::builtin(
            4,
            &[
                "education",
                "school",
                "literacy",
                "learning",
                "teacher",
                "student",
                "vocational training",
            ],
            &["machine learning", "deep learning"],
        ),
        SdgCategory::builtin(
            5,
            &[
                "gender",
                "women",
                "girls",
                "gender equality",
                "empowerment",
                "gender-based violence",
            ],
            &["gender bias in algorithms"],
        ),
        SdgCategory::builtin(
            6,
            &[
                "clean water",
                "sanitation",
                "drinking water",
                "wastewater",
                "water quality",
                "water scarcity",
            ],
            &["water polo"],
        ),
        SdgCategory::builtin(
            7,
            &[
                "renewable energy",
                "solar",
                "wind power",
                "energy efficiency",
                "electricity access",
                "clean energy",
            ],
            &["fossil fuel subsidy"],
        ),
        SdgCategory::builtin(
            8,
            &[
                "employment",
                "decent work",
                "economic growth",
                "labour",
                "unemployment",
                "productivity",
            ],
            &["child labour"],
        ),
        SdgCategory::builtin(
            9,
            &[
                "infrastructure",
                "innovation",
                "industrialization",
                "manufacturing",
                "research and development",
                "technology",
            ],
            &[],
        ),
        SdgCategory::builtin(
            10,
            &[
                "inequality",
                "inclusion",
                "discrimination",
                "migrants",
                "marginalized",
                "social protection",
            ],
            &[],
        ),
        SdgCategory::builtin(
            11,
            &[
                "urban",
                "cities",
                "housing",
                "public transport",
                "urbanization",
                "slums",
            ],
            &[],
        ),
        SdgCategory::builtin(
            12,
            &[
                "consumption",
                "recycling",
                "circular economy",
                "waste management",
                "resource efficiency",
                "sustainable production",
            ],
            &[],
        ),
        SdgCategory::builtin(
            13,
            &[
                "climate",
                "climate change",
                "carbon",
                "emission",
                "global warming",
                "greenhouse gas",
            ],
            &["climate of opinion"],
        ),
        SdgCategory::builtin(
            14,
            &[
                "ocean",
                "marine",
                "fisheries",
                "coral reef",
                "coastal",
                "overfishing",
            ],
            &[],
        ),
        SdgCategory::builtin(
            15,
            &[
                "forest",
                "biodiversity",
                "ecosystem",
                "wildlife",
                "deforestation",
                "desertification",
            ],
            &[],
        ),
        SdgCategory::builtin(
            16,
            &[
                "peace",
                "justice",
                "corruption",
                "governance",
                "rule of law",
                "violence",
            ],
            &[],
        ),
        SdgCategory::builtin(
            17,
            &[
                "partnership",
                "cooperation",
                "capacity building",
                "development assistance",
                "technology transfer",
                "multi-stakeholder",
            ],
            &[],
        ),
    ]
}

pub fn read_categories(path: &Path) -> Result<Vec<SdgCategory>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let categories: Vec<SdgCategory> =
        ron::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate(&categories)?;
    Ok(categories)
}

fn validate(categories: &[SdgCategory]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Invalid {
            reason: "no categories defined".into(),
        });
    }

    let mut seen = HashSet::new();
    for category in categories {
        if sdg_name(category.number).is_none() {
            return Err(ConfigError::Invalid {
                reason: format!("category number {} is outside 1-17", category.number),
            });
        }
        if !seen.insert(category.number) {
            return Err(ConfigError::Invalid {
                reason: format!("category {} is defined twice", category.number),
            });
        }
    }

    Ok(())
}

/// Reads the category table from `path`, or the built-in table when there is
/// no path or the file can't be used.
pub fn load_categories(path: Option<&Path>) -> Vec<SdgCategory> {
    let Some(path) = path else {
        debug!("no category source configured, using built-in table");
        return default_categories();
    };

    match read_categories(path) {
        Ok(categories) => {
            debug!(count = categories.len(), path = %path.display(), "loaded categories");
            categories
        }
        Err(e) => {
            warn!("{e}; using built-in category table");
            default_categories()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_table_covers_every_goal() {
        let categories = default_categories();
        assert_eq!(categories.len(), SDG_COUNT);
        for (idx, category) in categories.iter().enumerate() {
            assert_eq!(category.number as usize, idx + 1);
            assert!(!category.inclusion_keywords.is_empty());
        }
        assert!(validate(&categories).is_ok());
    }

    #[test]
    fn test_sdg_name_bounds() {
        assert_eq!(sdg_name(1), Some("No Poverty"));
        assert_eq!(sdg_name(17), Some("Partnerships for the Goals"));
        assert_eq!(sdg_name(0), None);
        assert_eq!(sdg_name(18), None);
    }

    #[test]
    fn test_missing_source_falls_back() {
        let categories = load_categories(Some(Path::new("does/not/exist.ron")));
        assert_eq!(categories, default_categories());
        assert_eq!(load_categories(None), default_categories());
    }

    #[test]
    fn test_reads_ron_table() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                (number: 14, name: "Life Below Water", inclusion_keywords: ["ocean", "reef"]),
            ]"#
        )
        .unwrap();

        let categories = load_categories(Some(file.path()));
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].number, 14);
        assert_eq!(categories[0].inclusion_keywords, vec!["ocean", "reef"]);
        assert!(categories[0].exclusion_keywords.is_empty());
    }

    #[test]
    fn test_duplicate_numbers_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[(number: 3, name: "A"), (number: 3, name: "B")]"#
        )
        .unwrap();

        assert!(matches!(
            read_categories(file.path()),
            Err(ConfigError::Invalid { .. })
        ));
        assert_eq!(load_categories(Some(file.path())).len(), SDG_COUNT);
    }
}
