use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::categories::SdgCategory;
use super::score::{InclusionScope, MatchResult};

static WORD_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

pub const RULE_THRESHOLD: f32 = 0.1;
pub const BROAD_SCOPE_MIN_MATCHES: usize = 3;
pub const MAX_RULE_RESULTS: usize = 10;

// Inclusions weigh 0.3 and exclusions 0.5, kept in tenths so that 2 inclusions
// against 1 exclusion land exactly on the threshold. Capped at 1.0.
const INCLUSION_TENTHS: i32 = 3;
const EXCLUSION_TENTHS: i32 = 5;
const MAX_TENTHS: i32 = 10;

/// Lowercased words of a text, split on anything that isn't a letter or digit.
pub struct WordIndex {
    words: Vec<String>,
}

impl WordIndex {
    pub fn new(text: &str) -> Self {
        let words = WORD_SPLIT
            .split(text)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whole-word match; multi-word keywords must appear as consecutive words.
    pub fn contains(&self, keyword: &str) -> bool {
        let keyword_parts: Vec<String> = WORD_SPLIT
            .split(keyword)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();

        if keyword_parts.is_empty() {
            return false;
        }

        if keyword_parts.len() == 1 {
            self.words.iter().any(|w| *w == keyword_parts[0])
        } else {
            self.words
                .windows(keyword_parts.len())
                .any(|window| window == keyword_parts.as_slice())
        }
    }

    pub fn matches<'a>(&self, keywords: &'a [String]) -> BTreeSet<&'a str> {
        keywords
            .iter()
            .map(|kw| kw.trim())
            .filter(|kw| self.contains(kw))
            .collect()
    }
}

pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    WordIndex::new(text).contains(keyword)
}

pub fn passes_rule_threshold(confidence: f32) -> bool {
    confidence > RULE_THRESHOLD
}

fn rule_confidence(inclusion_count: usize, exclusion_count: usize) -> f32 {
    let tenths =
        inclusion_count as i32 * INCLUSION_TENTHS - exclusion_count as i32 * EXCLUSION_TENTHS;
    tenths.clamp(0, MAX_TENTHS) as f32 / 10.0
}

pub fn score_category(words: &WordIndex, category: &SdgCategory) -> MatchResult {
    let included = words.matches(&category.inclusion_keywords);
    let excluded = words.matches(&category.exclusion_keywords);

    let mut result = MatchResult::new(category.number, category.name.clone());
    result.rule_confidence = rule_confidence(included.len(), excluded.len());
    result.inclusion_scope = if included.len() >= BROAD_SCOPE_MIN_MATCHES {
        InclusionScope::Broad
    } else {
        InclusionScope::Narrow
    };
    result.matched_keywords = included.into_iter().map(String::from).collect();
    result.excluded_keywords = excluded.into_iter().map(String::from).collect();
    result
}

/// Scores `text` against every category's patterns. Categories at or below
/// the rule threshold are dropped; the rest come back strongest first, at most
/// ten of them.
pub fn score(text: &str, categories: &[SdgCategory]) -> Vec<MatchResult> {
    let words = WordIndex::new(text);
    if words.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<MatchResult> = categories
        .iter()
        .map(|category| score_category(&words, category))
        .filter(|result| passes_rule_threshold(result.rule_confidence))
        .collect();

    results.sort_by(|a, b| b.rule_confidence.total_cmp(&a.rule_confidence));
    results.truncate(MAX_RULE_RESULTS);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::categories::default_categories;

    fn category(number: u8, inclusion: &[&str], exclusion: &[&str]) -> SdgCategory {
        SdgCategory {
            number,
            name: format!("Goal {number}"),
            inclusion_keywords: inclusion.iter().map(|s| s.to_string()).collect(),
            exclusion_keywords: exclusion.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_whole_word_matching() {
        assert!(contains_keyword("Protecting the OCEAN floor", "ocean"));
        assert!(!contains_keyword("A career in oceanography", "ocean"));
        assert!(contains_keyword("households on low-income wages", "low income"));
        assert!(contains_keyword("mental well-being matters", "well-being"));
        assert!(!contains_keyword("a low and steady income", "low income"));
        assert!(!contains_keyword("anything", "  "));
    }

    #[test]
    fn test_accented_letters_are_part_of_words() {
        assert!(!contains_keyword("Pesca en Oceanía", "ocean"));
        assert!(contains_keyword("Pesca en Oceanía", "oceanía"));
        assert!(contains_keyword("ÉDUCATION pour tous", "éducation"));

        let categories = vec![category(14, &["ocean"], &[])];
        assert!(score("Pesca en Oceanía y el Pacífico", &categories).is_empty());
        assert_eq!(score("Pesca en el ocean Pacífico", &categories).len(), 1);
    }

    #[test]
    fn test_poverty_scenario() {
        let text = "This project addresses poverty and low income through sustainable agriculture.";
        let results = score(text, &default_categories());

        let poverty = results.iter().find(|r| r.sdg_number == 1).unwrap();
        assert!(poverty.matched_keywords.contains("poverty"));
        assert!(poverty.matched_keywords.contains("low income"));
        assert_eq!(poverty.inclusion_scope, InclusionScope::Narrow);
        assert!((poverty.rule_confidence - 0.6).abs() < 1e-6);

        assert_eq!(results[0].sdg_number, 1);
        assert!(results.iter().any(|r| r.sdg_number == 2));
    }

    #[test]
    fn test_rule_confidence_counts_distinct_inclusions() {
        let categories = vec![category(7, &["solar", "wind power", "grid", "battery"], &[])];

        for n in 1..=3 {
            let text = ["solar", "wind power", "grid"][..n].join(" and ");
            let text = format!("{text} {text}");
            let results = score(&text, &categories);
            assert_eq!(results.len(), 1);
            assert!((results[0].rule_confidence - 0.3 * n as f32).abs() < 1e-6);
        }

        let saturated = score("solar wind power grid battery", &categories);
        assert_eq!(saturated[0].rule_confidence, 1.0);
    }

    #[test]
    fn test_broad_scope_needs_more_than_two() {
        let categories = vec![category(15, &["forest", "wildlife", "ecosystem"], &[])];

        let narrow = score("forest wildlife", &categories);
        assert_eq!(narrow[0].inclusion_scope, InclusionScope::Narrow);

        let broad = score("forest wildlife ecosystem", &categories);
        assert_eq!(broad[0].inclusion_scope, InclusionScope::Broad);
    }

    #[test]
    fn test_exclusions_subtract() {
        let categories = vec![category(1, &["poverty", "poor"], &["luxury"])];

        // 0.6 - 0.5 sits exactly on the threshold and is dropped
        assert!(score("poverty among the poor next to luxury", &categories).is_empty());
        assert!(score("luxury", &categories).is_empty());

        let results = score("poverty among the poor", &categories);
        assert_eq!(results.len(), 1);
        assert!(results[0].excluded_keywords.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!passes_rule_threshold(0.1));
        assert!(passes_rule_threshold(0.1000001));
        assert!(passes_rule_threshold(0.3));
        assert!(!passes_rule_threshold(0.0));
    }

    #[test]
    fn test_empty_text() {
        assert!(score("", &default_categories()).is_empty());
        assert!(score("   \n\t ", &default_categories()).is_empty());
    }

    #[test]
    fn test_sorted_and_truncated() {
        let categories: Vec<SdgCategory> = (1..=12)
            .map(|n| category(n, &["shared"], &[]))
            .chain(std::iter::once(category(13, &["shared", "climate"], &[])))
            .collect();

        let results = score("shared climate", &categories);
        assert_eq!(results.len(), MAX_RULE_RESULTS);
        assert_eq!(results[0].sdg_number, 13);
        assert!(results
            .windows(2)
            .all(|w| w[0].rule_confidence >= w[1].rule_confidence));
    }
}
