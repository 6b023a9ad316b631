use crate::settings::settings;
use strum::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    Pass,
    Reject(Filter),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum Filter {
    #[strum(serialize = "empty")]
    Empty,
    #[strum(serialize = "min-length")]
    MinLength,
}

/// Rejects input too short to be worth analyzing. The engine itself accepts
/// anything; this is for callers.
pub fn apply_filters(text: &str) -> FilterResult {
    check_length(text, settings().input.min_text_length)
}

pub fn check_length(text: &str, min_text_length: usize) -> FilterResult {
    let length = text.trim().chars().count();
    if length == 0 {
        return FilterResult::Reject(Filter::Empty);
    }
    if length < min_text_length {
        return FilterResult::Reject(Filter::MinLength);
    }
    FilterResult::Pass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_empty() {
        assert_eq!(check_length("", 10), FilterResult::Reject(Filter::Empty));
        assert_eq!(check_length(" \n ", 10), FilterResult::Reject(Filter::Empty));
    }

    #[test]
    fn test_filter_min_length() {
        assert_eq!(check_length("too short", 10), FilterResult::Reject(Filter::MinLength));
        assert_eq!(check_length("just right", 10), FilterResult::Pass);
    }

    #[test]
    fn test_filter_default_settings() {
        let text = "Access to clean water and sanitation remains uneven across rural regions.";
        assert_eq!(apply_filters(text), FilterResult::Pass);
        assert_eq!(apply_filters("hi"), FilterResult::Reject(Filter::MinLength));
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(Filter::MinLength.to_string(), "min-length");
    }
}
