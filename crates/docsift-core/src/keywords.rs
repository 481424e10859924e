//! Persona/job keyword modeling: weighted terms plus heading-shape patterns.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AnalysisConfig;

/// Minimum token length kept as a keyword term.
const MIN_TERM_CHARS: usize = 3;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+(?:['\u{2019}\u{2018}\-][a-zA-Z0-9]+)*").unwrap());

static STOP_WORDS: Lazy<std::collections::HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "with", "from", "that", "this", "have", "are", "was", "were",
        "been", "being", "has", "had", "does", "did", "will", "would", "could", "should",
        "may", "might", "must", "shall", "can", "not", "but", "its", "our", "their", "your",
        "into", "over", "under", "about", "between", "through", "during", "before", "after",
        "above", "below", "each", "every", "both", "few", "more", "most", "other", "some",
        "such", "only", "than", "too", "very",
    ]
    .into_iter()
    .collect()
});

// Heading shapes are persona-independent and always part of the model.
static TITLE_CASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][a-zA-Z\s\-:]+$").unwrap());
static NUMBERED_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)*\.?\s+\S").unwrap());
static ALL_CAPS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s\-:]+$").unwrap());

/// Weighted keyword terms and compiled heading patterns derived once per run
/// from the persona and job descriptions, then shared read-only by the
/// scorer and the refiner.
///
/// Building is a pure function of its inputs: the same persona and job
/// strings always produce the same model.
#[derive(Debug, Clone)]
pub struct KeywordModel {
    /// Term weights in (0.0, 1.0]. Kept in a `BTreeMap` so that weight
    /// sums are accumulated in a fixed order and repeated runs produce
    /// bit-identical scores.
    terms: BTreeMap<String, f64>,
    patterns: Vec<Regex>,
}

impl KeywordModel {
    /// Derive a model from free-text persona and job descriptions.
    ///
    /// Terms are lowercased tokens minus stop words; each term's weight is
    /// proportional to its length times its frequency across both inputs,
    /// normalized so the heaviest term weighs 1.0. Longer, repeated domain
    /// nouns therefore outrank short generic verbs. Empty inputs yield an
    /// empty term map and scoring falls back to structural signals alone.
    pub fn build(persona: &str, job: &str, config: &AnalysisConfig) -> Self {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for token in tokenize(persona).into_iter().chain(tokenize(job)) {
            *counts.entry(token).or_insert(0) += 1;
        }

        let max_raw = counts
            .iter()
            .map(|(term, count)| (term.len() * count) as f64)
            .fold(0.0_f64, f64::max);

        let terms = if max_raw > 0.0 {
            counts
                .into_iter()
                .map(|(term, count)| {
                    let raw = (term.len() * count) as f64;
                    (term, raw / max_raw)
                })
                .collect()
        } else {
            BTreeMap::new()
        };

        let patterns = vec![
            config
                .title_case_re
                .as_ref()
                .unwrap_or(&TITLE_CASE_RE)
                .clone(),
            config
                .numbered_heading_re
                .as_ref()
                .unwrap_or(&NUMBERED_HEADING_RE)
                .clone(),
            config.all_caps_re.as_ref().unwrap_or(&ALL_CAPS_RE).clone(),
        ];

        Self { terms, patterns }
    }

    /// True when no terms survived tokenization (structural-only fallback).
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Keyword relevance of `text` in [0.0, 1.0]: the capped sum of the
    /// weights of every term contained in the lowercased text.
    pub fn term_score(&self, text: &str) -> f64 {
        self.weight_sum(text).min(1.0)
    }

    /// Uncapped sum of matched term weights. Used where volume of keyword
    /// evidence matters, not just presence.
    pub fn weight_sum(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        self.terms
            .iter()
            .filter(|(term, _)| lower.contains(term.as_str()))
            .map(|(_, weight)| weight)
            .sum()
    }

    /// Terms contained in the lowercased text, in term order.
    pub fn matching_terms(&self, text: &str) -> Vec<&str> {
        let lower = text.to_lowercase();
        self.terms
            .keys()
            .filter(|term| lower.contains(term.as_str()))
            .map(|term| term.as_str())
            .collect()
    }

    /// True if any heading-shape pattern matches `text`.
    pub fn pattern_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// True if `text` contains a keyword term or matches a pattern.
    pub fn has_any_match(&self, text: &str) -> bool {
        self.pattern_match(text) || {
            let lower = text.to_lowercase();
            self.terms.keys().any(|term| lower.contains(term.as_str()))
        }
    }
}

/// Lowercased tokens of `text`, minus stop words and short fragments.
fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.len() >= MIN_TERM_CHARS && !STOP_WORDS.contains(w.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(persona: &str, job: &str) -> KeywordModel {
        KeywordModel::build(persona, job, &AnalysisConfig::default())
    }

    // ── tokenization and weighting ──

    #[test]
    fn test_tokenize_drops_stop_words() {
        let tokens = tokenize("the methodology and the results");
        assert_eq!(tokens, vec!["methodology", "results"]);
    }

    #[test]
    fn test_tokenize_handles_hyphens_and_digits() {
        let tokens = tokenize("job-to-be-done 3D analysis");
        assert!(tokens.contains(&"job-to-be-done".to_string()));
        assert!(tokens.contains(&"analysis".to_string()));
    }

    #[test]
    fn test_longer_terms_outweigh_shorter() {
        let m = model("Researcher", "map methodology");
        let methodology = m.weight_sum("methodology");
        let map = m.weight_sum("map");
        assert!(
            methodology > map,
            "methodology {} should outweigh map {}",
            methodology,
            map
        );
    }

    #[test]
    fn test_repeated_terms_gain_weight() {
        let m = model("travel planner", "plan travel for a travel group");
        let travel = m.weight_sum("travel");
        let group = m.weight_sum("group");
        assert!(travel > group, "travel {} vs group {}", travel, group);
    }

    #[test]
    fn test_heaviest_term_normalized_to_one() {
        let m = model("Researcher", "literature review methodology");
        let max = m
            .terms
            .values()
            .fold(0.0_f64, |a, &b| a.max(b));
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs_give_empty_model() {
        let m = model("", "");
        assert!(m.is_empty());
        assert_eq!(m.term_score("anything at all"), 0.0);
    }

    #[test]
    fn test_stop_word_only_inputs_give_empty_model() {
        let m = model("the and for", "with from that");
        assert!(m.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = model("PhD Researcher", "summarize methodologies");
        let b = model("PhD Researcher", "summarize methodologies");
        assert_eq!(a.terms, b.terms);
    }

    // ── scoring ──

    #[test]
    fn test_term_score_capped_at_one() {
        let m = model(
            "travel planner",
            "plan trip travel cities restaurants hotels nightlife",
        );
        let loaded = "travel cities restaurants hotels nightlife trip planner";
        assert!(m.weight_sum(loaded) > 1.0, "enough hits to exceed the cap");
        assert!((m.term_score(loaded) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_term_score_case_insensitive() {
        let m = model("Researcher", "methodology review");
        assert!(m.term_score("METHODOLOGY Overview") > 0.0);
    }

    #[test]
    fn test_matching_terms_ordering_stable() {
        let m = model("food contractor", "vegetarian buffet menu");
        let hits = m.matching_terms("buffet menu with vegetarian dishes");
        let mut sorted = hits.clone();
        sorted.sort();
        assert_eq!(hits, sorted, "BTreeMap keys iterate in sorted order");
    }

    // ── heading patterns ──

    #[test]
    fn test_patterns_present_without_keywords() {
        let m = model("", "");
        assert!(m.pattern_match("Introduction to Methods"));
        assert!(m.pattern_match("1. Introduction"));
        assert!(m.pattern_match("RELATED WORK"));
    }

    #[test]
    fn test_patterns_reject_body_text() {
        let m = model("", "");
        assert!(!m.pattern_match("we observed a 4.2% improvement in recall."));
    }

    #[test]
    fn test_pattern_override_via_config() {
        let config = crate::config::AnalysisConfigBuilder::new()
            .numbered_heading_regex(r"^\d+\)\s+\S")
            .build()
            .unwrap();
        let m = KeywordModel::build("", "", &config);
        assert!(m.pattern_match("3) Evaluation"));
    }

    #[test]
    fn test_has_any_match_term_or_pattern() {
        let m = model("Researcher", "methodology");
        assert!(m.has_any_match("our methodology was simple"));
        assert!(m.has_any_match("RELATED WORK"));
        assert!(!m.has_any_match("nothing of note here."));
    }
}
