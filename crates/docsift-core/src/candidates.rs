//! Section-heading candidate detection and scoring.
//!
//! Every span on every page is tested against structural gates (font size,
//! boldness, page position, title length) plus a shape-or-keyword
//! requirement, then scored with a weighted component sum. Structural
//! weights dominate so keyword-dense body text can never qualify on
//! keyword evidence alone.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::AnalysisConfig;
use crate::keywords::KeywordModel;
use crate::{Document, SectionCandidate, TextSpan};

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace and trim.
pub(crate) fn clean_text(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// Per-document font-size statistics.
///
/// The heading threshold is the body median plus a configured delta,
/// clamped from below by the absolute heading floor. Computed once per
/// document rather than per page: per-page medians are unstable on sparse
/// pages.
#[derive(Debug, Clone)]
pub struct FontStats {
    pub median_size: f64,
    pub max_size: f64,
    pub heading_threshold: f64,
}

impl FontStats {
    pub fn from_document(doc: &Document, config: &AnalysisConfig) -> Self {
        let mut sizes: Vec<f64> = doc
            .spans()
            .map(|s| s.font_size)
            .filter(|&s| s > 0.0)
            .collect();

        if sizes.is_empty() {
            return Self {
                median_size: config.min_heading_font_size,
                max_size: config.min_heading_font_size,
                heading_threshold: config.min_heading_font_size,
            };
        }

        sizes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sizes.len() / 2;
        let median_size = if sizes.len() % 2 == 0 {
            (sizes[mid - 1] + sizes[mid]) / 2.0
        } else {
            sizes[mid]
        };
        let max_size = sizes[sizes.len() - 1];
        let heading_threshold =
            (median_size + config.heading_size_delta).max(config.min_heading_font_size);

        Self {
            median_size,
            max_size,
            heading_threshold,
        }
    }
}

/// Structural gates: emphasized font, well-positioned, title-length text.
///
/// This is the "is this span laid out like a heading" test, independent of
/// keyword evidence. The refiner uses the same test to keep heading spans
/// out of content blocks.
pub(crate) fn passes_structural_gates(
    span: &TextSpan,
    title: &str,
    stats: &FontStats,
    config: &AnalysisConfig,
) -> bool {
    let emphasized = span.font_size >= stats.heading_threshold || span.is_bold;
    if !emphasized {
        return false;
    }

    let well_positioned = span.position.relative_y() <= config.top_region_ratio
        || span.position.relative_x() <= config.left_margin_ratio;
    if !well_positioned {
        return false;
    }

    let chars = title.chars().count();
    if chars < config.min_title_chars || chars > config.max_title_chars {
        return false;
    }
    let words = title.split_whitespace().count();
    words >= 1 && words <= config.max_title_words
}

/// Normalized font size: where the span sits between body median and
/// document maximum.
fn font_size_factor(span: &TextSpan, stats: &FontStats) -> f64 {
    if stats.max_size > stats.median_size {
        ((span.font_size - stats.median_size) / (stats.max_size - stats.median_size))
            .clamp(0.0, 1.0)
    } else {
        // Uniform font size across the document: no signal either way.
        1.0
    }
}

/// Position bonus: top-of-page beats left-aligned beats everything else.
fn position_bonus(span: &TextSpan, config: &AnalysisConfig) -> f64 {
    if span.position.relative_y() <= config.top_region_ratio {
        1.0
    } else if span.position.relative_x() <= config.left_margin_ratio {
        0.6
    } else {
        0.2
    }
}

/// Length factor: medium-length titles are the sweet spot.
fn length_factor(title: &str) -> f64 {
    let chars = title.chars().count();
    if (10..=50).contains(&chars) {
        1.0
    } else if chars < 10 {
        0.6
    } else {
        0.3
    }
}

/// Composite candidate score in [0, 1].
fn score_candidate(
    span: &TextSpan,
    title: &str,
    stats: &FontStats,
    model: &KeywordModel,
    config: &AnalysisConfig,
) -> f64 {
    let w = config.scoring_weights();
    w.font_size * font_size_factor(span, stats)
        + w.bold * if span.is_bold { 1.0 } else { 0.0 }
        + w.position * position_bonus(span, config)
        + w.keyword * model.term_score(title)
        + w.length * length_factor(title)
}

/// Scan one document for section-heading candidates.
///
/// A span qualifies only if it passes the structural gates AND has either
/// a heading shape (title case, numbered, all caps) or a persona keyword
/// hit. Repeated titles within the document (running page headers) keep
/// only their highest-scoring instance. Output order is unspecified
/// relative to other documents; the selector re-sorts globally.
pub fn scan_candidates(
    doc: &Document,
    model: &KeywordModel,
    config: &AnalysisConfig,
) -> Vec<SectionCandidate> {
    let stats = FontStats::from_document(doc, config);
    let mut candidates: Vec<SectionCandidate> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for span in doc.spans() {
        let title = clean_text(&span.text);
        if !passes_structural_gates(span, &title, &stats, config) {
            continue;
        }
        if !model.pattern_match(&title) && model.term_score(&title) == 0.0 {
            continue;
        }

        let score = score_candidate(span, &title, &stats, model, config);
        let candidate = SectionCandidate {
            document: doc.filename.clone(),
            page: span.page_number,
            title: title.clone(),
            score,
            span: span.clone(),
        };

        match seen.get(&title.to_lowercase()) {
            Some(&idx) => {
                // Strict comparison: on equal scores the earlier instance
                // wins, preserving the page/position tie-break.
                if score > candidates[idx].score {
                    candidates[idx] = candidate;
                }
            }
            None => {
                seen.insert(title.to_lowercase(), candidates.len());
                candidates.push(candidate);
            }
        }
    }

    candidates
}
