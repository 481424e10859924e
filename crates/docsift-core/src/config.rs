use regex::Regex;

/// Weights for the composite section-candidate score.
///
/// Each weight controls the relative importance of one component:
/// - `font_size`: span size normalized between body median and document max
/// - `bold`: 1.0 when the span is bold
/// - `position`: top-of-page > left-aligned > other
/// - `keyword`: persona/job keyword hits in the title
/// - `length`: preference for medium-length titles
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub font_size: f64,
    pub bold: f64,
    pub position: f64,
    pub keyword: f64,
    pub length: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        // Structural components carry 0.75 of the total so keyword hits
        // boost a heading but can never qualify body text on their own.
        Self {
            font_size: 0.30,
            bold: 0.20,
            position: 0.25,
            keyword: 0.15,
            length: 0.10,
        }
    }
}

/// Configuration for the section extraction and refinement pipeline.
///
/// All regex fields are `Option<Regex>` — `None` means "use the built-in
/// default". Use [`AnalysisConfigBuilder`] to construct with string
/// patterns. The struct is immutable once built and is passed by reference
/// into the pipeline entry point.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // ── candidates.rs ──
    /// Minimum cleaned title length in characters (default: 5).
    pub(crate) min_title_chars: usize,
    /// Maximum cleaned title length in characters (default: 100).
    pub(crate) max_title_chars: usize,
    /// Maximum title length in words (default: 12).
    pub(crate) max_title_words: usize,
    /// Absolute font-size floor for heading candidates (default: 12.0).
    pub(crate) min_heading_font_size: f64,
    /// Points above the body median that mark heading-sized text (default: 2.0).
    pub(crate) heading_size_delta: f64,
    /// Fraction of page height counted as "top of page" (default: 0.3).
    pub(crate) top_region_ratio: f64,
    /// Fraction of page width counted as "left-aligned" (default: 0.2).
    pub(crate) left_margin_ratio: f64,
    /// Override for the title-case heading shape.
    pub(crate) title_case_re: Option<Regex>,
    /// Override for the numbered heading shape (`2.`, `2.3.1`).
    pub(crate) numbered_heading_re: Option<Regex>,
    /// Override for the short all-caps heading shape.
    pub(crate) all_caps_re: Option<Regex>,

    // ── selector.rs ──
    /// Number of sections to select collection-wide (default: 5).
    pub(crate) section_count: usize,

    // ── refine.rs ──
    /// Minimum block length in characters (default: 30).
    pub(crate) min_block_chars: usize,
    /// Minimum sentence length in characters (default: 20).
    pub(crate) min_sentence_chars: usize,
    /// Maximum sentences joined into one snippet (default: 2).
    pub(crate) max_snippet_sentences: usize,
    /// Maximum snippet length before ellipsis truncation (default: 400).
    pub(crate) max_snippet_chars: usize,
    /// Blocks kept per document before the collection pass (default: 5).
    pub(crate) blocks_per_document: usize,
    /// Number of subsection entries collection-wide (default: 5).
    pub(crate) subsection_count: usize,
    /// Vertical gap allowed inside a block, as a multiple of font size (default: 1.8).
    pub(crate) block_gap_factor: f64,
    /// Font-size difference allowed inside a block, in points (default: 1.0).
    pub(crate) block_font_jitter: f64,

    // ── scoring ──
    /// Weights for the candidate scoring function.
    pub(crate) scoring_weights: Option<ScoringWeights>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_title_chars: 5,
            max_title_chars: 100,
            max_title_words: 12,
            min_heading_font_size: 12.0,
            heading_size_delta: 2.0,
            top_region_ratio: 0.3,
            left_margin_ratio: 0.2,
            title_case_re: None,
            numbered_heading_re: None,
            all_caps_re: None,
            section_count: 5,
            min_block_chars: 30,
            min_sentence_chars: 20,
            max_snippet_sentences: 2,
            max_snippet_chars: 400,
            blocks_per_document: 5,
            subsection_count: 5,
            block_gap_factor: 1.8,
            block_font_jitter: 1.0,
            scoring_weights: None,
        }
    }
}

impl AnalysisConfig {
    /// Get the scoring weights, using defaults if not configured.
    pub(crate) fn scoring_weights(&self) -> ScoringWeights {
        self.scoring_weights.clone().unwrap_or_default()
    }

    /// Number of sections selected collection-wide.
    pub fn section_count(&self) -> usize {
        self.section_count
    }

    /// Number of subsection entries emitted collection-wide.
    pub fn subsection_count(&self) -> usize {
        self.subsection_count
    }
}

/// Builder for [`AnalysisConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in
/// [`build()`](Self::build). Fails fast with `regex::Error` if any pattern
/// is invalid.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    min_title_chars: Option<usize>,
    max_title_chars: Option<usize>,
    max_title_words: Option<usize>,
    min_heading_font_size: Option<f64>,
    heading_size_delta: Option<f64>,
    top_region_ratio: Option<f64>,
    left_margin_ratio: Option<f64>,
    title_case_re: Option<String>,
    numbered_heading_re: Option<String>,
    all_caps_re: Option<String>,
    section_count: Option<usize>,
    min_block_chars: Option<usize>,
    min_sentence_chars: Option<usize>,
    max_snippet_sentences: Option<usize>,
    max_snippet_chars: Option<usize>,
    blocks_per_document: Option<usize>,
    subsection_count: Option<usize>,
    block_gap_factor: Option<f64>,
    block_font_jitter: Option<f64>,
    scoring_weights: Option<ScoringWeights>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Title gates ──

    pub fn min_title_chars(mut self, n: usize) -> Self {
        self.min_title_chars = Some(n);
        self
    }

    pub fn max_title_chars(mut self, n: usize) -> Self {
        self.max_title_chars = Some(n);
        self
    }

    pub fn max_title_words(mut self, n: usize) -> Self {
        self.max_title_words = Some(n);
        self
    }

    // ── Font thresholds ──

    pub fn min_heading_font_size(mut self, size: f64) -> Self {
        self.min_heading_font_size = Some(size);
        self
    }

    pub fn heading_size_delta(mut self, delta: f64) -> Self {
        self.heading_size_delta = Some(delta);
        self
    }

    // ── Position gates ──

    pub fn top_region_ratio(mut self, ratio: f64) -> Self {
        self.top_region_ratio = Some(ratio);
        self
    }

    pub fn left_margin_ratio(mut self, ratio: f64) -> Self {
        self.left_margin_ratio = Some(ratio);
        self
    }

    // ── Heading shape overrides ──

    pub fn title_case_regex(mut self, pattern: &str) -> Self {
        self.title_case_re = Some(pattern.to_string());
        self
    }

    pub fn numbered_heading_regex(mut self, pattern: &str) -> Self {
        self.numbered_heading_re = Some(pattern.to_string());
        self
    }

    pub fn all_caps_regex(mut self, pattern: &str) -> Self {
        self.all_caps_re = Some(pattern.to_string());
        self
    }

    // ── Selection ──

    pub fn section_count(mut self, n: usize) -> Self {
        self.section_count = Some(n);
        self
    }

    pub fn subsection_count(mut self, n: usize) -> Self {
        self.subsection_count = Some(n);
        self
    }

    // ── Refinement ──

    pub fn min_block_chars(mut self, n: usize) -> Self {
        self.min_block_chars = Some(n);
        self
    }

    pub fn min_sentence_chars(mut self, n: usize) -> Self {
        self.min_sentence_chars = Some(n);
        self
    }

    pub fn max_snippet_sentences(mut self, n: usize) -> Self {
        self.max_snippet_sentences = Some(n);
        self
    }

    pub fn max_snippet_chars(mut self, n: usize) -> Self {
        self.max_snippet_chars = Some(n);
        self
    }

    pub fn blocks_per_document(mut self, n: usize) -> Self {
        self.blocks_per_document = Some(n);
        self
    }

    pub fn block_gap_factor(mut self, factor: f64) -> Self {
        self.block_gap_factor = Some(factor);
        self
    }

    pub fn block_font_jitter(mut self, jitter: f64) -> Self {
        self.block_font_jitter = Some(jitter);
        self
    }

    // ── Scoring weights ──

    /// Set custom weights for the candidate scoring function.
    pub fn scoring_weights(mut self, weights: ScoringWeights) -> Self {
        self.scoring_weights = Some(weights);
        self
    }

    /// Compile all string patterns into regexes and produce an [`AnalysisConfig`].
    pub fn build(self) -> Result<AnalysisConfig, regex::Error> {
        let compile = |opt: Option<String>| -> Result<Option<Regex>, regex::Error> {
            opt.map(|p| Regex::new(&p)).transpose()
        };

        Ok(AnalysisConfig {
            min_title_chars: self.min_title_chars.unwrap_or(5),
            max_title_chars: self.max_title_chars.unwrap_or(100),
            max_title_words: self.max_title_words.unwrap_or(12),
            min_heading_font_size: self.min_heading_font_size.unwrap_or(12.0),
            heading_size_delta: self.heading_size_delta.unwrap_or(2.0),
            top_region_ratio: self.top_region_ratio.unwrap_or(0.3),
            left_margin_ratio: self.left_margin_ratio.unwrap_or(0.2),
            title_case_re: compile(self.title_case_re)?,
            numbered_heading_re: compile(self.numbered_heading_re)?,
            all_caps_re: compile(self.all_caps_re)?,
            section_count: self.section_count.unwrap_or(5),
            min_block_chars: self.min_block_chars.unwrap_or(30),
            min_sentence_chars: self.min_sentence_chars.unwrap_or(20),
            max_snippet_sentences: self.max_snippet_sentences.unwrap_or(2),
            max_snippet_chars: self.max_snippet_chars.unwrap_or(400),
            blocks_per_document: self.blocks_per_document.unwrap_or(5),
            subsection_count: self.subsection_count.unwrap_or(5),
            block_gap_factor: self.block_gap_factor.unwrap_or(1.8),
            block_font_jitter: self.block_font_jitter.unwrap_or(1.0),
            scoring_weights: self.scoring_weights,
        })
    }
}
