use thiserror::Error;

pub mod candidates;
pub mod config;
pub mod input;
pub mod keywords;
pub mod output;
pub mod pipeline;
pub mod refine;
pub mod selector;
pub mod source;

// Re-export for convenience
pub use candidates::{FontStats, scan_candidates};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ScoringWeights};
pub use input::{InputSpec, InputSpecError};
pub use keywords::KeywordModel;
pub use output::{OutputResult, RunMetadata, SelectedSection, SubsectionEntry};
pub use pipeline::{CollectionAnalyzer, CollectionReport, DocumentEvent, DocumentTiming};
pub use refine::{refine_collection, refine_document};
pub use selector::select_sections;
pub use source::{SourceError, SpanSource};

/// Position of a text span on its page, in points.
///
/// `y` is measured from the top edge of the page, so a small
/// [`relative_y`](SpanPosition::relative_y) means near the top. Page
/// dimensions travel with the position so relative coordinates can be
/// computed without the page at hand.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanPosition {
    pub x: f64,
    pub y: f64,
    pub page_width: f64,
    pub page_height: f64,
}

impl SpanPosition {
    /// Horizontal position as a fraction of page width (0.0 = left edge).
    pub fn relative_x(&self) -> f64 {
        if self.page_width > 0.0 {
            self.x / self.page_width
        } else {
            0.0
        }
    }

    /// Vertical position as a fraction of page height (0.0 = top edge).
    pub fn relative_y(&self) -> f64 {
        if self.page_height > 0.0 {
            self.y / self.page_height
        } else {
            0.0
        }
    }
}

/// A contiguous run of text sharing font and position metadata, as reported
/// by the PDF backend. Immutable once produced by a [`SpanSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f64,
    pub is_bold: bool,
    pub position: SpanPosition,
    /// 1-based page number.
    pub page_number: u32,
}

/// The spans of one page, in the backend's reading order.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// 1-based page number.
    pub number: u32,
    pub spans: Vec<TextSpan>,
}

/// A fully collected input document. Read-only after collection.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub pages: Vec<PageRecord>,
}

impl Document {
    /// All spans across all pages, in reading order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flat_map(|p| p.spans.iter())
    }
}

/// A span hypothesized to be a section heading, before selection.
#[derive(Debug, Clone)]
pub struct SectionCandidate {
    pub document: String,
    /// 1-based page number.
    pub page: u32,
    pub title: String,
    pub score: f64,
    /// The originating span, kept for position tie-breaking.
    pub span: TextSpan,
}

/// A document that could not be read and was skipped.
#[derive(Debug, Clone)]
pub struct SkipRecord {
    pub filename: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input specification error: {0}")]
    InputSpec(#[from] InputSpecError),
    #[error("all {0} input documents failed to read")]
    AllDocumentsFailed(usize),
}
