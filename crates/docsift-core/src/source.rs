use std::path::Path;

use thiserror::Error;

use crate::Document;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract spans: {0}")]
    ExtractionError(String),
    #[error("document has no pages")]
    EmptyDocument,
    #[error("time budget of {0:.1}s exceeded")]
    Timeout(f64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for span collection backends.
///
/// Implementors wrap the external PDF library and produce the structured
/// span model; all scoring, selection, and refinement lives in
/// [`crate::pipeline::CollectionAnalyzer`]. A failure here is recoverable:
/// the caller skips the document and continues with the rest of the
/// collection.
pub trait SpanSource: Send + Sync {
    /// Collect every page of the document at `path` into a [`Document`].
    ///
    /// Spans must be reported in the library's reading order, never
    /// reordered or deduplicated. Whitespace-only spans carry no content
    /// and may be omitted.
    fn collect(&self, path: &Path) -> Result<Document, SourceError>;
}
