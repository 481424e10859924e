use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use pdfium_render::prelude::*;

use docsift_core::source::{SourceError, SpanSource};
use docsift_core::{Document, PageRecord, SpanPosition, TextSpan};

/// pdfium-based implementation of [`SpanSource`].
///
/// This crate isolates the pdfium dependency so the analysis engine stays
/// free of native-library concerns. The binding looks for a local pdfium
/// library first (an explicit path if configured, then the working
/// directory), falling back to the system library.
///
/// Span metadata comes from the first character of each pdfium text
/// segment: scaled font size, and boldness from the font weight (600 and
/// up, the named bold weights, or bold-reenforced rendering). Vertical
/// coordinates are converted from pdfium's bottom-left origin to the
/// engine's top-origin convention, so small `y` means near the top of the
/// page.
#[derive(Default)]
pub struct PdfiumSource {
    /// Directory holding a local pdfium library, tried before the system
    /// library. `None` means working directory, then system.
    library_path: Option<PathBuf>,
    /// Soft per-document time budget, checked between page parses.
    /// `None` disables the budget.
    time_budget: Option<Duration>,
}

impl PdfiumSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit directory to look for the pdfium library in.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Set a soft per-document time budget. A document whose pages are
    /// still being parsed when the budget expires fails with
    /// [`SourceError::Timeout`] and is skipped like any other read
    /// failure. The check runs between pages; a single stuck page parse
    /// cannot be interrupted.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    fn bind(&self) -> Result<Pdfium, SourceError> {
        let bindings = match &self.library_path {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|_| Pdfium::bind_to_system_library()),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| SourceError::OpenError(format!("cannot load pdfium library: {}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl SpanSource for PdfiumSource {
    fn collect(&self, path: &Path) -> Result<Document, SourceError> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SourceError::OpenError("path has no file name".into()))?;

        let start = Instant::now();
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| SourceError::OpenError(e.to_string()))?;

        let page_count = document.pages().len();
        if page_count == 0 {
            return Err(SourceError::EmptyDocument);
        }

        let mut pages = Vec::with_capacity(usize::from(page_count));
        for (index, page) in document.pages().iter().enumerate() {
            if let Some(budget) = self.time_budget {
                if start.elapsed() > budget {
                    return Err(SourceError::Timeout(budget.as_secs_f64()));
                }
            }

            let number = index as u32 + 1;
            pages.push(collect_page(&page, number)?);
        }

        Ok(Document { filename, pages })
    }
}

fn collect_page(page: &PdfPage, number: u32) -> Result<PageRecord, SourceError> {
    let page_width = f64::from(page.width().value);
    let page_height = f64::from(page.height().value);

    let text = page
        .text()
        .map_err(|e| SourceError::ExtractionError(e.to_string()))?;

    let mut spans = Vec::new();
    for segment in text.segments().iter() {
        let raw = segment.text();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            // Whitespace-only segments carry no content; the only
            // filtering the collector is allowed to do.
            continue;
        }

        let bounds = segment.bounds();
        let (font_size, is_bold) = segment_style(&segment);

        spans.push(TextSpan {
            text: trimmed.to_string(),
            font_size,
            is_bold,
            position: SpanPosition {
                x: f64::from(bounds.left().value),
                // pdfium measures from the bottom-left corner; the engine
                // wants distance from the top edge.
                y: page_height - f64::from(bounds.top().value),
                page_width,
                page_height,
            },
            page_number: number,
        });
    }

    Ok(PageRecord { number, spans })
}

/// Font size and boldness of a segment, read from its first character.
fn segment_style(segment: &PdfPageTextSegment<'_>) -> (f64, bool) {
    let Ok(chars) = segment.chars() else {
        return (0.0, false);
    };
    let Some(first) = chars.iter().next() else {
        return (0.0, false);
    };

    let font_size = f64::from(first.scaled_font_size().value);
    let weight_is_bold = match first.font_weight() {
        Some(PdfFontWeight::Weight600)
        | Some(PdfFontWeight::Weight700Bold)
        | Some(PdfFontWeight::Weight800)
        | Some(PdfFontWeight::Weight900) => true,
        Some(PdfFontWeight::Custom(weight)) => weight >= 600,
        _ => false,
    };
    let is_bold = weight_is_bold || first.font_is_bold_reenforced();

    (font_size, is_bold)
}
