//! The collection pipeline: span collection, keyword modeling, candidate
//! scoring, selection, refinement, and assembly, run once per collection.
//!
//! Documents are processed sequentially in input-specification order so
//! the selector's tie-break sees a fixed, reproducible ordering. A failure
//! to read one document is caught at the collector boundary and converted
//! into a skip; only the loss of every document is fatal.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::candidates::scan_candidates;
use crate::config::AnalysisConfig;
use crate::input::InputSpec;
use crate::keywords::KeywordModel;
use crate::output::{OutputResult, RunMetadata};
use crate::refine::refine_collection;
use crate::selector::select_sections;
use crate::source::SpanSource;
use crate::{Document, PipelineError, SectionCandidate, SkipRecord};

/// Per-document progress, for CLI progress reporting.
#[derive(Debug)]
pub enum DocumentEvent<'a> {
    Started { filename: &'a str },
    Collected { filename: &'a str, pages: usize },
    Skipped { filename: &'a str, reason: &'a str },
}

/// Wall-clock time spent collecting and holding one document.
#[derive(Debug, Clone)]
pub struct DocumentTiming {
    pub filename: String,
    pub elapsed: Duration,
}

/// The assembled result plus per-run diagnostics.
#[derive(Debug)]
pub struct CollectionReport {
    pub result: OutputResult,
    pub skipped: Vec<SkipRecord>,
    pub timings: Vec<DocumentTiming>,
}

/// A configurable analysis pipeline.
///
/// Holds an [`AnalysisConfig`] and exposes each pipeline stage as a
/// method. The default constructor uses built-in defaults; use
/// [`CollectionAnalyzer::with_config`] to supply custom thresholds and
/// patterns.
pub struct CollectionAnalyzer {
    config: AnalysisConfig,
}

impl Default for CollectionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
        }
    }

    /// Create an analyzer with a custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Build the keyword model for a persona/job pair (stage 1).
    pub fn build_keyword_model(&self, persona: &str, job: &str) -> KeywordModel {
        KeywordModel::build(persona, job, &self.config)
    }

    /// Scan one document for section candidates (stage 2).
    pub fn scan_document(&self, doc: &Document, model: &KeywordModel) -> Vec<SectionCandidate> {
        scan_candidates(doc, model, &self.config)
    }

    /// Run the full pipeline over a collection.
    ///
    /// `timestamp` is sourced by the caller and passed through to the
    /// output metadata untouched.
    pub fn analyze(
        &self,
        source: &dyn SpanSource,
        spec: &InputSpec,
        pdf_dir: &Path,
        timestamp: String,
    ) -> Result<CollectionReport, PipelineError> {
        self.analyze_with_progress(source, spec, pdf_dir, timestamp, |_| {})
    }

    /// [`analyze`](Self::analyze) with a per-document progress callback.
    pub fn analyze_with_progress(
        &self,
        source: &dyn SpanSource,
        spec: &InputSpec,
        pdf_dir: &Path,
        timestamp: String,
        mut progress: impl FnMut(DocumentEvent<'_>),
    ) -> Result<CollectionReport, PipelineError> {
        let filenames = spec.filenames();
        if filenames.is_empty() {
            return Err(PipelineError::InputSpec(
                crate::input::InputSpecError::NoDocuments,
            ));
        }

        let model = self.build_keyword_model(spec.persona(), spec.job());
        tracing::debug!(
            terms = model.term_count(),
            structural_only = model.is_empty(),
            "built keyword model"
        );

        // Collect in input order; order must not depend on anything else.
        let mut documents: Vec<Document> = Vec::new();
        let mut skipped: Vec<SkipRecord> = Vec::new();
        let mut timings: Vec<DocumentTiming> = Vec::new();

        for filename in &filenames {
            progress(DocumentEvent::Started { filename });
            let start = Instant::now();

            match source.collect(&pdf_dir.join(filename)) {
                Ok(mut doc) => {
                    // The specification filename is the canonical name in all
                    // outputs, whatever the backend derived from the path.
                    doc.filename = filename.clone();
                    progress(DocumentEvent::Collected {
                        filename,
                        pages: doc.pages.len(),
                    });
                    timings.push(DocumentTiming {
                        filename: filename.clone(),
                        elapsed: start.elapsed(),
                    });
                    documents.push(doc);
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::warn!(document = %filename, error = %reason, "skipping unreadable document");
                    progress(DocumentEvent::Skipped {
                        filename,
                        reason: &reason,
                    });
                    skipped.push(SkipRecord {
                        filename: filename.clone(),
                        reason,
                    });
                }
            }
        }

        if documents.is_empty() {
            return Err(PipelineError::AllDocumentsFailed(filenames.len()));
        }

        let mut candidates: Vec<SectionCandidate> = Vec::new();
        for doc in &documents {
            let found = self.scan_document(doc, &model);
            tracing::debug!(document = %doc.filename, candidates = found.len(), "scanned document");
            candidates.extend(found);
        }

        let extracted_sections = select_sections(candidates, documents.len(), &self.config);
        let subsection_analysis = refine_collection(&documents, &model, &self.config);

        let metadata = RunMetadata {
            input_documents: filenames,
            persona: spec.persona().to_string(),
            job: spec.job().to_string(),
            timestamp,
        };

        Ok(CollectionReport {
            result: OutputResult::assemble(metadata, extracted_sections, subsection_analysis),
            skipped,
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use crate::{PageRecord, SpanPosition, TextSpan};
    use std::path::PathBuf;

    struct FailingSource;

    impl SpanSource for FailingSource {
        fn collect(&self, _path: &Path) -> Result<Document, SourceError> {
            Err(SourceError::OpenError("corrupt file".into()))
        }
    }

    struct OnePageSource;

    impl SpanSource for OnePageSource {
        fn collect(&self, path: &Path) -> Result<Document, SourceError> {
            Ok(Document {
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                pages: vec![PageRecord {
                    number: 1,
                    spans: vec![TextSpan {
                        text: "Methodology".to_string(),
                        font_size: 24.0,
                        is_bold: true,
                        position: SpanPosition {
                            x: 72.0,
                            y: 60.0,
                            page_width: 612.0,
                            page_height: 792.0,
                        },
                        page_number: 1,
                    }],
                }],
            })
        }
    }

    fn spec(files: &[&str]) -> InputSpec {
        let documents: Vec<String> = files
            .iter()
            .map(|f| format!(r#"{{"filename": "{}"}}"#, f))
            .collect();
        InputSpec::from_json(&format!(
            r#"{{"documents": [{}], "persona": "Researcher", "job_to_be_done": "methodology review"}}"#,
            documents.join(",")
        ))
        .unwrap()
    }

    #[test]
    fn test_all_documents_failed_is_fatal() {
        let analyzer = CollectionAnalyzer::new();
        let err = analyzer
            .analyze(
                &FailingSource,
                &spec(&["a.pdf", "b.pdf"]),
                &PathBuf::from("/tmp"),
                "t".to_string(),
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::AllDocumentsFailed(2)));
    }

    #[test]
    fn test_output_uses_spec_filenames() {
        let analyzer = CollectionAnalyzer::new();
        let report = analyzer
            .analyze(
                &OnePageSource,
                &spec(&["paper.pdf"]),
                &PathBuf::from("/collection/PDFs"),
                "t".to_string(),
            )
            .unwrap();
        assert_eq!(report.result.metadata.input_documents, vec!["paper.pdf"]);
        assert_eq!(report.result.extracted_sections[0].document, "paper.pdf");
        assert!(report.skipped.is_empty());
        assert_eq!(report.timings.len(), 1);
    }

    #[test]
    fn test_progress_events_fire_in_order() {
        let analyzer = CollectionAnalyzer::new();
        let mut events: Vec<String> = Vec::new();
        analyzer
            .analyze_with_progress(
                &OnePageSource,
                &spec(&["paper.pdf"]),
                &PathBuf::from("/tmp"),
                "t".to_string(),
                |e| {
                    events.push(match e {
                        DocumentEvent::Started { filename } => format!("start:{}", filename),
                        DocumentEvent::Collected { filename, .. } => format!("done:{}", filename),
                        DocumentEvent::Skipped { filename, .. } => format!("skip:{}", filename),
                    })
                },
            )
            .unwrap();
        assert_eq!(events, vec!["start:paper.pdf", "done:paper.pdf"]);
    }
}
