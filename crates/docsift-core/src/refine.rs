//! Subsection refinement: keyword-dense content blocks distilled into
//! short evidence snippets.
//!
//! Works on full page content independently of which sections were
//! selected. Contiguous non-heading spans are grouped into blocks by
//! vertical proximity and similar formatting; blocks with keyword
//! evidence are scored, the best per document are refined down to the
//! sentences that actually contain keyword matches, and a final
//! collection pass bounds the output with the same diversity rule used
//! for sections.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::candidates::{clean_text, passes_structural_gates, FontStats};
use crate::config::AnalysisConfig;
use crate::keywords::KeywordModel;
use crate::output::SubsectionEntry;
use crate::selector::{diversity_cap, diversity_indices};
use crate::{Document, TextSpan};

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// A group of adjacent, similarly formatted spans.
#[derive(Debug)]
struct ContentBlock {
    page: u32,
    text: String,
    score: f64,
}

/// Group non-heading spans into content blocks.
///
/// A span extends the current block when it sits on the same page, within
/// `block_gap_factor` font sizes vertically of the previous span, and
/// within `block_font_jitter` points of its font size. Heading-shaped
/// spans break blocks and are never included.
fn group_blocks(doc: &Document, stats: &FontStats, config: &AnalysisConfig) -> Vec<(u32, String)> {
    let mut blocks: Vec<(u32, String)> = Vec::new();

    for page in &doc.pages {
        let mut current: Vec<&TextSpan> = Vec::new();

        for span in &page.spans {
            let cleaned = clean_text(&span.text);
            if cleaned.is_empty() {
                continue;
            }
            if passes_structural_gates(span, &cleaned, stats, config) {
                flush(&mut current, page.number, &mut blocks);
                continue;
            }

            let joins = match current.last() {
                Some(prev) => {
                    let gap = (span.position.y - prev.position.y).abs();
                    gap <= config.block_gap_factor * prev.font_size.max(1.0)
                        && (span.font_size - prev.font_size).abs() <= config.block_font_jitter
                }
                None => true,
            };

            if !joins {
                flush(&mut current, page.number, &mut blocks);
            }
            current.push(span);
        }

        flush(&mut current, page.number, &mut blocks);
    }

    blocks
}

fn flush(current: &mut Vec<&TextSpan>, page: u32, blocks: &mut Vec<(u32, String)>) {
    if current.is_empty() {
        return;
    }
    let joined = current
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = clean_text(&joined);
    if !text.is_empty() {
        blocks.push((page, text));
    }
    current.clear();
}

/// Block relevance: keyword evidence weighted double, plus a capped
/// length bonus favoring longer, more self-contained blocks.
fn score_block(text: &str, model: &KeywordModel) -> f64 {
    2.0 * model.weight_sum(text) + (text.chars().count() as f64 / 100.0).min(5.0)
}

/// Refine a block into a snippet: the first qualifying sentences that
/// contain a keyword match, joined in original order and truncated with
/// an ellipsis when over the limit. Returns `None` when no sentence
/// qualifies; such blocks are dropped, never emitted empty.
fn refine_block(text: &str, model: &KeywordModel, config: &AnalysisConfig) -> Option<String> {
    let sentences: Vec<&str> = SENTENCE_SPLIT_RE
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() >= config.min_sentence_chars)
        .filter(|s| model.weight_sum(s) > 0.0)
        .take(config.max_snippet_sentences)
        .collect();

    if sentences.is_empty() {
        return None;
    }

    let mut refined = sentences.join(". ");
    refined.push('.');

    if refined.chars().count() > config.max_snippet_chars {
        let keep = config.max_snippet_chars.saturating_sub(3);
        refined = refined.chars().take(keep).collect();
        refined.push_str("...");
    }

    Some(refined)
}

/// Refine one document, returning entries paired with block scores.
fn refine_document_scored(
    doc: &Document,
    model: &KeywordModel,
    config: &AnalysisConfig,
) -> Vec<(SubsectionEntry, f64)> {
    let stats = FontStats::from_document(doc, config);

    let mut blocks: Vec<ContentBlock> = group_blocks(doc, &stats, config)
        .into_iter()
        .filter(|(_, text)| text.chars().count() >= config.min_block_chars)
        .filter(|(_, text)| model.has_any_match(text))
        .map(|(page, text)| {
            let score = score_block(&text, model);
            ContentBlock { page, text, score }
        })
        .collect();

    // Stable sort keeps reading order among equal scores.
    blocks.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    blocks
        .into_iter()
        .take(config.blocks_per_document)
        .filter_map(|block| {
            refine_block(&block.text, model, config).map(|refined_text| {
                (
                    SubsectionEntry {
                        document: doc.filename.clone(),
                        page: block.page,
                        refined_text,
                    },
                    block.score,
                )
            })
        })
        .collect()
}

/// Refine one document into bounded subsection entries.
pub fn refine_document(
    doc: &Document,
    model: &KeywordModel,
    config: &AnalysisConfig,
) -> Vec<SubsectionEntry> {
    refine_document_scored(doc, model, config)
        .into_iter()
        .map(|(entry, _)| entry)
        .collect()
}

/// Refine every document and bound the combined output.
///
/// Documents are processed in the given order; the collection pass ranks
/// all entries by block score and applies the same diversity cap used for
/// section selection, so subsections are not dominated by one document
/// either.
pub fn refine_collection(
    documents: &[Document],
    model: &KeywordModel,
    config: &AnalysisConfig,
) -> Vec<SubsectionEntry> {
    let mut scored: Vec<(SubsectionEntry, f64)> = Vec::new();
    for doc in documents {
        scored.extend(refine_document_scored(doc, model, config));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let limit = config.subsection_count;
    let cap = diversity_cap(limit, documents.len());
    let doc_names: Vec<&str> = scored.iter().map(|(e, _)| e.document.as_str()).collect();

    diversity_indices(&doc_names, limit, cap)
        .into_iter()
        .map(|i| scored[i].0.clone())
        .collect()
}
