//! Cross-document section selection with diversity enforcement.
//!
//! Candidates from every document are ranked globally, then selected
//! greedily under a per-document cap so that no single document dominates
//! the final list. Remaining slots after the capped pass are filled in
//! pure score order.

use std::cmp::Ordering;

use crate::config::AnalysisConfig;
use crate::output::SelectedSection;
use crate::SectionCandidate;

/// Global candidate ordering: score descending, then earlier page, then
/// higher on the page.
pub(crate) fn candidate_order(a: &SectionCandidate, b: &SectionCandidate) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.page.cmp(&b.page))
        .then_with(|| {
            a.span
                .position
                .relative_y()
                .partial_cmp(&b.span.position.relative_y())
                .unwrap_or(Ordering::Equal)
        })
}

/// Per-document cap for a target of `limit` entries over `document_count`
/// contributing documents.
pub(crate) fn diversity_cap(limit: usize, document_count: usize) -> usize {
    limit.div_ceil(document_count.max(1))
}

/// Diversity-capped selection over pre-sorted items.
///
/// `documents` holds the source document of each item, already in ranked
/// order. The first pass takes items in order while each document stays
/// under `cap`; the second pass fills remaining slots in pure ranked
/// order. Returns the chosen indices in selection order.
pub(crate) fn diversity_indices(documents: &[&str], limit: usize, cap: usize) -> Vec<usize> {
    let mut selected: Vec<usize> = Vec::with_capacity(limit.min(documents.len()));
    let mut per_doc: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    for (i, doc) in documents.iter().enumerate() {
        if selected.len() >= limit {
            return selected;
        }
        let count = per_doc.entry(doc).or_insert(0);
        if *count < cap {
            *count += 1;
            selected.push(i);
        }
    }

    // Every document contributed its cap or ran out; fill by rank alone.
    for i in 0..documents.len() {
        if selected.len() >= limit {
            break;
        }
        if !selected.contains(&i) {
            selected.push(i);
        }
    }

    selected
}

/// Select the collection-wide top sections.
///
/// `document_count` is the number of successfully collected documents and
/// sets the diversity cap; a single-document collection degenerates to
/// pure score order. `importance_rank` is assigned in final selection
/// order, 1-based and contiguous.
pub fn select_sections(
    mut candidates: Vec<SectionCandidate>,
    document_count: usize,
    config: &AnalysisConfig,
) -> Vec<SelectedSection> {
    candidates.sort_by(candidate_order);

    let limit = config.section_count;
    let cap = diversity_cap(limit, document_count);
    let documents: Vec<&str> = candidates.iter().map(|c| c.document.as_str()).collect();

    diversity_indices(&documents, limit, cap)
        .into_iter()
        .enumerate()
        .map(|(rank, idx)| {
            let c = &candidates[idx];
            SelectedSection {
                document: c.document.clone(),
                page: c.page,
                title: c.title.clone(),
                importance_rank: rank + 1,
            }
        })
        .collect()
}
