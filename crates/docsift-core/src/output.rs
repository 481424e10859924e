//! Output result model and assembly.
//!
//! Field names and nesting are a compatibility contract with downstream
//! evaluators and must not change. Assembly is pure aggregation; every
//! filtering or scoring decision happens upstream.

use std::io::Write;

use serde::{Deserialize, Serialize};

/// A section promoted by the selector. `importance_rank` is 1-based and
/// contiguous across the output array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedSection {
    pub document: String,
    pub page: u32,
    pub title: String,
    pub importance_rank: usize,
}

/// A refined evidence snippet. `refined_text` is always non-empty,
/// bounded, and verbatim source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionEntry {
    pub document: String,
    pub page: u32,
    pub refined_text: String,
}

/// Run metadata. The timestamp is supplied by the caller, not computed
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job: String,
    pub timestamp: String,
}

/// The complete result, written to the output sink exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputResult {
    pub metadata: RunMetadata,
    pub extracted_sections: Vec<SelectedSection>,
    pub subsection_analysis: Vec<SubsectionEntry>,
}

impl OutputResult {
    /// Stitch metadata, ranked sections, and subsection entries together.
    pub fn assemble(
        metadata: RunMetadata,
        extracted_sections: Vec<SelectedSection>,
        subsection_analysis: Vec<SubsectionEntry>,
    ) -> Self {
        Self {
            metadata,
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Write the result as pretty-printed JSON.
    pub fn write_pretty<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OutputResult {
        OutputResult::assemble(
            RunMetadata {
                input_documents: vec!["a.pdf".to_string(), "b.pdf".to_string()],
                persona: "Researcher".to_string(),
                job: "literature review".to_string(),
                timestamp: "2025-01-01T00:00:00Z".to_string(),
            },
            vec![SelectedSection {
                document: "a.pdf".to_string(),
                page: 1,
                title: "Methodology".to_string(),
                importance_rank: 1,
            }],
            vec![SubsectionEntry {
                document: "b.pdf".to_string(),
                page: 2,
                refined_text: "The survey covered forty participants.".to_string(),
            }],
        )
    }

    #[test]
    fn test_field_names_are_the_wire_contract() {
        let value = serde_json::to_value(sample()).unwrap();
        let metadata = &value["metadata"];
        assert!(metadata["input_documents"].is_array());
        assert!(metadata["persona"].is_string());
        assert!(metadata["job"].is_string());
        assert!(metadata["timestamp"].is_string());

        let section = &value["extracted_sections"][0];
        assert_eq!(section["document"], "a.pdf");
        assert_eq!(section["page"], 1);
        assert_eq!(section["title"], "Methodology");
        assert_eq!(section["importance_rank"], 1);

        let sub = &value["subsection_analysis"][0];
        assert_eq!(sub["document"], "b.pdf");
        assert_eq!(sub["page"], 2);
        assert!(sub["refined_text"].is_string());
    }

    #[test]
    fn test_write_pretty_round_trip() {
        let result = sample();
        let file = tempfile::NamedTempFile::new().unwrap();
        result.write_pretty(file.reopen().unwrap()).unwrap();
        let read: OutputResult =
            serde_json::from_reader(std::fs::File::open(file.path()).unwrap()).unwrap();
        assert_eq!(read, result);
    }
}
