//! Input specification reading.
//!
//! The specification JSON lists the collection's documents and the
//! persona/job driving relevance. Persona and job appear in the wild both
//! as plain strings and as structured objects (`{"role": ...}`,
//! `{"task": ...}`); both shapes are accepted.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Fatal specification errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum InputSpecError {
    #[error("cannot read input specification: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed input specification: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("input specification lists no documents")]
    NoDocuments,
}

/// One document entry in the specification.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PersonaField {
    Text(String),
    Structured { role: String },
}

impl Default for PersonaField {
    fn default() -> Self {
        PersonaField::Text(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum JobField {
    Text(String),
    Structured { task: String },
}

impl Default for JobField {
    fn default() -> Self {
        JobField::Text(String::new())
    }
}

/// The parsed input specification.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSpec {
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    persona: PersonaField,
    #[serde(default)]
    job_to_be_done: JobField,
}

impl InputSpec {
    /// Read and validate a specification file.
    pub fn from_file(path: &Path) -> Result<Self, InputSpecError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse and validate specification JSON.
    pub fn from_json(data: &str) -> Result<Self, InputSpecError> {
        let spec: InputSpec = serde_json::from_str(data)?;
        if spec.documents.is_empty() {
            return Err(InputSpecError::NoDocuments);
        }
        Ok(spec)
    }

    pub fn persona(&self) -> &str {
        match &self.persona {
            PersonaField::Text(s) => s,
            PersonaField::Structured { role } => role,
        }
    }

    pub fn job(&self) -> &str {
        match &self.job_to_be_done {
            JobField::Text(s) => s,
            JobField::Structured { task } => task,
        }
    }

    /// Document filenames in specification order.
    pub fn filenames(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.filename.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_structured_persona_and_job() {
        let spec = InputSpec::from_json(
            r#"{
                "documents": [
                    {"filename": "a.pdf", "title": "Guide A"},
                    {"filename": "b.pdf"}
                ],
                "persona": {"role": "Travel Planner"},
                "job_to_be_done": {"task": "Plan a trip of 4 days."}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.persona(), "Travel Planner");
        assert_eq!(spec.job(), "Plan a trip of 4 days.");
        assert_eq!(spec.filenames(), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_plain_string_persona_and_job() {
        let spec = InputSpec::from_json(
            r#"{
                "documents": [{"filename": "a.pdf"}],
                "persona": "Researcher",
                "job_to_be_done": "literature review"
            }"#,
        )
        .unwrap();
        assert_eq!(spec.persona(), "Researcher");
        assert_eq!(spec.job(), "literature review");
    }

    #[test]
    fn test_missing_persona_defaults_empty() {
        let spec = InputSpec::from_json(r#"{"documents": [{"filename": "a.pdf"}]}"#).unwrap();
        assert_eq!(spec.persona(), "");
        assert_eq!(spec.job(), "");
    }

    #[test]
    fn test_empty_documents_rejected() {
        let err = InputSpec::from_json(r#"{"documents": []}"#).unwrap_err();
        assert!(matches!(err, InputSpecError::NoDocuments));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = InputSpec::from_json("{not json").unwrap_err();
        assert!(matches!(err, InputSpecError::Parse(_)));
    }

    #[test]
    fn test_missing_file_rejected() {
        let err = InputSpec::from_file(Path::new("/nonexistent/spec.json")).unwrap_err();
        assert!(matches!(err, InputSpecError::Io(_)));
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"documents": [{{"filename": "a.pdf"}}], "persona": "Researcher", "job_to_be_done": "review"}}"#
        )
        .unwrap();
        let spec = InputSpec::from_file(file.path()).unwrap();
        assert_eq!(spec.persona(), "Researcher");
    }
}
