//! Error types for the job matcher.
//!
//! Query-level failures that reach the user are [`MatchError`]; snapshot and
//! index cache I/O failures are [`StoreError`]. Ingestion glue uses `anyhow`
//! and never surfaces past the corpus store.

use std::path::PathBuf;
use thiserror::Error;

/// Prompt returned when neither query text nor a resume was supplied.
pub const EMPTY_QUERY_PROMPT: &str = "Please enter skills/job title or upload a resume.";

/// Errors surfaced to the caller of a search.
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Please enter skills/job title or upload a resume.")]
    MalformedQuery,

    #[error("Unsupported file type '{extension}'. Please upload PDF or DOCX.")]
    UnsupportedFileFormat { path: PathBuf, extension: String },

    #[error("Failed to read resume '{path}': {reason}")]
    Extraction { path: PathBuf, reason: String },
}

impl MatchError {
    /// Stable identifier for JSON responses.
    pub fn status_code(&self) -> &'static str {
        match self {
            Self::MalformedQuery => "MALFORMED_QUERY",
            Self::UnsupportedFileFormat { .. } => "UNSUPPORTED_FILE_TYPE",
            Self::Extraction { .. } => "EXTRACTION_FAILED",
        }
    }

    /// Whether the error is caused by the request rather than by the system.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedQuery | Self::UnsupportedFileFormat { .. }
        )
    }
}

/// Errors reading or writing persisted corpus state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read snapshot '{path}': {source}")]
    SnapshotRead { path: PathBuf, source: csv::Error },

    #[error("Failed to write snapshot '{path}': {source}")]
    SnapshotWrite { path: PathBuf, source: csv::Error },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to load index cache from '{path}': {source}")]
    CacheLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to persist index cache to '{path}': {source}")]
    CacheSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type MatchResult<T> = std::result::Result<T, MatchError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_query_message_is_the_prompt() {
        assert_eq!(MatchError::MalformedQuery.to_string(), EMPTY_QUERY_PROMPT);
        assert_eq!(MatchError::MalformedQuery.status_code(), "MALFORMED_QUERY");
    }

    #[test]
    fn unsupported_format_is_a_user_error() {
        let err = MatchError::UnsupportedFileFormat {
            path: PathBuf::from("cv.txt"),
            extension: "txt".to_string(),
        };
        assert!(err.is_user_error());
        assert!(err.to_string().contains("Please upload PDF or DOCX"));

        let err = MatchError::Extraction {
            path: PathBuf::from("cv.pdf"),
            reason: "truncated".to_string(),
        };
        assert!(!err.is_user_error());
    }
}
