//! Turning request input into query text.

use crate::error::{MatchError, MatchResult};
use crate::extract::{extract_skills, extract_text};
use log::info;
use serde::Serialize;
use std::path::Path;

pub const RESUME_LABEL: &str = "Your Resume Skills";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOrigin {
    Text,
    Resume,
}

/// Query text ready for scoring, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    pub text: String,
    pub origin: QueryOrigin,
}

impl ResolvedQuery {
    /// A typed query. Blank text is rejected.
    pub fn text(text: &str) -> MatchResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MatchError::MalformedQuery);
        }
        Ok(Self {
            text: text.to_string(),
            origin: QueryOrigin::Text,
        })
    }

    /// Skills found in a resume. May be empty when no known skill occurs.
    pub fn from_skills(skills: String) -> Self {
        Self {
            text: skills,
            origin: QueryOrigin::Resume,
        }
    }

    /// Extracts text from the resume at `path` and keeps its known skills.
    pub fn resume(path: &Path) -> MatchResult<Self> {
        let skills = extract_skills(&extract_text(path)?);
        info!("Resume {} yielded skills: '{}'", path.display(), skills);
        Ok(Self::from_skills(skills))
    }

    /// Resolves request input; a resume takes precedence over typed text.
    pub fn resolve(text: Option<&str>, resume: Option<&Path>) -> MatchResult<Self> {
        match (resume, text) {
            (Some(path), _) => Self::resume(path),
            (None, Some(text)) => Self::text(text),
            (None, None) => Err(MatchError::MalformedQuery),
        }
    }

    /// What the query is shown as to the user.
    pub fn label(&self) -> &str {
        match self.origin {
            QueryOrigin::Text => &self.text,
            QueryOrigin::Resume => RESUME_LABEL,
        }
    }

    pub fn no_match_message(&self) -> String {
        match self.origin {
            QueryOrigin::Text => format!("No matching jobs found for '{}'.", self.text),
            QueryOrigin::Resume => "No matching jobs found for your resume skills.".to_string(),
        }
    }
}
