//! Resume text and skill extraction.

use crate::error::{MatchError, MatchResult};
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

/// Skills recognised in resume text, in output order.
pub const KNOWN_SKILLS: &[&str] = &[
    "python",
    "java",
    "c++",
    "machine learning",
    "data analysis",
    "django",
    "flask",
    "sql",
    "tensorflow",
    "keras",
    "pandas",
    "numpy",
    "react",
    "aws",
    "api",
    "backend",
    "frontend",
    "docker",
    "kubernetes",
];

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("paragraph pattern compiles"));
static BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:(?:tab|br|cr)\b[^>]*/>").expect("break pattern compiles"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern compiles"));

/// Supported resume formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Canonical lowercase file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    /// Detects the format from the file extension, ignoring case.
    pub fn detect(path: &Path) -> MatchResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(MatchError::UnsupportedFileFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

fn extraction_error(path: &Path, reason: impl ToString) -> MatchError {
    MatchError::Extraction {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Plain text of a PDF or DOCX file.
pub fn extract_text(path: &Path) -> MatchResult<String> {
    let text = match DocumentFormat::detect(path)? {
        DocumentFormat::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| extraction_error(path, e))?
        }
        DocumentFormat::Docx => extract_docx(path)?,
    };
    debug!("Extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

fn extract_docx(path: &Path) -> MatchResult<String> {
    let file = File::open(path).map_err(|e| extraction_error(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_error(path, e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| extraction_error(path, e))?
        .read_to_string(&mut xml)
        .map_err(|e| extraction_error(path, e))?;
    Ok(docx_text(&xml))
}

/// Paragraph texts of a WordprocessingML body, joined by spaces.
pub fn docx_text(xml: &str) -> String {
    PARAGRAPH
        .find_iter(xml)
        .map(|p| {
            let spaced = BREAK.replace_all(p.as_str(), " ");
            let text = unescape_xml(&TAG.replace_all(&spaced, ""));
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Space-joined known skills present in `text`, matched as case-insensitive substrings.
pub fn extract_skills(text: &str) -> String {
    let text = text.to_lowercase();
    KNOWN_SKILLS
        .iter()
        .copied()
        .filter(|skill| text.contains(skill))
        .collect::<Vec<_>>()
        .join(" ")
}
