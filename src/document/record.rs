use serde::{Deserialize, Serialize};

/// Sentinel stored in place of any missing or blank field.
pub const MISSING: &str = "N/A";

/// A posting as produced by an ingestion source or a snapshot row; any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJobRecord {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub date_posted: Option<String>,
    pub skill_level: Option<String>,
    pub link: Option<String>,
    pub source: Option<String>,
    /// Pre-extracted skills; replaces title + description as the scored text.
    pub skills: Option<String>,
}

/// A normalized posting. Every field is populated; absent data is [`MISSING`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub date_posted: String,
    pub skill_level: String,
    pub link: String,
    pub source: String,
    skills_text: String,
}

fn or_missing(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn is_missing(value: &str) -> bool {
    value == MISSING
}

impl From<RawJobRecord> for JobRecord {
    fn from(raw: RawJobRecord) -> Self {
        let title = or_missing(raw.title);
        let description = or_missing(raw.description);
        let skills_text = match raw.skills.map(|s| s.trim().to_string()) {
            Some(skills) if !skills.is_empty() => skills.to_lowercase(),
            _ => format!("{title} {description}").to_lowercase(),
        };

        Self {
            title,
            company: or_missing(raw.company),
            location: or_missing(raw.location),
            description,
            date_posted: or_missing(raw.date_posted),
            skill_level: or_missing(raw.skill_level),
            link: or_missing(raw.link),
            source: or_missing(raw.source),
            skills_text,
        }
    }
}

impl JobRecord {
    /// Lowercased text the vocabulary model is fit on. Never displayed.
    pub fn skills_text(&self) -> &str {
        &self.skills_text
    }
}

/// Ordered postings; the position of a record is its document index in the fitted model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    records: Vec<JobRecord>,
}

impl Corpus {
    pub fn new(records: Vec<JobRecord>) -> Self {
        Self { records }
    }

    pub fn from_raw(raw: impl IntoIterator<Item = RawJobRecord>) -> Self {
        raw.into_iter().map(JobRecord::from).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JobRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.records.iter()
    }
}

impl FromIterator<JobRecord> for Corpus {
    fn from_iter<T: IntoIterator<Item = JobRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for Corpus {
    type Output = JobRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}
