//! Filtering, ordering and fallback selection of scored records.

use crate::document::record::{Corpus, JobRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Optional attribute constraints, combined with AND.
///
/// Each present value must occur in the matching field as a case-insensitive
/// substring. Blank values are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub location: Option<String>,
    pub company: Option<String>,
    pub skill_level: Option<String>,
}

fn field_matches(field: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim).filter(|n| !n.is_empty()) {
        None => true,
        Some(needle) => field.to_lowercase().contains(&needle.to_lowercase()),
    }
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        [&self.location, &self.company, &self.skill_level]
            .iter()
            .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
    }

    pub fn matches(&self, record: &JobRecord) -> bool {
        field_matches(&record.location, self.location.as_deref())
            && field_matches(&record.company, self.company.as_deref())
            && field_matches(&record.skill_level, self.skill_level.as_deref())
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Highest similarity first.
    #[default]
    Relevance,
    /// Newest first by the raw `date_posted` text.
    Date,
    /// Company name A-Z.
    Company,
}

impl SortBy {
    /// Parses a sort key; absent or unrecognized values mean [`SortBy::Relevance`].
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("date") => Self::Date,
            Some("company") => Self::Company,
            _ => Self::Relevance,
        }
    }

    fn compare(self, corpus: &Corpus, scores: &[f64], a: usize, b: usize) -> Ordering {
        match self {
            Self::Relevance => scores[b].total_cmp(&scores[a]),
            Self::Date => corpus[b].date_posted.cmp(&corpus[a].date_posted),
            Self::Company => corpus[a].company.cmp(&corpus[b].company),
        }
    }
}

/// Records searched by the title fallback when weighted matching finds nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackScope {
    /// Only records passing the filters.
    #[default]
    Filtered,
    /// The whole corpus, ignoring filters.
    Corpus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOptions {
    pub top_n: usize,
    pub filters: Filters,
    pub sort_by: SortBy,
    pub fallback_scope: FallbackScope,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            filters: Filters::default(),
            sort_by: SortBy::default(),
            fallback_scope: FallbackScope::default(),
        }
    }
}

/// A selected record. `similarity` is `None` for title-fallback matches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub record: JobRecord,
    pub similarity: Option<f64>,
}

/// Selects at most `options.top_n` records.
///
/// Records passing the filters with a positive score are ordered by
/// `options.sort_by` (stable, ties keep corpus order). When none qualify, the
/// records whose title contains `query` case-insensitively are returned in
/// corpus order instead.
pub fn rank(corpus: &Corpus, scores: &[f64], query: &str, options: &RankOptions) -> Vec<RankedResult> {
    debug_assert_eq!(scores.len(), corpus.len());

    let filtered: Vec<usize> = (0..corpus.len())
        .filter(|&i| options.filters.matches(&corpus[i]))
        .collect();

    let mut matched: Vec<usize> = filtered
        .iter()
        .copied()
        .filter(|&i| scores.get(i).is_some_and(|&s| s > 0.0))
        .collect();

    if matched.is_empty() {
        let pool = match options.fallback_scope {
            FallbackScope::Filtered => filtered,
            FallbackScope::Corpus => (0..corpus.len()).collect(),
        };
        return title_fallback(corpus, &pool, query, options.top_n);
    }

    matched.sort_by(|&a, &b| options.sort_by.compare(corpus, scores, a, b));
    matched
        .into_iter()
        .take(options.top_n)
        .map(|i| RankedResult {
            record: corpus[i].clone(),
            similarity: Some(scores[i]),
        })
        .collect()
}

fn title_fallback(corpus: &Corpus, pool: &[usize], query: &str, top_n: usize) -> Vec<RankedResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    pool.iter()
        .map(|&i| &corpus[i])
        .filter(|record| record.title.to_lowercase().contains(&needle))
        .take(top_n)
        .map(|record| RankedResult {
            record: record.clone(),
            similarity: None,
        })
        .collect()
}
