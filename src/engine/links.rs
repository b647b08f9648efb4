use crate::config::LinkConfig;
use crate::document::record::is_missing;
use crate::engine::rank::RankedResult;
use std::collections::HashMap;

/// Turns relative posting links into absolute URLs using a per-source base.
#[derive(Debug, Clone)]
pub struct LinkNormalizer {
    default_base: String,
    per_source: HashMap<String, String>,
}

impl Default for LinkNormalizer {
    fn default() -> Self {
        Self::from(&LinkConfig::default())
    }
}

impl From<&LinkConfig> for LinkNormalizer {
    fn from(config: &LinkConfig) -> Self {
        Self::new(config.default_base.clone(), config.sources.clone())
    }
}

fn is_absolute(link: &str) -> bool {
    let lowered = link.get(..8).unwrap_or(link).to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

impl LinkNormalizer {
    pub fn new(default_base: String, per_source: HashMap<String, String>) -> Self {
        Self {
            default_base,
            per_source,
        }
    }

    fn base_for(&self, source: &str) -> &str {
        self.per_source
            .get(source)
            .map(String::as_str)
            .unwrap_or(&self.default_base)
    }

    /// Absolute form of `link` for a record from `source`. Absolute links and the
    /// missing-value sentinel are returned unchanged.
    pub fn normalize(&self, source: &str, link: &str) -> String {
        if is_absolute(link) || is_missing(link) {
            return link.to_string();
        }

        let base = self.base_for(source).trim_end_matches('/');
        let path = link.trim_start_matches('/');
        format!("{base}/{path}")
    }

    pub fn apply(&self, results: &mut [RankedResult]) {
        for result in results {
            let record = &mut result.record;
            record.link = self.normalize(&record.source, &record.link);
        }
    }
}
