//! Job posting matcher.
//!
//! A corpus of postings is loaded from a CSV snapshot (or scraped from job
//! boards when none exists), a TF-IDF term space is fit over it, and free-text
//! queries or resume skills are ranked against it by cosine similarity, with
//! attribute filters, selectable ordering and a title-substring fallback.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod extract;
pub mod index;
pub mod ingest;
pub mod matrix;
pub mod preprocessing;
pub mod query;

pub use config::Settings;
pub use document::record::{Corpus, JobRecord, RawJobRecord};
pub use document::store::CorpusStore;
pub use engine::links::LinkNormalizer;
pub use engine::rank::{FallbackScope, Filters, RankOptions, RankedResult, SortBy};
pub use error::{MatchError, StoreError};
pub use index::{SearchIndex, SearchOutcome, SharedIndex};
pub use preprocessing::tokenizer::Tokenizer;
pub use query::{QueryOrigin, ResolvedQuery};

use log::warn;

/// Tokenizer from the configured stopword file, or the built-in English list.
pub fn tokenizer_from_settings(settings: &Settings) -> Tokenizer {
    match &settings.data.stop_words_path {
        Some(path) => Tokenizer::from_file(path).unwrap_or_else(|e| {
            warn!(
                "Could not load stop words from {}: {}. Using the built-in list.",
                path.display(),
                e
            );
            Tokenizer::english()
        }),
        None => Tokenizer::english(),
    }
}

/// Loads the corpus through `store` and builds (or reuses) the fitted index.
pub async fn build_index(settings: &Settings, store: &CorpusStore, refresh: bool) -> SearchIndex {
    let corpus = if refresh {
        store.rebuild().await
    } else {
        store.load().await
    };
    SearchIndex::load_or_build(
        &settings.data.index_cache_path,
        corpus,
        tokenizer_from_settings(settings),
        LinkNormalizer::from(&settings.links),
    )
}
