//! The searchable index: a corpus with its fitted term space.

use crate::document::record::Corpus;
use crate::engine::links::LinkNormalizer;
use crate::engine::rank::{RankOptions, RankedResult, rank};
use crate::engine::search::score;
use crate::error::{MatchError, MatchResult, StoreError, StoreResult};
use crate::matrix::TfIdfMatrix;
use crate::preprocessing::tokenizer::Tokenizer;
use crate::query::{QueryOrigin, ResolvedQuery};
use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// A corpus and the model fitted on it, as persisted to the index cache.
#[derive(Serialize, Deserialize)]
struct CachedData {
    corpus: Corpus,
    tfidf_matrix: TfIdfMatrix,
}

fn load_cached_data(path: &Path) -> StoreResult<CachedData> {
    let cache_err = |source: Box<dyn std::error::Error + Send + Sync>| StoreError::CacheLoad {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| cache_err(Box::new(e)))?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|e| cache_err(e))
}

fn save_cached_data(data: &CachedData, path: &Path) -> StoreResult<()> {
    let cache_err = |source: Box<dyn std::error::Error + Send + Sync>| StoreError::CacheSave {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|e| cache_err(Box::new(e)))?;
    bincode::serialize_into(BufWriter::new(file), data).map_err(|e| cache_err(e))
}

/// Result of one search, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// The query as shown to the user.
    pub label: String,
    pub results: Vec<RankedResult>,
    /// Set when `results` is empty.
    pub message: Option<String>,
}

/// Immutable corpus + model pair. Rebuilt wholesale when the corpus changes.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    corpus: Corpus,
    tfidf_matrix: TfIdfMatrix,
    links: LinkNormalizer,
}

impl SearchIndex {
    pub fn build(corpus: Corpus, tokenizer: Tokenizer, links: LinkNormalizer) -> Self {
        let texts: Vec<&str> = corpus.iter().map(|r| r.skills_text()).collect();
        let tfidf_matrix = TfIdfMatrix::fit(&texts, tokenizer);
        info!(
            "Search index built: {} documents, {} terms",
            corpus.len(),
            tfidf_matrix.vocabulary_size()
        );
        Self {
            corpus,
            tfidf_matrix,
            links,
        }
    }

    /// Reuses the fitted model cached at `cache_path` when it was fit on the same
    /// corpus with the same tokenizer; otherwise fits anew and refreshes the cache.
    pub fn load_or_build(
        cache_path: &Path,
        corpus: Corpus,
        tokenizer: Tokenizer,
        links: LinkNormalizer,
    ) -> Self {
        match load_cached_data(cache_path) {
            Ok(cached) if cached.corpus == corpus && cached.tfidf_matrix.tokenizer() == &tokenizer => {
                info!("Loaded search index from cache {}", cache_path.display());
                return Self {
                    corpus: cached.corpus,
                    tfidf_matrix: cached.tfidf_matrix,
                    links,
                };
            }
            Ok(_) => info!("Index cache {} is stale, rebuilding", cache_path.display()),
            Err(e) => info!("No usable index cache ({}), building", e),
        }

        let index = Self::build(corpus, tokenizer, links);
        if let Err(e) = index.save_cache(cache_path) {
            warn!("{}", e);
        }
        index
    }

    pub fn save_cache(&self, path: &Path) -> StoreResult<()> {
        let data = CachedData {
            corpus: self.corpus.clone(),
            tfidf_matrix: self.tfidf_matrix.clone(),
        };
        save_cached_data(&data, path)?;
        info!("Search index cached to {}", path.display());
        Ok(())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn tfidf_matrix(&self) -> &TfIdfMatrix {
        &self.tfidf_matrix
    }

    pub fn document_count(&self) -> usize {
        self.corpus.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.tfidf_matrix.vocabulary_size()
    }

    /// Similarity of every record to `query`, indexed like the corpus.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        score(&self.tfidf_matrix, &self.corpus, query)
    }

    /// Scores, ranks and link-normalizes results for `query`.
    ///
    /// Blank typed text is rejected. A resume that yielded no skills is a
    /// normal no-match outcome.
    pub fn search(&self, query: &ResolvedQuery, options: &RankOptions) -> MatchResult<SearchOutcome> {
        let text = query.text.trim();
        let mut results = if text.is_empty() {
            if query.origin == QueryOrigin::Text {
                return Err(MatchError::MalformedQuery);
            }
            Vec::new()
        } else {
            let scores = self.scores(text);
            rank(&self.corpus, &scores, text, options)
        };
        self.links.apply(&mut results);

        let message = results.is_empty().then(|| query.no_match_message());
        Ok(SearchOutcome {
            label: query.label().to_string(),
            results,
            message,
        })
    }
}

/// The active index, replaceable while queries are in flight.
///
/// Readers clone the `Arc` and keep searching the index they started with;
/// [`SharedIndex::replace`] swaps in a fully built index and never mutates the old one.
pub struct SharedIndex {
    active: RwLock<(u64, Arc<SearchIndex>)>,
}

impl SharedIndex {
    pub fn new(index: SearchIndex) -> Self {
        Self {
            active: RwLock::new((1, Arc::new(index))),
        }
    }

    pub fn current(&self) -> Arc<SearchIndex> {
        Arc::clone(&self.active.read().1)
    }

    pub fn version(&self) -> u64 {
        self.active.read().0
    }

    /// Makes `index` active and returns its version.
    pub fn replace(&self, index: SearchIndex) -> u64 {
        let mut active = self.active.write();
        active.0 += 1;
        active.1 = Arc::new(index);
        active.0
    }
}
