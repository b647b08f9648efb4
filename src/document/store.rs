use crate::config::Settings;
use crate::document::parser::{read_snapshot, write_snapshot};
use crate::document::record::Corpus;
use crate::ingest::{JobSource, boards_from_settings, fetch_all};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads the corpus from its snapshot, or rebuilds it from the job boards.
pub struct CorpusStore {
    snapshot_path: PathBuf,
    sources: Vec<Box<dyn JobSource>>,
    seed_query: String,
    timeout: Duration,
}

impl CorpusStore {
    pub fn new(
        snapshot_path: impl Into<PathBuf>,
        sources: Vec<Box<dyn JobSource>>,
        seed_query: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            sources,
            seed_query: seed_query.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self::new(
            settings.data.snapshot_path.clone(),
            boards_from_settings(&settings.ingest)?,
            settings.ingest.query.clone(),
            Duration::from_secs(settings.ingest.timeout_secs),
        ))
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// The snapshot when it exists and holds records, otherwise a fresh ingestion.
    pub async fn load(&self) -> Corpus {
        match read_snapshot(&self.snapshot_path) {
            Ok(Some(corpus)) if !corpus.is_empty() => {
                info!(
                    "Loaded {} postings from snapshot {}",
                    corpus.len(),
                    self.snapshot_path.display()
                );
                return corpus;
            }
            Ok(Some(_)) => info!("Snapshot {} is empty", self.snapshot_path.display()),
            Ok(None) => info!("No snapshot at {}", self.snapshot_path.display()),
            Err(e) => warn!("{}", e),
        }
        self.rebuild().await
    }

    /// Ingests from every source and persists the merged corpus as the new snapshot.
    pub async fn rebuild(&self) -> Corpus {
        info!(
            "Ingesting '{}' from {} sources",
            self.seed_query,
            self.sources.len()
        );
        let corpus = Corpus::from_raw(fetch_all(&self.sources, &self.seed_query, self.timeout).await);

        match write_snapshot(&self.snapshot_path, &corpus) {
            Ok(()) => info!(
                "Wrote {} postings to snapshot {}",
                corpus.len(),
                self.snapshot_path.display()
            ),
            Err(e) => warn!("{}", e),
        }
        corpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::record::{JobRecord, RawJobRecord};
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    impl JobSource for CountingSource {
        fn name(&self) -> &str {
            "Counting"
        }

        fn fetch<'a>(&'a self, query: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<RawJobRecord>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(vec![RawJobRecord {
                    title: Some(format!("{query} lead")),
                    link: Some("/jobs/9".to_string()),
                    source: Some("Counting".to_string()),
                    ..Default::default()
                }])
            })
        }
    }

    fn store(dir: &TempDir, calls: &Arc<AtomicUsize>) -> CorpusStore {
        CorpusStore::new(
            dir.path().join("data").join("jobs.csv"),
            vec![Box::new(CountingSource {
                calls: Arc::clone(calls),
            })],
            "data scientist",
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn ingests_once_then_uses_snapshot() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store(&dir, &calls);

        let first = store.load().await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "data scientist lead");
        assert!(store.snapshot_path().exists());

        let second = store.load().await;
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_snapshot_triggers_ingestion() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store(&dir, &calls);
        write_snapshot(store.snapshot_path(), &Corpus::default()).unwrap();

        let corpus = store.load().await;
        assert_eq!(corpus.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn existing_snapshot_skips_sources() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = store(&dir, &calls);
        let corpus = Corpus::new(vec![JobRecord::from(RawJobRecord {
            title: Some("Cached Role".to_string()),
            ..Default::default()
        })]);
        write_snapshot(store.snapshot_path(), &corpus).unwrap();

        assert_eq!(store.load().await, corpus);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
