//! Job board ingestion.
//!
//! Each board is a [`JobSource`]. [`fetch_all`] queries every source
//! concurrently and isolates failures: a source that errors or exceeds the
//! timeout is logged and contributes no records.

pub mod boards;

use crate::document::record::RawJobRecord;
use futures::future::{BoxFuture, join_all};
use log::{info, warn};
use std::time::Duration;

pub use boards::{BoardSource, BoardSpec, boards_from_settings};

/// A provider of raw postings for a search query.
pub trait JobSource: Send + Sync {
    /// Provenance tag, also used in logs.
    fn name(&self) -> &str;

    fn fetch<'a>(&'a self, query: &'a str) -> BoxFuture<'a, anyhow::Result<Vec<RawJobRecord>>>;
}

/// Fetches from every source and concatenates the results in source order.
pub async fn fetch_all(
    sources: &[Box<dyn JobSource>],
    query: &str,
    timeout: Duration,
) -> Vec<RawJobRecord> {
    let tasks = sources.iter().map(|source| async move {
        let outcome = tokio::time::timeout(timeout, source.fetch(query)).await;
        (source.name(), outcome)
    });

    let mut records = Vec::new();
    for (name, outcome) in join_all(tasks).await {
        match outcome {
            Ok(Ok(batch)) => {
                info!("Fetched {} postings from {}", batch.len(), name);
                records.extend(batch);
            }
            Ok(Err(e)) => warn!("Skipping source {}: {:#}", name, e),
            Err(_) => warn!("Skipping source {}: no response within {:?}", name, timeout),
        }
    }
    records
}
