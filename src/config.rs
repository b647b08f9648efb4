//! Layered configuration for the job matcher.
//!
//! Values are resolved in this order, later layers winning:
//! - Built-in defaults
//! - TOML configuration file (`jobmatch.toml` unless a path is given)
//! - Environment variables
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `JOBMATCH_` and use double
//! underscores to separate nested levels:
//! - `JOBMATCH_SEARCH__DEFAULT_LIMIT=10` sets `search.default_limit`
//! - `JOBMATCH_INGEST__TIMEOUT_SECS=5` sets `ingest.timeout_secs`
//! - `JOBMATCH_SERVER__BIND=0.0.0.0:8080` sets `server.bind`

use crate::engine::rank::FallbackScope;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "jobmatch.toml";
const ENV_PREFIX: &str = "JOBMATCH_";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Where the corpus snapshot and index cache live
    #[serde(default)]
    pub data: DataConfig,

    /// Query defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Job board ingestion
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Link normalization
    #[serde(default)]
    pub links: LinkConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DataConfig {
    /// Tabular corpus snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Fitted index cache (corpus + weight matrix)
    #[serde(default = "default_index_cache_path")]
    pub index_cache_path: PathBuf,

    /// Optional stopword list, one word per line; the built-in list is used otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_words_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// `relevance`, `date` or `company`; anything else means relevance
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Which records the title fallback searches when filters are active
    #[serde(default)]
    pub fallback_scope: FallbackScope,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IngestConfig {
    /// Query sent to every job board when the snapshot is rebuilt
    #[serde(default = "default_seed_query")]
    pub query: String,

    /// Result pages requested per board
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Per-source network timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Boards to scrape, by name
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LinkConfig {
    /// Prefix for relative links from sources without their own entry
    #[serde(default = "default_base_url")]
    pub default_base: String,

    /// Per-source prefix, keyed by the record's `source` tag
    #[serde(default = "default_source_bases")]
    pub sources: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Directory uploaded resumes are written to before extraction
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/jobs.csv")
}
fn default_index_cache_path() -> PathBuf {
    PathBuf::from("data/index_cache.bin")
}
fn default_limit() -> usize {
    5
}
fn default_sort() -> String {
    "relevance".to_string()
}
fn default_seed_query() -> String {
    "data scientist".to_string()
}
fn default_pages() -> u32 {
    2
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}
fn default_sources() -> Vec<String> {
    ["monster", "apna", "cuvette", "indeed"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_base_url() -> String {
    "https://www.naukri.com".to_string()
}
fn default_source_bases() -> HashMap<String, String> {
    [
        ("Monster", "https://www.monster.com"),
        ("Apna", "https://apna.co"),
        ("Cuvette", "https://cuvette.io"),
        ("Indeed", "https://www.indeed.com"),
    ]
    .into_iter()
    .map(|(source, base)| (source.to_string(), base.to_string()))
    .collect()
}
fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            index_cache_path: default_index_cache_path(),
            stop_words_path: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_sort: default_sort(),
            fallback_scope: FallbackScope::default(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            query: default_seed_query(),
            pages: default_pages(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            sources: default_sources(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_base: default_base_url(),
            sources: default_source_bases(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Settings {
    /// Load configuration from `jobmatch.toml` in the working directory and the environment.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific TOML file; a missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }
}
