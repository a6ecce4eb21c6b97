use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Input of a single collection job. Immutable once accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectConfig {
    pub queries: Vec<String>,
    #[serde(default = "default_year_from")]
    pub year_from: i32,
    #[serde(default = "default_instances")]
    pub instances: Vec<String>,
    #[serde(default = "default_max_links")]
    pub max_links_per_query: usize,
    #[serde(default = "default_pause_sec")]
    pub pause_sec: u64,
}

fn default_year_from() -> i32 {
    2017
}

fn default_instances() -> Vec<String> {
    vec![
        "апелляция".to_string(),
        "кассация".to_string(),
        "ВС".to_string(),
    ]
}

fn default_max_links() -> usize {
    30
}

fn default_pause_sec() -> u64 {
    6
}

impl CollectConfig {
    /// Creates a config for the given queries with every other field defaulted.
    pub fn with_queries<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            year_from: default_year_from(),
            instances: default_instances(),
            max_links_per_query: default_max_links(),
            pause_sec: default_pause_sec(),
        }
    }
}

/// Process-wide settings for the job service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
    #[serde(default = "default_max_queries_per_job")]
    pub max_queries_per_job: usize,
    /// Delay between page fetches during extraction.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_max_queries_per_job() -> usize {
    100
}

fn default_fetch_delay_ms() -> u64 {
    1500
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_queries_per_job: default_max_queries_per_job(),
            fetch_delay_ms: default_fetch_delay_ms(),
        }
    }
}
