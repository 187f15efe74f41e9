// Run options with defaults, env overrides and eager validation.

use crate::error::ConfigurationError;
use crate::ranking::RankingStrategy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Options for one analysis run, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub root: PathBuf,
    /// Whitelist globs; when non-empty only matching files are analyzed.
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    /// Include files ignored by .gitignore.
    pub no_gitignore: bool,
    /// `pagerank` or `git-changes` (SYMGRAPH_RANKING)
    pub ranking_strategy: String,
    /// Extraction worker count; 1 runs in-process (SYMGRAPH_MAX_WORKERS)
    pub max_workers: usize,
    /// Default filter when RUST_LOG is unset (SYMGRAPH_LOG)
    pub log_level: String,
    /// Files larger than this are skipped (SYMGRAPH_MAX_FILE_SIZE)
    pub max_file_size: u64,
    /// History depth for change-frequency ranking (SYMGRAPH_GIT_MAX_COMMITS)
    pub git_max_commits: usize,
    pub pagerank_damping: f64,
    pub pagerank_iterations: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: Vec::new(),
            ignore: Vec::new(),
            no_gitignore: false,
            ranking_strategy: "pagerank".to_string(),
            max_workers: 1,
            log_level: "info".to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            git_max_commits: 1000,
            pagerank_damping: 0.85,
            pagerank_iterations: 100,
        }
    }
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Applies SYMGRAPH_* environment variables on top of the current values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("SYMGRAPH_RANKING") {
            self.ranking_strategy = val;
        }
        if let Ok(val) = env::var("SYMGRAPH_LOG") {
            self.log_level = val;
        }
        override_number("SYMGRAPH_MAX_WORKERS", &mut self.max_workers);
        override_number("SYMGRAPH_MAX_FILE_SIZE", &mut self.max_file_size);
        override_number("SYMGRAPH_GIT_MAX_COMMITS", &mut self.git_max_commits);
        self
    }

    /// Checks everything that can be checked without touching the file system.
    pub fn validate(&self) -> Result<ValidatedOptions, ConfigurationError> {
        let ranking = RankingStrategy::from_str(&self.ranking_strategy)?;
        if self.max_workers == 0 {
            return Err(ConfigurationError::InvalidMaxWorkers(self.max_workers));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigurationError::InvalidLogLevel(self.log_level.clone()));
        }
        Ok(ValidatedOptions {
            options: self.clone(),
            ranking,
        })
    }
}

fn override_number<T>(key: &str, slot: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    if let Ok(val) = env::var(key) {
        match val.parse() {
            Ok(parsed) => *slot = parsed,
            Err(_) => tracing::warn!(
                "invalid {} value: {}, using default: {}",
                key,
                val,
                slot
            ),
        }
    }
}

/// Options that passed validation; the only input the pipeline accepts.
#[derive(Debug, Clone)]
pub struct ValidatedOptions {
    options: RunOptions,
    ranking: RankingStrategy,
}

impl ValidatedOptions {
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn ranking(&self) -> RankingStrategy {
        self.ranking
    }

    pub fn max_workers(&self) -> usize {
        self.options.max_workers
    }
}
