use std::path::PathBuf;
use thiserror::Error;

/// Invalid run options. Raised before any file is read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown ranking strategy `{0}` (expected `pagerank` or `git-changes`)")]
    UnknownRankingStrategy(String),
    #[error("max_workers must be at least 1, got {0}")]
    InvalidMaxWorkers(usize),
    #[error("invalid log level `{0}`")]
    InvalidLogLevel(String),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("root path {} does not exist", .0.display())]
    RootNotFound(PathBuf),
    #[error("root path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid glob pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },
    #[error("walking source tree")]
    Walk(#[source] ignore::Error),
}

/// Grammar or parse failure for one file; the file is skipped.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{language}: incompatible grammar")]
    Grammar {
        language: String,
        #[source]
        source: tree_sitter::LanguageError,
    },
    #[error("{language}: invalid structural query")]
    Query {
        language: String,
        #[source]
        source: tree_sitter::QueryError,
    },
    #[error("{language}: failed to parse {path}")]
    Parse { language: String, path: String },
}

impl ParserError {
    pub fn language(&self) -> &str {
        match self {
            ParserError::Grammar { language, .. }
            | ParserError::Query { language, .. }
            | ParserError::Parse { language, .. } => language,
        }
    }
}

#[derive(Debug, Error)]
pub enum RankerError {
    #[error("git is not available")]
    GitUnavailable(#[source] std::io::Error),
    #[error("git exited with {status}: {stderr}")]
    GitFailed { status: String, stderr: String },
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("failed to start extraction worker pool")]
    WorkerPool(#[source] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("discovery failed")]
    Discovery(#[from] DiscoveryError),
    #[error("graph assembly failed")]
    Assembly(#[from] AssemblyError),
}
