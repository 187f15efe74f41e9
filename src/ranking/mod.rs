//! Node importance. Both strategies take the frozen graph and return it with
//! a score for every node.

pub mod git;
pub mod pagerank;

pub use git::ChangeFrequencyRanker;
pub use pagerank::PageRanker;

use crate::config::ValidatedOptions;
use crate::error::ConfigurationError;
use crate::model::{Graph, RankedGraph};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingStrategy {
    #[default]
    PageRank,
    GitChanges,
}

impl RankingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            RankingStrategy::PageRank => "pagerank",
            RankingStrategy::GitChanges => "git-changes",
        }
    }
}

impl FromStr for RankingStrategy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pagerank" => Ok(RankingStrategy::PageRank),
            "git-changes" => Ok(RankingStrategy::GitChanges),
            _ => Err(ConfigurationError::UnknownRankingStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for RankingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait Ranker: Send + Sync {
    fn rank(&self, graph: Graph) -> RankedGraph;
}

pub fn ranker_for(options: &ValidatedOptions) -> Box<dyn Ranker> {
    let run = options.options();
    match options.ranking() {
        RankingStrategy::PageRank => Box::new(PageRanker::new(
            run.pagerank_damping,
            run.pagerank_iterations,
        )),
        RankingStrategy::GitChanges => Box::new(ChangeFrequencyRanker::new(
            run.root.clone(),
            run.git_max_commits,
        )),
    }
}
