//! Change-frequency ranking from git history.
//!
//! Runs `git log --name-only` over the most recent commits, counts how many
//! commits touched each file, and scores file nodes by `count / max_count`.
//! Symbol nodes always score 0. Any git failure degrades to all-zero ranks.

use super::Ranker;
use crate::error::RankerError;
use crate::model::{Graph, RankedGraph, SymbolKind};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct ChangeFrequencyRanker {
    root: PathBuf,
    max_commits: usize,
}

impl ChangeFrequencyRanker {
    pub fn new(root: impl Into<PathBuf>, max_commits: usize) -> Self {
        Self {
            root: root.into(),
            max_commits: max_commits.max(1),
        }
    }

    /// Commits touching each project-relative path, newest `max_commits` only.
    pub fn change_counts(&self) -> Result<HashMap<String, u64>, RankerError> {
        let prefix = run_git(&self.root, &["rev-parse", "--show-prefix"])?;
        let prefix = prefix.trim();
        let limit = format!("-n{}", self.max_commits);
        // unquoted paths so non-ASCII names match node file paths
        let log = run_git(
            &self.root,
            &[
                "-c",
                "core.quotePath=false",
                "log",
                "--name-only",
                "--format=",
                "--no-renames",
                &limit,
            ],
        )?;
        Ok(count_changes(&log, prefix))
    }
}

impl Ranker for ChangeFrequencyRanker {
    fn rank(&self, graph: Graph) -> RankedGraph {
        let counts = match self.change_counts() {
            Ok(counts) => counts,
            Err(err) => {
                tracing::warn!(root = %self.root.display(), error = %err, "change-frequency ranking unavailable, all ranks are 0");
                return RankedGraph::new(graph, BTreeMap::new());
            }
        };
        let max = counts.values().copied().max().unwrap_or(0);
        let mut ranks = BTreeMap::new();
        if max > 0 {
            for node in graph.nodes().values() {
                if node.kind != SymbolKind::File {
                    continue;
                }
                if let Some(count) = counts.get(&node.file_path) {
                    ranks.insert(node.id.clone(), *count as f64 / max as f64);
                }
            }
        }
        tracing::debug!(files = counts.len(), max, "change counts collected");
        RankedGraph::new(graph, ranks)
    }
}

fn run_git(root: &Path, args: &[&str]) -> Result<String, RankerError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(root)
        .output()
        .map_err(RankerError::GitUnavailable)?;
    if !output.status.success() {
        return Err(RankerError::GitFailed {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Counts path occurrences in `git log --name-only --format=` output. Paths
/// are relative to the repository top level; `prefix` (from
/// `git rev-parse --show-prefix`) maps them onto the analysed root and drops
/// files outside it.
fn count_changes(log: &str, prefix: &str) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for line in log.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(path) = line.strip_prefix(prefix) else {
            continue;
        };
        *counts.entry(path.to_string()).or_insert(0) += 1;
    }
    counts
}
