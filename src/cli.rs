use crate::config::RunOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "symgraph",
    version,
    about = "Ranked symbol and dependency graph of a source tree",
    after_help = r#"Examples:
  symgraph analyze .
  symgraph analyze . --ranking git-changes --top 20
  symgraph analyze src --include '**/*.ts' --ignore '**/*.test.ts' --max-workers 8 --pretty
  symgraph languages
"#
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build and rank the graph, print it as JSON.
    Analyze {
        #[arg(default_value = ".")]
        root: PathBuf,
        /// Only analyze files matching this glob (repeatable).
        #[arg(long)]
        include: Vec<String>,
        /// Skip files matching this glob (repeatable).
        #[arg(long)]
        ignore: Vec<String>,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_gitignore: bool,
        /// Ranking strategy: pagerank|git-changes [default: pagerank].
        #[arg(long)]
        ranking: Option<String>,
        /// Extraction worker threads; 1 runs in-process [default: 1].
        #[arg(long)]
        max_workers: Option<usize>,
        /// Log filter used when RUST_LOG is unset [default: info].
        #[arg(long)]
        log_level: Option<String>,
        /// Print stats and the N highest-ranked nodes instead of the full graph.
        #[arg(long)]
        top: Option<usize>,
        /// Pretty-print JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// List supported languages and their extensions.
    Languages,
}

/// Flags of `analyze` that map onto [`RunOptions`].
pub struct AnalyzeFlags {
    pub root: PathBuf,
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    pub no_gitignore: bool,
    pub ranking: Option<String>,
    pub max_workers: Option<usize>,
    pub log_level: Option<String>,
}

impl AnalyzeFlags {
    /// Defaults, then SYMGRAPH_* environment variables, then explicit flags.
    pub fn into_run_options(self) -> RunOptions {
        let mut options = RunOptions::new(self.root).with_env_overrides();
        options.include = self.include;
        options.ignore = self.ignore;
        options.no_gitignore |= self.no_gitignore;
        if let Some(ranking) = self.ranking {
            options.ranking_strategy = ranking;
        }
        if let Some(max_workers) = self.max_workers {
            options.max_workers = max_workers;
        }
        if let Some(log_level) = self.log_level {
            options.log_level = log_level;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_analyze_flags() {
        let args = Args::parse_from([
            "symgraph",
            "analyze",
            "repo",
            "--include",
            "src/**",
            "--include",
            "lib/**",
            "--ranking",
            "git-changes",
            "--max-workers",
            "4",
            "--top",
            "5",
        ]);
        match args.command {
            Command::Analyze {
                root,
                include,
                ranking,
                max_workers,
                top,
                ..
            } => {
                assert_eq!(root, PathBuf::from("repo"));
                assert_eq!(include, vec!["src/**", "lib/**"]);
                assert_eq!(ranking.as_deref(), Some("git-changes"));
                assert_eq!(max_workers, Some(4));
                assert_eq!(top, Some(5));
            }
            Command::Languages => panic!("expected analyze"),
        }
    }
}
