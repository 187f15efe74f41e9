//! discover -> assemble -> rank.

use crate::assemble::{AssemblyStats, GraphAssembler};
use crate::config::{RunOptions, ValidatedOptions};
use crate::discovery::{self, DiscoveryOptions};
use crate::error::{ConfigurationError, PipelineError};
use crate::grammar::GrammarLoader;
use crate::model::{FileContent, RankedGraph};
use crate::ranking::ranker_for;
use std::time::Instant;

/// A configured run. Construction validates the options, so a bad ranking
/// strategy or worker count fails before any file is read.
pub struct Pipeline {
    options: ValidatedOptions,
    loader: GrammarLoader,
}

impl Pipeline {
    pub fn new(options: RunOptions) -> Result<Self, ConfigurationError> {
        let options = options.validate()?;
        Ok(Self {
            options,
            loader: GrammarLoader::new(),
        })
    }

    pub fn options(&self) -> &ValidatedOptions {
        &self.options
    }

    pub fn run(&self) -> Result<RankedGraph, PipelineError> {
        self.run_with_stats().map(|(ranked, _)| ranked)
    }

    pub fn run_with_stats(&self) -> Result<(RankedGraph, AssemblyStats), PipelineError> {
        let started = Instant::now();
        let files = discovery::discover(&DiscoveryOptions::from(self.options.options()))?;
        let result = self.analyze(&files)?;
        tracing::info!(
            root = %self.options.options().root.display(),
            ranking = %self.options.ranking(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis finished"
        );
        Ok(result)
    }

    /// Assembles and ranks files supplied by the caller.
    pub fn analyze(&self, files: &[FileContent]) -> Result<(RankedGraph, AssemblyStats), PipelineError> {
        let assembled =
            GraphAssembler::new(&self.loader, self.options.max_workers()).assemble(files)?;
        let ranked = ranker_for(&self.options).rank(assembled.graph);
        Ok((ranked, assembled.stats))
    }
}

/// One-shot [`Pipeline::analyze`] with a fresh grammar cache.
pub fn analyze_files(
    files: &[FileContent],
    options: &ValidatedOptions,
) -> Result<RankedGraph, PipelineError> {
    let loader = GrammarLoader::new();
    let assembled = GraphAssembler::new(&loader, options.max_workers()).assemble(files)?;
    Ok(ranker_for(options).rank(assembled.graph))
}
