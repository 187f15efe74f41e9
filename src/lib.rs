//! Multi-language source trees to a ranked symbol/dependency graph.
//!
//! [`pipeline::Pipeline`] is the entry point: it discovers source files,
//! extracts symbols with tree-sitter queries, resolves imports and then
//! symbol references, and ranks the resulting [`model::Graph`].

pub mod assemble;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod grammar;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod ranking;
pub mod resolve;
pub mod util;

pub use assemble::{Assembled, AssemblyStats, GraphAssembler};
pub use config::{RunOptions, ValidatedOptions};
pub use error::{
    AssemblyError, ConfigurationError, DiscoveryError, ParserError, PipelineError, RankerError,
};
pub use model::{Edge, EdgeKind, FileContent, Graph, RankedGraph, SymbolKind, SymbolNode};
pub use pipeline::{Pipeline, analyze_files};
pub use ranking::{Ranker, RankingStrategy};
