//! Graph assembly: extract every file, merge the per-file output, then
//! resolve relations in two phases (imports first, everything else after).

use crate::error::AssemblyError;
use crate::extract::{Extractor, FileExtraction};
use crate::grammar::{self, GrammarLoader};
use crate::model::{Edge, FileContent, Graph, RelationKind, SymbolNode, UnresolvedRelation};
use crate::resolve::{KnownFiles, ResolvedImports, SymbolResolver};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyStats {
    pub files_seen: usize,
    pub files_extracted: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub nodes: usize,
    pub edges: usize,
    pub relations_dropped: usize,
}

#[derive(Debug)]
pub struct Assembled {
    pub graph: Graph,
    pub stats: AssemblyStats,
}

enum Outcome {
    Extracted(FileExtraction),
    Unsupported,
    Failed,
}

pub struct GraphAssembler<'a> {
    loader: &'a GrammarLoader,
    max_workers: usize,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(loader: &'a GrammarLoader, max_workers: usize) -> Self {
        Self {
            loader,
            max_workers: max_workers.max(1),
        }
    }

    pub fn assemble(&self, files: &[FileContent]) -> Result<Assembled, AssemblyError> {
        let started = Instant::now();
        let outcomes = if self.max_workers == 1 || files.len() < 2 {
            files.iter().map(|file| self.extract_one(file)).collect()
        } else {
            self.extract_parallel(files)?
        };

        let mut stats = AssemblyStats {
            files_seen: files.len(),
            ..AssemblyStats::default()
        };
        let mut nodes: BTreeMap<String, SymbolNode> = BTreeMap::new();
        let mut relations: Vec<UnresolvedRelation> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Extracted(extraction) => {
                    stats.files_extracted += 1;
                    for node in extraction.nodes {
                        nodes.entry(node.id.clone()).or_insert(node);
                    }
                    relations.extend(extraction.relations);
                }
                Outcome::Unsupported => stats.files_skipped += 1,
                Outcome::Failed => stats.files_failed += 1,
            }
        }

        let known: KnownFiles = files
            .iter()
            .map(|file| file.path.as_str())
            .filter(|path| nodes.contains_key(*path))
            .collect();
        let imports = ResolvedImports::resolve(&nodes, &relations, &known);
        tracing::debug!(
            edges = imports.edges().len(),
            unresolved = imports.unresolved(),
            "imports resolved"
        );

        let mut edges: Vec<Edge> = imports.edges().to_vec();
        let mut dropped = imports.unresolved();
        {
            let resolver = SymbolResolver::new(&nodes, &imports);
            for relation in relations.iter().filter(|r| r.kind != RelationKind::Imports) {
                match resolver.resolve_relation(relation) {
                    Some(edge) => edges.push(edge),
                    None => dropped += 1,
                }
            }
        }

        let graph = Graph::new(nodes, edges);
        stats.nodes = graph.nodes().len();
        stats.edges = graph.edges().len();
        stats.relations_dropped = dropped;
        tracing::info!(
            files = stats.files_seen,
            extracted = stats.files_extracted,
            failed = stats.files_failed,
            nodes = stats.nodes,
            edges = stats.edges,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "graph assembled"
        );
        Ok(Assembled { graph, stats })
    }

    fn extract_one(&self, file: &FileContent) -> Outcome {
        let Some(config) = grammar::lookup(&file.path) else {
            return Outcome::Unsupported;
        };
        match Extractor::new(self.loader).extract_with(file, config) {
            Ok(extraction) => {
                tracing::debug!(
                    path = %file.path,
                    nodes = extraction.nodes.len(),
                    relations = extraction.relations.len(),
                    "extracted"
                );
                Outcome::Extracted(extraction)
            }
            Err(err) => {
                tracing::warn!(path = %file.path, language = err.language(), error = %err, "skipping file");
                Outcome::Failed
            }
        }
    }

    /// One task per file on a bounded pool; results come back over a channel
    /// tagged with the input index so the merge order matches the input.
    fn extract_parallel(&self, files: &[FileContent]) -> Result<Vec<Outcome>, AssemblyError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .thread_name(|idx| format!("symgraph-extract-{idx}"))
            .build()
            .map_err(AssemblyError::WorkerPool)?;

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for (idx, file) in files.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = self.extract_one(file);
                    // receiver outlives the scope
                    let _ = tx.send((idx, outcome));
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, Outcome)> = rx.into_iter().collect();
        results.sort_by_key(|(idx, _)| *idx);
        Ok(results.into_iter().map(|(_, outcome)| outcome).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EdgeKind;

    #[test]
    fn unsupported_files_count_as_skipped() {
        let loader = GrammarLoader::new();
        let files = vec![
            FileContent::new("notes.txt", "hello"),
            FileContent::new("main.py", "def main():\n    pass\n"),
        ];
        let assembled = GraphAssembler::new(&loader, 1).assemble(&files).unwrap();
        assert_eq!(assembled.stats.files_skipped, 1);
        assert_eq!(assembled.stats.files_extracted, 1);
        assert!(assembled.graph.node("notes.txt").is_none());
        assert!(assembled.graph.node("main.py#main").is_some());
    }

    #[test]
    fn calls_resolve_within_a_file() {
        let loader = GrammarLoader::new();
        let files = vec![FileContent::new(
            "app.py",
            "def helper():\n    return 1\n\ndef run():\n    return helper()\n",
        )];
        let assembled = GraphAssembler::new(&loader, 1).assemble(&files).unwrap();
        let calls: Vec<&Edge> = assembled
            .graph
            .edges()
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Calls)
            .collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].from_id, "app.py#run");
        assert_eq!(calls[0].to_id, "app.py#helper");
    }
}
