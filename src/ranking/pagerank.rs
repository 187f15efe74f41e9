//! Link-analysis ranking over the symbol graph.
//!
//! Every edge kind counts as a vote from its source to its target. Parallel
//! edges between the same pair (a call and an import, say) collapse into one
//! link, so a pair of nodes never votes twice. Mass held by nodes without
//! outgoing links is spread uniformly on every iteration.

use super::Ranker;
use crate::model::{Graph, RankedGraph};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

const TOLERANCE: f64 = 1e-6;

pub struct PageRanker {
    damping: f64,
    max_iterations: usize,
}

impl Default for PageRanker {
    fn default() -> Self {
        Self::new(0.85, 100)
    }
}

impl PageRanker {
    pub fn new(damping: f64, max_iterations: usize) -> Self {
        Self {
            damping: damping.clamp(0.0, 1.0),
            max_iterations: max_iterations.max(1),
        }
    }

    fn link_graph(graph: &Graph) -> (DiGraph<&str, ()>, Vec<NodeIndex>) {
        let mut links = DiGraph::with_capacity(graph.nodes().len(), graph.edges().len());
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();
        let mut order = Vec::with_capacity(graph.nodes().len());
        for id in graph.nodes().keys() {
            let idx = links.add_node(id.as_str());
            index.insert(id.as_str(), idx);
            order.push(idx);
        }
        for edge in graph.edges() {
            if let (Some(from), Some(to)) = (
                index.get(edge.from_id.as_str()),
                index.get(edge.to_id.as_str()),
            ) {
                links.update_edge(*from, *to, ());
            }
        }
        (links, order)
    }

    /// Raw scores keyed by node id; they sum to 1 for a non-empty graph.
    pub fn scores(&self, graph: &Graph) -> BTreeMap<String, f64> {
        if graph.is_empty() {
            return BTreeMap::new();
        }
        let n = graph.nodes().len();
        let (links, order) = Self::link_graph(graph);
        let out_degree: Vec<usize> = order
            .iter()
            .map(|idx| links.neighbors_directed(*idx, Direction::Outgoing).count())
            .collect();

        let uniform = 1.0 / n as f64;
        let mut ranks = vec![uniform; n];
        let mut next = vec![0.0; n];
        let mut iterations = 0;
        for _ in 0..self.max_iterations {
            iterations += 1;
            let dangling: f64 = ranks
                .iter()
                .zip(&out_degree)
                .filter(|(_, degree)| **degree == 0)
                .map(|(rank, _)| rank)
                .sum();
            let base = (1.0 - self.damping) * uniform + self.damping * dangling * uniform;

            for (slot, idx) in next.iter_mut().zip(&order) {
                let incoming: f64 = links
                    .neighbors_directed(*idx, Direction::Incoming)
                    .map(|pred| ranks[pred.index()] / out_degree[pred.index()] as f64)
                    .sum();
                *slot = base + self.damping * incoming;
            }

            let delta = ranks
                .iter()
                .zip(&next)
                .map(|(old, new)| (new - old).abs())
                .fold(0.0_f64, f64::max);
            std::mem::swap(&mut ranks, &mut next);
            if delta < TOLERANCE {
                break;
            }
        }
        tracing::debug!(nodes = n, iterations, "pagerank converged");

        order
            .iter()
            .map(|idx| (links[*idx].to_string(), ranks[idx.index()]))
            .collect()
    }
}

impl Ranker for PageRanker {
    fn rank(&self, graph: Graph) -> RankedGraph {
        let scores = self.scores(&graph);
        RankedGraph::new(graph, scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeKind, SymbolKind, SymbolNode};

    fn graph(ids: &[&str], edges: &[(&str, &str, EdgeKind)]) -> Graph {
        let nodes = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    SymbolNode::new(*id, SymbolKind::Function, *id, "a.py", 1, 1),
                )
            })
            .collect();
        let edges = edges
            .iter()
            .map(|(from, to, kind)| Edge::new(*from, *to, *kind))
            .collect();
        Graph::new(nodes, edges)
    }

    #[test]
    fn empty_graph_has_no_ranks() {
        let ranked = PageRanker::default().rank(Graph::default());
        assert!(ranked.ranks().is_empty());
    }

    #[test]
    fn scores_sum_to_one() {
        let g = graph(
            &["a", "b", "c"],
            &[("a", "b", EdgeKind::Calls), ("b", "c", EdgeKind::Calls)],
        );
        let total: f64 = PageRanker::default().scores(&g).values().sum();
        assert!((total - 1.0).abs() < 1e-6, "total = {total}");
    }

    #[test]
    fn parallel_edges_count_once() {
        let single = graph(&["a", "b", "c"], &[("a", "b", EdgeKind::Calls)]);
        let doubled = graph(
            &["a", "b", "c"],
            &[("a", "b", EdgeKind::Calls), ("a", "b", EdgeKind::Imports)],
        );
        let ranker = PageRanker::default();
        let left = ranker.scores(&single);
        let right = ranker.scores(&doubled);
        for id in ["a", "b", "c"] {
            assert!((left[id] - right[id]).abs() < 1e-12);
        }
    }
}
