//! Weighted undirected graph in compressed sparse row form

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

/// Undirected tie graph. Every tie is stored as two arcs, one per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// offsets[i] to offsets[i+1] is the arc range of node i
    pub offsets: Vec<u32>,

    /// Concatenated, sorted neighbour lists
    pub edges: Vec<u32>,

    /// Tie weight of each arc, aligned with `edges`
    pub weights: Vec<u8>,

    /// Person identifier of each node index
    pub node_ids: Vec<u32>,
}

impl TieGraph {
    /// Neighbours of a node, sorted by index
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Tie weights aligned with `neighbors(node)`
    pub fn neighbor_weights(&self, node: usize) -> &[u8] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    /// Number of distinct neighbours
    pub fn degree(&self, node: usize) -> usize {
        (self.offsets[node + 1] - self.offsets[node]) as usize
    }

    /// Sum of incident tie weights
    pub fn strength(&self, node: usize) -> u32 {
        self.neighbor_weights(node).iter().map(|&w| u32::from(w)).sum()
    }

    /// Number of undirected ties
    pub fn tie_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Fraction of possible ties present
    pub fn density(&self) -> f64 {
        let n = self.node_count;
        if n < 2 {
            return 0.0;
        }
        self.tie_count() as f64 / (n * (n - 1) / 2) as f64
    }

    /// Iterate each undirected tie once as (a, b, weight) with a < b
    pub fn ties(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        (0..self.node_count).flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .zip(self.neighbor_weights(a))
                .filter(move |(&b, _)| (b as usize) > a)
                .map(move |(&b, &w)| (a, b as usize, w))
        })
    }

    /// Convert to a petgraph graph whose node weights are person identifiers
    pub fn to_petgraph(&self) -> UnGraph<u32, u8> {
        let mut graph = UnGraph::with_capacity(self.node_count, self.tie_count());
        let indices: Vec<NodeIndex> = self
            .node_ids
            .iter()
            .map(|&id| graph.add_node(id))
            .collect();
        for (a, b, w) in self.ties() {
            graph.add_edge(indices[a], indices[b], w);
        }
        graph
    }
}
