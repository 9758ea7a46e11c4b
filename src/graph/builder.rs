//! Graph construction module

use std::collections::HashMap;

use crate::data::Tie;
use crate::graph::TieGraph;

/// Builder for incrementally constructing a TieGraph
pub struct GraphBuilder {
    /// Mapping from person identifiers to node indices
    id_to_index: HashMap<u32, u32>,

    /// Person identifier of each node
    node_ids: Vec<u32>,

    /// Adjacency lists of (neighbour, weight) for each node
    adjacency_lists: Vec<Vec<(u32, u8)>>,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
        }
    }

    /// Builder with nodes 1..=n already registered, so isolates keep their index
    pub fn with_people(n: usize) -> Self {
        let mut builder = Self::with_capacity(n);
        for id in 1..=n as u32 {
            builder.get_or_create_node(id);
        }
        builder
    }

    /// Get or create the node index for a person identifier
    pub fn get_or_create_node(&mut self, id: u32) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id, idx);
        self.node_ids.push(id);
        self.adjacency_lists.push(Vec::new());
        idx
    }

    /// Add an undirected tie. Self ties are ignored.
    pub fn add_tie(&mut self, tie: &Tie) {
        let src_idx = self.get_or_create_node(tie.source);
        let dst_idx = self.get_or_create_node(tie.target);
        if src_idx == dst_idx {
            return;
        }

        self.adjacency_lists[src_idx as usize].push((dst_idx, tie.weight));
        self.adjacency_lists[dst_idx as usize].push((src_idx, tie.weight));
    }

    pub fn add_ties<'a>(&mut self, ties: impl IntoIterator<Item = &'a Tie>) {
        for tie in ties {
            self.add_tie(tie);
        }
    }

    /// Build the compressed graph. Repeated ties between the same pair keep
    /// the first weight seen, so both tie enumerations yield the same graph.
    pub fn build(mut self) -> TieGraph {
        let node_count = self.node_ids.len();

        let mut offsets = Vec::with_capacity(node_count + 1);
        let mut edges = Vec::new();
        let mut weights = Vec::new();
        offsets.push(0);

        for list in &mut self.adjacency_lists {
            // stable sort keeps insertion order among duplicates
            list.sort_by_key(|&(dst, _)| dst);
            list.dedup_by_key(|&mut (dst, _)| dst);

            for &(dst, w) in list.iter() {
                edges.push(dst);
                weights.push(w);
            }
            offsets.push(edges.len() as u32);
        }

        log::debug!(
            "Built tie graph with {} nodes and {} ties",
            node_count,
            edges.len() / 2
        );

        TieGraph {
            node_count,
            offsets,
            edges,
            weights,
            node_ids: self.node_ids,
        }
    }
}

/// Build the graph of an `n`-person network from a tie list
pub fn build_graph(n: usize, ties: &[Tie]) -> TieGraph {
    let mut builder = GraphBuilder::with_people(n);
    builder.add_ties(ties);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{extract_ties, TieEnumeration, WeightMatrix};
    use ndarray::array;

    fn tie(source: u32, target: u32, weight: u8) -> Tie {
        Tie { source, target, weight }
    }

    #[test]
    fn builds_symmetric_adjacency() {
        let graph = build_graph(4, &[tie(1, 2, 1), tie(2, 3, 4)]);
        assert_eq!(graph.node_count, 4);
        assert_eq!(graph.tie_count(), 2);
        assert_eq!(graph.neighbors(1), &[0, 2]);
        assert_eq!(graph.neighbor_weights(2), &[4]);
        assert_eq!(graph.degree(3), 0);
        assert_eq!(graph.strength(1), 5);
    }

    #[test]
    fn both_enumerations_build_the_same_graph() {
        let weights = array![[0u8, 2, 0], [2, 0, 3], [0, 3, 0]];
        let matrix = WeightMatrix::new(weights, None).unwrap();
        let directed = build_graph(3, &extract_ties(&matrix, TieEnumeration::Directed));
        let unordered = build_graph(3, &extract_ties(&matrix, TieEnumeration::Unordered));
        assert_eq!(directed.edges, unordered.edges);
        assert_eq!(directed.weights, unordered.weights);
        assert_eq!(directed.tie_count(), 2);
    }

    #[test]
    fn self_ties_are_dropped() {
        let graph = build_graph(2, &[tie(1, 1, 2)]);
        assert_eq!(graph.tie_count(), 0);
    }

    #[test]
    fn unknown_identifiers_create_nodes() {
        let mut builder = GraphBuilder::with_capacity(2);
        builder.add_tie(&tie(10, 20, 1));
        let graph = builder.build();
        assert_eq!(graph.node_ids, vec![10, 20]);
    }

    #[test]
    fn petgraph_export_keeps_ties() {
        let graph = build_graph(3, &[tie(1, 2, 1), tie(2, 3, 2), tie(1, 3, 3)]);
        let pg = graph.to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 3);
        assert!((graph.density() - 1.0).abs() < 1e-12);
    }
}
