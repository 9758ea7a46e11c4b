//! Connected components of the tie graph

use std::collections::HashMap;

use crate::cluster::metrics::{calculate_density, identify_central_nodes};
use crate::cluster::Cluster;
use crate::graph::{Centrality, TieGraph};

/// Union-find over node indices, used for components and dendrogram cuts
pub struct DisjointSets {
    /// parent[i] == i at a root
    parent: Vec<u32>,

    /// Size of each set, valid at roots (for union by size)
    size: Vec<u32>,
}

impl DisjointSets {
    /// `size` singleton sets
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Root of `x`, compressing the path on the way
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Merge the sets of `x` and `y`, keeping the larger root
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // attach the smaller tree under the larger
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];
    }
}

/// Node indices of each connected component, largest first, ties broken
/// by lowest member
pub fn connected_components(graph: &TieGraph) -> Vec<Vec<u32>> {
    let mut sets = DisjointSets::new(graph.node_count);
    for (a, b, _) in graph.ties() {
        sets.union(a as u32, b as u32);
    }

    let mut by_root: HashMap<u32, Vec<u32>> = HashMap::new();
    for node in 0..graph.node_count as u32 {
        let root = sets.find(node);
        by_root.entry(root).or_default().push(node);
    }

    let mut components: Vec<Vec<u32>> = by_root.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));
    components
}

/// Connected components with at least `min_size` members, profiled as clusters
pub fn find_components(
    graph: &TieGraph,
    centrality: &Centrality,
    min_size: usize,
    top_n: usize,
) -> Vec<Cluster> {
    let components = connected_components(graph);
    log::info!("Found {} connected components", components.len());

    let clusters: Vec<Cluster> = components
        .into_iter()
        .filter(|members| members.len() >= min_size)
        .enumerate()
        .map(|(id, members)| Cluster {
            id: id as u32,
            size: members.len(),
            density: calculate_density(graph, &members),
            mean_similarity: None,
            central_nodes: identify_central_nodes(graph, &members, centrality, top_n),
            members,
        })
        .collect();

    log::info!(
        "Kept {} components with {} or more members",
        clusters.len(),
        min_size
    );
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tie;
    use crate::graph::{build_graph, compute_centrality, PageRankConfig};

    #[test]
    fn disjoint_sets_merge_transitively() {
        let mut sets = DisjointSets::new(5);
        sets.union(0, 1);
        sets.union(3, 4);
        sets.union(1, 4);
        assert_eq!(sets.find(3), sets.find(0));
        assert_eq!(sets.find(4), sets.find(1));
        assert_ne!(sets.find(2), sets.find(0));
        assert_eq!(sets.find(2), 2);
    }

    #[test]
    fn components_sorted_by_size() {
        let ties: Vec<Tie> = [(1, 2), (4, 5), (5, 6)]
            .iter()
            .map(|&(source, target)| Tie { source, target, weight: 2 })
            .collect();
        let graph = build_graph(6, &ties);
        let components = connected_components(&graph);
        assert_eq!(components, vec![vec![3, 4, 5], vec![0, 1], vec![2]]);

        let centrality = compute_centrality(&graph, &PageRankConfig::default(), false);
        let clusters = find_components(&graph, &centrality, 2, 3);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].size, 3);
        // path of three: two of three possible ties
        assert!((clusters[0].density - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(clusters[0].central_nodes.degree[0], 5);
    }
}
