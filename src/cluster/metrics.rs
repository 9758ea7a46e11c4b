//! Cluster statistics and metrics

use std::collections::HashSet;

use crate::cluster::{Cluster, ClusterCentralNodes};
use crate::graph::{Centrality, TieGraph};
use crate::similarity::SimilarityMatrix;

/// Calculate density (ties inside / possible ties)
pub fn calculate_density(graph: &TieGraph, members: &[u32]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton clusters have density 1
    }

    let member_set: HashSet<u32> = members.iter().copied().collect();

    // every inside tie is seen from both ends
    let arcs: usize = members
        .iter()
        .map(|&src| {
            graph
                .neighbors(src as usize)
                .iter()
                .filter(|&&dst| member_set.contains(&dst))
                .count()
        })
        .sum();

    arcs as f64 / (n * (n - 1)) as f64
}

/// Rank members by inside degree and by network-wide betweenness and closeness
pub fn identify_central_nodes(
    graph: &TieGraph,
    members: &[u32],
    centrality: &Centrality,
    top_n: usize,
) -> ClusterCentralNodes {
    let member_set: HashSet<u32> = members.iter().copied().collect();

    let inside_degree: Vec<f64> = members
        .iter()
        .map(|&node| {
            graph
                .neighbors(node as usize)
                .iter()
                .filter(|&&dst| member_set.contains(&dst))
                .count() as f64
        })
        .collect();

    let ranked = |score: &dyn Fn(usize, u32) -> f64| -> Vec<u32> {
        let mut scored: Vec<(u32, f64)> = members
            .iter()
            .enumerate()
            .map(|(pos, &node)| (node, score(pos, node)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(top_n)
            .map(|(node, _)| graph.node_ids[node as usize])
            .collect()
    };

    ClusterCentralNodes {
        degree: ranked(&|pos, _| inside_degree[pos]),
        betweenness: ranked(&|_, node| centrality.betweenness[node as usize]),
        closeness: ranked(&|_, node| centrality.closeness[node as usize]),
    }
}

/// Average similarity over member pairs; `None` for singletons
pub fn mean_similarity(similarity: &SimilarityMatrix, members: &[u32]) -> Option<f64> {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (k, &a) in members.iter().enumerate() {
        for &b in &members[k + 1..] {
            total += similarity.get(a as usize, b as usize);
            pairs += 1;
        }
    }
    (pairs > 0).then(|| total / pairs as f64)
}

/// Weighted Newman modularity of a node labelling
pub fn modularity(graph: &TieGraph, labels: &[usize]) -> f64 {
    let clusters = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut internal = vec![0.0f64; clusters];
    let mut degree_sum = vec![0.0f64; clusters];
    let mut total = 0.0;

    for (a, b, w) in graph.ties() {
        let w = f64::from(w);
        total += w;
        if labels[a] == labels[b] {
            internal[labels[a]] += w;
        }
    }
    if total == 0.0 {
        return 0.0;
    }
    for node in 0..graph.node_count {
        degree_sum[labels[node]] += f64::from(graph.strength(node));
    }

    (0..clusters)
        .map(|c| internal[c] / total - (degree_sum[c] / (2.0 * total)).powi(2))
        .sum()
}

/// Group node indices by label into profiled clusters
pub fn profile_partition(
    graph: &TieGraph,
    labels: &[usize],
    centrality: &Centrality,
    similarity: &SimilarityMatrix,
    top_n: usize,
) -> Vec<Cluster> {
    let clusters = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut groups: Vec<Vec<u32>> = vec![Vec::new(); clusters];
    for (node, &label) in labels.iter().enumerate() {
        groups[label].push(node as u32);
    }

    groups
        .into_iter()
        .enumerate()
        .filter(|(_, members)| !members.is_empty())
        .map(|(id, members)| Cluster {
            id: id as u32,
            size: members.len(),
            density: calculate_density(graph, &members),
            mean_similarity: mean_similarity(similarity, &members),
            central_nodes: identify_central_nodes(graph, &members, centrality, top_n),
            members,
        })
        .collect()
}
