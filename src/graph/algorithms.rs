//! Centrality and mixing measures on the tie graph

use std::collections::VecDeque;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::graph::TieGraph;

/// PageRank configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Damping factor (usually 0.85)
    pub damping_factor: f64,
    /// Upper bound on iterations
    pub max_iterations: usize,
    /// Stop once the L1 change between iterations drops below this
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// Per-node centrality scores, indexed like the graph's nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Centrality {
    pub degree: Vec<f64>,
    pub strength: Vec<f64>,
    pub betweenness: Vec<f64>,
    pub closeness: Vec<f64>,
    pub pagerank: Vec<f64>,
}

/// Compute every centrality measure for the graph
pub fn compute_centrality(
    graph: &TieGraph,
    pagerank: &PageRankConfig,
    normalize_betweenness: bool,
) -> Centrality {
    log::info!("Computing centrality for {} nodes", graph.node_count);

    Centrality {
        degree: degree_centrality(graph),
        strength: strength_centrality(graph),
        betweenness: betweenness_centrality(graph, normalize_betweenness),
        closeness: closeness_centrality(graph),
        pagerank: page_rank(graph, pagerank),
    }
}

/// Number of distinct neighbours of each node
pub fn degree_centrality(graph: &TieGraph) -> Vec<f64> {
    (0..graph.node_count)
        .map(|node| graph.degree(node) as f64)
        .collect()
}

/// Sum of tie weights at each node
pub fn strength_centrality(graph: &TieGraph) -> Vec<f64> {
    (0..graph.node_count)
        .map(|node| f64::from(graph.strength(node)))
        .collect()
}

/// Hop distances from `source`; `None` for unreachable nodes
pub fn bfs_distances(graph: &TieGraph, source: usize) -> Vec<Option<u32>> {
    let mut dist = vec![None; graph.node_count];
    let mut queue = VecDeque::new();
    dist[source] = Some(0);
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v].map_or(0, |d| d + 1);
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w].is_none() {
                dist[w] = Some(next);
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Brandes betweenness on hop distance, each unordered pair counted once.
///
/// With `normalized` the scores are divided by (n-1)(n-2)/2, the number of
/// pairs not involving the node.
pub fn betweenness_centrality(graph: &TieGraph, normalized: bool) -> Vec<f64> {
    let n = graph.node_count;

    let totals = (0..n)
        .into_par_iter()
        .map(|source| source_dependencies(graph, source))
        .reduce(
            || vec![0.0; n],
            |mut acc, deps| {
                for (a, d) in acc.iter_mut().zip(deps) {
                    *a += d;
                }
                acc
            },
        );

    // every pair was reached from both of its endpoints
    let scale = if normalized && n > 2 {
        1.0 / ((n - 1) * (n - 2)) as f64
    } else {
        0.5
    };
    totals.into_iter().map(|b| b * scale).collect()
}

/// Dependency of `source` on every other node (one Brandes pass)
fn source_dependencies(graph: &TieGraph, source: usize) -> Vec<f64> {
    let n = graph.node_count;
    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<i64> = vec![-1; n];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        stack.push(v);
        for &w in graph.neighbors(v) {
            let w = w as usize;
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    let mut delta = vec![0.0; n];
    while let Some(w) = stack.pop() {
        for &v in &predecessors[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[source] = 0.0;
    delta
}

/// Closeness on hop distance, scaled by the reachable fraction of the graph
/// so that nodes in small components are not over-rated. Isolates score 0.
pub fn closeness_centrality(graph: &TieGraph) -> Vec<f64> {
    let n = graph.node_count;

    (0..n)
        .into_par_iter()
        .map(|node| {
            let (reached, total) = bfs_distances(graph, node)
                .into_iter()
                .flatten()
                .fold((0usize, 0u64), |(r, t), d| (r + 1, t + u64::from(d)));

            if total == 0 || n < 2 {
                return 0.0;
            }
            let others = (reached - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}

/// Weighted PageRank. Nodes without ties spread their score uniformly.
pub fn page_rank(graph: &TieGraph, config: &PageRankConfig) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }

    let strength = strength_centrality(graph);
    let d = config.damping_factor;
    let mut scores = vec![1.0 / n as f64; n];

    for iteration in 0..config.max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&i| strength[i] == 0.0)
            .map(|i| scores[i])
            .sum();
        let base = (1.0 - d) / n as f64 + d * dangling / n as f64;
        let mut next_scores = vec![base; n];

        for i in 0..n {
            if strength[i] == 0.0 {
                continue;
            }
            let share = d * scores[i] / strength[i];
            for (&j, &w) in graph.neighbors(i).iter().zip(graph.neighbor_weights(i)) {
                next_scores[j as usize] += share * f64::from(w);
            }
        }

        let total_diff: f64 = scores
            .iter()
            .zip(&next_scores)
            .map(|(a, b)| (a - b).abs())
            .sum();
        scores = next_scores;

        if total_diff < config.tolerance {
            log::debug!("PageRank converged after {} iterations", iteration + 1);
            break;
        }
    }

    scores
}

/// Newman's assortativity coefficient for a categorical node label.
///
/// `None` when every tie end carries the same class (coefficient undefined)
/// or the graph has no ties.
pub fn nominal_assortativity(graph: &TieGraph, labels: &[usize]) -> Option<f64> {
    let classes = labels.iter().copied().max()? + 1;
    let mut mixing = vec![vec![0.0f64; classes]; classes];
    let mut ends = 0.0;

    for node in 0..graph.node_count {
        for &other in graph.neighbors(node) {
            mixing[labels[node]][labels[other as usize]] += 1.0;
            ends += 1.0;
        }
    }
    if ends == 0.0 {
        return None;
    }

    let trace: f64 = (0..classes).map(|c| mixing[c][c] / ends).sum();
    let expected: f64 = mixing
        .iter()
        .map(|row| {
            let a = row.iter().sum::<f64>() / ends;
            a * a
        })
        .sum();

    if (1.0 - expected).abs() < f64::EPSILON {
        return None;
    }
    Some((trace - expected) / (1.0 - expected))
}

/// Pearson correlation of a numeric attribute across tie endpoints
pub fn numeric_assortativity(graph: &TieGraph, values: &[f64]) -> Option<f64> {
    let mut xs = Vec::with_capacity(graph.edges.len());
    let mut ys = Vec::with_capacity(graph.edges.len());
    for node in 0..graph.node_count {
        for &other in graph.neighbors(node) {
            xs.push(values[node]);
            ys.push(values[other as usize]);
        }
    }
    crate::similarity::pearson(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Tie;
    use crate::graph::builder::build_graph;

    fn graph_from(n: usize, pairs: &[(u32, u32)]) -> TieGraph {
        let ties: Vec<Tie> = pairs
            .iter()
            .map(|&(source, target)| Tie { source, target, weight: 1 })
            .collect();
        build_graph(n, &ties)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn triangle_degree_is_two() {
        let graph = graph_from(3, &[(1, 2), (2, 3), (1, 3)]);
        assert_eq!(degree_centrality(&graph), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn path_betweenness_and_closeness() {
        let graph = graph_from(3, &[(1, 2), (2, 3)]);
        let betweenness = betweenness_centrality(&graph, false);
        assert!(close(betweenness[0], 0.0));
        assert!(close(betweenness[1], 1.0));

        let closeness = closeness_centrality(&graph);
        assert!(close(closeness[1], 1.0));
        assert!(close(closeness[0], 2.0 / 3.0));
    }

    #[test]
    fn star_center_bridges_every_pair() {
        let graph = graph_from(4, &[(1, 2), (1, 3), (1, 4)]);
        assert!(close(betweenness_centrality(&graph, false)[0], 3.0));
        assert!(close(betweenness_centrality(&graph, true)[0], 1.0));
    }

    #[test]
    fn isolates_have_zero_closeness() {
        let graph = graph_from(3, &[(1, 2)]);
        let closeness = closeness_centrality(&graph);
        assert_eq!(closeness[2], 0.0);
        // one of two possible neighbours reachable
        assert!(close(closeness[0], 0.5));
    }

    #[test]
    fn pagerank_sums_to_one_and_favours_hubs() {
        let graph = graph_from(5, &[(1, 2), (1, 3), (1, 4)]);
        let scores = page_rank(&graph, &PageRankConfig::default());
        assert!(close(scores.iter().sum::<f64>(), 1.0));
        assert!(scores[0] > scores[1]);
        assert!(close(scores[1], scores[2]));

        let triangle = graph_from(3, &[(1, 2), (2, 3), (1, 3)]);
        for score in page_rank(&triangle, &PageRankConfig::default()) {
            assert!(close(score, 1.0 / 3.0));
        }
    }

    #[test]
    fn pagerank_follows_weights() {
        let ties = vec![
            Tie { source: 1, target: 2, weight: 4 },
            Tie { source: 1, target: 3, weight: 1 },
        ];
        let graph = build_graph(3, &ties);
        let scores = page_rank(&graph, &PageRankConfig::default());
        assert!(scores[1] > scores[2]);
    }

    #[test]
    fn assortativity_extremes() {
        let graph = graph_from(4, &[(1, 2), (3, 4)]);
        let same = nominal_assortativity(&graph, &[0, 0, 1, 1]).unwrap();
        assert!(close(same, 1.0));
        let cross = nominal_assortativity(&graph, &[0, 1, 0, 1]).unwrap();
        assert!(close(cross, -1.0));
        assert!(nominal_assortativity(&graph, &[0, 0, 0, 0]).is_none());
    }

    #[test]
    fn bfs_marks_unreachable() {
        let graph = graph_from(3, &[(1, 2)]);
        assert_eq!(bfs_distances(&graph, 0), vec![Some(0), Some(1), None]);
    }
}
