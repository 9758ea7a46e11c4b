//! Agglomerative hierarchical clustering over a distance matrix

use clap::ValueEnum;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::cluster::detection::DisjointSets;

/// Distance between merged clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Linkage {
    /// Closest pair of members
    Single,
    /// Farthest pair of members
    Complete,
    /// Mean over all member pairs
    #[default]
    Average,
}

impl Linkage {
    /// Lance-Williams update: distance from a third cluster to the union of
    /// clusters i and j
    fn update(self, d_ik: f64, d_jk: f64, size_i: usize, size_j: usize) -> f64 {
        match self {
            Linkage::Single => d_ik.min(d_jk),
            Linkage::Complete => d_ik.max(d_jk),
            Linkage::Average => {
                (size_i as f64 * d_ik + size_j as f64 * d_jk) / (size_i + size_j) as f64
            }
        }
    }
}

/// One agglomeration step. Nodes `0..n` are leaves; merge `k` creates node `n + k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub height: f64,
    pub size: usize,
}

/// Full merge history of an agglomerative clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    pub leaves: usize,
    pub merges: Vec<Merge>,
}

/// Cluster `distances` bottom-up until one cluster remains.
///
/// Among equally close pairs the one with the lowest indices merges first.
pub fn agglomerate(distances: &Array2<f64>, linkage: Linkage) -> Dendrogram {
    let n = distances.nrows();
    let mut dist = distances.clone();
    let mut active = vec![true; n];
    let mut node_of_slot: Vec<usize> = (0..n).collect();
    let mut size = vec![1usize; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut closest: Option<(usize, usize, f64)> = None;
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                let d = dist[[i, j]];
                if closest.map_or(true, |(_, _, best)| d < best) {
                    closest = Some((i, j, d));
                }
            }
        }
        let Some((i, j, height)) = closest else {
            break;
        };

        merges.push(Merge {
            left: node_of_slot[i],
            right: node_of_slot[j],
            height,
            size: size[i] + size[j],
        });

        for k in (0..n).filter(|&k| active[k] && k != i && k != j) {
            let updated = linkage.update(dist[[i, k]], dist[[j, k]], size[i], size[j]);
            dist[[i, k]] = updated;
            dist[[k, i]] = updated;
        }
        size[i] += size[j];
        active[j] = false;
        node_of_slot[i] = n + step;
    }

    log::debug!("Agglomerated {} leaves with {:?} linkage", n, linkage);
    Dendrogram { leaves: n, merges }
}

impl Dendrogram {
    /// Labels from applying the first `merges` merges, numbered by first member
    fn labels_after(&self, merges: usize) -> Vec<usize> {
        let n = self.leaves;
        let mut sets = DisjointSets::new(n + self.merges.len());
        for (step, merge) in self.merges.iter().take(merges).enumerate() {
            let node = (n + step) as u32;
            sets.union(merge.left as u32, node);
            sets.union(merge.right as u32, node);
        }

        let mut label_of_root = std::collections::HashMap::new();
        (0..n as u32)
            .map(|leaf| {
                let root = sets.find(leaf);
                let next = label_of_root.len();
                *label_of_root.entry(root).or_insert(next)
            })
            .collect()
    }

    /// Cut into `k` clusters (clamped to 1..=leaves)
    pub fn cut_into(&self, k: usize) -> Vec<usize> {
        let k = k.clamp(1, self.leaves.max(1));
        self.labels_after(self.leaves - k)
    }

    /// Cut at a height: merges at or below `height` are kept
    pub fn cut_at_height(&self, height: f64) -> Vec<usize> {
        let kept = self
            .merges
            .iter()
            .take_while(|merge| merge.height <= height)
            .count();
        self.labels_after(kept)
    }

    fn node_height(&self, node: usize) -> f64 {
        if node < self.leaves {
            0.0
        } else {
            self.merges[node - self.leaves].height
        }
    }

    /// Leaves in left-to-right dendrogram order
    pub fn leaf_order(&self) -> Vec<usize> {
        let Some(root) = self.root() else {
            return (0..self.leaves).collect();
        };
        let mut order = Vec::with_capacity(self.leaves);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node < self.leaves {
                order.push(node);
            } else {
                let merge = &self.merges[node - self.leaves];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }

    fn root(&self) -> Option<usize> {
        match (self.leaves, self.merges.len()) {
            (0, _) => None,
            (1, _) => Some(0),
            (n, m) => Some(n + m - 1),
        }
    }

    /// Newick rendering with branch lengths, leaves named by `labels`
    pub fn to_newick(&self, labels: &[String]) -> String {
        match self.root() {
            Some(root) => format!("{};", self.newick_node(root, labels)),
            None => ";".to_string(),
        }
    }

    fn newick_node(&self, node: usize, labels: &[String]) -> String {
        if node < self.leaves {
            return labels[node].clone();
        }
        let merge = &self.merges[node - self.leaves];
        format!(
            "({}:{:.4},{}:{:.4})",
            self.newick_node(merge.left, labels),
            merge.height - self.node_height(merge.left),
            self.newick_node(merge.right, labels),
            merge.height - self.node_height(merge.right),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_pairs() -> Array2<f64> {
        array![
            [0.0, 0.1, 0.9, 0.9],
            [0.1, 0.0, 0.9, 0.9],
            [0.9, 0.9, 0.0, 0.2],
            [0.9, 0.9, 0.2, 0.0]
        ]
    }

    fn chain() -> Array2<f64> {
        array![[0.0, 0.1, 0.9], [0.1, 0.0, 0.2], [0.9, 0.2, 0.0]]
    }

    #[test]
    fn merges_closest_pairs_first() {
        let dendrogram = agglomerate(&two_pairs(), Linkage::Average);
        assert_eq!(dendrogram.merges.len(), 3);
        assert_eq!(dendrogram.merges[0], Merge { left: 0, right: 1, height: 0.1, size: 2 });
        assert_eq!(dendrogram.merges[1], Merge { left: 2, right: 3, height: 0.2, size: 2 });
        assert_eq!(dendrogram.merges[2].left, 4);
        assert_eq!(dendrogram.merges[2].right, 5);
        assert!((dendrogram.merges[2].height - 0.9).abs() < 1e-12);
    }

    #[test]
    fn linkages_differ_on_a_chain() {
        let heights: Vec<f64> = [Linkage::Single, Linkage::Complete, Linkage::Average]
            .iter()
            .map(|&linkage| agglomerate(&chain(), linkage).merges[1].height)
            .collect();
        assert!((heights[0] - 0.2).abs() < 1e-12);
        assert!((heights[1] - 0.9).abs() < 1e-12);
        assert!((heights[2] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn cuts_produce_expected_groups() {
        let dendrogram = agglomerate(&two_pairs(), Linkage::Average);
        assert_eq!(dendrogram.cut_into(2), vec![0, 0, 1, 1]);
        assert_eq!(dendrogram.cut_into(1), vec![0, 0, 0, 0]);
        assert_eq!(dendrogram.cut_into(4), vec![0, 1, 2, 3]);
        assert_eq!(dendrogram.cut_at_height(0.15), vec![0, 0, 1, 2]);
    }

    #[test]
    fn newick_and_leaf_order_cover_all_leaves() {
        let dendrogram = agglomerate(&two_pairs(), Linkage::Average);
        let labels: Vec<String> = (1..=4).map(|i| i.to_string()).collect();
        assert_eq!(
            dendrogram.to_newick(&labels),
            "((1:0.1000,2:0.1000):0.8000,(3:0.2000,4:0.2000):0.7000);"
        );
        assert_eq!(dendrogram.leaf_order(), vec![0, 1, 2, 3]);
    }
}
