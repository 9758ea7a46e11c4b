//! CART decision tree with Gini impurity

use std::fmt::Write as _;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::classify::dataset::Dataset;
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    /// Nodes with fewer rows become leaves
    pub min_samples_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_samples_split: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        prediction: bool,
        samples: usize,
        positive_fraction: f64,
    },
    Split {
        feature: usize,
        /// Rows with value <= threshold go left
        threshold: f64,
        samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub feature_names: Vec<String>,
    pub root: TreeNode,
    /// Total impurity decrease per feature, summing to 1 when any split exists
    pub importances: Vec<f64>,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity
    impurity: f64,
}

struct Builder<'a> {
    features: &'a Array2<f64>,
    labels: &'a [bool],
    config: &'a TreeConfig,
    importances: Vec<f64>,
}

impl Builder<'_> {
    fn positives(&self, rows: &[usize]) -> usize {
        rows.iter().filter(|&&r| self.labels[r]).count()
    }

    fn leaf(&self, rows: &[usize]) -> TreeNode {
        let positives = self.positives(rows);
        let positive_fraction = positives as f64 / rows.len().max(1) as f64;
        TreeNode::Leaf {
            prediction: positive_fraction > 0.5,
            samples: rows.len(),
            positive_fraction,
        }
    }

    fn best_split(&self, rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let total_positives = self.positives(rows);
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.features.ncols() {
            let mut ordered: Vec<(f64, bool)> = rows
                .iter()
                .map(|&r| (self.features[[r, feature]], self.labels[r]))
                .collect();
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_positives = 0;
            for k in 0..n - 1 {
                if ordered[k].1 {
                    left_positives += 1;
                }
                if ordered[k].0 == ordered[k + 1].0 {
                    continue;
                }
                let left = k + 1;
                let right = n - left;
                let impurity = (left as f64 * gini(left_positives, left)
                    + right as f64 * gini(total_positives - left_positives, right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (ordered[k].0 + ordered[k + 1].0) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best
    }

    fn build(&mut self, rows: &[usize], depth: usize) -> TreeNode {
        let n = rows.len();
        let node_impurity = gini(self.positives(rows), n);
        if depth >= self.config.max_depth || n < self.config.min_samples_split || node_impurity == 0.0 {
            return self.leaf(rows);
        }

        let Some(split) = self.best_split(rows) else {
            return self.leaf(rows);
        };
        if split.impurity >= node_impurity {
            return self.leaf(rows);
        }

        self.importances[split.feature] += n as f64 * (node_impurity - split.impurity);

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| self.features[[r, split.feature]] <= split.threshold);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            samples: n,
            left: Box::new(self.build(&left_rows, depth + 1)),
            right: Box::new(self.build(&right_rows, depth + 1)),
        }
    }
}

impl DecisionTree {
    pub fn fit(train: &Dataset, config: &TreeConfig) -> Result<Self> {
        if train.is_empty() {
            return Err(AnalysisError::EmptyDataset("no training rows"));
        }

        let mut builder = Builder {
            features: &train.features,
            labels: &train.labels,
            config,
            importances: vec![0.0; train.features.ncols()],
        };
        let rows: Vec<usize> = (0..train.len()).collect();
        let root = builder.build(&rows, 0);

        let mut importances = builder.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(Self {
            feature_names: train.feature_names.clone(),
            root,
            importances,
        })
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> bool {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { prediction, .. } => return *prediction,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    pub fn predict(&self, features: &Array2<f64>) -> Vec<bool> {
        features
            .axis_iter(Axis(0))
            .map(|row| self.predict_row(row))
            .collect()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    /// Indented text rendering, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(&self.root, 0, &mut out);
        out
    }

    fn render_node(&self, node: &TreeNode, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match node {
            TreeNode::Leaf {
                prediction,
                samples,
                positive_fraction,
            } => {
                let _ = writeln!(
                    out,
                    "{}predict {} (n={}, p={:.2})",
                    pad, prediction, samples, positive_fraction
                );
            }
            TreeNode::Split {
                feature,
                threshold,
                samples,
                left,
                right,
            } => {
                let name = &self.feature_names[*feature];
                let _ = writeln!(out, "{}{} <= {:.4} (n={})", pad, name, threshold, samples);
                self.render_node(left, indent + 1, out);
                let _ = writeln!(out, "{}{} > {:.4}", pad, name, threshold);
                self.render_node(right, indent + 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn threshold_data() -> Dataset {
        Dataset {
            feature_names: vec!["noise".to_string(), "convictions".to_string()],
            features: array![
                [5.0, 0.0],
                [1.0, 1.0],
                [4.0, 2.0],
                [2.0, 6.0],
                [3.0, 7.0],
                [5.0, 8.0]
            ],
            labels: vec![false, false, false, true, true, true],
        }
    }

    #[test]
    fn finds_the_informative_split() {
        let tree = DecisionTree::fit(&threshold_data(), &TreeConfig::default()).unwrap();
        match &tree.root {
            TreeNode::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 1);
                assert_eq!(*threshold, 4.0);
            }
            leaf => panic!("expected a split, got {:?}", leaf),
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.importances, vec![0.0, 1.0]);
        assert_eq!(tree.predict(&threshold_data().features), threshold_data().labels);
        assert!(tree.render().contains("convictions <= 4.0000"));
    }

    #[test]
    fn depth_limit_yields_a_leaf() {
        let config = TreeConfig {
            max_depth: 0,
            ..TreeConfig::default()
        };
        let tree = DecisionTree::fit(&threshold_data(), &config).unwrap();
        assert!(matches!(tree.root, TreeNode::Leaf { samples: 6, .. }));
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn gini_of_pure_and_mixed_nodes() {
        assert_eq!(gini(0, 4), 0.0);
        assert_eq!(gini(4, 4), 0.0);
        assert!((gini(2, 4) - 0.5).abs() < 1e-12);
    }
}
