//! Predicting person attributes from network position

pub mod dataset;
pub mod evaluation;
pub mod logistic;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use dataset::{Dataset, Feature, Target};
pub use evaluation::ConfusionMatrix;
pub use logistic::{LogisticConfig, LogisticRegression};
pub use tree::{DecisionTree, TreeConfig};

use crate::error::Result;
use crate::profile::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub target: Target,
    pub features: Vec<Feature>,
    /// Lowest rank counted as senior for `Target::SeniorRank`
    pub senior_rank: u8,
    pub test_fraction: f64,
    pub seed: u64,
    pub logistic: LogisticConfig,
    pub tree: TreeConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            target: Target::Prison,
            features: vec![
                Feature::Age,
                Feature::Arrests,
                Feature::Convictions,
                Feature::Degree,
                Feature::Betweenness,
                Feature::Closeness,
                Feature::Pagerank,
                Feature::Power,
            ],
            senior_rank: 4,
            test_fraction: 0.3,
            seed: 42,
            logistic: LogisticConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

/// Train and test quality of one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEvaluation {
    pub train_accuracy: f64,
    pub test: ConfusionMatrix,
}

impl ModelEvaluation {
    fn new(train_pred: &[bool], train: &Dataset, test_pred: &[bool], test: &Dataset) -> Self {
        Self {
            train_accuracy: ConfusionMatrix::from_predictions(train_pred, &train.labels).accuracy(),
            test: ConfusionMatrix::from_predictions(test_pred, &test.labels),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub target: Target,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Share of positive labels over all rows
    pub base_rate: f64,
    pub logistic: LogisticRegression,
    pub logistic_evaluation: ModelEvaluation,
    pub tree: DecisionTree,
    pub tree_evaluation: ModelEvaluation,
}

/// Fit both classifiers on a seeded split and evaluate them on the held-out rows
pub fn run_classifiers(profiles: &[Profile], config: &ClassifierConfig) -> Result<ClassificationReport> {
    log::info!(
        "Fitting classifiers for {:?} on {} features",
        config.target,
        config.features.len()
    );

    let data = Dataset::from_profiles(profiles, &config.features, config.target, config.senior_rank)?;
    let (train, test) = data.train_test_split(config.test_fraction, config.seed)?;
    log::debug!("Split into {} training and {} test rows", train.len(), test.len());

    let logistic = LogisticRegression::fit(&train, &config.logistic)?;
    let logistic_evaluation = ModelEvaluation::new(
        &logistic.predict(&train.features),
        &train,
        &logistic.predict(&test.features),
        &test,
    );

    let tree = DecisionTree::fit(&train, &config.tree)?;
    let tree_evaluation = ModelEvaluation::new(
        &tree.predict(&train.features),
        &train,
        &tree.predict(&test.features),
        &test,
    );

    log::info!(
        "Test accuracy: logistic {:.3}, tree {:.3}",
        logistic_evaluation.test.accuracy(),
        tree_evaluation.test.accuracy()
    );

    Ok(ClassificationReport {
        target: config.target,
        train_rows: train.len(),
        test_rows: test.len(),
        base_rate: data.positives() as f64 / data.len() as f64,
        logistic,
        logistic_evaluation,
        tree,
        tree_evaluation,
    })
}
