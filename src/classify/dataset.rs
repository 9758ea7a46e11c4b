//! Feature matrices built from annotated profiles

use clap::ValueEnum;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{AnalysisError, Result};
use crate::profile::Profile;

/// Explanatory variables available to the classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Feature {
    Age,
    Arrests,
    Convictions,
    Degree,
    Strength,
    Betweenness,
    Closeness,
    Pagerank,
    Power,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::Arrests => "arrests",
            Feature::Convictions => "convictions",
            Feature::Degree => "degree",
            Feature::Strength => "strength",
            Feature::Betweenness => "betweenness",
            Feature::Closeness => "closeness",
            Feature::Pagerank => "pagerank",
            Feature::Power => "power",
        }
    }

    /// Value of this feature for one profile; `None` if it was not computed
    pub fn value(self, profile: &Profile) -> Option<f64> {
        let metrics = &profile.metrics;
        let person = &profile.person;
        match self {
            Feature::Age => Some(f64::from(person.age)),
            Feature::Arrests => Some(f64::from(person.arrests)),
            Feature::Convictions => Some(f64::from(person.convictions)),
            Feature::Degree => Some(metrics.degree),
            Feature::Strength => Some(metrics.strength),
            Feature::Betweenness => Some(metrics.betweenness),
            Feature::Closeness => Some(metrics.closeness),
            Feature::Pagerank => Some(metrics.pagerank),
            Feature::Power => metrics.power,
        }
    }
}

/// Binary outcome predicted by the classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Target {
    /// Has served a prison sentence
    #[default]
    Prison,
    /// Listens to gang-related music
    Music,
    /// Lives in the gang's home area
    Residence,
    /// Rank at or above the configured threshold
    SeniorRank,
}

impl Target {
    pub fn label(self, profile: &Profile, senior_rank: u8) -> bool {
        let person = &profile.person;
        match self {
            Target::Prison => person.prison,
            Target::Music => person.music,
            Target::Residence => person.resident,
            Target::SeniorRank => person.rank.level() >= senior_rank,
        }
    }
}

/// Rows of features with a binary label each
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Vec<bool>,
}

impl Dataset {
    pub fn from_profiles(
        profiles: &[Profile],
        features: &[Feature],
        target: Target,
        senior_rank: u8,
    ) -> Result<Self> {
        if profiles.is_empty() {
            return Err(AnalysisError::EmptyDataset("no profiles to classify"));
        }
        if features.is_empty() {
            return Err(AnalysisError::EmptyDataset("no features selected"));
        }

        let mut matrix = Array2::<f64>::zeros((profiles.len(), features.len()));
        for (row, profile) in profiles.iter().enumerate() {
            for (column, feature) in features.iter().enumerate() {
                matrix[[row, column]] = feature.value(profile).ok_or_else(|| {
                    AnalysisError::Model(format!("feature {} is unavailable", feature.name()))
                })?;
            }
        }

        Ok(Self {
            feature_names: features.iter().map(|f| f.name().to_string()).collect(),
            features: matrix,
            labels: profiles
                .iter()
                .map(|p| target.label(p, senior_rank))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l).count()
    }

    /// Rows selected by index, in the given order
    pub fn subset(&self, rows: &[usize]) -> Dataset {
        Dataset {
            feature_names: self.feature_names.clone(),
            features: self.features.select(Axis(0), rows),
            labels: rows.iter().map(|&r| self.labels[r]).collect(),
        }
    }

    /// Seeded shuffle, then the first `test_fraction` of rows become the test set.
    ///
    /// Both parts keep at least one row.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        let n = self.len();
        if n < 2 {
            return Err(AnalysisError::EmptyDataset("need two rows to split"));
        }

        let mut rows: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        rows.shuffle(&mut rng);

        let test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);
        let (test_rows, train_rows) = rows.split_at(test);
        Ok((self.subset(train_rows), self.subset(test_rows)))
    }
}

/// Per-column z-scoring fitted on training rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl Standardizer {
    pub fn fit(features: &Array2<f64>) -> Self {
        let (means, scales) = features
            .axis_iter(Axis(1))
            .map(|column| {
                let mean = column.iter().mean();
                let sd = column.iter().std_dev();
                // constant columns pass through centred
                let scale = if sd.is_finite() && sd > 0.0 { sd } else { 1.0 };
                (mean, scale)
            })
            .unzip();
        Self { means, scales }
    }

    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        let means = Array1::from(self.means.clone());
        let scales = Array1::from(self.scales.clone());
        (features - &means) / &scales
    }
}
