//! Logistic regression fitted by batch gradient descent

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::classify::dataset::{Dataset, Standardizer};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on the coefficients (not the intercept)
    pub l2: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 2_000,
            l2: 0.01,
        }
    }
}

/// Fitted model. Coefficients apply to standardised features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub scaler: Standardizer,
    /// Mean log-loss on the training rows after the final epoch
    pub training_loss: f64,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn log_loss(probabilities: &Array1<f64>, targets: &Array1<f64>) -> f64 {
    let eps = 1e-12;
    let total: f64 = probabilities
        .iter()
        .zip(targets.iter())
        .map(|(&p, &y)| {
            let p = p.clamp(eps, 1.0 - eps);
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    total / probabilities.len() as f64
}

impl LogisticRegression {
    pub fn fit(train: &Dataset, config: &LogisticConfig) -> Result<Self> {
        let n = train.len();
        let positives = train.positives();
        if n == 0 {
            return Err(AnalysisError::EmptyDataset("no training rows"));
        }
        if positives == 0 || positives == n {
            return Err(AnalysisError::Model(
                "training rows contain a single class".to_string(),
            ));
        }

        let scaler = Standardizer::fit(&train.features);
        let x = scaler.transform(&train.features);
        let y: Array1<f64> = train.labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect();

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut intercept = 0.0;
        for _ in 0..config.epochs {
            let probabilities = (x.dot(&weights) + intercept).mapv(sigmoid);
            let errors = &probabilities - &y;

            let gradient = x.t().dot(&errors) / n as f64 + &weights * config.l2;
            let intercept_gradient = errors.sum() / n as f64;

            weights = weights - gradient * config.learning_rate;
            intercept -= config.learning_rate * intercept_gradient;
        }

        let training_loss = log_loss(&(x.dot(&weights) + intercept).mapv(sigmoid), &y);
        log::debug!("Logistic regression training loss {:.4}", training_loss);

        Ok(Self {
            feature_names: train.feature_names.clone(),
            coefficients: weights.to_vec(),
            intercept,
            scaler,
            training_loss,
        })
    }

    /// Probability of the positive class for each row of raw features
    pub fn predict_proba(&self, features: &Array2<f64>) -> Vec<f64> {
        let x = self.scaler.transform(features);
        let weights = Array1::from(self.coefficients.clone());
        x.axis_iter(Axis(0))
            .map(|row| sigmoid(row.dot(&weights) + self.intercept))
            .collect()
    }

    pub fn predict(&self, features: &Array2<f64>) -> Vec<bool> {
        self.predict_proba(features)
            .into_iter()
            .map(|p| p >= 0.5)
            .collect()
    }
}
