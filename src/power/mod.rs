//! Power scores: the reciprocal fixed point x = (1/x)·A
//!
//! A person is powerful when tied to people who are themselves weakly tied.
//! The iteration alternates between two sequences, so convergence is tested
//! against the iterate two steps back.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Power iteration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerConfig {
    /// Stop when the L1 change falls below 10^-precision
    pub precision: u32,
    /// Give up after this many iterations
    pub max_iterations: usize,
    /// Added to every diagonal cell of the tie-weight matrix
    pub diagonal: f64,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            precision: 6,
            max_iterations: 10_000,
            diagonal: 1.0,
        }
    }
}

impl PowerConfig {
    pub fn tolerance(&self) -> f64 {
        10f64.powi(-(self.precision as i32))
    }
}

/// Converged power vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerScores {
    pub vector: Vec<f64>,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PowerError {
    #[error("invalid input matrix: {0}")]
    InvalidMatrix(String),

    #[error("no convergence after {iterations} iterations (residual {residual:e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("iterate became non-finite at iteration {iteration}")]
    Diverged { iteration: usize },
}

/// Run the power iteration on `matrix`.
///
/// The matrix must be square and non-negative with no empty row or column.
/// On success the returned vector satisfies x ≈ (1/x)·A.
pub fn power_iteration(
    matrix: ArrayView2<'_, f64>,
    config: &PowerConfig,
) -> Result<PowerScores, PowerError> {
    validate(matrix)?;

    let n = matrix.nrows();
    let eps = config.tolerance();

    let mut x1 = Array1::<f64>::ones(n);
    let mut x2 = Array1::<f64>::ones(n);
    let mut residual = f64::INFINITY;
    let mut iterations = 0;

    while residual >= eps {
        if iterations == config.max_iterations {
            log::warn!(
                "Power iteration stopped at the cap of {} iterations",
                iterations
            );
            return Err(PowerError::NotConverged {
                iterations,
                residual,
            });
        }

        let next = x2.mapv(f64::recip).dot(&matrix);
        iterations += 1;
        if next.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(PowerError::Diverged {
                iteration: iterations,
            });
        }

        // x0 lags two steps behind x2
        let x0 = std::mem::replace(&mut x1, std::mem::replace(&mut x2, next));
        residual = (&x2 - &x0).mapv(f64::abs).sum();
    }

    // on each connected component x2 = t·x and its image is x/t for some t,
    // so their geometric mean is the fixed point
    let image = x2.mapv(f64::recip).dot(&matrix);
    let vector = x2
        .iter()
        .zip(image.iter())
        .map(|(a, b)| (a * b).sqrt())
        .collect();

    log::debug!("Power iteration converged in {} iterations", iterations);
    Ok(PowerScores { vector, iterations })
}

/// Power scores for a tie-weight matrix, with the configured diagonal added
pub fn power_scores(weights: &Array2<f64>, config: &PowerConfig) -> Result<PowerScores, PowerError> {
    let mut matrix = weights.clone();
    for i in 0..matrix.nrows().min(matrix.ncols()) {
        matrix[[i, i]] += config.diagonal;
    }
    power_iteration(matrix.view(), config)
}

fn validate(matrix: ArrayView2<'_, f64>) -> Result<(), PowerError> {
    let (rows, columns) = matrix.dim();
    if rows == 0 || rows != columns {
        return Err(PowerError::InvalidMatrix(format!(
            "expected a non-empty square matrix, got {}x{}",
            rows, columns
        )));
    }
    if matrix.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(PowerError::InvalidMatrix(
            "entries must be finite and non-negative".to_string(),
        ));
    }
    if let Some(row) = matrix.rows().into_iter().position(|r| r.sum() <= 0.0) {
        return Err(PowerError::InvalidMatrix(format!("row {} sums to zero", row)));
    }
    if let Some(column) = matrix.columns().into_iter().position(|c| c.sum() <= 0.0) {
        return Err(PowerError::InvalidMatrix(format!(
            "column {} sums to zero",
            column
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_fixed_point(matrix: &Array2<f64>, x: &[f64]) {
        let x = Array1::from(x.to_vec());
        let image = x.mapv(f64::recip).dot(matrix);
        for (a, b) in x.iter().zip(image.iter()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn all_ones_matrix_has_sqrt_n_power() {
        let matrix = Array2::<f64>::ones((4, 4));
        let scores = power_iteration(matrix.view(), &PowerConfig::default()).unwrap();
        for v in &scores.vector {
            assert!((v - 2.0).abs() < 1e-9);
        }
        assert_eq!(scores.iterations, 2);
    }

    #[test]
    fn weighted_matrix_reaches_fixed_point() {
        let weights = array![[0.0, 1.0, 3.0], [1.0, 0.0, 2.0], [3.0, 2.0, 0.0]];
        let config = PowerConfig::default();
        let scores = power_scores(&weights, &config).unwrap();

        let mut damped = weights.clone();
        damped.diag_mut().fill(1.0);
        assert_fixed_point(&damped, &scores.vector);
        assert!(scores.vector.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn isolates_get_their_own_scale() {
        let weights = array![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let scores = power_scores(&weights, &PowerConfig::default()).unwrap();

        let mut damped = weights.clone();
        damped.diag_mut().fill(1.0);
        assert_fixed_point(&damped, &scores.vector);
        assert!((scores.vector[0] - 2f64.sqrt()).abs() < 1e-6);
        assert!((scores.vector[1] - 2f64.sqrt()).abs() < 1e-6);
        assert!((scores.vector[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn separate_components_each_reach_the_fixed_point() {
        let weights = array![
            [0.0, 3.0, 0.0, 0.0],
            [3.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0]
        ];
        let scores = power_scores(&weights, &PowerConfig::default()).unwrap();

        let mut damped = weights.clone();
        damped.diag_mut().fill(1.0);
        assert_fixed_point(&damped, &scores.vector);
        assert!((scores.vector[0] - 2.0).abs() < 1e-6);
        assert!((scores.vector[2] - 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let weights = array![[1.0, 4.0, 0.0], [4.0, 1.0, 1.0], [0.0, 1.0, 1.0]];
        let config = PowerConfig {
            max_iterations: 2,
            ..PowerConfig::default()
        };
        let err = power_iteration(weights.view(), &config).unwrap_err();
        assert!(matches!(err, PowerError::NotConverged { iterations: 2, .. }));
    }

    #[test]
    fn empty_rows_are_rejected() {
        let weights = array![[1.0, 0.0], [0.0, 0.0]];
        assert!(matches!(
            power_iteration(weights.view(), &PowerConfig::default()),
            Err(PowerError::InvalidMatrix(_))
        ));
        let ragged = Array2::<f64>::ones((2, 3));
        assert!(power_iteration(ragged.view(), &PowerConfig::default()).is_err());
        let negative = array![[1.0, -1.0], [-1.0, 1.0]];
        assert!(power_iteration(negative.view(), &PowerConfig::default()).is_err());
    }

    #[test]
    fn tolerance_follows_precision() {
        let config = PowerConfig {
            precision: 3,
            ..PowerConfig::default()
        };
        assert!((config.tolerance() - 1e-3).abs() < 1e-15);
    }
}
