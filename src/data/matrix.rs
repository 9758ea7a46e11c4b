//! Tie-weight adjacency matrix

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Largest tie weight (co-offended, serious crime, and kin)
pub const MAX_WEIGHT: u8 = 4;

/// Dense symmetric matrix of tie weights in 0..=4
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    weights: Array2<u8>,
}

impl WeightMatrix {
    /// Build a matrix from parsed rows, checking shape, weight domain, symmetry and diagonal.
    ///
    /// `expected` pins the node count when set.
    pub fn from_rows(rows: Vec<Vec<f64>>, expected: Option<usize>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(AnalysisError::EmptyDataset("weight matrix has no rows"));
        }

        let mut weights = Array2::<u8>::zeros((n, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(AnalysisError::NotSquare {
                    row: i,
                    expected: n,
                    found: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                weights[[i, j]] = weight_from_value(value, i, j)?;
            }
        }

        Self::new(weights, expected)
    }

    /// Wrap an existing weight array after validating it
    pub fn new(weights: Array2<u8>, expected: Option<usize>) -> Result<Self> {
        let (rows, columns) = weights.dim();
        if let Some(expected) = expected {
            if rows != expected || columns != expected {
                return Err(AnalysisError::Dimension {
                    expected,
                    rows,
                    columns,
                });
            }
        }
        if rows != columns {
            return Err(AnalysisError::NotSquare {
                row: 0,
                expected: rows,
                found: columns,
            });
        }

        for i in 0..rows {
            let diagonal = weights[[i, i]];
            if diagonal != 0 {
                return Err(AnalysisError::NonZeroDiagonal {
                    index: i,
                    value: diagonal,
                });
            }
            for j in (i + 1)..rows {
                let forward = weights[[i, j]];
                let backward = weights[[j, i]];
                if forward > MAX_WEIGHT {
                    return Err(AnalysisError::InvalidWeight {
                        row: i,
                        column: j,
                        value: forward as f64,
                    });
                }
                if forward != backward {
                    return Err(AnalysisError::Asymmetric {
                        i,
                        j,
                        forward,
                        backward,
                    });
                }
            }
        }

        Ok(Self { weights })
    }

    /// Number of people (rows) in the matrix
    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weight(&self, i: usize, j: usize) -> u8 {
        self.weights[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, u8> {
        self.weights.row(i)
    }

    pub fn weights(&self) -> &Array2<u8> {
        &self.weights
    }

    /// The weights as floating point, for the numeric routines
    pub fn to_f64(&self) -> Array2<f64> {
        self.weights.mapv(f64::from)
    }

    /// Number of unordered pairs with a nonzero weight
    pub fn tie_count(&self) -> usize {
        let n = self.size();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.weights[[i, j]] > 0)
            .count()
    }
}

fn weight_from_value(value: f64, row: usize, column: usize) -> Result<u8> {
    if value.is_finite() && value.fract() == 0.0 && (0.0..=MAX_WEIGHT as f64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(AnalysisError::InvalidWeight { row, column, value })
    }
}
