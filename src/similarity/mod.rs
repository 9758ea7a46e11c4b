//! Structural similarity between people: Pearson correlation of matrix rows

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::WeightMatrix;

/// Dense symmetric similarity matrix with entries in [-1, 1] and a zero diagonal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
}

impl SimilarityMatrix {
    /// Wrap precomputed similarities, clamping to [-1, 1] and zeroing the diagonal
    pub fn from_values(mut values: Array2<f64>) -> Self {
        values.mapv_inplace(|v| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 });
        values.diag_mut().fill(0.0);
        Self { values }
    }

    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Dissimilarity `1 - s` used for clustering; zero on the diagonal
    pub fn distances(&self) -> Array2<f64> {
        let mut distances = self.values.mapv(|s| 1.0 - s);
        distances.diag_mut().fill(0.0);
        distances
    }

    /// Most similar other person for each row, as (index, similarity)
    pub fn nearest(&self) -> Vec<Option<(usize, f64)>> {
        let n = self.size();
        (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (j, self.values[[i, j]]))
                    .fold(None, |best: Option<(usize, f64)>, (j, s)| match best {
                        Some((_, b)) if b >= s => best,
                        _ => Some((j, s)),
                    })
            })
            .collect()
    }
}

/// Pearson correlation coefficient of two equally long samples.
///
/// `None` when the samples are shorter than two or either has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let mean_x = xs.iter().mean();
    let mean_y = ys.iter().mean();

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((cov / denominator).clamp(-1.0, 1.0))
}

/// Correlate every pair of matrix rows.
///
/// Pairs involving a constant row (an isolate) get similarity 0.
pub fn similarity_matrix(matrix: &WeightMatrix) -> SimilarityMatrix {
    let n = matrix.size();
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| matrix.row(i).iter().map(|&w| f64::from(w)).collect())
        .collect();

    let mut values = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pearson(&rows[i], &rows[j]).unwrap_or(0.0);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }

    log::info!("Computed {}x{} similarity matrix", n, n);
    SimilarityMatrix::from_values(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn pearson_of_linear_samples() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let up = [2.0, 4.0, 6.0, 8.0];
        let down = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]).is_none());
        assert!(pearson(&xs, &up[..3]).is_none());
    }

    #[test]
    fn diagonal_is_zero_and_matrix_symmetric() {
        let weights = array![
            [0u8, 1, 1, 0],
            [1, 0, 1, 0],
            [1, 1, 0, 2],
            [0, 0, 2, 0]
        ];
        let matrix = WeightMatrix::new(weights, None).unwrap();
        let similarity = similarity_matrix(&matrix);
        for i in 0..4 {
            assert_eq!(similarity.get(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(similarity.get(i, j), similarity.get(j, i));
                assert!((-1.0..=1.0).contains(&similarity.get(i, j)));
            }
        }
    }

    #[test]
    fn diagonal_forced_to_zero_for_any_input() {
        let similarity = SimilarityMatrix::from_values(array![[5.0, 0.3], [0.3, f64::NAN]]);
        assert_eq!(similarity.get(0, 0), 0.0);
        assert_eq!(similarity.get(1, 1), 0.0);
        assert_eq!(similarity.get(0, 1), 0.3);
    }

    #[test]
    fn isolates_are_dissimilar_to_everyone() {
        let weights = array![[0u8, 2, 0], [2, 0, 0], [0, 0, 0]];
        let similarity = similarity_matrix(&WeightMatrix::new(weights, None).unwrap());
        assert_eq!(similarity.get(2, 0), 0.0);
        assert_eq!(similarity.get(2, 1), 0.0);
        // rows (0,2,0) and (2,0,0) are anti-correlated
        assert!(similarity.get(0, 1) < 0.0);
    }

    #[test]
    fn distances_are_one_minus_similarity() {
        let similarity = SimilarityMatrix::from_values(array![[0.0, 0.25], [0.25, 0.0]]);
        let distances = similarity.distances();
        assert_eq!(distances[[0, 1]], 0.75);
        assert_eq!(distances[[0, 0]], 0.0);
    }

    #[test]
    fn serialises_to_json() {
        let similarity = SimilarityMatrix::from_values(array![[0.0, 0.5], [0.5, 0.0]]);
        let json = serde_json::to_string(&similarity).unwrap();
        let restored: SimilarityMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get(0, 1), 0.5);
        assert_eq!(restored, similarity);
    }

    #[test]
    fn nearest_neighbour_by_similarity() {
        let similarity = SimilarityMatrix::from_values(array![
            [0.0, 0.2, 0.9],
            [0.2, 0.0, -0.1],
            [0.9, -0.1, 0.0]
        ]);
        let nearest = similarity.nearest();
        assert_eq!(nearest[0], Some((2, 0.9)));
        assert_eq!(nearest[1], Some((0, 0.2)));
    }
}
