//! Property tests over random symmetric weight matrices

use gang_network_analyzer::data::{extract_ties, TieEnumeration, WeightMatrix};
use gang_network_analyzer::power::{power_scores, PowerConfig};
use gang_network_analyzer::similarity::similarity_matrix;
use ndarray::Array2;
use proptest::prelude::*;

/// Symmetric n x n weights in 0..=4 with a zero diagonal
fn symmetric_weights() -> impl Strategy<Value = Array2<u8>> {
    (2usize..8).prop_flat_map(|n| {
        prop::collection::vec(0u8..=4, n * n).prop_map(move |cells| {
            Array2::from_shape_fn((n, n), |(i, j)| match i.cmp(&j) {
                std::cmp::Ordering::Less => cells[i * n + j],
                std::cmp::Ordering::Greater => cells[j * n + i],
                std::cmp::Ordering::Equal => 0,
            })
        })
    })
}

proptest! {
    #[test]
    fn power_iteration_reaches_the_fixed_point(weights in symmetric_weights()) {
        let config = PowerConfig::default();
        let matrix = weights.mapv(f64::from);
        let scores = power_scores(&matrix, &config);

        prop_assert!(scores.is_ok(), "{:?}", scores);
        let scores = scores.unwrap();
        prop_assert!(scores.iterations <= config.max_iterations);
        prop_assert!(scores.vector.iter().all(|&v| v > 0.0));

        // x_i = sum_j (A + dI)[j, i] / x_j
        let n = matrix.nrows();
        for i in 0..n {
            let image: f64 = (0..n)
                .map(|j| {
                    let weight = matrix[[j, i]] + if i == j { config.diagonal } else { 0.0 };
                    weight / scores.vector[j]
                })
                .sum();
            prop_assert!(
                (scores.vector[i] - image).abs() < 1e-4,
                "node {}: {} vs {}",
                i,
                scores.vector[i],
                image
            );
        }
    }

    #[test]
    fn tie_lists_match_nonzero_cells(weights in symmetric_weights()) {
        let nonzero = weights.iter().filter(|&&w| w > 0).count();
        let matrix = WeightMatrix::new(weights, None).unwrap();

        let directed = extract_ties(&matrix, TieEnumeration::Directed);
        let unordered = extract_ties(&matrix, TieEnumeration::Unordered);
        prop_assert_eq!(directed.len(), nonzero);
        prop_assert_eq!(unordered.len() * 2, nonzero);
        prop_assert!(unordered.iter().all(|t| t.source < t.target));
    }

    #[test]
    fn similarity_diagonal_is_zero(weights in symmetric_weights()) {
        let matrix = WeightMatrix::new(weights, None).unwrap();
        let similarity = similarity_matrix(&matrix);
        for i in 0..similarity.size() {
            prop_assert_eq!(similarity.get(i, i), 0.0);
            for j in 0..similarity.size() {
                let s = similarity.get(i, j);
                prop_assert!((-1.0..=1.0).contains(&s));
                prop_assert_eq!(s, similarity.get(j, i));
            }
        }
    }
}
