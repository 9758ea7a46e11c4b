//! Prediction quality measures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &[bool], actual: &[bool]) -> Self {
        let mut matrix = Self::default();
        for (&p, &a) in predicted.iter().zip(actual) {
            match (p, a) {
                (true, true) => matrix.true_positives += 1,
                (true, false) => matrix.false_positives += 1,
                (false, false) => matrix.true_negatives += 1,
                (false, true) => matrix.false_negatives += 1,
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.true_positives + self.true_negatives) as f64 / total as f64,
        }
    }

    /// `None` when nothing was predicted positive
    pub fn precision(&self) -> Option<f64> {
        let predicted = self.true_positives + self.false_positives;
        (predicted > 0).then(|| self.true_positives as f64 / predicted as f64)
    }

    /// `None` when there are no actual positives
    pub fn recall(&self) -> Option<f64> {
        let actual = self.true_positives + self.false_negatives;
        (actual > 0).then(|| self.true_positives as f64 / actual as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_outcome() {
        let predicted = [true, true, false, false, true];
        let actual = [true, false, false, true, true];
        let matrix = ConfusionMatrix::from_predictions(&predicted, &actual);
        assert_eq!(matrix.true_positives, 2);
        assert_eq!(matrix.false_positives, 1);
        assert_eq!(matrix.true_negatives, 1);
        assert_eq!(matrix.false_negatives, 1);
        assert!((matrix.accuracy() - 0.6).abs() < 1e-12);
        assert_eq!(matrix.precision(), Some(2.0 / 3.0));
        assert_eq!(matrix.recall(), Some(2.0 / 3.0));
    }

    #[test]
    fn undefined_rates_are_none() {
        let matrix = ConfusionMatrix::from_predictions(&[false, false], &[false, false]);
        assert_eq!(matrix.precision(), None);
        assert_eq!(matrix.recall(), None);
        assert_eq!(matrix.accuracy(), 1.0);
    }
}
