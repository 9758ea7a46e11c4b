//! Input tables: the tie-weight matrix and the person attributes

pub mod loader;
pub mod matrix;
pub mod person;
pub mod preprocessing;

use std::path::Path;

pub use matrix::WeightMatrix;
pub use person::{Birthplace, Person, Rank};
pub use preprocessing::{extract_ties, Tie, TieEnumeration, TieStrength};

use crate::error::Result;

/// Number of people in the London gang dataset
pub const GANG_SIZE: usize = 54;

/// The loaded, validated network: matrix row `k` describes `persons[k]`
#[derive(Debug, Clone)]
pub struct Network {
    pub matrix: WeightMatrix,
    pub persons: Vec<Person>,
}

impl Network {
    pub fn size(&self) -> usize {
        self.matrix.size()
    }
}

/// Load and cross-check both CSV files
pub fn load_network(
    matrix_path: impl AsRef<Path>,
    attributes_path: impl AsRef<Path>,
    expected_nodes: Option<usize>,
) -> Result<Network> {
    let matrix = loader::load_weight_matrix(matrix_path, expected_nodes)?;
    let persons = loader::load_persons(attributes_path, matrix.size())?;
    Ok(Network { matrix, persons })
}
