//! Flattening the weight matrix into a tie list

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::matrix::WeightMatrix;

/// Relationship strength encoded by a tie weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TieStrength {
    /// Hung out together
    HungOut = 1,
    /// Co-offended together
    CoOffended = 2,
    /// Co-offended and committed serious crime together
    SeriousCrime = 3,
    /// Co-offended, serious crime, and related by kinship
    Kinship = 4,
}

impl TieStrength {
    pub fn from_weight(weight: u8) -> Option<Self> {
        match weight {
            1 => Some(TieStrength::HungOut),
            2 => Some(TieStrength::CoOffended),
            3 => Some(TieStrength::SeriousCrime),
            4 => Some(TieStrength::Kinship),
            _ => None,
        }
    }

    pub fn weight(self) -> u8 {
        self as u8
    }
}

/// A recorded relationship between two people (1-based identifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tie {
    pub source: u32,
    pub target: u32,
    pub weight: u8,
}

impl Tie {
    pub fn strength(&self) -> Option<TieStrength> {
        TieStrength::from_weight(self.weight)
    }
}

/// How the double loop over the matrix enumerates symmetric cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum TieEnumeration {
    /// One tie per nonzero cell: (i, j) and (j, i) both appear
    #[default]
    Directed,
    /// One tie per unordered pair, source < target
    Unordered,
}

/// Flatten the matrix into a tie list in row-major order
pub fn extract_ties(matrix: &WeightMatrix, mode: TieEnumeration) -> Vec<Tie> {
    let n = matrix.size();
    let mut ties = Vec::new();

    for i in 0..n {
        let start = match mode {
            TieEnumeration::Directed => 0,
            TieEnumeration::Unordered => i + 1,
        };
        for j in start..n {
            let weight = matrix.weight(i, j);
            if weight > 0 {
                ties.push(Tie {
                    source: i as u32 + 1,
                    target: j as u32 + 1,
                    weight,
                });
            }
        }
    }

    log::debug!("Extracted {} ties ({:?} enumeration)", ties.len(), mode);
    ties
}

/// Count ties at each strength level (index 0 = weight 1)
pub fn strength_distribution(ties: &[Tie]) -> [usize; 4] {
    let mut counts = [0; 4];
    for tie in ties {
        if let Some(strength) = tie.strength() {
            counts[strength.weight() as usize - 1] += 1;
        }
    }
    counts
}
