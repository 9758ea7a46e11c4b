//! Per-person attribute records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, Result};

/// Highest ranking code present in the attribute table
pub const MAX_RANK: u8 = 5;

/// Region of birth, coded 1..=4 in the attribute file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Birthplace {
    WestAfrica,
    Caribbean,
    Uk,
    EastAfrica,
}

impl Birthplace {
    pub const ALL: [Birthplace; 4] = [
        Birthplace::WestAfrica,
        Birthplace::Caribbean,
        Birthplace::Uk,
        Birthplace::EastAfrica,
    ];

    /// Decode the numeric birthplace code used in the attribute CSV
    pub fn from_code(code: i64, row: usize) -> Result<Self> {
        match code {
            1 => Ok(Birthplace::WestAfrica),
            2 => Ok(Birthplace::Caribbean),
            3 => Ok(Birthplace::Uk),
            4 => Ok(Birthplace::EastAfrica),
            other => Err(AnalysisError::InvalidCode {
                row,
                field: "birthplace",
                value: other,
            }),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Birthplace::WestAfrica => 1,
            Birthplace::Caribbean => 2,
            Birthplace::Uk => 3,
            Birthplace::EastAfrica => 4,
        }
    }
}

impl fmt::Display for Birthplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Birthplace::WestAfrica => "West Africa",
            Birthplace::Caribbean => "Caribbean",
            Birthplace::Uk => "UK",
            Birthplace::EastAfrica => "East Africa",
        };
        f.write_str(name)
    }
}

/// Rank category within the gang (1 = lowest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rank(u8);

impl Rank {
    pub fn from_code(code: i64, row: usize) -> Result<Self> {
        if (1..=MAX_RANK as i64).contains(&code) {
            Ok(Rank(code as u8))
        } else {
            Err(AnalysisError::InvalidCode {
                row,
                field: "ranking",
                value: code,
            })
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

/// One member of the network, as read from the attribute table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// 1-based identifier, equal to the person's matrix index
    pub id: u32,
    pub age: u32,
    pub birthplace: Birthplace,
    /// Lives in the gang's home area
    pub resident: bool,
    pub arrests: u32,
    pub convictions: u32,
    /// Has served a prison sentence
    pub prison: bool,
    /// Listens to gang-related music
    pub music: bool,
    pub rank: Rank,
}

/// Decode a 0/1 flag column
pub(crate) fn flag_from_code(code: i64, row: usize, field: &'static str) -> Result<bool> {
    match code {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(AnalysisError::InvalidCode {
            row,
            field,
            value: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birthplace_codes_round_trip() {
        for place in Birthplace::ALL {
            assert_eq!(Birthplace::from_code(place.code() as i64, 0).unwrap(), place);
        }
    }

    #[test]
    fn unknown_birthplace_is_rejected() {
        let err = Birthplace::from_code(7, 12).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidCode { row: 12, field: "birthplace", value: 7 }
        ));
    }

    #[test]
    fn rank_must_be_in_range() {
        assert_eq!(Rank::from_code(3, 0).unwrap().level(), 3);
        assert!(Rank::from_code(0, 0).is_err());
        assert!(Rank::from_code(MAX_RANK as i64 + 1, 0).is_err());
    }

    #[test]
    fn flags_accept_only_zero_and_one() {
        assert!(!flag_from_code(0, 0, "prison").unwrap());
        assert!(flag_from_code(1, 0, "prison").unwrap());
        assert!(flag_from_code(2, 0, "prison").is_err());
    }
}
