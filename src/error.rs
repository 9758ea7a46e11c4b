//! Error types for loading and analysing the network

use std::path::PathBuf;
use thiserror::Error;

use crate::power::PowerError;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can go wrong between reading the CSV files and fitting the models
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}, column {column}: cannot parse {value:?} as {expected}")]
    Parse {
        row: usize,
        column: usize,
        value: String,
        expected: &'static str,
    },

    #[error("expected a {expected}x{expected} matrix, found {rows}x{columns}")]
    Dimension {
        expected: usize,
        rows: usize,
        columns: usize,
    },

    #[error("matrix is not square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix is not symmetric: w[{i}][{j}] = {forward} but w[{j}][{i}] = {backward}")]
    Asymmetric {
        i: usize,
        j: usize,
        forward: u8,
        backward: u8,
    },

    #[error("row {row} has {found} fields, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix diagonal must be zero, found {value} at index {index}")]
    NonZeroDiagonal { index: usize, value: u8 },

    #[error("row {row}, column {column}: tie weight {value} outside 0..=4")]
    InvalidWeight { row: usize, column: usize, value: f64 },

    #[error("row {row}: {field} code {value} is not valid")]
    InvalidCode {
        row: usize,
        field: &'static str,
        value: i64,
    },

    #[error("attribute table has {found} rows but the matrix has {expected} nodes")]
    RowCountMismatch { expected: usize, found: usize },

    #[error("attribute row {row} carries identifier {found}, expected {expected}")]
    IdentifierMismatch {
        row: usize,
        expected: u32,
        found: u32,
    },

    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("power iteration failed: {0}")]
    Power(#[from] PowerError),

    #[error("model error: {0}")]
    Model(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
