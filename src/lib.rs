//! Co-offending network analysis of a 54-member London street gang

pub mod classify;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod power;
pub mod profile;
pub mod similarity;
pub mod stats;
pub mod storage;
pub mod viz;

pub use config::Config;
pub use data::{load_network, Network};
pub use error::{AnalysisError, Result};
pub use pipeline::{run_analysis, Analysis};
