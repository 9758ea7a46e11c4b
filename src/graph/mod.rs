//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod compressed;

pub use algorithms::{compute_centrality, Centrality, PageRankConfig};
pub use builder::{build_graph, GraphBuilder};
pub use compressed::TieGraph;
