//! Groups of people: connected components and dendrogram cuts

pub mod detection;
pub mod hierarchical;
pub mod metrics;

use serde::{Deserialize, Serialize};

pub use hierarchical::{agglomerate, Dendrogram, Linkage, Merge};

/// A group of people: a connected component or a cut of the dendrogram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Label within its partition
    pub id: u32,

    /// Node indices, ascending
    pub members: Vec<u32>,

    pub size: usize,

    /// Density: ties inside the cluster / possible ties
    pub density: f64,

    /// Average pairwise similarity of the members, when computed
    pub mean_similarity: Option<f64>,

    /// Central members using various centrality measures
    pub central_nodes: ClusterCentralNodes,
}

/// Key members of a cluster, as person identifiers, highest score first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterCentralNodes {
    /// Highest degree counted inside the cluster
    pub degree: Vec<u32>,

    /// Highest network-wide betweenness among the members
    pub betweenness: Vec<u32>,

    /// Highest network-wide closeness among the members
    pub closeness: Vec<u32>,
}
