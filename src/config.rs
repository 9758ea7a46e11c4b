//! Configuration of an analysis run

use serde::{Deserialize, Serialize};

use crate::classify::ClassifierConfig;
use crate::cluster::Linkage;
use crate::data::{TieEnumeration, GANG_SIZE};
use crate::graph::PageRankConfig;
use crate::power::PowerConfig;

/// Hierarchical clustering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    pub linkage: Linkage,

    /// Number of clusters the dendrogram is cut into
    pub clusters: usize,

    /// Cut at this dissimilarity instead of into `clusters`
    pub cut_height: Option<f64>,

    /// Smallest connected component reported
    pub min_component_size: usize,

    /// Central members listed per cluster
    pub central_nodes: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            linkage: Linkage::Average,
            clusters: 4,
            cut_height: None,
            min_component_size: 2,
            central_nodes: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Required network size; `None` accepts any size
    pub expected_nodes: Option<usize>,

    pub tie_mode: TieEnumeration,

    /// Scale betweenness by 1/((n-1)(n-2))
    pub normalize_betweenness: bool,

    pub pagerank: PageRankConfig,

    pub power: PowerConfig,

    pub clustering: ClusteringConfig,

    pub classifier: ClassifierConfig,

    /// People listed per metric in the rankings
    pub top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_nodes: Some(GANG_SIZE),
            tie_mode: TieEnumeration::Directed,
            normalize_betweenness: false,
            pagerank: PageRankConfig::default(),
            power: PowerConfig::default(),
            clustering: ClusteringConfig::default(),
            classifier: ClassifierConfig::default(),
            top_k: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_gang() {
        let config = Config::default();
        assert_eq!(config.expected_nodes, Some(54));
        assert_eq!(config.tie_mode, TieEnumeration::Directed);
        assert_eq!(config.power.precision, 6);
        assert_eq!(config.clustering.linkage, Linkage::Average);
        assert_eq!(config.clustering.cut_height, None);
    }

    #[test]
    fn serialises_to_json() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["top_k"], 5);
        assert_eq!(json["clustering"]["clusters"], 4);
        assert_eq!(json["power"]["max_iterations"], 10_000);
    }
}
