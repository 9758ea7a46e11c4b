//! End-to-end analysis of a loaded network

use crate::classify::{run_classifiers, ClassificationReport, Feature};
use crate::cluster::detection::find_components;
use crate::cluster::metrics::{modularity, profile_partition};
use crate::cluster::{agglomerate, Cluster, Dendrogram};
use crate::config::Config;
use crate::data::{extract_ties, Network, Tie, TieEnumeration};
use crate::error::Result;
use crate::graph::{build_graph, compute_centrality, Centrality, TieGraph};
use crate::power::{power_scores, PowerError, PowerScores};
use crate::profile::{annotate, Profile};
use crate::similarity::{similarity_matrix, SimilarityMatrix};
use crate::stats::{
    attribute_summary, degree_distribution, metric_correlations, network_summary, top_k,
    AttributeSummary, Metric, MetricCorrelations, NetworkSummary,
};

/// Everything derived from one network
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Tie list as enumerated by the configured mode
    pub ties: Vec<Tie>,
    pub graph: TieGraph,
    pub centrality: Centrality,
    pub power: Option<PowerScores>,
    /// Why `power` is missing
    pub power_error: Option<PowerError>,
    pub profiles: Vec<Profile>,
    pub similarity: SimilarityMatrix,
    pub dendrogram: Dendrogram,
    /// Cluster label of each node from the dendrogram cut
    pub labels: Vec<usize>,
    pub clusters: Vec<Cluster>,
    pub modularity: f64,
    pub components: Vec<Cluster>,
    pub attributes: AttributeSummary,
    pub network: NetworkSummary,
    pub degree_distribution: Vec<usize>,
    pub correlations: MetricCorrelations,
    pub rankings: Vec<(Metric, Vec<(u32, f64)>)>,
    pub classification: Option<ClassificationReport>,
    /// Why `classification` is missing
    pub classification_error: Option<String>,
}

pub fn run_analysis(network: &Network, config: &Config) -> Result<Analysis> {
    let n = network.size();

    let ties = extract_ties(&network.matrix, config.tie_mode);
    log::info!("Extracted {} ties ({:?})", ties.len(), config.tie_mode);
    let graph = build_graph(n, &ties);
    log::info!(
        "Built tie graph with {} nodes and {} ties",
        graph.node_count,
        graph.tie_count()
    );

    let centrality = compute_centrality(&graph, &config.pagerank, config.normalize_betweenness);

    log::info!("Running power iteration (precision {})", config.power.precision);
    let (power, power_error) = match power_scores(&network.matrix.to_f64(), &config.power) {
        Ok(scores) => {
            log::info!("Power iteration converged after {} iterations", scores.iterations);
            (Some(scores), None)
        }
        Err(err) => {
            log::warn!("Power scores unavailable: {}", err);
            (None, Some(err))
        }
    };

    let profiles = annotate(
        &network.persons,
        &centrality,
        power.as_ref().map(|p| p.vector.as_slice()),
    );

    let similarity = similarity_matrix(&network.matrix);
    let dendrogram = agglomerate(&similarity.distances(), config.clustering.linkage);
    let labels = match config.clustering.cut_height {
        Some(height) => dendrogram.cut_at_height(height),
        None => dendrogram.cut_into(config.clustering.clusters),
    };
    let clusters = profile_partition(
        &graph,
        &labels,
        &centrality,
        &similarity,
        config.clustering.central_nodes,
    );
    let modularity = modularity(&graph, &labels);
    log::info!(
        "Cut dendrogram into {} clusters (modularity {:.3})",
        clusters.len(),
        modularity
    );

    let components = find_components(
        &graph,
        &centrality,
        config.clustering.min_component_size,
        config.clustering.central_nodes,
    );

    let unordered = match config.tie_mode {
        TieEnumeration::Unordered => ties.clone(),
        TieEnumeration::Directed => extract_ties(&network.matrix, TieEnumeration::Unordered),
    };
    let attributes = attribute_summary(&network.persons);
    let network_stats = network_summary(&graph, &unordered, &network.persons);
    let correlations = metric_correlations(&profiles);
    let rankings = Metric::ALL
        .iter()
        .map(|&metric| (metric, top_k(&profiles, metric, config.top_k)))
        .filter(|(_, ranked)| !ranked.is_empty())
        .collect();

    let mut classifier = config.classifier.clone();
    if power.is_none() {
        classifier.features.retain(|&f| f != Feature::Power);
    }
    let (classification, classification_error) = match run_classifiers(&profiles, &classifier) {
        Ok(report) => (Some(report), None),
        Err(err) => {
            log::warn!("Classification unavailable: {}", err);
            (None, Some(err.to_string()))
        }
    };

    Ok(Analysis {
        ties,
        degree_distribution: degree_distribution(&graph),
        graph,
        centrality,
        power,
        power_error,
        profiles,
        similarity,
        dendrogram,
        labels,
        clusters,
        modularity,
        components,
        attributes,
        network: network_stats,
        correlations,
        rankings,
        classification,
        classification_error,
    })
}
