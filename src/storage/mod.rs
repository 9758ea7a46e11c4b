//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, to_string_pretty, Value};

use crate::cluster::Cluster;
use crate::config::Config;
use crate::graph::TieGraph;
use crate::pipeline::Analysis;

/// Save analysis results to the specified directory
pub fn save_results(analysis: &Analysis, config: &Config, output_dir: &Path) -> Result<()> {
    log::info!("Saving results to {}", output_dir.display());

    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    save_summary(analysis, config, output_dir)?;
    save_profiles(analysis, output_dir)?;
    save_clusters(analysis, output_dir)?;
    save_classification(analysis, output_dir)?;
    save_similarity(analysis, output_dir)?;

    log::info!("Results saved successfully");
    Ok(())
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

fn save_summary(analysis: &Analysis, config: &Config, output_dir: &Path) -> Result<()> {
    log::debug!("Saving summary information");

    let rankings: serde_json::Map<String, Value> = analysis
        .rankings
        .iter()
        .map(|(metric, ranked)| {
            let entries = ranked
                .iter()
                .map(|&(id, score)| json!({ "id": id, "score": score }))
                .collect::<Vec<_>>();
            (metric.name().to_string(), Value::Array(entries))
        })
        .collect();

    let summary = json!({
        "config": config,
        "network": analysis.network,
        "attributes": analysis.attributes,
        "degree_distribution": analysis.degree_distribution,
        "tie_list_length": analysis.ties.len(),
        "power": {
            "converged": analysis.power.is_some(),
            "iterations": analysis.power.as_ref().map(|p| p.iterations),
            "error": analysis.power_error.as_ref().map(|e| e.to_string()),
        },
        "classification": {
            "fitted": analysis.classification.is_some(),
            "error": analysis.classification_error,
        },
        "clustering": {
            "cluster_count": analysis.clusters.len(),
            "modularity": analysis.modularity,
            "component_count": analysis.components.len(),
        },
        "metric_correlations": analysis.correlations,
        "rankings": rankings,
    });

    write_json(&output_dir.join("summary.json"), &summary)
}

fn save_profiles(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    log::debug!("Saving {} profiles", analysis.profiles.len());

    let ids = &analysis.graph.node_ids;
    let nearest = analysis.similarity.nearest();
    let profiles = analysis
        .profiles
        .iter()
        .zip(&analysis.labels)
        .zip(&nearest)
        .map(|((profile, &cluster), nearest)| {
            let person = &profile.person;
            let metrics = &profile.metrics;
            let most_similar = nearest.map(|(k, s)| json!({ "id": ids[k], "similarity": s }));
            json!({
                "id": person.id,
                "age": person.age,
                "birthplace": person.birthplace.to_string(),
                "resident": person.resident,
                "arrests": person.arrests,
                "convictions": person.convictions,
                "prison": person.prison,
                "music": person.music,
                "rank": person.rank.level(),
                "degree": metrics.degree,
                "strength": metrics.strength,
                "betweenness": metrics.betweenness,
                "closeness": metrics.closeness,
                "pagerank": metrics.pagerank,
                "power": metrics.power,
                "cluster": cluster,
                "most_similar": most_similar,
            })
        })
        .collect::<Vec<_>>();

    write_json(&output_dir.join("profiles.json"), &Value::Array(profiles))
}

/// Cluster members are node indices; resolve them to person identifiers
fn cluster_json(cluster: &Cluster, graph: &TieGraph) -> Value {
    let members = cluster
        .members
        .iter()
        .map(|&m| graph.node_ids[m as usize])
        .collect::<Vec<_>>();

    json!({
        "id": cluster.id,
        "size": cluster.size,
        "density": cluster.density,
        "mean_similarity": cluster.mean_similarity,
        "central_nodes": cluster.central_nodes,
        "members": members,
    })
}

fn save_clusters(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    log::debug!(
        "Saving {} clusters and {} components",
        analysis.clusters.len(),
        analysis.components.len()
    );

    let clusters = json!({
        "modularity": analysis.modularity,
        "clusters": analysis.clusters.iter().map(|c| cluster_json(c, &analysis.graph)).collect::<Vec<_>>(),
        "components": analysis.components.iter().map(|c| cluster_json(c, &analysis.graph)).collect::<Vec<_>>(),
        "merges": analysis.dendrogram.merges,
    });

    write_json(&output_dir.join("clusters.json"), &clusters)
}

fn save_classification(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    log::debug!("Saving classification report");

    let report = match &analysis.classification {
        Some(report) => report,
        None => {
            let value = json!({ "error": analysis.classification_error });
            return write_json(&output_dir.join("classification.json"), &value);
        }
    };
    let mut value = serde_json::to_value(report)?;
    value["tree_text"] = Value::String(report.tree.render());
    value["logistic_evaluation"]["test_precision"] = json!(report.logistic_evaluation.test.precision());
    value["logistic_evaluation"]["test_recall"] = json!(report.logistic_evaluation.test.recall());
    value["tree_evaluation"]["test_precision"] = json!(report.tree_evaluation.test.precision());
    value["tree_evaluation"]["test_recall"] = json!(report.tree_evaluation.test.recall());

    write_json(&output_dir.join("classification.json"), &value)
}

/// Similarity matrix with person identifiers as the header row and first column
fn save_similarity(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    let path = output_dir.join("similarity.csv");
    log::debug!("Saving similarity matrix to {}", path.display());

    let ids = &analysis.graph.node_ids;
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec![String::new()];
    header.extend(ids.iter().map(u32::to_string));
    writer.write_record(&header)?;

    for (i, id) in ids.iter().enumerate() {
        let mut record = vec![id.to_string()];
        record.extend((0..ids.len()).map(|j| format!("{:.6}", analysis.similarity.get(i, j))));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
