//! Visualization generation module
//!
//! Writes plot-ready files: Graphviz DOT for the network, CSV tables for
//! histograms and scatter plots, and Newick for the dendrogram.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, NodeIndex, UnGraph};

use crate::data::Person;
use crate::pipeline::Analysis;
use crate::stats::Metric;

/// Number of colours in the Graphviz `set19` scheme
const PALETTE_SIZE: usize = 9;

/// Generate visualizations from analysis results
pub fn generate_visualizations(analysis: &Analysis, output_dir: &Path) -> Result<()> {
    let viz_dir = output_dir.join("visualizations");
    log::info!("Generating visualizations in {}", viz_dir.display());
    fs::create_dir_all(&viz_dir).with_context(|| format!("creating {}", viz_dir.display()))?;

    generate_network_diagram(analysis, &viz_dir)?;
    generate_histograms(analysis, &viz_dir)?;
    generate_metric_table(analysis, &viz_dir)?;
    generate_dendrogram(analysis, &viz_dir)?;

    log::info!("Visualizations generated successfully");
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

/// Tie graph as DOT: nodes coloured by cluster, pen width by tie weight
fn generate_network_diagram(analysis: &Analysis, viz_dir: &Path) -> Result<()> {
    log::debug!("Writing network diagram");

    let graph = analysis.graph.to_petgraph();
    let labels = &analysis.labels;
    let edge_attributes: &dyn Fn(&UnGraph<u32, u8>, EdgeReference<'_, u8>) -> String =
        &|_, edge| format!("penwidth={}", edge.weight());
    let node_attributes: &dyn Fn(&UnGraph<u32, u8>, (NodeIndex, &u32)) -> String =
        &|_, (index, id)| {
            let colour = labels.get(index.index()).map_or(0, |c| c % PALETTE_SIZE) + 1;
            format!(
                "label=\"{}\" style=filled colorscheme=set19 fillcolor={}",
                id, colour
            )
        };
    let dot = Dot::with_attr_getters(
        &graph,
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        edge_attributes,
        node_attributes,
    );

    let mut file = create(&viz_dir.join("network.dot"))?;
    write!(file, "{:?}", dot)?;
    Ok(())
}

fn write_counts(path: &Path, header: &str, counts: impl IntoIterator<Item = (String, usize)>) -> Result<()> {
    let mut file = create(path)?;
    writeln!(file, "{},count", header)?;
    for (value, count) in counts {
        writeln!(file, "{},{}", value, count)?;
    }
    Ok(())
}

fn value_counts(persons: &[Person], field: fn(&Person) -> u32) -> Vec<(String, usize)> {
    persons
        .iter()
        .map(field)
        .counts()
        .into_iter()
        .sorted()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

fn generate_histograms(analysis: &Analysis, viz_dir: &Path) -> Result<()> {
    log::debug!("Writing histograms");

    let degrees = analysis
        .degree_distribution
        .iter()
        .enumerate()
        .map(|(degree, &count)| (degree.to_string(), count));
    write_counts(&viz_dir.join("degree_histogram.csv"), "degree", degrees)?;

    let strengths = analysis
        .network
        .tie_strengths
        .iter()
        .enumerate()
        .map(|(k, &count)| ((k + 1).to_string(), count));
    write_counts(&viz_dir.join("tie_weight_histogram.csv"), "weight", strengths)?;

    let persons: Vec<Person> = analysis.profiles.iter().map(|p| p.person.clone()).collect();
    write_counts(&viz_dir.join("age_histogram.csv"), "age", value_counts(&persons, |p| p.age))?;
    write_counts(
        &viz_dir.join("arrests_histogram.csv"),
        "arrests",
        value_counts(&persons, |p| p.arrests),
    )?;
    write_counts(
        &viz_dir.join("convictions_histogram.csv"),
        "convictions",
        value_counts(&persons, |p| p.convictions),
    )?;
    write_counts(
        &viz_dir.join("birthplace_histogram.csv"),
        "birthplace",
        analysis.attributes.birthplace.clone(),
    )?;
    write_counts(
        &viz_dir.join("rank_histogram.csv"),
        "rank",
        analysis.attributes.rank.iter().map(|(rank, &count)| (rank.to_string(), count)),
    )?;
    Ok(())
}

/// One row per person with every metric, for scatter plots
fn generate_metric_table(analysis: &Analysis, viz_dir: &Path) -> Result<()> {
    log::debug!("Writing metric table");

    let mut file = create(&viz_dir.join("metrics.csv"))?;
    let names = Metric::ALL.iter().map(|m| m.name()).join(",");
    writeln!(file, "id,age,arrests,convictions,{},cluster", names)?;

    for (profile, cluster) in analysis.profiles.iter().zip(&analysis.labels) {
        let person = &profile.person;
        let values = Metric::ALL
            .iter()
            .map(|m| m.value(&profile.metrics).map_or_else(String::new, |v| format!("{:.6}", v)))
            .join(",");
        writeln!(
            file,
            "{},{},{},{},{},{}",
            person.id, person.age, person.arrests, person.convictions, values, cluster
        )?;
    }
    Ok(())
}

fn generate_dendrogram(analysis: &Analysis, viz_dir: &Path) -> Result<()> {
    log::debug!("Writing dendrogram");

    let ids = &analysis.graph.node_ids;
    let labels: Vec<String> = ids.iter().map(u32::to_string).collect();
    let mut newick = create(&viz_dir.join("dendrogram.nwk"))?;
    writeln!(newick, "{}", analysis.dendrogram.to_newick(&labels))?;

    let mut merges = create(&viz_dir.join("dendrogram_merges.csv"))?;
    writeln!(merges, "step,left,right,height,size")?;
    for (step, merge) in analysis.dendrogram.merges.iter().enumerate() {
        writeln!(
            merges,
            "{},{},{},{:.6},{}",
            step, merge.left, merge.right, merge.height, merge.size
        )?;
    }

    // similarity rows and columns in dendrogram leaf order, for a heatmap
    let order = analysis.dendrogram.leaf_order();
    let mut heatmap = create(&viz_dir.join("similarity_ordered.csv"))?;
    writeln!(heatmap, ",{}", order.iter().map(|&k| ids[k]).join(","))?;
    for &i in &order {
        let row = order
            .iter()
            .map(|&j| format!("{:.4}", analysis.similarity.get(i, j)))
            .join(",");
        writeln!(heatmap, "{},{}", ids[i], row)?;
    }
    Ok(())
}
