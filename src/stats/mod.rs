//! Descriptive statistics of the people and the network

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::cluster::detection::connected_components;
use crate::data::preprocessing::strength_distribution;
use crate::data::{Birthplace, Person, Tie};
use crate::graph::algorithms::{nominal_assortativity, numeric_assortativity};
use crate::graph::TieGraph;
use crate::profile::{NodeMetrics, Profile};
use crate::similarity::pearson;

/// Mean, sample standard deviation and range of a numeric column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let std_dev = if values.len() > 1 { values.iter().std_dev() } else { 0.0 };
    Some(NumericSummary {
        count: values.len(),
        mean: values.iter().mean(),
        std_dev,
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSummary {
    pub age: Option<NumericSummary>,
    pub arrests: Option<NumericSummary>,
    pub convictions: Option<NumericSummary>,
    pub birthplace: BTreeMap<String, usize>,
    /// Count per rank level
    pub rank: BTreeMap<u8, usize>,
    pub resident_share: f64,
    pub prison_share: f64,
    pub music_share: f64,
}

pub fn attribute_summary(persons: &[Person]) -> AttributeSummary {
    let column = |f: fn(&Person) -> u32| -> Vec<f64> {
        persons.iter().map(|p| f64::from(f(p))).collect()
    };
    let share = |f: fn(&Person) -> bool| -> f64 {
        if persons.is_empty() {
            0.0
        } else {
            persons.iter().filter(|p| f(p)).count() as f64 / persons.len() as f64
        }
    };

    let mut birthplace = BTreeMap::new();
    for place in Birthplace::ALL {
        birthplace.insert(place.to_string(), 0);
    }
    let mut rank = BTreeMap::new();
    for person in persons {
        *birthplace.entry(person.birthplace.to_string()).or_insert(0) += 1;
        *rank.entry(person.rank.level()).or_insert(0) += 1;
    }

    AttributeSummary {
        age: summarize(&column(|p| p.age)),
        arrests: summarize(&column(|p| p.arrests)),
        convictions: summarize(&column(|p| p.convictions)),
        birthplace,
        rank,
        resident_share: share(|p| p.resident),
        prison_share: share(|p| p.prison),
        music_share: share(|p| p.music),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub ties: usize,
    pub density: f64,
    pub components: usize,
    pub largest_component: usize,
    pub isolates: usize,
    pub mean_degree: f64,
    pub mean_strength: f64,
    /// Undirected tie counts for weights 1..=4
    pub tie_strengths: [usize; 4],
    pub birthplace_assortativity: Option<f64>,
    pub age_assortativity: Option<f64>,
}

/// `ties` should be the unordered tie list so that each pair counts once
pub fn network_summary(graph: &TieGraph, ties: &[Tie], persons: &[Person]) -> NetworkSummary {
    let n = graph.node_count;
    let components = connected_components(graph);
    let degrees: Vec<f64> = (0..n).map(|v| graph.degree(v) as f64).collect();
    let strengths: Vec<f64> = (0..n).map(|v| f64::from(graph.strength(v))).collect();

    let birthplaces: Vec<usize> = persons
        .iter()
        .map(|p| p.birthplace.code() as usize - 1)
        .collect();
    let ages: Vec<f64> = persons.iter().map(|p| f64::from(p.age)).collect();

    NetworkSummary {
        nodes: n,
        ties: graph.tie_count(),
        density: graph.density(),
        components: components.len(),
        largest_component: components.first().map_or(0, Vec::len),
        isolates: (0..n).filter(|&v| graph.degree(v) == 0).count(),
        mean_degree: if n > 0 { degrees.iter().mean() } else { 0.0 },
        mean_strength: if n > 0 { strengths.iter().mean() } else { 0.0 },
        tie_strengths: strength_distribution(ties),
        birthplace_assortativity: nominal_assortativity(graph, &birthplaces),
        age_assortativity: numeric_assortativity(graph, &ages),
    }
}

/// Number of nodes at each degree, index = degree
pub fn degree_distribution(graph: &TieGraph) -> Vec<usize> {
    let max_degree = (0..graph.node_count).map(|v| graph.degree(v)).fold(0, usize::max);
    let mut counts = vec![0; max_degree + 1];
    for v in 0..graph.node_count {
        counts[graph.degree(v)] += 1;
    }
    counts
}

/// Network measures a profile carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Degree,
    Strength,
    Betweenness,
    Closeness,
    Pagerank,
    Power,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Degree,
        Metric::Strength,
        Metric::Betweenness,
        Metric::Closeness,
        Metric::Pagerank,
        Metric::Power,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Degree => "degree",
            Metric::Strength => "strength",
            Metric::Betweenness => "betweenness",
            Metric::Closeness => "closeness",
            Metric::Pagerank => "pagerank",
            Metric::Power => "power",
        }
    }

    pub fn value(self, metrics: &NodeMetrics) -> Option<f64> {
        match self {
            Metric::Degree => Some(metrics.degree),
            Metric::Strength => Some(metrics.strength),
            Metric::Betweenness => Some(metrics.betweenness),
            Metric::Closeness => Some(metrics.closeness),
            Metric::Pagerank => Some(metrics.pagerank),
            Metric::Power => metrics.power,
        }
    }

    /// Column of this metric over all profiles; `None` if any value is missing
    pub fn column(self, profiles: &[Profile]) -> Option<Vec<f64>> {
        profiles.iter().map(|p| self.value(&p.metrics)).collect()
    }
}

/// Pairwise Pearson correlation among the available metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCorrelations {
    pub metrics: Vec<String>,
    /// `None` where a metric is constant
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn metric_correlations(profiles: &[Profile]) -> MetricCorrelations {
    let columns: Vec<(Metric, Vec<f64>)> = Metric::ALL
        .iter()
        .filter_map(|&m| m.column(profiles).map(|c| (m, c)))
        .collect();

    let values = columns
        .iter()
        .map(|(_, a)| columns.iter().map(|(_, b)| pearson(a, b)).collect())
        .collect();

    MetricCorrelations {
        metrics: columns.iter().map(|(m, _)| m.name().to_string()).collect(),
        values,
    }
}

/// The `k` highest scoring people as (person id, score), ties broken by id
pub fn top_k(profiles: &[Profile], metric: Metric, k: usize) -> Vec<(u32, f64)> {
    let mut scored: Vec<(u32, f64)> = profiles
        .iter()
        .filter_map(|p| metric.value(&p.metrics).map(|v| (p.person.id, v)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Rank;
    use crate::graph::build_graph;

    fn person(id: u32, age: u32, birthplace: Birthplace, prison: bool) -> Person {
        Person {
            id,
            age,
            birthplace,
            resident: id % 2 == 0,
            arrests: id * 2,
            convictions: id,
            prison,
            music: false,
            rank: Rank::from_code(1, 0).unwrap(),
        }
    }

    fn metrics(degree: f64, power: Option<f64>) -> NodeMetrics {
        NodeMetrics {
            degree,
            strength: degree * 2.0,
            betweenness: degree * degree,
            closeness: 1.0 / (1.0 + degree),
            pagerank: degree / 10.0,
            power,
        }
    }

    #[test]
    fn numeric_summary_of_small_sample() {
        let summary = summarize(&[2.0, 4.0, 6.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 4.0).abs() < 1e-12);
        assert!((summary.std_dev - 2.0).abs() < 1e-12);
        assert_eq!((summary.min, summary.max), (2.0, 6.0));
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn attribute_counts_and_shares() {
        let persons = vec![
            person(1, 18, Birthplace::Uk, true),
            person(2, 22, Birthplace::Uk, false),
            person(3, 30, Birthplace::Caribbean, true),
            person(4, 26, Birthplace::WestAfrica, true),
        ];
        let summary = attribute_summary(&persons);
        assert_eq!(summary.birthplace["UK"], 2);
        assert_eq!(summary.birthplace["East Africa"], 0);
        assert_eq!(summary.rank[&1], 4);
        assert!((summary.prison_share - 0.75).abs() < 1e-12);
        assert!((summary.resident_share - 0.5).abs() < 1e-12);
        assert_eq!(summary.age.unwrap().max, 30.0);
    }

    #[test]
    fn network_summary_counts_components() {
        let persons: Vec<Person> = (1..=5)
            .map(|i| person(i, 20, if i <= 3 { Birthplace::Uk } else { Birthplace::Caribbean }, false))
            .collect();
        let ties = vec![
            Tie { source: 1, target: 2, weight: 1 },
            Tie { source: 2, target: 3, weight: 4 },
            Tie { source: 1, target: 3, weight: 2 },
        ];
        let graph = build_graph(5, &ties);
        let summary = network_summary(&graph, &ties, &persons);
        assert_eq!(summary.ties, 3);
        assert_eq!(summary.components, 3);
        assert_eq!(summary.largest_component, 3);
        assert_eq!(summary.isolates, 2);
        assert_eq!(summary.tie_strengths, [1, 1, 0, 1]);
        // all tie ends are UK-born
        assert!(summary.birthplace_assortativity.is_none());
    }

    #[test]
    fn degree_histogram() {
        let ties = vec![
            Tie { source: 1, target: 2, weight: 1 },
            Tie { source: 1, target: 3, weight: 1 },
        ];
        let graph = build_graph(4, &ties);
        assert_eq!(degree_distribution(&graph), vec![1, 2, 1]);
    }

    #[test]
    fn rankings_and_correlations() {
        let profiles: Vec<Profile> = [3.0, 1.0, 2.0]
            .iter()
            .enumerate()
            .map(|(k, &d)| Profile {
                person: person(k as u32 + 1, 20, Birthplace::Uk, false),
                metrics: metrics(d, None),
            })
            .collect();

        assert_eq!(top_k(&profiles, Metric::Degree, 2), vec![(1, 3.0), (3, 2.0)]);
        assert!(top_k(&profiles, Metric::Power, 2).is_empty());

        let correlations = metric_correlations(&profiles);
        assert!(!correlations.metrics.contains(&"power".to_string()));
        let degree = correlations.metrics.iter().position(|m| m == "degree").unwrap();
        let closeness = correlations.metrics.iter().position(|m| m == "closeness").unwrap();
        assert!((correlations.values[degree][degree].unwrap() - 1.0).abs() < 1e-12);
        assert!(correlations.values[degree][closeness].unwrap() < 0.0);
    }
}
