//! People annotated with their network measures

use serde::{Deserialize, Serialize};

use crate::data::Person;
use crate::graph::Centrality;

/// Derived numeric fields appended to a person record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub degree: f64,
    pub strength: f64,
    pub betweenness: f64,
    pub closeness: f64,
    pub pagerank: f64,
    /// Missing when the power iteration did not converge
    pub power: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub person: Person,
    pub metrics: NodeMetrics,
}

/// Join persons (in matrix order) with their centrality and power scores
pub fn annotate(persons: &[Person], centrality: &Centrality, power: Option<&[f64]>) -> Vec<Profile> {
    persons
        .iter()
        .enumerate()
        .map(|(k, person)| Profile {
            person: person.clone(),
            metrics: NodeMetrics {
                degree: centrality.degree[k],
                strength: centrality.strength[k],
                betweenness: centrality.betweenness[k],
                closeness: centrality.closeness[k],
                pagerank: centrality.pagerank[k],
                power: power.map(|p| p[k]),
            },
        })
        .collect()
}
