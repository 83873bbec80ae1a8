//! Affinity graph construction and affinity queries
//!
//! Turns the preference relation into an undirected weighted graph:
//! - weight 2: both participants chose each other (mutual)
//! - weight 1: only one of them chose the other
//!
//! The graph is built once per request and never modified afterwards. It
//! feeds the partitioning engine and, unchanged, the presentation step.

use crate::identity::Identity;
use crate::preferences::PreferenceRelation;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Strength of the tie between two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeWeight {
    /// Exactly one of the two chose the other
    OneWay,
    /// Both chose each other
    Mutual,
}

impl EdgeWeight {
    /// Numeric weight used for affinity sums
    pub fn value(self) -> u32 {
        match self {
            EdgeWeight::OneWay => 1,
            EdgeWeight::Mutual => 2,
        }
    }
}

/// One undirected edge, endpoints in canonical (lexicographic) order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityEdge {
    pub source: Identity,
    pub target: Identity,
    pub weight: u32,
}

/// Undirected weighted graph over participant identities
#[derive(Debug, Clone, Default)]
pub struct AffinityGraph {
    graph: UnGraph<Identity, EdgeWeight>,
    index: BTreeMap<Identity, NodeIndex>,
}

impl AffinityGraph {
    fn with_nodes(identities: &BTreeSet<Identity>) -> Self {
        let mut graph = UnGraph::with_capacity(identities.len(), 0);
        let mut index = BTreeMap::new();
        for identity in identities {
            let node = graph.add_node(identity.clone());
            index.insert(identity.clone(), node);
        }
        Self { graph, index }
    }

    /// Record a tie between two nodes
    ///
    /// Mutual ties always win; a one-way tie only lands on an empty pair, so
    /// weights never go down.
    fn connect(&mut self, a: NodeIndex, b: NodeIndex, weight: EdgeWeight) {
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if let Some(existing) = self.graph.edge_weight_mut(edge) {
                    if weight > *existing {
                        *existing = weight;
                    }
                }
            }
            None => {
                self.graph.add_edge(a, b, weight);
            }
        }
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.index.contains_key(identity)
    }

    /// All identities, in lexicographic order
    pub fn nodes(&self) -> impl Iterator<Item = &Identity> {
        self.index.keys()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Weight of the edge between `a` and `b`, if any
    pub fn weight(&self, a: &str, b: &str) -> Option<EdgeWeight> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge))
            .copied()
    }

    /// Sum of edge weights between `person` and every member of `group`
    pub fn affinity(&self, person: &str, group: &[Identity]) -> u32 {
        group
            .iter()
            .filter_map(|member| self.weight(person, member))
            .map(EdgeWeight::value)
            .sum()
    }

    /// Every edge with canonical endpoints, ordered by endpoint pair
    pub fn edges(&self) -> Vec<AffinityEdge> {
        let mut edges: Vec<AffinityEdge> = self
            .graph
            .edge_references()
            .map(|edge| {
                let a = &self.graph[edge.source()];
                let b = &self.graph[edge.target()];
                let (source, target) = if a <= b { (a, b) } else { (b, a) };
                AffinityEdge {
                    source: source.clone(),
                    target: target.clone(),
                    weight: edge.weight().value(),
                }
            })
            .collect();
        edges.sort_by(|x, y| (&x.source, &x.target).cmp(&(&y.source, &y.target)));
        edges
    }

    /// Edges ordered for group seeding: heaviest first, then by endpoint pair
    pub fn edges_by_strength(&self) -> Vec<AffinityEdge> {
        let mut edges = self.edges();
        // sort_by is stable, so equal weights keep the endpoint-pair order
        edges.sort_by(|x, y| y.weight.cmp(&x.weight));
        edges
    }
}

/// Build the affinity graph from the identity set and the preference relation
///
/// Every identity becomes a node. Preference pairs that mention someone
/// outside the identity set are skipped silently.
pub fn build_graph(
    identities: &BTreeSet<Identity>,
    preferences: &PreferenceRelation,
) -> AffinityGraph {
    let mut graph = AffinityGraph::with_nodes(identities);
    let mut skipped = 0usize;

    for (voter, choice) in preferences.pairs() {
        let (Some(&a), Some(&b)) = (
            graph.index.get(voter.as_str()),
            graph.index.get(choice.as_str()),
        ) else {
            skipped += 1;
            continue;
        };

        let weight = if preferences.prefers(choice, voter) {
            EdgeWeight::Mutual
        } else {
            EdgeWeight::OneWay
        };
        graph.connect(a, b, weight);
    }

    debug!(
        "Built affinity graph: {} nodes, {} edges ({} preference pairs skipped)",
        graph.node_count(),
        graph.edge_count(),
        skipped
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> BTreeSet<Identity> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_mutual_and_one_way_weights() {
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B"])
            .with_choices("B", ["A"])
            .with_choices("C", ["D"]);
        let graph = build_graph(&ids(&["A", "B", "C", "D"]), &prefs);

        assert_eq!(graph.weight("A", "B"), Some(EdgeWeight::Mutual));
        assert_eq!(graph.weight("B", "A"), Some(EdgeWeight::Mutual));
        assert_eq!(graph.weight("C", "D"), Some(EdgeWeight::OneWay));
        assert_eq!(graph.weight("A", "C"), None);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_one_edge_per_pair() {
        // Both directions are seen while iterating; the pair stays one edge
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B", "C"])
            .with_choices("B", ["A"])
            .with_choices("C", ["B"]);
        let graph = build_graph(&ids(&["A", "B", "C"]), &prefs);

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.weight("A", "B"), Some(EdgeWeight::Mutual));
        assert_eq!(graph.weight("A", "C"), Some(EdgeWeight::OneWay));
        assert_eq!(graph.weight("B", "C"), Some(EdgeWeight::OneWay));
    }

    #[test]
    fn test_unknown_identities_skipped() {
        let prefs = PreferenceRelation::new().with_choices("A", ["Ghost", "B"]);
        let graph = build_graph(&ids(&["A", "B"]), &prefs);

        assert!(!graph.contains("Ghost"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_isolated_identities_are_nodes() {
        let graph = build_graph(&ids(&["E"]), &PreferenceRelation::new());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes().next().map(String::as_str), Some("E"));
    }

    #[test]
    fn test_affinity_sums_weights() {
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B", "C"])
            .with_choices("B", ["A"]);
        let graph = build_graph(&ids(&["A", "B", "C", "D"]), &prefs);

        let group = vec!["B".to_string(), "C".to_string(), "D".to_string()];
        assert_eq!(graph.affinity("A", &group), 3);
        assert_eq!(graph.affinity("D", &group), 0);
        assert_eq!(graph.affinity("A", &[]), 0);
    }

    #[test]
    fn test_edges_by_strength_order() {
        let prefs = PreferenceRelation::new()
            .with_choices("C", ["D"])
            .with_choices("A", ["B"])
            .with_choices("X", ["Y"])
            .with_choices("Y", ["X"]);
        let graph = build_graph(&ids(&["A", "B", "C", "D", "X", "Y"]), &prefs);

        let order: Vec<(String, String, u32)> = graph
            .edges_by_strength()
            .into_iter()
            .map(|e| (e.source, e.target, e.weight))
            .collect();
        assert_eq!(
            order,
            vec![
                ("X".to_string(), "Y".to_string(), 2),
                ("A".to_string(), "B".to_string(), 1),
                ("C".to_string(), "D".to_string(), 1),
            ]
        );
    }
}
