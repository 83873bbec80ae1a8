//! JSON request/response types shared by the CLI and the HTTP service

use crate::balance::Category;
use crate::constraints::UnorderedPair;
use crate::grouping::GroupingOutcome;
use crate::identity::Identity;
use crate::partition::Group;
use crate::roster::Ballot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grouping request as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsRequest {
    /// Target group size; falls back to the configured default when absent
    #[serde(default)]
    pub group_size: Option<usize>,

    /// One ballot per voter
    pub ballots: Vec<Ballot>,

    /// Resolver output: raw label → canonical name
    #[serde(default)]
    pub name_map: BTreeMap<String, String>,

    /// Forbidden pairs given as raw labels
    #[serde(default)]
    pub forbidden: Vec<(String, String)>,

    /// Forbidden pairs as free text, one `name, name` pair per line
    #[serde(default)]
    pub restrictions: Option<String>,

    /// Balance category per raw label; absent disables balancing
    #[serde(default)]
    pub balance: Option<BTreeMap<String, Category>>,

    /// Overrides the configured balance weight
    #[serde(default)]
    pub balance_weight: Option<f64>,
}

/// Grouping result returned to a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
    pub warnings: Vec<String>,
    pub graph: GraphView,
    pub forbidden: Vec<UnorderedPair>,
}

/// Graph as handed to a renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: Identity,
    /// 0-based index into `groups`
    pub group: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: Identity,
    pub target: Identity,
    pub weight: u32,
    /// Whether the endpoints form a forbidden pair
    pub forbidden: bool,
}

impl From<GroupingOutcome> for GroupsResponse {
    fn from(outcome: GroupingOutcome) -> Self {
        let group_index: BTreeMap<&str, usize> = outcome
            .groups
            .iter()
            .enumerate()
            .flat_map(|(index, group)| group.iter().map(move |member| (member.as_str(), index)))
            .collect();

        let nodes = outcome
            .graph
            .nodes()
            .map(|id| NodeView {
                id: id.clone(),
                group: group_index.get(id.as_str()).copied(),
            })
            .collect();

        let edges = outcome
            .graph
            .edges()
            .into_iter()
            .map(|edge| EdgeView {
                forbidden: outcome.forbidden.is_forbidden_pair(&edge.source, &edge.target),
                source: edge.source,
                target: edge.target,
                weight: edge.weight,
            })
            .collect();

        let warnings = outcome.warning_messages();
        let forbidden = outcome.forbidden.iter().cloned().collect();

        Self {
            groups: outcome.groups,
            warnings,
            graph: GraphView { nodes, edges },
            forbidden,
        }
    }
}
