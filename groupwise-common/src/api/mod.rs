//! Request handling shared by the groupwise front ends
//!
//! Turns a [`GroupsRequest`] into engine inputs (resolving every raw label
//! through the request's name map), runs the engine and shapes the
//! [`GroupsResponse`].

pub mod types;

pub use types::{EdgeView, GraphView, GroupsRequest, GroupsResponse, NodeView};

use crate::balance::BalanceMap;
use crate::config::GroupingDefaults;
use crate::constraints::ConstraintSet;
use crate::grouping::{form_groups, GroupingRequest};
use crate::identity::{IdentityResolver, NameMap};
use crate::roster::Roster;
use crate::{Error, Result};
use tracing::{debug, warn};

/// Run one grouping request end to end
///
/// Values missing from the request (group size, balance weight) come from
/// `defaults`.
pub fn process_request(
    request: GroupsRequest,
    defaults: &GroupingDefaults,
) -> Result<GroupsResponse> {
    let names = NameMap::from_aliases(request.name_map.iter())
        .with_participants(request.ballots.iter().map(|ballot| ballot.voter.as_str()));

    let roster = Roster::from_ballots(&request.ballots, &names);
    if roster.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no ballot names a recognized participant ({} skipped)",
            roster.skipped_ballots
        )));
    }
    if roster.skipped_ballots > 0 {
        warn!(
            "{} of {} ballots skipped: voter not recognized",
            roster.skipped_ballots,
            request.ballots.len()
        );
    }

    let mut forbidden = ConstraintSet::new();
    for (a, b) in &request.forbidden {
        match (names.resolve(a), names.resolve(b)) {
            (Some(a), Some(b)) => {
                forbidden.forbid(a, b);
            }
            _ => warn!("Ignoring forbidden pair ({:?}, {:?}): unknown participant", a, b),
        }
    }
    if let Some(text) = &request.restrictions {
        for pair in ConstraintSet::parse_restrictions(text, &names).iter() {
            forbidden.forbid(pair.first().clone(), pair.second().clone());
        }
    }

    let group_size = request.group_size.unwrap_or(defaults.group_size);
    let balance_weight = request.balance_weight.unwrap_or(defaults.balance_weight);

    debug!(
        "Request: {} ballots → {} participants, {} forbidden pairs, group size {}",
        request.ballots.len(),
        roster.identities.len(),
        forbidden.len(),
        group_size
    );

    let mut engine_request = GroupingRequest::new(roster.identities, group_size)
        .with_preferences(roster.preferences)
        .with_forbidden(forbidden)
        .with_balance_weight(balance_weight);

    if let Some(tags) = &request.balance {
        let balance: BalanceMap = tags
            .iter()
            .filter_map(|(raw, category)| names.resolve(raw).map(|id| (id, *category)))
            .collect();
        engine_request = engine_request.with_balance(balance);
    }

    let outcome = form_groups(engine_request)?;
    Ok(GroupsResponse::from(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::Category;
    use crate::roster::Ballot;

    fn defaults() -> GroupingDefaults {
        GroupingDefaults::default()
    }

    #[test]
    fn test_group_size_falls_back_to_default() {
        let request = GroupsRequest {
            ballots: vec![
                Ballot::new("A", ["B"]),
                Ballot::new("B", ["A"]),
                Ballot::new("C", ["D"]),
                Ballot::new("D", Vec::<String>::new()),
            ],
            ..Default::default()
        };
        let defaults = GroupingDefaults {
            group_size: 2,
            ..defaults()
        };

        let response = process_request(request, &defaults).unwrap();
        assert_eq!(response.groups, vec![vec!["A", "B"], vec!["C", "D"]]);
        assert!(response.warnings.is_empty());
    }

    #[test]
    fn test_forbidden_sources_are_merged() {
        let request = GroupsRequest {
            group_size: Some(2),
            ballots: vec![
                Ballot::new("A", ["B"]),
                Ballot::new("B", ["A"]),
                Ballot::new("C", Vec::<String>::new()),
            ],
            name_map: [("bee".to_string(), "B".to_string())].into_iter().collect(),
            forbidden: vec![("A".to_string(), "bee".to_string())],
            restrictions: Some("B, C\nA, nobody".to_string()),
            ..Default::default()
        };

        let response = process_request(request, &defaults()).unwrap();
        assert_eq!(response.forbidden.len(), 2);

        let ab = response
            .graph
            .edges
            .iter()
            .find(|e| e.source == "A" && e.target == "B")
            .unwrap();
        assert_eq!(ab.weight, 2);
        assert!(ab.forbidden);
        for group in &response.groups {
            assert!(!(group.contains(&"A".to_string()) && group.contains(&"B".to_string())));
        }
    }

    #[test]
    fn test_nodes_carry_group_index() {
        let request = GroupsRequest {
            group_size: Some(3),
            ballots: vec![Ballot::new("E", Vec::<String>::new())],
            ..Default::default()
        };

        let response = process_request(request, &defaults()).unwrap();
        assert_eq!(response.graph.nodes.len(), 1);
        assert_eq!(response.graph.nodes[0].group, Some(0));
        assert_eq!(response.warnings.len(), 1);
    }

    #[test]
    fn test_balance_keys_resolved() {
        let request = GroupsRequest {
            group_size: Some(2),
            ballots: vec![
                Ballot::new("a1", ["a2", "b1"]),
                Ballot::new("a2", Vec::<String>::new()),
                Ballot::new("b1", Vec::<String>::new()),
                Ballot::new("b2", Vec::<String>::new()),
            ],
            balance: Some(
                [
                    ("a1".to_string(), Category::A),
                    ("a2".to_string(), Category::A),
                    ("b1".to_string(), Category::B),
                    ("ghost".to_string(), Category::B),
                ]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        };

        let response = process_request(request, &defaults()).unwrap();
        let flat: usize = response.groups.iter().map(Vec::len).sum();
        assert_eq!(flat, 4);
    }

    #[test]
    fn test_blank_voter_ballot_is_skipped() {
        let request = GroupsRequest {
            group_size: Some(2),
            ballots: vec![
                Ballot::new("  ", ["A"]),
                Ballot::new("A", ["B"]),
                Ballot::new("B", Vec::<String>::new()),
            ],
            ..Default::default()
        };

        let response = process_request(request, &defaults()).unwrap();
        assert_eq!(response.groups, vec![vec!["A", "B"]]);
        assert_eq!(response.graph.edges.len(), 1);
    }

    #[test]
    fn test_only_unrecognized_voters_is_invalid() {
        let request = GroupsRequest {
            ballots: vec![Ballot::new("", ["A"])],
            ..Default::default()
        };

        match process_request(request, &defaults()) {
            Err(Error::InvalidInput(message)) => assert!(message.contains("1 skipped")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_request_is_invalid() {
        let result = process_request(GroupsRequest::default(), &defaults());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
