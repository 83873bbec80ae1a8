//! End-to-end grouping: validated inputs → affinity graph → partition
//!
//! This is the engine-level contract the front ends call. Inputs are already
//! resolved identities; raw labels never reach this point.

use crate::balance::BalanceMap;
use crate::constraints::ConstraintSet;
use crate::graph::{build_graph, AffinityGraph};
use crate::identity::Identity;
use crate::partition::{partition, Group, GroupWarning, PartitionOptions, DEFAULT_BALANCE_WEIGHT};
use crate::preferences::PreferenceRelation;
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Everything the engine needs for one run
#[derive(Debug, Clone)]
pub struct GroupingRequest {
    pub identities: BTreeSet<Identity>,
    pub preferences: PreferenceRelation,
    pub forbidden: ConstraintSet,
    pub group_size: usize,
    pub balance: Option<BalanceMap>,
    pub balance_weight: f64,
}

impl GroupingRequest {
    /// Request over `identities` with no votes, constraints or balancing yet
    pub fn new(identities: BTreeSet<Identity>, group_size: usize) -> Self {
        Self {
            identities,
            preferences: PreferenceRelation::new(),
            forbidden: ConstraintSet::new(),
            group_size,
            balance: None,
            balance_weight: DEFAULT_BALANCE_WEIGHT,
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceRelation) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_forbidden(mut self, forbidden: ConstraintSet) -> Self {
        self.forbidden = forbidden;
        self
    }

    pub fn with_balance(mut self, balance: BalanceMap) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn with_balance_weight(mut self, balance_weight: f64) -> Self {
        self.balance_weight = balance_weight;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.group_size < 1 {
            return Err(Error::InvalidInput(format!(
                "group size must be at least 1, got {}",
                self.group_size
            )));
        }
        if self.identities.is_empty() {
            return Err(Error::InvalidInput(
                "no participants to group".to_string(),
            ));
        }
        Ok(())
    }
}

/// Graph plus groups, ready for presentation
#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    pub graph: AffinityGraph,
    pub groups: Vec<Group>,
    pub warnings: Vec<GroupWarning>,
    pub forbidden: ConstraintSet,
}

impl GroupingOutcome {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Build the affinity graph and partition it
///
/// Fails with [`Error::InvalidInput`] before any graph is built when the
/// group size is below 1, the identity set is empty, or the balance weight
/// lies outside `[0, 1]`. No partial result is ever returned.
pub fn form_groups(request: GroupingRequest) -> Result<GroupingOutcome> {
    request.validate()?;

    let mut options =
        PartitionOptions::new(request.group_size).with_balance_weight(request.balance_weight);
    if let Some(balance) = request.balance {
        options = options.with_balance(balance);
    }
    options.validate()?;

    debug!(
        "Forming groups of {} from {} participants ({} voters, {} forbidden pairs)",
        request.group_size,
        request.identities.len(),
        request.preferences.voter_count(),
        request.forbidden.len()
    );

    let graph = build_graph(&request.identities, &request.preferences);
    let result = partition(&graph, &request.forbidden, &options)?;

    Ok(GroupingOutcome {
        graph,
        groups: result.groups,
        warnings: result.warnings,
        forbidden: request.forbidden,
    })
}
