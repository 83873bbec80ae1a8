//! Constrained partitioning engine
//!
//! Splits every node of an [`AffinityGraph`] into groups of at most
//! `group_size` members with a three-phase greedy heuristic (see
//! [`phases`]). The heuristic is not an optimizer: it reproduces one
//! specific, deterministic sequence of local decisions, and reports
//! under-filled groups as warnings rather than trying to repair them.
//!
//! # Determinism
//! Identities are visited in lexicographic order, edges strongest first and
//! then by endpoint pair. Every "best" choice keeps the first maximum, so a
//! given input always yields the same groups.
//!
//! # Example
//! ```rust
//! use groupwise_common::{
//!     build_graph, partition, ConstraintSet, PartitionOptions, PreferenceRelation,
//! };
//!
//! let prefs = PreferenceRelation::new()
//!     .with_choices("A", ["B"])
//!     .with_choices("B", ["A"])
//!     .with_choices("C", ["D"]);
//! let identities = prefs.mentioned();
//! let graph = build_graph(&identities, &prefs);
//!
//! let result = partition(&graph, &ConstraintSet::new(), &PartitionOptions::new(2)).unwrap();
//! assert_eq!(result.groups, vec![vec!["A", "B"], vec!["C", "D"]]);
//! assert!(result.warnings.is_empty());
//! ```

mod phases;
mod selection;
mod state;
mod warnings;

pub use warnings::GroupWarning;

use crate::balance::BalanceMap;
use crate::constraints::ConstraintSet;
use crate::graph::AffinityGraph;
use crate::identity::Identity;
use crate::{Error, Result};
use state::PartitionState;
use tracing::{debug, info};

/// Ordered members of one group
pub type Group = Vec<Identity>;

/// Default multiplicative discount applied to majority-deepening candidates
pub const DEFAULT_BALANCE_WEIGHT: f64 = 0.5;

/// Knobs for one partitioning run
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionOptions {
    /// Target (and maximum) group size; must be at least 1
    pub group_size: usize,
    /// Category tags; `None` disables balancing
    pub balance: Option<BalanceMap>,
    /// Discount in `[0, 1]` for candidates deepening a category majority
    pub balance_weight: f64,
}

impl PartitionOptions {
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            balance: None,
            balance_weight: DEFAULT_BALANCE_WEIGHT,
        }
    }

    /// Enable balancing with the given category tags
    pub fn with_balance(mut self, balance: BalanceMap) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn with_balance_weight(mut self, balance_weight: f64) -> Self {
        self.balance_weight = balance_weight;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.group_size < 1 {
            return Err(Error::InvalidInput(
                "group size must be at least 1".to_string(),
            ));
        }
        validate_balance_weight(self.balance_weight)
    }
}

/// Reject balance weights outside `[0, 1]` (including NaN)
pub fn validate_balance_weight(weight: f64) -> Result<()> {
    if (0.0..=1.0).contains(&weight) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "balance weight must lie in [0, 1], got {}",
            weight
        )))
    }
}

/// Result of a partitioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Groups in creation order (Phase 1 seeds first, then Phase 3 leftovers)
    pub groups: Vec<Group>,
    /// One entry per under-filled or single-member group
    pub warnings: Vec<GroupWarning>,
}

/// Read-only context shared by the phases of one run
pub(crate) struct Partitioner<'a> {
    graph: &'a AffinityGraph,
    constraints: &'a ConstraintSet,
    group_size: usize,
    balance: Option<&'a BalanceMap>,
    balance_weight: f64,
}

impl<'a> Partitioner<'a> {
    pub(crate) fn new(
        graph: &'a AffinityGraph,
        constraints: &'a ConstraintSet,
        group_size: usize,
        balance: Option<&'a BalanceMap>,
        balance_weight: f64,
    ) -> Self {
        Self {
            graph,
            constraints,
            group_size,
            balance,
            balance_weight,
        }
    }

    fn run(&self) -> Result<Partition> {
        let mut state = PartitionState::new(self.graph.nodes().cloned());

        self.seed_groups(&mut state);
        debug!(
            "Phase 1 complete: {} groups, {} unassigned",
            state.groups().len(),
            state.unassigned().len()
        );

        self.attach_stragglers(&mut state)?;
        debug!("Phase 2 complete: {} unassigned", state.unassigned().len());

        self.form_residual_groups(&mut state);

        let groups = state.finish(self.graph, self.constraints, self.group_size)?;
        let warnings = warnings::collect(&groups, self.group_size);
        Ok(Partition { groups, warnings })
    }
}

/// Partition every node of `graph` into groups
///
/// # Errors
/// - [`Error::InvalidInput`] for a group size below 1 or a balance weight
///   outside `[0, 1]`
/// - [`Error::Internal`] if the finished partition breaks an invariant
///   (an identity placed twice or not at all, an oversized group, a
///   forbidden pair inside a group)
pub fn partition(
    graph: &AffinityGraph,
    constraints: &ConstraintSet,
    options: &PartitionOptions,
) -> Result<Partition> {
    options.validate()?;

    let partitioner = Partitioner::new(
        graph,
        constraints,
        options.group_size,
        options.balance.as_ref(),
        options.balance_weight,
    );
    let result = partitioner.run()?;

    info!(
        "Partitioned {} participants into {} groups (target size {}, {} warnings, balancing {})",
        graph.node_count(),
        result.groups.len(),
        options.group_size,
        result.warnings.len(),
        if options.balance.is_some() { "on" } else { "off" }
    );

    Ok(result)
}
