//! Mutable state threaded through the three partitioning phases

use super::Group;
use crate::constraints::ConstraintSet;
use crate::graph::AffinityGraph;
use crate::identity::Identity;
use crate::{Error, Result};
use std::collections::{BTreeSet, HashSet};

/// Unassigned set plus the groups formed so far
///
/// Identities only move forward: unassigned → partial group → finalized
/// group. The one exception is a Phase 1 seed that ends below two members,
/// whose members are restored before the group is ever finalized.
#[derive(Debug, Default)]
pub(crate) struct PartitionState {
    unassigned: BTreeSet<Identity>,
    groups: Vec<Group>,
}

impl PartitionState {
    pub(crate) fn new<I>(identities: I) -> Self
    where
        I: IntoIterator<Item = Identity>,
    {
        Self {
            unassigned: identities.into_iter().collect(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn unassigned(&self) -> &BTreeSet<Identity> {
        &self.unassigned
    }

    pub(crate) fn is_unassigned(&self, identity: &str) -> bool {
        self.unassigned.contains(identity)
    }

    pub(crate) fn has_unassigned(&self) -> bool {
        !self.unassigned.is_empty()
    }

    /// Remove `identity` from the unassigned set; `false` if it was not there
    pub(crate) fn take(&mut self, identity: &str) -> bool {
        self.unassigned.remove(identity)
    }

    /// Remove and return the first unassigned identity in iteration order
    pub(crate) fn pop_first(&mut self) -> Option<Identity> {
        self.unassigned.pop_first()
    }

    /// Return members of an abandoned partial group to the unassigned set
    pub(crate) fn restore(&mut self, members: Group) {
        self.unassigned.extend(members);
    }

    /// Copy of the unassigned set, for iterating while placing
    pub(crate) fn snapshot_unassigned(&self) -> Vec<Identity> {
        self.unassigned.iter().cloned().collect()
    }

    pub(crate) fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Finalize a group; returns its index
    pub(crate) fn push_group(&mut self, group: Group) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Move an unassigned identity into an existing group
    pub(crate) fn place(&mut self, identity: &str, group_index: usize) -> Result<()> {
        let group = self.groups.get_mut(group_index).ok_or_else(|| {
            Error::Internal(format!("group index {} out of range", group_index))
        })?;
        if !self.unassigned.remove(identity) {
            return Err(Error::Internal(format!(
                "{} placed while not unassigned",
                identity
            )));
        }
        group.push(identity.to_string());
        Ok(())
    }

    /// Check the terminal-state invariants and hand out the groups
    ///
    /// Every graph node must sit in exactly one group, no group may exceed
    /// `group_size`, and no group may contain a forbidden pair. Any breach
    /// is a programming error and aborts the run.
    pub(crate) fn finish(
        self,
        graph: &AffinityGraph,
        constraints: &ConstraintSet,
        group_size: usize,
    ) -> Result<Vec<Group>> {
        if let Some(left) = self.unassigned.iter().next() {
            return Err(Error::Internal(format!(
                "{} unassigned identities remain (first: {})",
                self.unassigned.len(),
                left
            )));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(graph.node_count());
        for (index, group) in self.groups.iter().enumerate() {
            if group.is_empty() || group.len() > group_size {
                return Err(Error::Internal(format!(
                    "group {} has {} members (target {})",
                    index + 1,
                    group.len(),
                    group_size
                )));
            }
            for (position, member) in group.iter().enumerate() {
                if !graph.contains(member) {
                    return Err(Error::Internal(format!(
                        "{} is not a node of the affinity graph",
                        member
                    )));
                }
                if !seen.insert(member.as_str()) {
                    return Err(Error::Internal(format!("{} placed twice", member)));
                }
                if constraints.is_forbidden(member, &group[..position]) {
                    return Err(Error::Internal(format!(
                        "group {} contains a forbidden pair involving {}",
                        index + 1,
                        member
                    )));
                }
            }
        }

        if seen.len() != graph.node_count() {
            return Err(Error::Internal(format!(
                "{} of {} identities placed",
                seen.len(),
                graph.node_count()
            )));
        }

        Ok(self.groups)
    }
}
