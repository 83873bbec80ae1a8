//! Warnings about under-filled and single-member groups

use super::Group;
use crate::identity::Identity;
use std::fmt;

/// A finalized group that is under-filled or has a single member
///
/// Group numbers are 1-based positions in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupWarning {
    /// More than one member but fewer than the target size
    UnderFilled {
        group: usize,
        members: Vec<Identity>,
        target: usize,
    },
    /// A lone participant nobody else could be placed with
    SingleMember { group: usize, member: Identity },
}

impl GroupWarning {
    /// 1-based number of the group the warning refers to
    pub fn group_number(&self) -> usize {
        match self {
            GroupWarning::UnderFilled { group, .. }
            | GroupWarning::SingleMember { group, .. } => *group,
        }
    }
}

impl fmt::Display for GroupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupWarning::UnderFilled {
                group,
                members,
                target,
            } => write!(
                f,
                "Group {} ({}) was formed with fewer members ({}) than the target of {}, or with participants lacking strong connections.",
                group,
                members.join(", "),
                members.len(),
                target
            ),
            GroupWarning::SingleMember { group, member } => write!(
                f,
                "Group {} ({}) has only 1 member because it could not be placed in another group.",
                group, member
            ),
        }
    }
}

/// Inspect finalized groups in output order
pub(crate) fn collect(groups: &[Group], group_size: usize) -> Vec<GroupWarning> {
    groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let number = index + 1;
            match group.len() {
                1 => Some(GroupWarning::SingleMember {
                    group: number,
                    member: group[0].clone(),
                }),
                len if len > 1 && len < group_size => Some(GroupWarning::UnderFilled {
                    group: number,
                    members: group.clone(),
                    target: group_size,
                }),
                _ => None,
            }
        })
        .collect()
}
