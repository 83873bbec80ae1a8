//! # Groupwise Common Library
//!
//! Shared code for the groupwise front ends including:
//! - Identity resolution seam and ballot intake (roster)
//! - Preference relation and affinity graph construction
//! - Forbidden-pair constraints and the optional balance attribute
//! - The three-phase greedy partitioning engine
//! - JSON wire types for requests and responses
//! - Configuration loading

pub mod api;
pub mod balance;
pub mod config;
pub mod constraints;
pub mod error;
pub mod graph;
pub mod grouping;
pub mod identity;
pub mod partition;
pub mod preferences;
pub mod roster;

pub use balance::{BalanceMap, Category};
pub use constraints::{ConstraintSet, UnorderedPair};
pub use error::{Error, Result};
pub use graph::{build_graph, AffinityEdge, AffinityGraph, EdgeWeight};
pub use grouping::{form_groups, GroupingOutcome, GroupingRequest};
pub use identity::{Identity, IdentityResolver, NameMap};
pub use partition::{partition, Group, GroupWarning, Partition, PartitionOptions};
pub use preferences::PreferenceRelation;
