//! Optional demographic balance attribute
//!
//! Each participant may carry one of two category tags (`A`, `B`). Untagged
//! participants count as `Unknown`, which never triggers a balancing
//! preference and never counts toward a group's majority.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Balance category of one participant
///
/// Deserializes leniently through [`Category::from_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String")]
pub enum Category {
    A,
    B,
    #[default]
    Unknown,
}

impl Category {
    /// Parse a free-form tag; anything unrecognised is `Unknown`
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "A" => Category::A,
            "B" => Category::B,
            _ => Category::Unknown,
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Category::from_tag(&tag)
    }
}

/// Category tags per identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceMap {
    tags: HashMap<Identity, Category>,
}

impl BalanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, identity: impl Into<Identity>, category: Category) {
        self.tags.insert(identity.into(), category);
    }

    /// Category of `identity`; untagged identities are `Unknown`
    pub fn category_of(&self, identity: &str) -> Category {
        self.tags.get(identity).copied().unwrap_or_default()
    }

    /// Tagged members of `group` as `(A count, B count)`
    pub fn counts(&self, group: &[Identity]) -> (usize, usize) {
        group
            .iter()
            .fold((0, 0), |(a, b), member| match self.category_of(member) {
                Category::A => (a + 1, b),
                Category::B => (a, b + 1),
                Category::Unknown => (a, b),
            })
    }

    /// Category holding a strict majority among the tagged members of `group`
    pub fn majority(&self, group: &[Identity]) -> Option<Category> {
        let (a, b) = self.counts(group);
        if a > b {
            Some(Category::A)
        } else if b > a {
            Some(Category::B)
        } else {
            None
        }
    }

    /// Whether adding someone of `category` would deepen the group's existing majority
    pub fn deepens_majority(&self, category: Category, group: &[Identity]) -> bool {
        category != Category::Unknown && self.majority(group) == Some(category)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<K: Into<Identity>> FromIterator<(K, Category)> for BalanceMap {
    fn from_iter<T: IntoIterator<Item = (K, Category)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (identity, category) in iter {
            map.tag(identity, category);
        }
        map
    }
}
