//! Forbidden-pair constraints
//!
//! Pairs are unordered: `{Ana, Bia}` and `{Bia, Ana}` are the same pair. The
//! canonical form stores the lexicographically smaller identity first.

use crate::identity::{Identity, IdentityResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Order-independent pair of distinct identities
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "(Identity, Identity)", from = "(Identity, Identity)")]
pub struct UnorderedPair {
    low: Identity,
    high: Identity,
}

impl UnorderedPair {
    pub fn new(a: impl Into<Identity>, b: impl Into<Identity>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub fn first(&self) -> &Identity {
        &self.low
    }

    pub fn second(&self) -> &Identity {
        &self.high
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.low == identity || self.high == identity
    }

    fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

impl From<(Identity, Identity)> for UnorderedPair {
    fn from((a, b): (Identity, Identity)) -> Self {
        Self::new(a, b)
    }
}

impl From<UnorderedPair> for (Identity, Identity) {
    fn from(pair: UnorderedPair) -> Self {
        (pair.low, pair.high)
    }
}

/// Set of pairs that must never share a group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    pairs: BTreeSet<UnorderedPair>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid `a` and `b` from sharing a group
    ///
    /// Returns `false` if the pair was already forbidden or names the same
    /// identity twice (which constrains nothing).
    pub fn forbid(&mut self, a: impl Into<Identity>, b: impl Into<Identity>) -> bool {
        let pair = UnorderedPair::new(a, b);
        if pair.is_degenerate() {
            return false;
        }
        self.pairs.insert(pair)
    }

    /// Whether the unordered pair `{a, b}` is forbidden
    pub fn is_forbidden_pair(&self, a: &str, b: &str) -> bool {
        if a == b || self.pairs.is_empty() {
            return false;
        }
        self.pairs.contains(&UnorderedPair::new(a, b))
    }

    /// Whether `person` forms a forbidden pair with any member of `group`
    pub fn is_forbidden(&self, person: &str, group: &[Identity]) -> bool {
        if self.pairs.is_empty() {
            return false;
        }
        group.iter().any(|member| self.is_forbidden_pair(person, member))
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnorderedPair> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parse restriction text, one pair per line: `name, name`
    ///
    /// - Blank lines and lines with fewer than two names are ignored
    /// - Only the first two names on a line are used
    /// - Both names go through `resolver`; the pair is kept only if both resolve
    pub fn parse_restrictions<R>(text: &str, resolver: &R) -> Self
    where
        R: IdentityResolver + ?Sized,
    {
        let mut set = Self::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let names: Vec<&str> = line.split(',').map(str::trim).collect();
            if names.len() < 2 {
                debug!("Restriction line {} has fewer than two names, ignoring", line_no + 1);
                continue;
            }
            match (resolver.resolve(names[0]), resolver.resolve(names[1])) {
                (Some(a), Some(b)) => {
                    set.forbid(a, b);
                }
                _ => warn!(
                    "Restriction line {} ({:?}) names an unknown participant, ignoring",
                    line_no + 1,
                    line.trim()
                ),
            }
        }
        set
    }
}

impl<A, B> FromIterator<(A, B)> for ConstraintSet
where
    A: Into<Identity>,
    B: Into<Identity>,
{
    fn from_iter<T: IntoIterator<Item = (A, B)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (a, b) in iter {
            set.forbid(a, b);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NameMap;

    #[test]
    fn test_pair_is_unordered() {
        assert_eq!(UnorderedPair::new("B", "A"), UnorderedPair::new("A", "B"));
        let pair = UnorderedPair::new("Zed", "Amy");
        assert_eq!(pair.first(), "Amy");
        assert_eq!(pair.second(), "Zed");
        assert!(pair.contains("Zed"));
    }

    #[test]
    fn test_forbid_symmetric() {
        let mut set = ConstraintSet::new();
        assert!(set.forbid("A", "B"));
        assert!(!set.forbid("B", "A"));
        assert!(set.is_forbidden_pair("A", "B"));
        assert!(set.is_forbidden_pair("B", "A"));
        assert!(!set.is_forbidden_pair("A", "C"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_self_pair_ignored() {
        let mut set = ConstraintSet::new();
        assert!(!set.forbid("A", "A"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_is_forbidden_against_group() {
        let set: ConstraintSet = [("A", "C")].into_iter().collect();
        let group = vec!["B".to_string(), "C".to_string()];
        assert!(set.is_forbidden("A", &group));
        assert!(!set.is_forbidden("D", &group));
        assert!(!set.is_forbidden("A", &[]));
    }

    #[test]
    fn test_parse_restrictions() {
        let names =
            NameMap::from_aliases([("ana s.", "Ana")]).with_participants(["Ana", "Bia", "Caio"]);
        let text = "ana s., Bia\n\n  Caio \nBia, Caio, Ana\nGhost, Ana\n";
        let set = ConstraintSet::parse_restrictions(text, &names);

        assert_eq!(set.len(), 2);
        assert!(set.is_forbidden_pair("Ana", "Bia"));
        assert!(set.is_forbidden_pair("Bia", "Caio"));
        assert!(!set.is_forbidden_pair("Caio", "Ana"));
    }

    #[test]
    fn test_pair_serializes_as_tuple() {
        let pair = UnorderedPair::new("B", "A");
        let json = serde_json::to_string(&pair).unwrap();
        assert_eq!(json, r#"["A","B"]"#);
        let back: UnorderedPair = serde_json::from_str(r#"["B","A"]"#).unwrap();
        assert_eq!(back, pair);
    }
}
