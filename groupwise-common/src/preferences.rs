//! Per-participant preference relation
//!
//! Each voter maps to the set of identities they chose. Sets are ordered so
//! iteration (and therefore graph construction) is reproducible.

use crate::identity::Identity;
use std::collections::{BTreeMap, BTreeSet};

/// Who chose whom: voter → chosen identities
///
/// Duplicate choices collapse and self-references are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceRelation {
    choices: BTreeMap<Identity, BTreeSet<Identity>>,
}

impl PreferenceRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the choices of `voter`, replacing any earlier entry
    pub fn set_choices<I>(&mut self, voter: impl Into<Identity>, choices: I)
    where
        I: IntoIterator,
        I::Item: Into<Identity>,
    {
        let voter = voter.into();
        let chosen: BTreeSet<Identity> = choices
            .into_iter()
            .map(Into::into)
            .filter(|choice| *choice != voter)
            .collect();
        self.choices.insert(voter, chosen);
    }

    /// Builder-style variant of [`PreferenceRelation::set_choices`]
    pub fn with_choices<I>(mut self, voter: impl Into<Identity>, choices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Identity>,
    {
        self.set_choices(voter, choices);
        self
    }

    /// Whether `voter` chose `choice`
    pub fn prefers(&self, voter: &str, choice: &str) -> bool {
        self.choices
            .get(voter)
            .map_or(false, |chosen| chosen.contains(choice))
    }

    /// Choices of one voter (empty if they did not vote)
    pub fn choices_of(&self, voter: &str) -> impl Iterator<Item = &Identity> {
        self.choices.get(voter).into_iter().flatten()
    }

    /// Every `(voter, choice)` pair, ordered by voter then choice
    pub fn pairs(&self) -> impl Iterator<Item = (&Identity, &Identity)> {
        self.choices
            .iter()
            .flat_map(|(voter, chosen)| chosen.iter().map(move |choice| (voter, choice)))
    }

    pub fn voters(&self) -> impl Iterator<Item = &Identity> {
        self.choices.keys()
    }

    /// Everyone who voted or was chosen
    pub fn mentioned(&self) -> BTreeSet<Identity> {
        let mut all: BTreeSet<Identity> = self.choices.keys().cloned().collect();
        for chosen in self.choices.values() {
            all.extend(chosen.iter().cloned());
        }
        all
    }

    pub fn voter_count(&self) -> usize {
        self.choices.len()
    }
}

impl<K, V> FromIterator<(K, V)> for PreferenceRelation
where
    K: Into<Identity>,
    V: IntoIterator,
    V::Item: Into<Identity>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut relation = Self::new();
        for (voter, choices) in iter {
            relation.set_choices(voter, choices);
        }
        relation
    }
}
