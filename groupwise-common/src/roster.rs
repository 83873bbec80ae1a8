//! Ballot intake
//!
//! Converts raw ballots (a voter's own label plus the labels they wrote as
//! choices) into engine inputs. Every label goes through the identity
//! resolver; whatever does not resolve is dropped here, so the engine only
//! ever sees recognized participants.

use crate::identity::{Identity, IdentityResolver};
use crate::preferences::PreferenceRelation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// One participant's raw submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: String,
    #[serde(default)]
    pub choices: Vec<String>,
}

impl Ballot {
    pub fn new<I, S>(voter: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            voter: voter.into(),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

/// Resolved participants and their preferences
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Voters plus everyone a voter chose
    pub identities: BTreeSet<Identity>,
    pub preferences: PreferenceRelation,
    /// Ballots whose voter label did not resolve
    pub skipped_ballots: usize,
}

impl Roster {
    /// Resolve ballots into a roster
    ///
    /// - a ballot whose voter does not resolve is skipped
    /// - choices that do not resolve, or resolve to the voter, are dropped
    /// - repeated choices collapse to one
    /// - a later ballot from the same voter replaces the earlier one
    pub fn from_ballots<R>(ballots: &[Ballot], resolver: &R) -> Self
    where
        R: IdentityResolver + ?Sized,
    {
        let mut preferences = PreferenceRelation::new();
        let mut seen_voters: HashSet<Identity> = HashSet::new();
        let mut skipped_ballots = 0;

        for ballot in ballots {
            let Some(voter) = resolver.resolve(&ballot.voter) else {
                warn!("Skipping ballot from unrecognized voter {:?}", ballot.voter);
                skipped_ballots += 1;
                continue;
            };

            let mut dropped = 0;
            let choices: Vec<Identity> = ballot
                .choices
                .iter()
                .filter_map(|raw| {
                    let resolved = resolver.resolve(raw);
                    if resolved.is_none() {
                        dropped += 1;
                    }
                    resolved
                })
                .collect();
            if dropped > 0 {
                debug!("{}: {} choice(s) did not resolve", voter, dropped);
            }

            if !seen_voters.insert(voter.clone()) {
                warn!("Duplicate ballot for {}, keeping the later one", voter);
            }
            preferences.set_choices(voter, choices);
        }

        Self {
            identities: preferences.mentioned(),
            preferences,
            skipped_ballots,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
