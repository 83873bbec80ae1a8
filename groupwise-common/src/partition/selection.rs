//! Best-candidate selection for growing a partial group
//!
//! Without balancing, the candidate with the highest affinity to the group
//! wins. With balancing, candidates are bucketed by category and the bucket
//! winners compete on a score where a category that already holds a strict
//! majority in the group is discounted by the balance weight.
//!
//! Ties always go to the candidate seen first; candidates are visited in
//! lexicographic order.

use super::Partitioner;
use crate::balance::{BalanceMap, Category};
use crate::identity::Identity;
use std::collections::BTreeSet;

/// A chosen candidate and its raw (undiscounted) affinity to the group
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub identity: Identity,
    pub affinity: u32,
}

/// Keep the first candidate with the highest affinity
#[derive(Debug, Default)]
struct Best(Option<Candidate>);

impl Best {
    fn offer(&mut self, identity: &Identity, affinity: u32) {
        let better = match &self.0 {
            None => true,
            Some(current) => affinity > current.affinity,
        };
        if better {
            self.0 = Some(Candidate {
                identity: identity.clone(),
                affinity,
            });
        }
    }
}

impl Partitioner<'_> {
    /// Pick the unassigned identity that best joins `group`
    ///
    /// Identities forming a forbidden pair with any member are never
    /// considered. Returns `None` only when no candidate is left (or, with
    /// balancing, when no bucket produced one).
    pub(crate) fn best_candidate(
        &self,
        unassigned: &BTreeSet<Identity>,
        group: &[Identity],
    ) -> Option<Candidate> {
        let candidates = unassigned
            .iter()
            .filter(|candidate| !self.constraints.is_forbidden(candidate, group));

        match self.balance {
            None => {
                let mut best = Best::default();
                for candidate in candidates {
                    best.offer(candidate, self.graph.affinity(candidate, group));
                }
                best.0
            }
            Some(balance) => self.best_balanced(balance, candidates, group),
        }
    }

    fn best_balanced<'c, I>(
        &self,
        balance: &BalanceMap,
        candidates: I,
        group: &[Identity],
    ) -> Option<Candidate>
    where
        I: Iterator<Item = &'c Identity>,
    {
        let mut best_a = Best::default();
        let mut best_b = Best::default();
        let mut best_unknown = Best::default();

        for candidate in candidates {
            let affinity = self.graph.affinity(candidate, group);
            match balance.category_of(candidate) {
                Category::A => best_a.offer(candidate, affinity),
                Category::B => best_b.offer(candidate, affinity),
                Category::Unknown => best_unknown.offer(candidate, affinity),
            }
        }

        let winners = [
            (Category::Unknown, best_unknown.0),
            (Category::A, best_a.0),
            (Category::B, best_b.0),
        ];

        // (score, discounted, candidate)
        let mut chosen: Option<(f64, bool, &Candidate)> = None;
        for (category, winner) in &winners {
            let Some(winner) = winner else { continue };
            if winner.affinity == 0 {
                continue;
            }
            let discounted = balance.deepens_majority(*category, group);
            let raw = f64::from(winner.affinity);
            let score = if discounted { raw * self.balance_weight } else { raw };

            let better = match chosen {
                None => true,
                Some((best_score, best_discounted, _)) => {
                    score > best_score || (score == best_score && best_discounted && !discounted)
                }
            };
            if better {
                chosen = Some((score, discounted, winner));
            }
        }

        if let Some((_, _, candidate)) = chosen {
            return Some(candidate.clone());
        }

        // Nobody has a positive affinity: Unknown first, then A, then B
        let [(_, unknown), (_, a), (_, b)] = winners;
        unknown.or(a).or(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintSet;
    use crate::graph::{build_graph, AffinityGraph};
    use crate::preferences::PreferenceRelation;

    fn setup(prefs: PreferenceRelation, extra: &[&str]) -> AffinityGraph {
        let mut ids = prefs.mentioned();
        ids.extend(extra.iter().map(|n| n.to_string()));
        build_graph(&ids, &prefs)
    }

    fn names(list: &[&str]) -> Vec<Identity> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn pool(list: &[&str]) -> BTreeSet<Identity> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_highest_affinity_wins() {
        let graph = setup(
            PreferenceRelation::new()
                .with_choices("G", ["X", "Y"])
                .with_choices("Y", ["G"]),
            &[],
        );
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&graph, &constraints, 3, None, 0.5);

        let pick = engine.best_candidate(&pool(&["X", "Y"]), &names(&["G"])).unwrap();
        assert_eq!(pick.identity, "Y");
        assert_eq!(pick.affinity, 2);
    }

    #[test]
    fn test_zero_affinity_still_selected() {
        let graph = setup(PreferenceRelation::new(), &["G", "P", "Q"]);
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&graph, &constraints, 3, None, 0.5);

        let pick = engine.best_candidate(&pool(&["Q", "P"]), &names(&["G"])).unwrap();
        // Tie at zero goes to the first in order
        assert_eq!(pick.identity, "P");
        assert_eq!(pick.affinity, 0);
    }

    #[test]
    fn test_forbidden_candidates_filtered() {
        let graph = setup(PreferenceRelation::new().with_choices("G", ["X"]), &["Y"]);
        let constraints: ConstraintSet = [("G", "X")].into_iter().collect();
        let engine = Partitioner::new(&graph, &constraints, 3, None, 0.5);

        let pick = engine.best_candidate(&pool(&["X", "Y"]), &names(&["G"])).unwrap();
        assert_eq!(pick.identity, "Y");
        assert!(engine.best_candidate(&pool(&["X"]), &names(&["G"])).is_none());
        assert!(engine.best_candidate(&pool(&[]), &names(&["G"])).is_none());
    }

    #[test]
    fn test_majority_category_discounted() {
        // Group is all A; an A and a B candidate have equal affinity
        let graph = setup(
            PreferenceRelation::new().with_choices("a1", ["a2", "b1"]),
            &[],
        );
        let constraints = ConstraintSet::new();
        let balance: BalanceMap = [("a1", Category::A), ("a2", Category::A), ("b1", Category::B)]
            .into_iter()
            .collect();
        let engine = Partitioner::new(&graph, &constraints, 3, Some(&balance), 0.5);

        let pick = engine.best_candidate(&pool(&["a2", "b1"]), &names(&["a1"])).unwrap();
        assert_eq!(pick.identity, "b1");
    }

    #[test]
    fn test_equal_scores_prefer_undiscounted() {
        let graph = setup(PreferenceRelation::new().with_choices("a1", ["a2", "b1"]), &[]);
        let constraints = ConstraintSet::new();
        let balance: BalanceMap = [("a1", Category::A), ("a2", Category::A), ("b1", Category::B)]
            .into_iter()
            .collect();
        // A weight of 1.0 leaves the scores tied
        let engine = Partitioner::new(&graph, &constraints, 3, Some(&balance), 1.0);

        let pick = engine.best_candidate(&pool(&["a2", "b1"]), &names(&["a1"])).unwrap();
        assert_eq!(pick.identity, "b1");
    }

    #[test]
    fn test_strong_majority_candidate_can_still_win() {
        // a2 is mutual with both members, enough to survive the discount
        let graph = setup(
            PreferenceRelation::new()
                .with_choices("a1", ["a2", "b1"])
                .with_choices("a2", ["a1", "a3"])
                .with_choices("a3", ["a2"]),
            &[],
        );
        let constraints = ConstraintSet::new();
        let balance: BalanceMap = [
            ("a1", Category::A),
            ("a2", Category::A),
            ("a3", Category::A),
            ("b1", Category::B),
        ]
        .into_iter()
        .collect();
        let engine = Partitioner::new(&graph, &constraints, 4, Some(&balance), 0.5);

        let pick = engine
            .best_candidate(&pool(&["a2", "b1"]), &names(&["a1", "a3"]))
            .unwrap();
        // a2: 2 (a1) + 2 (a3) = 4 → 2.0 after discount; b1: 1
        assert_eq!(pick.identity, "a2");
    }

    #[test]
    fn test_fallback_order_without_positive_affinity() {
        let graph = setup(PreferenceRelation::new(), &["G", "a1", "b1", "u1"]);
        let constraints = ConstraintSet::new();
        let balance: BalanceMap = [("a1", Category::A), ("b1", Category::B)].into_iter().collect();
        let engine = Partitioner::new(&graph, &constraints, 3, Some(&balance), 0.5);

        let group = names(&["G"]);
        let pick = engine.best_candidate(&pool(&["a1", "b1", "u1"]), &group).unwrap();
        assert_eq!(pick.identity, "u1");
        let pick = engine.best_candidate(&pool(&["a1", "b1"]), &group).unwrap();
        assert_eq!(pick.identity, "a1");
        let pick = engine.best_candidate(&pool(&["b1"]), &group).unwrap();
        assert_eq!(pick.identity, "b1");
        assert!(engine.best_candidate(&pool(&[]), &group).is_none());
    }

    #[test]
    fn test_unknown_never_discounted() {
        let graph = setup(PreferenceRelation::new().with_choices("G", ["u1", "u2"]), &[]);
        let constraints = ConstraintSet::new();
        let balance = BalanceMap::new();
        let engine = Partitioner::new(&graph, &constraints, 3, Some(&balance), 0.0);

        let pick = engine.best_candidate(&pool(&["u1", "u2"]), &names(&["G"])).unwrap();
        assert_eq!(pick.identity, "u1");
        assert_eq!(pick.affinity, 1);
    }
}
