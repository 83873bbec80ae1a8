//! The three greedy phases
//!
//! 1. **Seed**: walk edges strongest first, open a group on every edge whose
//!    endpoints are both free and allowed together, then grow it with
//!    positively connected candidates.
//! 2. **Attach**: move each remaining identity into the existing group it
//!    fits best, if any group has room and no conflict.
//! 3. **Residual**: build new groups from whatever is left, accepting
//!    unconnected candidates.

use super::state::PartitionState;
use super::{Group, Partitioner};
use crate::Result;
use tracing::debug;

impl Partitioner<'_> {
    /// Phase 1: seed groups from the strongest edges
    pub(crate) fn seed_groups(&self, state: &mut PartitionState) {
        if self.group_size < 2 {
            debug!(
                "Group size {} leaves no room for seeded pairs, skipping phase 1",
                self.group_size
            );
            return;
        }

        for edge in self.graph.edges_by_strength() {
            if !state.is_unassigned(&edge.source) || !state.is_unassigned(&edge.target) {
                continue;
            }
            if self.constraints.is_forbidden_pair(&edge.source, &edge.target) {
                debug!("Not seeding from forbidden pair {} / {}", edge.source, edge.target);
                continue;
            }

            state.take(&edge.source);
            state.take(&edge.target);
            let mut group = vec![edge.source, edge.target];
            self.grow(&mut group, state, 1);

            if group.len() < 2 {
                state.restore(group);
                continue;
            }

            debug!("Phase 1 group (weight {} seed): {:?}", edge.weight, group);
            state.push_group(group);
        }
    }

    /// Phase 2: attach stragglers to the best-fitting existing group
    pub(crate) fn attach_stragglers(&self, state: &mut PartitionState) -> Result<()> {
        for person in state.snapshot_unassigned() {
            let Some(index) = self.best_group_for(&person, state.groups()) else {
                continue;
            };
            debug!("Phase 2 attaching {} to group {}", person, index + 1);
            state.place(&person, index)?;
        }
        Ok(())
    }

    /// Phase 3: form residual groups from everyone still unassigned
    pub(crate) fn form_residual_groups(&self, state: &mut PartitionState) {
        while let Some(first) = state.pop_first() {
            let mut group = vec![first];
            self.grow(&mut group, state, 0);
            debug!("Phase 3 group: {:?}", group);
            state.push_group(group);
        }
    }

    /// Add best candidates to `group` until it is full, nobody is left, or
    /// the best candidate's affinity falls below `min_affinity`
    fn grow(&self, group: &mut Group, state: &mut PartitionState, min_affinity: u32) {
        while group.len() < self.group_size && state.has_unassigned() {
            let Some(candidate) = self.best_candidate(state.unassigned(), group) else {
                break;
            };
            if candidate.affinity < min_affinity {
                break;
            }
            state.take(&candidate.identity);
            group.push(candidate.identity);
        }
    }

    /// Index of the group `person` should join in Phase 2
    ///
    /// Only groups with room and no forbidden member qualify. The score is
    /// the affinity, discounted by the balance weight when `person` would
    /// deepen their own category's majority. Zero scores qualify; ties go
    /// to the earliest group.
    fn best_group_for(&self, person: &str, groups: &[Group]) -> Option<usize> {
        let category = self.balance.map(|balance| balance.category_of(person));
        let mut best: Option<(usize, f64)> = None;

        for (index, group) in groups.iter().enumerate() {
            if group.len() >= self.group_size || self.constraints.is_forbidden(person, group) {
                continue;
            }

            let affinity = f64::from(self.graph.affinity(person, group));
            let score = match (self.balance, category) {
                (Some(balance), Some(category)) if balance.deepens_majority(category, group) => {
                    affinity * self.balance_weight
                }
                _ => affinity,
            };

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{BalanceMap, Category};
    use crate::constraints::ConstraintSet;
    use crate::graph::{build_graph, AffinityGraph};
    use crate::identity::Identity;
    use crate::preferences::PreferenceRelation;

    fn graph(prefs: &PreferenceRelation, extra: &[&str]) -> AffinityGraph {
        let mut ids = prefs.mentioned();
        ids.extend(extra.iter().map(|n| n.to_string()));
        build_graph(&ids, prefs)
    }

    fn state_for(graph: &AffinityGraph) -> PartitionState {
        PartitionState::new(graph.nodes().cloned())
    }

    fn names(list: &[&str]) -> Vec<Identity> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_seed_prefers_mutual_edges() {
        // B-C mutual must seed before the one-way A-B edge
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B"])
            .with_choices("B", ["C"])
            .with_choices("C", ["B"]);
        let g = graph(&prefs, &[]);
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&g, &constraints, 2, None, 0.5);
        let mut state = state_for(&g);

        engine.seed_groups(&mut state);

        assert_eq!(state.groups(), &[names(&["B", "C"])]);
        assert!(state.is_unassigned("A"));
    }

    #[test]
    fn test_seed_grows_only_with_positive_affinity() {
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B", "C"])
            .with_choices("B", ["A"]);
        let g = graph(&prefs, &["Z"]);
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&g, &constraints, 4, None, 0.5);
        let mut state = state_for(&g);

        engine.seed_groups(&mut state);

        assert_eq!(state.groups(), &[names(&["A", "B", "C"])]);
        assert!(state.is_unassigned("Z"));
    }

    #[test]
    fn test_seed_skips_for_singleton_target() {
        let prefs = PreferenceRelation::new().with_choices("A", ["B"]);
        let g = graph(&prefs, &[]);
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&g, &constraints, 1, None, 0.5);
        let mut state = state_for(&g);

        engine.seed_groups(&mut state);

        assert!(state.groups().is_empty());
        assert_eq!(state.unassigned().len(), 2);
    }

    #[test]
    fn test_attach_prefers_highest_affinity_group() {
        let prefs = PreferenceRelation::new()
            .with_choices("A", ["B"])
            .with_choices("C", ["D"])
            .with_choices("X", ["D"]);
        let g = graph(&prefs, &[]);
        let constraints = ConstraintSet::new();
        let engine = Partitioner::new(&g, &constraints, 3, None, 0.5);
        let mut state = state_for(&g);
        for id in ["A", "B", "C", "D"] {
            state.take(id);
        }
        state.push_group(names(&["A", "B"]));
        state.push_group(names(&["C", "D"]));

        engine.attach_stragglers(&mut state).unwrap();

        assert_eq!(state.groups()[1], names(&["C", "D", "X"]));
        assert!(!state.has_unassigned());
    }

    #[test]
    fn test_attach_respects_capacity_and_constraints() {
        let g = graph(&PreferenceRelation::new(), &["A", "B", "C", "D", "X"]);
        let constraints: ConstraintSet = [("X", "C")].into_iter().collect();
        let engine = Partitioner::new(&g, &constraints, 2, None, 0.5);
        let mut state = state_for(&g);
        for id in ["A", "B", "C"] {
            state.take(id);
        }
        state.push_group(names(&["A", "B"]));
        state.push_group(names(&["C"]));

        engine.attach_stragglers(&mut state).unwrap();

        // X cannot join the full group nor C; D takes the free slot
        assert_eq!(state.groups()[1], names(&["C", "D"]));
        assert!(state.is_unassigned("X"));
    }

    #[test]
    fn test_attach_discount_steers_toward_minority() {
        let prefs = PreferenceRelation::new()
            .with_choices("a3", ["a1", "b1"]);
        let g = graph(&prefs, &["a2", "b2"]);
        let constraints = ConstraintSet::new();
        let balance: BalanceMap = [
            ("a1", Category::A),
            ("a2", Category::A),
            ("a3", Category::A),
            ("b1", Category::B),
            ("b2", Category::B),
        ]
        .into_iter()
        .collect();
        let engine = Partitioner::new(&g, &constraints, 3, Some(&balance), 0.5);
        let mut state = state_for(&g);
        for id in ["a1", "a2", "b1", "b2"] {
            state.take(id);
        }
        // Group 1 is A-heavy, group 2 is B-heavy; a3 has affinity 1 to each
        state.push_group(names(&["a1", "a2"]));
        state.push_group(names(&["b1", "b2"]));

        engine.attach_stragglers(&mut state).unwrap();

        assert_eq!(state.groups()[1], names(&["b1", "b2", "a3"]));
    }

    #[test]
    fn test_residual_groups_fill_with_unconnected() {
        let g = graph(&PreferenceRelation::new(), &["P", "Q", "R", "S", "T"]);
        let constraints: ConstraintSet = [("P", "Q")].into_iter().collect();
        let engine = Partitioner::new(&g, &constraints, 2, None, 0.5);
        let mut state = state_for(&g);

        engine.form_residual_groups(&mut state);

        assert_eq!(
            state.groups(),
            &[names(&["P", "R"]), names(&["Q", "S"]), names(&["T"])]
        );
        assert!(!state.has_unassigned());
    }
}
