//! Controller synthesis.
//!
//! [`SynthesisOperator`] computes the most permissive sub-automaton that is closed under two
//! predicates:
//!
//! - `pruning(t, T, R)`: transition `t` must be removed, given the current transitions `T`
//!   and bad states `R`;
//! - `forbidden(t, T, R)`: the source of `t` is unsafe (an unpreventable bad move leaves it).
//!
//! Both are evaluated against a [`Snapshot`] of the current round. Starting from
//! `R = dangling(A)`, every round removes the transitions that must be pruned, adds the states
//! that became dangling, then marks the sources of forbidden transitions (taken from the
//! *original* transition set) as bad. Rounds are repeated until neither set changes.
//!
//! The result is `None` when the initial state ends up bad or no transition survives.
//! Otherwise transitions leaving unreachable states or entering unsuccessful states are
//! dropped and the remainder is returned.
//!
//! The role-specific operators live in submodules:
//!
//! - [`orchestration`]: central scheduler, agreement enforced by the requester side;
//! - [`choreography`]: no scheduler, with branching-condition refinement;
//! - [`mpc`]: most permissive controller of a fully controllable plant.

pub mod choreography;
pub mod mpc;
pub mod orchestration;

use log::debug;
use rayon::prelude::*;

use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::controllability::Controllability;
use crate::error::Result;
use crate::label::Label;
use crate::requirement::Requirement;
use crate::state::StateId;
use crate::transition::{ModalTransition, TransitionId};

/// The current transition set and bad-state set of a synthesis round.
pub struct Snapshot<'a> {
    automaton: &'a Automaton,
    transitions: &'a BitSet,
    bad: &'a BitSet,
}

impl<'a> Snapshot<'a> {
    pub fn new(automaton: &'a Automaton, transitions: &'a BitSet, bad: &'a BitSet) -> Self {
        Self {
            automaton,
            transitions,
            bad,
        }
    }

    pub fn automaton(&self) -> &'a Automaton {
        self.automaton
    }

    pub fn transition(&self, id: TransitionId) -> &'a ModalTransition {
        self.automaton.transition(id)
    }

    /// Is `id` still in the current transition set?
    pub fn contains(&self, id: TransitionId) -> bool {
        self.transitions.contains(id.index())
    }

    pub fn is_bad(&self, state: StateId) -> bool {
        self.bad.contains(state.index())
    }

    /// Current transitions.
    pub fn iter(&self) -> impl Iterator<Item = (TransitionId, &'a ModalTransition)> + '_ {
        let automaton = self.automaton;
        self.transitions.iter().map(move |i| {
            let id = TransitionId::new(i);
            (id, automaton.transition(id))
        })
    }
}

/// States reachable from the initial state, and states from which a reachable final state
/// is reachable, both through `alive` transitions only.
pub fn reachability(aut: &Automaton, alive: &BitSet) -> (BitSet, BitSet) {
    let reachable = aut.forward_reachable(alive);
    let finals = aut.final_states().filter(|s| reachable.contains(s.index()));
    let successful = aut.backward_reachable(alive, finals);
    (reachable, successful)
}

/// States that are unreachable or cannot reach a final state through `alive` transitions.
pub fn dangling_states(aut: &Automaton, alive: &BitSet) -> BitSet {
    let (reachable, successful) = reachability(aut, alive);
    (0..aut.num_states())
        .filter(|&s| !(reachable.contains(s) && successful.contains(s)))
        .collect()
}

pub struct SynthesisOperator<P, F> {
    pruning: P,
    forbidden: F,
}

impl<P, F> SynthesisOperator<P, F>
where
    P: Fn(TransitionId, &Snapshot<'_>) -> bool + Sync,
    F: Fn(TransitionId, &Snapshot<'_>) -> bool + Sync,
{
    pub fn new(pruning: P, forbidden: F) -> Self {
        Self { pruning, forbidden }
    }

    pub fn apply(&self, aut: &Automaton) -> Result<Option<Automaton>> {
        debug!(
            "synthesis(states = {}, transitions = {})",
            aut.num_states(),
            aut.num_transitions()
        );
        let all = aut.num_transitions();
        let mut alive = BitSet::full(all);
        let mut bad = dangling_states(aut, &alive);

        for round in 1.. {
            let (alive_before, bad_before) = (alive.len(), bad.len());

            let pruned: Vec<usize> = {
                let snapshot = Snapshot::new(aut, &alive, &bad);
                let current: Vec<usize> = alive.iter().collect();
                current
                    .into_par_iter()
                    .filter(|&i| (self.pruning)(TransitionId::new(i), &snapshot))
                    .collect()
            };
            if !pruned.is_empty() {
                for &i in &pruned {
                    alive.remove(i);
                }
                bad.union_with(&dangling_states(aut, &alive));
            }

            let unsafe_sources: Vec<StateId> = {
                let snapshot = Snapshot::new(aut, &alive, &bad);
                (0..all)
                    .into_par_iter()
                    .filter(|&i| (self.forbidden)(TransitionId::new(i), &snapshot))
                    .map(|i| aut.transition(TransitionId::new(i)).source())
                    .collect()
            };
            bad.extend(unsafe_sources.into_iter().map(StateId::index));

            debug!(
                "synthesis round {}: {} transitions, {} bad states",
                round,
                alive.len(),
                bad.len()
            );
            if alive.len() == alive_before && bad.len() == bad_before {
                break;
            }
        }

        if bad.contains(aut.initial().index()) || alive.is_empty() {
            debug!("synthesis: empty controller");
            return Ok(None);
        }

        let (reachable, successful) = reachability(aut, &alive);
        let keep: BitSet = alive
            .iter()
            .filter(|&i| {
                let t = aut.transition(TransitionId::new(i));
                reachable.contains(t.source().index()) && successful.contains(t.target().index())
            })
            .collect();
        if keep.is_empty() {
            return Ok(None);
        }
        aut.restrict(&keep).map(Some)
    }
}

/// Synthesis with the standard predicates of the controller roles:
///
/// - pruning: the target is bad, the label violates `requirement`, or `excluded(label)`;
/// - forbidden: the transition is no longer available and is uncontrollable for the role
///   (never, without a role).
pub(crate) fn synthesize_controller<E>(
    aut: &Automaton,
    requirement: Requirement,
    controllability: Option<Controllability>,
    excluded: E,
) -> Result<Option<Automaton>>
where
    E: Fn(&Label) -> bool + Sync,
{
    SynthesisOperator::new(
        |id, s| {
            let t = s.transition(id);
            s.is_bad(t.target()) || !requirement.test(t.label()) || excluded(t.label())
        },
        |id, s| match controllability {
            Some(c) => !s.contains(id) && c.is_uncontrollable(id, s),
            None => false,
        },
    )
    .apply(aut)
}
