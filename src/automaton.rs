//! Contract automata.
//!
//! An [`Automaton`] owns an arena of composite [`State`]s and a duplicate-free list of
//! [`ModalTransition`]s that address states by [`StateId`]. Operators never mutate an
//! automaton: they build index sets over it and construct a new one.
//!
//! # Invariants
//!
//! Checked eagerly by every constructor:
//!
//! - at least one transition;
//! - every label and every state has the same rank;
//! - exactly one initial state and at least one final state;
//! - no two arena entries share a key (no ambiguous states).
//!
//! States that no transition references are compacted away.

use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::state::{State, StateId};
use crate::table::Table;
use crate::transition::{ModalTransition, Modality, TransitionId};

#[derive(Debug, Clone)]
pub struct Automaton {
    rank: usize,
    states: Vec<State>,
    transitions: Vec<ModalTransition>,
    initial: StateId,
    forward: Vec<Vec<TransitionId>>,
    backward: Vec<Vec<TransitionId>>,
}

impl Automaton {
    /// Build an automaton from value-level transitions.
    ///
    /// Structurally equal states are interned to a single arena entry.
    ///
    /// ```
    /// use contract_automata::automaton::Automaton;
    /// use contract_automata::label::Label;
    /// use contract_automata::state::State;
    /// use contract_automata::transition::Modality;
    ///
    /// let c0 = State::single("c0", true, false);
    /// let c1 = State::single("c1", false, true);
    /// let client = Automaton::new([(c0, Label::offer(1, 0, "pay").unwrap(), c1, Modality::Permitted)]).unwrap();
    /// assert_eq!(client.num_states(), 2);
    /// ```
    pub fn new<I>(transitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (State, Label, State, Modality)>,
    {
        let mut table = Table::default();
        let mut arena = Vec::new();
        for (source, label, target, modality) in transitions {
            let (s, _) = table.put(source);
            let (t, _) = table.put(target);
            arena.push(ModalTransition::new(StateId::new(s), label, StateId::new(t), modality));
        }
        Self::from_parts(table.into_vec(), arena)
    }

    /// Build an automaton from an arena of states and transitions over it.
    pub(crate) fn from_parts(states: Vec<State>, transitions: Vec<ModalTransition>) -> Result<Self> {
        let rank = transitions.first().ok_or(Error::EmptyAutomaton)?.label().rank();
        let check_rank = |found: usize| {
            if found == rank {
                Ok(())
            } else {
                Err(Error::RankMismatch { expected: rank, found })
            }
        };

        // Compact: keep referenced states only, in order of first appearance.
        let mut remap: Vec<Option<StateId>> = vec![None; states.len()];
        let mut compact: Vec<State> = Vec::new();
        let mut intern = |id: StateId, compact: &mut Vec<State>| -> Result<StateId> {
            if let Some(new) = remap[id.index()] {
                return Ok(new);
            }
            let state = &states[id.index()];
            check_rank(state.rank())?;
            let new = StateId::new(compact.len());
            compact.push(state.clone());
            remap[id.index()] = Some(new);
            Ok(new)
        };

        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(transitions.len());
        for t in transitions {
            check_rank(t.label().rank())?;
            let source = intern(t.source(), &mut compact)?;
            let target = intern(t.target(), &mut compact)?;
            let t = ModalTransition::new(source, t.label().clone(), target, t.modality());
            if seen.insert(t.clone()) {
                kept.push(t);
            }
        }

        {
            let mut keys: HashMap<Vec<&str>, StateId> = HashMap::with_capacity(compact.len());
            for (i, s) in compact.iter().enumerate() {
                if keys.insert(s.key(), StateId::new(i)).is_some() {
                    return Err(Error::AmbiguousState(s.to_string()));
                }
            }
        }

        let initials: Vec<usize> = (0..compact.len()).filter(|&i| compact[i].is_initial()).collect();
        let initial = match initials.as_slice() {
            [i] => StateId::new(*i),
            _ => return Err(Error::InitialStates(initials.len())),
        };
        if !compact.iter().any(State::is_final) {
            return Err(Error::NoFinalState);
        }

        let mut forward = vec![Vec::new(); compact.len()];
        let mut backward = vec![Vec::new(); compact.len()];
        for (i, t) in kept.iter().enumerate() {
            forward[t.source().index()].push(TransitionId::new(i));
            backward[t.target().index()].push(TransitionId::new(i));
        }

        Ok(Self {
            rank,
            states: compact,
            transitions: kept,
            initial,
            forward,
            backward,
        })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn transition(&self, id: TransitionId) -> &ModalTransition {
        &self.transitions[id.index()]
    }

    pub fn transitions(&self) -> &[ModalTransition] {
        &self.transitions
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.len()
    }

    pub fn transition_ids(&self) -> impl Iterator<Item = TransitionId> {
        (0..self.transitions.len()).map(TransitionId::new)
    }

    /// Outgoing transitions of `state`.
    pub fn forward_star(&self, state: StateId) -> &[TransitionId] {
        &self.forward[state.index()]
    }

    /// Incoming transitions of `state`.
    pub fn backward_star(&self, state: StateId) -> &[TransitionId] {
        &self.backward[state.index()]
    }

    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId::new).filter(|&s| self.state(s).is_final())
    }

    /// Find a state by its key (sequence of local labels).
    pub fn find_state(&self, key: &[&str]) -> Option<StateId> {
        self.states.iter().position(|s| s.key() == key).map(StateId::new)
    }

    /// Transition rendered with state values, e.g. `!U([0, 0],[!a,?a],[1, 1])`.
    pub fn format_transition(&self, t: &ModalTransition) -> String {
        format!(
            "{}({},{},{})",
            t.modality().prefix(),
            self.state(t.source()),
            t.label(),
            self.state(t.target())
        )
    }

    /// Value-level view of the transitions.
    pub fn iter_values(&self) -> impl Iterator<Item = (&State, &Label, &State, Modality)> {
        self.transitions
            .iter()
            .map(|t| (self.state(t.source()), t.label(), self.state(t.target()), t.modality()))
    }

    /// States reachable from the initial state through `alive` transitions.
    pub fn forward_reachable(&self, alive: &BitSet) -> BitSet {
        let mut visited = BitSet::new(self.states.len());
        let mut queue = VecDeque::from([self.initial]);
        visited.insert(self.initial.index());
        while let Some(s) = queue.pop_front() {
            for &t in self.forward_star(s) {
                if alive.contains(t.index()) {
                    let target = self.transition(t).target();
                    if visited.insert(target.index()) {
                        queue.push_back(target);
                    }
                }
            }
        }
        visited
    }

    /// States from which some state in `seeds` is reachable through `alive` transitions.
    pub fn backward_reachable(&self, alive: &BitSet, seeds: impl IntoIterator<Item = StateId>) -> BitSet {
        let mut visited = BitSet::new(self.states.len());
        let mut stack = Vec::new();
        for s in seeds {
            if visited.insert(s.index()) {
                stack.push(s);
            }
        }
        while let Some(s) = stack.pop() {
            for &t in self.backward_star(s) {
                if alive.contains(t.index()) {
                    let source = self.transition(t).source();
                    if visited.insert(source.index()) {
                        stack.push(source);
                    }
                }
            }
        }
        visited
    }

    /// New automaton made of the transitions in `keep`.
    pub fn restrict(&self, keep: &BitSet) -> Result<Automaton> {
        let transitions = keep.iter().map(|i| self.transitions[i].clone()).collect();
        let result = Self::from_parts(self.states.clone(), transitions)?;
        debug!(
            "restrict: {} -> {} transitions, {} -> {} states",
            self.num_transitions(),
            result.num_transitions(),
            self.num_states(),
            result.num_states()
        );
        Ok(result)
    }

    /// New automaton over the same states with every transition passed through `f`.
    /// Transitions mapped to `None` are dropped.
    pub(crate) fn map_transitions<F>(&self, f: F) -> Result<Automaton>
    where
        F: FnMut(&ModalTransition) -> Result<Option<ModalTransition>>,
    {
        let transitions = self
            .transitions
            .iter()
            .map(f)
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>>>()?;
        Self::from_parts(self.states.clone(), transitions)
    }
}

/// Structural equality: same rank and same value-level transitions.
impl PartialEq for Automaton {
    fn eq(&self, other: &Self) -> bool {
        if self.rank != other.rank || self.transitions.len() != other.transitions.len() {
            return false;
        }
        let mine: HashSet<_> = self.iter_values().collect();
        other.iter_values().all(|t| mine.contains(&t))
    }
}

impl Eq for Automaton {}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(name: &str, initial: bool, final_: bool) -> State {
        State::single(name, initial, final_)
    }

    fn offer(name: &str) -> Label {
        Label::offer(1, 0, name).unwrap()
    }

    #[test]
    fn test_interning() {
        let a = Automaton::new([
            (local("0", true, false), offer("a"), local("1", false, true), Modality::Permitted),
            (local("1", false, true), offer("b"), local("0", true, false), Modality::Urgent),
            (local("0", true, false), offer("a"), local("1", false, true), Modality::Permitted),
        ])
        .unwrap();
        assert_eq!(a.num_states(), 2);
        assert_eq!(a.num_transitions(), 2);
        assert_eq!(a.rank(), 1);
        assert_eq!(a.state(a.initial()).key(), vec!["0"]);
        assert_eq!(a.forward_star(a.initial()).len(), 1);
        assert_eq!(a.backward_star(a.initial()).len(), 1);
        assert_eq!(a.final_states().count(), 1);
        assert_eq!(a.find_state(&["1"]).map(|s| a.state(s).is_final()), Some(true));
    }

    #[test]
    fn test_empty() {
        let none: [(State, Label, State, Modality); 0] = [];
        assert!(matches!(Automaton::new(none), Err(Error::EmptyAutomaton)));
    }

    #[test]
    fn test_rank_mismatch() {
        let r = Automaton::new([
            (local("0", true, false), offer("a"), local("1", false, true), Modality::Permitted),
            (local("1", false, true), Label::offer(2, 0, "b").unwrap(), local("0", true, false), Modality::Permitted),
        ]);
        assert!(matches!(r, Err(Error::RankMismatch { expected: 1, found: 2 })));
    }

    #[test]
    fn test_initial_and_final() {
        let two_initials = Automaton::new([(local("0", true, false), offer("a"), local("1", true, true), Modality::Permitted)]);
        assert!(matches!(two_initials, Err(Error::InitialStates(2))));
        let no_initial = Automaton::new([(local("0", false, false), offer("a"), local("1", false, true), Modality::Permitted)]);
        assert!(matches!(no_initial, Err(Error::InitialStates(0))));
        let no_final = Automaton::new([(local("0", true, false), offer("a"), local("1", false, false), Modality::Permitted)]);
        assert!(matches!(no_final, Err(Error::NoFinalState)));
    }

    #[test]
    fn test_ambiguous() {
        let r = Automaton::new([
            (local("0", true, false), offer("a"), local("1", false, true), Modality::Permitted),
            (local("0", true, false), offer("b"), local("1", false, false), Modality::Permitted),
        ]);
        assert!(matches!(r, Err(Error::AmbiguousState(_))));
    }

    #[test]
    fn test_reachability() {
        // 0 -a-> 1 -b-> 2 (final), 3 -c-> 1 unreachable from the initial state
        let a = Automaton::new([
            (local("0", true, false), offer("a"), local("1", false, false), Modality::Permitted),
            (local("1", false, false), offer("b"), local("2", false, true), Modality::Permitted),
            (local("3", false, false), offer("c"), local("1", false, false), Modality::Permitted),
        ])
        .unwrap();
        let all = BitSet::full(a.num_transitions());
        let reachable = a.forward_reachable(&all);
        assert_eq!(reachable.len(), 3);
        let s3 = a.find_state(&["3"]).unwrap();
        assert!(!reachable.contains(s3.index()));
        let successful = a.backward_reachable(&all, a.final_states());
        assert_eq!(successful.len(), 4);

        let mut without_b = all.clone();
        let b = a.transition_ids().find(|&t| a.transition(t).label().name() == "b").unwrap();
        without_b.remove(b.index());
        assert_eq!(a.backward_reachable(&without_b, a.final_states()).len(), 1);
    }

    #[test]
    fn test_restrict_compacts_states() {
        let a = Automaton::new([
            (local("0", true, true), offer("a"), local("1", false, false), Modality::Permitted),
            (local("0", true, true), offer("b"), local("0", true, true), Modality::Permitted),
        ])
        .unwrap();
        let keep: BitSet = a
            .transition_ids()
            .filter(|&t| a.transition(t).label().name() == "b")
            .map(TransitionId::index)
            .collect();
        let r = a.restrict(&keep).unwrap();
        assert_eq!(r.num_states(), 1);
        assert_eq!(r.num_transitions(), 1);
        assert_ne!(r, a);
        assert_eq!(r, r.clone());
    }
}
