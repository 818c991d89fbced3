//! Synchronized product of contract automata.
//!
//! The composite of N operands has rank `Σ rank(Aᵢ)`; operand `i` occupies the positions
//! `offset(i)..offset(i) + rank(i)`. Exploration is a bounded breadth-first search from the
//! tuple of initial states. From every composite state:
//!
//! - **Matches**: each pair of moves of operands `i < j` whose labels satisfy the matcher
//!   becomes one transition in which both operands advance. The modality is the strongest
//!   of the two ([`Modality::join`]).
//! - **Interleavings**: every move that took part in no match is lifted to the composite
//!   rank and only its operand advances.
//!
//! The `pruning` predicate rejects candidates by label:
//!
//! - a necessary candidate of the initial state rejects the whole composition;
//! - elsewhere a necessary candidate is dropped and its target becomes *do-not-visit*;
//! - a permitted candidate is simply dropped.
//!
//! Do-not-visit states are settled after exploration: they keep no outgoing transitions,
//! permitted transitions entering them are dropped, and the unreachable rest is trimmed.
//! The result does not depend on the order of the operands' transitions.
//! [`CompositionFunction::retaining_lazy`] keeps pruned lazy candidates instead.
//!
//! Pruning decisions are local to the operands being composed, so composition is not
//! associative: `(A ⊗ B) ⊗ C` may differ from `A ⊗ (B ⊗ C)`.

use std::collections::VecDeque;

use log::{debug, trace};
use rayon::prelude::*;

use crate::action::Action;
use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::state::{State, StateId};
use crate::table::Table;
use crate::transition::{ModalTransition, Modality, TransitionId};

/// Default synchronization rule: offer and request of the same action.
pub type Matcher = fn(&Label, &Label) -> bool;

pub struct CompositionFunction<'a, M = Matcher> {
    operands: Vec<&'a Automaton>,
    offsets: Vec<usize>,
    rank: usize,
    matcher: M,
    retain_lazy: bool,
}

/// A candidate composite move, before pruning.
struct Candidate {
    label: Label,
    target: Vec<StateId>,
    modality: Modality,
}

impl<'a> CompositionFunction<'a> {
    pub fn new(operands: &[&'a Automaton]) -> Result<Self> {
        Self::with_matcher(operands, Label::matches as Matcher)
    }
}

impl<'a, M> CompositionFunction<'a, M>
where
    M: Fn(&Label, &Label) -> bool + Sync,
{
    /// Composition with a custom synchronization rule.
    ///
    /// The matcher is called with the labels of two moves from operands `i < j`, in that order.
    pub fn with_matcher(operands: &[&'a Automaton], matcher: M) -> Result<Self> {
        if operands.is_empty() {
            return Err(Error::NoOperands);
        }
        let offsets = operands
            .iter()
            .scan(0, |acc, a| {
                let offset = *acc;
                *acc += a.rank();
                Some(offset)
            })
            .collect();
        Ok(Self {
            operands: operands.to_vec(),
            offsets,
            rank: operands.iter().map(|a| a.rank()).sum(),
            matcher,
            retain_lazy: false,
        })
    }

    /// Keep pruned lazy candidates as transitions of the result.
    ///
    /// A retained lazy candidate neither rejects the initial state nor marks its target, and
    /// is left for a later synthesis to decide.
    pub fn retaining_lazy(mut self) -> Self {
        self.retain_lazy = true;
        self
    }

    /// Rank of the composite.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Explore the composite up to depth `bound` (`usize::MAX` for no bound).
    ///
    /// Returns `Ok(None)` when the composition is infeasible: the initial state was pruned,
    /// nothing was explored, or no final state was reached.
    pub fn apply<P>(&self, pruning: P, bound: usize) -> Result<Option<Automaton>>
    where
        P: Fn(&Label) -> bool + Sync,
    {
        debug!("compose(operands = {}, rank = {}, bound = {})", self.operands.len(), self.rank, bound);

        let mut tuples: Table<Vec<StateId>> = Table::default();
        let (initial, _) = tuples.put(self.operands.iter().map(|a| a.initial()).collect());

        let mut queue = VecDeque::from([(initial, 0usize)]);
        let mut visited = BitSet::default();
        let mut dont_visit = BitSet::default();
        let mut transitions: Vec<ModalTransition> = Vec::new();

        while let Some((source, depth)) = queue.pop_front() {
            if !visited.insert(source) || depth >= bound {
                continue;
            }
            let tuple = tuples[source].clone();
            let candidates = self.candidates(&tuple);
            let pruned: Vec<bool> = candidates.par_iter().map(|c| pruning(&c.label)).collect();
            trace!("expanding {:?} at depth {}: {} candidates", tuple, depth, candidates.len());

            let rejects = candidates.iter().zip(&pruned).any(|(c, &p)| p && self.rejects(c.modality));
            if rejects && source == initial {
                debug!("compose: a necessary move of the initial state is pruned");
                return Ok(None);
            }

            for (c, p) in candidates.into_iter().zip(pruned) {
                let (target, _) = tuples.put(c.target);
                if p && self.rejects(c.modality) {
                    dont_visit.insert(target);
                    continue;
                }
                if p && c.modality == Modality::Permitted {
                    continue;
                }
                transitions.push(ModalTransition::new(
                    StateId::new(source),
                    c.label,
                    StateId::new(target),
                    c.modality,
                ));
                queue.push_back((target, depth + 1));
            }
        }

        let transitions = settle(StateId::new(initial), transitions, &dont_visit, tuples.len());
        if transitions.is_empty() {
            debug!("compose: no transitions");
            return Ok(None);
        }

        let states: Vec<State> = tuples
            .iter()
            .map(|tuple| State::concat(tuple.iter().zip(&self.operands).map(|(&s, a)| a.state(s))))
            .collect();
        match Automaton::from_parts(states, transitions) {
            Ok(composite) => {
                debug!(
                    "compose: {} states, {} transitions",
                    composite.num_states(),
                    composite.num_transitions()
                );
                Ok(Some(composite))
            }
            Err(Error::NoFinalState) => {
                debug!("compose: no final state reached");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Does pruning a candidate of this modality mark its target?
    fn rejects(&self, modality: Modality) -> bool {
        match modality {
            Modality::Permitted => false,
            Modality::Lazy => !self.retain_lazy,
            Modality::Urgent => true,
        }
    }

    /// All composite moves out of `tuple`, matches first.
    fn candidates(&self, tuple: &[StateId]) -> Vec<Candidate> {
        let moves: Vec<(usize, TransitionId)> = tuple
            .iter()
            .enumerate()
            .flat_map(|(i, &s)| self.operands[i].forward_star(s).iter().map(move |&t| (i, t)))
            .collect();
        let transition = |(i, t): (usize, TransitionId)| self.operands[i].transition(t);

        let pairs: Vec<(usize, usize)> = (0..moves.len())
            .into_par_iter()
            .flat_map_iter(|a| {
                let moves = &moves;
                (a + 1..moves.len())
                    .filter(move |&b| {
                        moves[a].0 < moves[b].0
                            && (self.matcher)(transition(moves[a]).label(), transition(moves[b]).label())
                    })
                    .map(move |b| (a, b))
            })
            .collect();

        let mut matched = BitSet::new(moves.len());
        for &(a, b) in &pairs {
            matched.insert(a);
            matched.insert(b);
        }

        let synchronized = pairs.par_iter().map(|&(a, b)| {
            let (i, j) = (moves[a].0, moves[b].0);
            let (ta, tb) = (transition(moves[a]), transition(moves[b]));
            let mut actions = vec![Action::Idle; self.rank];
            self.place(&mut actions, i, ta.label());
            self.place(&mut actions, j, tb.label());
            let mut target = tuple.to_vec();
            target[i] = ta.target();
            target[j] = tb.target();
            Candidate {
                label: Label::unchecked(actions),
                target,
                modality: ta.modality().join(tb.modality()),
            }
        });
        let interleaved = (0..moves.len())
            .into_par_iter()
            .filter(|&m| !matched.contains(m))
            .map(|m| {
                let i = moves[m].0;
                let t = transition(moves[m]);
                let mut target = tuple.to_vec();
                target[i] = t.target();
                Candidate {
                    label: Label::lift(self.rank, self.offsets[i], t.label()),
                    target,
                    modality: t.modality(),
                }
            });
        synchronized.chain(interleaved).collect()
    }

    fn place(&self, actions: &mut [Action], operand: usize, label: &Label) {
        let offset = self.offsets[operand];
        actions[offset..offset + label.rank()].clone_from_slice(label.actions());
    }
}

/// Drop what the `dont_visit` states contribute once exploration is over.
///
/// A `dont_visit` state keeps its incoming necessary transitions but loses its outgoing ones,
/// permitted transitions into it are dropped, and so is everything left unreachable from
/// `initial`. The outcome does not depend on the order in which states were expanded.
fn settle(
    initial: StateId,
    transitions: Vec<ModalTransition>,
    dont_visit: &BitSet,
    num_states: usize,
) -> Vec<ModalTransition> {
    let kept: Vec<ModalTransition> = transitions
        .into_iter()
        .filter(|t| !dont_visit.contains(t.source().index()))
        .filter(|t| !(t.is_permitted() && dont_visit.contains(t.target().index())))
        .collect();

    let mut forward: Vec<Vec<StateId>> = vec![Vec::new(); num_states];
    for t in &kept {
        forward[t.source().index()].push(t.target());
    }
    let mut reachable = BitSet::new(num_states);
    reachable.insert(initial.index());
    let mut queue = VecDeque::from([initial]);
    while let Some(s) = queue.pop_front() {
        for &target in &forward[s.index()] {
            if reachable.insert(target.index()) {
                queue.push_back(target);
            }
        }
    }

    let total = kept.len();
    let kept: Vec<ModalTransition> = kept
        .into_iter()
        .filter(|t| reachable.contains(t.source().index()))
        .collect();
    trace!("settle: {} of {} explored transitions kept", kept.len(), total);
    kept
}

/// Compose `operands` with the default matcher.
///
/// ```
/// use contract_automata::automaton::Automaton;
/// use contract_automata::composition::compose;
///
/// let client: Automaton = "Rank: 1\nInitial state: [c0]\nFinal states: [[c1]]\nTransitions: \n([c0],[!pay],[c1])"
///     .parse()
///     .unwrap();
/// let hotel: Automaton = "Rank: 1\nInitial state: [h0]\nFinal states: [[h1]]\nTransitions: \n!U([h0],[?pay],[h1])"
///     .parse()
///     .unwrap();
/// let composite = compose(&[&client, &hotel], |_| false, usize::MAX).unwrap().unwrap();
/// assert_eq!(composite.rank(), 2);
/// assert_eq!(composite.num_transitions(), 1);
/// ```
pub fn compose<P>(operands: &[&Automaton], pruning: P, bound: usize) -> Result<Option<Automaton>>
where
    P: Fn(&Label) -> bool + Sync,
{
    CompositionFunction::new(operands)?.apply(pruning, bound)
}
