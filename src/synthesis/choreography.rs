//! Choreography synthesis.
//!
//! Without a scheduler every principal decides locally, so a principal must be able to
//! offer the same actions in all global states it cannot tell apart. This is the
//! *branching condition*. Synthesis is refined until it holds: a violating label is
//! excluded and synthesis runs again. Each round excludes one more distinct label, so the
//! loop terminates.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::automaton::Automaton;
use crate::bitset::BitSet;
use crate::controllability::Controllability;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::model_checking::{self, Relabel};
use crate::requirement::Requirement;
use crate::state::StateId;
use crate::synthesis::synthesize_controller;
use crate::transition::TransitionId;

/// Default violator choice: the first one in transition order.
pub fn first_violation(_aut: &Automaton, violators: &[TransitionId]) -> Option<TransitionId> {
    violators.first().copied()
}

pub type Choice = fn(&Automaton, &[TransitionId]) -> Option<TransitionId>;

#[derive(Debug, Clone)]
pub struct ChoreographySynthesisOperator<C = Choice> {
    requirement: Requirement,
    property: Option<Automaton>,
    choice: C,
}

impl ChoreographySynthesisOperator {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            property: None,
            choice: first_violation,
        }
    }
}

impl<C> ChoreographySynthesisOperator<C>
where
    C: Fn(&Automaton, &[TransitionId]) -> Option<TransitionId> + Sync,
{
    /// Replace the strategy picking which violating transition is excluded next.
    ///
    /// It is only asked when there are violators, and must return one of them.
    pub fn with_choice<D>(self, choice: D) -> ChoreographySynthesisOperator<D>
    where
        D: Fn(&Automaton, &[TransitionId]) -> Option<TransitionId> + Sync,
    {
        ChoreographySynthesisOperator {
            requirement: self.requirement,
            property: self.property,
            choice,
        }
    }

    pub fn with_property(mut self, property: Automaton) -> Self {
        self.property = Some(property);
        self
    }

    /// Does `id` satisfy the branching condition of `aut`, ignoring the `bad` states?
    ///
    /// Only *valid* transitions are considered: those satisfying the requirement whose
    /// source and target are not bad. Every other source state of a valid transition in
    /// which the offerer of `id` is in the same local state must have a valid outgoing
    /// transition with the same label.
    pub fn satisfies_branching_condition(&self, aut: &Automaton, id: TransitionId, bad: &BitSet) -> bool {
        let t = aut.transition(id);
        let Ok(offerer) = t.label().offerer() else {
            return true;
        };
        let valid = |u: TransitionId| {
            let u = aut.transition(u);
            self.requirement.test(u.label())
                && !bad.contains(u.source().index())
                && !bad.contains(u.target().index())
        };
        let local = aut.state(t.source()).local(offerer);

        let sources: BitSet = aut
            .transition_ids()
            .filter(|&u| valid(u))
            .map(|u| aut.transition(u).source().index())
            .collect();
        sources
            .iter()
            .filter(|&s| s != t.source().index())
            .filter(|&s| aut.states()[s].local(offerer) == local)
            .all(|s| {
                aut.forward_star(StateId::new(s))
                    .iter()
                    .any(|&u| valid(u) && aut.transition(u).label() == t.label())
            })
    }

    /// # Errors
    ///
    /// [`Error::NecessaryRequest`] if `aut` has an urgent or lazy unmatched request, and
    /// [`Error::InvalidChoice`] if the choice strategy does not return one of the violators
    /// it was given.
    pub fn apply(&self, aut: &Automaton) -> Result<Option<Automaton>> {
        if aut.transitions().iter().any(|t| t.is_necessary() && t.label().is_request()) {
            return Err(Error::NecessaryRequest);
        }
        debug!("choreography synthesis ({})", self.requirement);
        let restricted;
        let plant = match &self.property {
            Some(property) => match model_checking::restrict(aut, property, self.requirement, Relabel::Offer)? {
                Some(r) => {
                    restricted = r;
                    &restricted
                }
                None => return Ok(None),
            },
            None => aut,
        };

        let mut excluded: HashSet<Label> = HashSet::new();
        let no_bad = BitSet::default();
        loop {
            let Some(result) =
                synthesize_controller(plant, self.requirement, Some(Controllability::Choreography), |l| {
                    excluded.contains(l)
                })?
            else {
                return Ok(None);
            };
            let violators: Vec<TransitionId> = result
                .transition_ids()
                .filter(|&id| !self.satisfies_branching_condition(&result, id, &no_bad))
                .collect();
            if violators.is_empty() {
                info!("choreography found after excluding {} labels", excluded.len());
                return Ok(Some(result));
            }
            let chosen = match (self.choice)(&result, &violators) {
                Some(chosen) if violators.contains(&chosen) => chosen,
                other => {
                    warn!("violator choice returned {:?}, not one of {} violators", other, violators.len());
                    return Err(Error::InvalidChoice);
                }
            };
            let label = result.transition(chosen).label().clone();
            debug!(
                "branching condition violated by {}, excluding {}",
                result.format_transition(result.transition(chosen)),
                label
            );
            excluded.insert(label);
        }
    }
}
