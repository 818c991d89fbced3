//! Which transitions a controller cannot prevent.
//!
//! An urgent transition is always uncontrollable and a permitted one never is. A lazy
//! transition is uncontrollable unless some current matched transition, leaving a state
//! that is not bad, *stands in* for it. What counts as a stand-in depends on who does the
//! scheduling:
//!
//! - with an orchestrator, the requester can be steered to any match of the same action
//!   from the same local state;
//! - in a choreography, only a match of the same offerer and action from the very same
//!   global state will do.

use crate::automaton::Automaton;
use crate::synthesis::Snapshot;
use crate::transition::{ModalTransition, Modality, TransitionId};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Controllability {
    Orchestration,
    Choreography,
}

impl Controllability {
    pub fn is_uncontrollable(self, id: TransitionId, snapshot: &Snapshot<'_>) -> bool {
        let t = snapshot.transition(id);
        match t.modality() {
            Modality::Urgent => true,
            Modality::Permitted => false,
            Modality::Lazy => !snapshot.iter().any(|(_, candidate)| {
                candidate.label().is_match()
                    && !snapshot.is_bad(candidate.source())
                    && self.stands_in(snapshot.automaton(), candidate, t)
            }),
        }
    }

    /// Can the matched transition `candidate` be taken instead of `lazy`?
    pub fn stands_in(self, aut: &Automaton, candidate: &ModalTransition, lazy: &ModalTransition) -> bool {
        let same_name = candidate.label().name() == lazy.label().name();
        match self {
            Controllability::Orchestration => match (candidate.label().requester(), lazy.label().requester()) {
                (Ok(a), Ok(b)) => {
                    a == b && same_name && aut.state(candidate.source()).local(a) == aut.state(lazy.source()).local(b)
                }
                _ => false,
            },
            Controllability::Choreography => match (candidate.label().offerer(), lazy.label().offerer()) {
                (Ok(a), Ok(b)) => a == b && same_name && candidate.source() == lazy.source(),
                _ => false,
            },
        }
    }
}
