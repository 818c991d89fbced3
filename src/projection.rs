//! Projection of a composite automaton on one of its principals.

use log::debug;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::state::{State, StateId};
use crate::transition::{ModalTransition, Modality};

/// Side of a match that carries its necessity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Role {
    Offerer,
    Requester,
}

impl Role {
    fn position(self, label: &Label) -> Result<usize> {
        match self {
            Role::Offerer => label.offerer(),
            Role::Requester => label.requester(),
        }
    }
}

/// Extracts a single principal from a composite automaton.
///
/// States are the local states of the principal; only transitions in which it moves are
/// kept, labeled with its own action. A necessary match stays necessary only for the
/// principal on the `necessary` side.
#[derive(Debug, Copy, Clone)]
pub struct ProjectionFunction {
    necessary: Role,
}

impl Default for ProjectionFunction {
    fn default() -> Self {
        Self::new(Role::Requester)
    }
}

impl ProjectionFunction {
    pub fn new(necessary: Role) -> Self {
        Self { necessary }
    }

    /// Rank-1 automaton of principal `index`.
    ///
    /// # Errors
    ///
    /// [`Error::PrincipalOutOfRank`] if `index >= aut.rank()`; automaton construction errors
    /// if the principal never moves or never reaches a final local state through its moves.
    pub fn apply(&self, aut: &Automaton, index: usize) -> Result<Automaton> {
        if index >= aut.rank() {
            return Err(Error::PrincipalOutOfRank {
                index,
                rank: aut.rank(),
            });
        }
        let local = |id: StateId| State::new(vec![aut.state(id).local(index).clone()]);

        let mut projected = Vec::new();
        for t in aut.transitions() {
            let label = t.label();
            if label.actions()[index].is_idle() {
                continue;
            }
            let modality = self.modality(t, index)?;
            let own = Label::new(vec![label.actions()[index].clone()])?;
            projected.push((local(t.source()), own, local(t.target()), modality));
        }
        debug!(
            "projection on principal {}: {} of {} transitions",
            index,
            projected.len(),
            aut.num_transitions()
        );
        Automaton::new(projected)
    }

    fn modality(&self, t: &ModalTransition, index: usize) -> Result<Modality> {
        if t.is_permitted() {
            return Ok(Modality::Permitted);
        }
        if t.label().is_match() && self.necessary.position(t.label())? != index {
            return Ok(Modality::Permitted);
        }
        Ok(t.modality())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::compose;
    use test_log::test;

    fn parse(s: &str) -> Automaton {
        s.parse().unwrap()
    }

    const CLIENT: &str = "Rank: 1
Initial state: [c0]
Final states: [[c2]]
Transitions:
([c0],[!pay],[c1])
([c1],[!bye],[c2])
";

    const HOTEL: &str = "Rank: 1
Initial state: [h0]
Final states: [[h2]]
Transitions:
!U([h0],[?pay],[h1])
([h1],[?bye],[h2])
";

    #[test]
    fn test_projection_recovers_operands() {
        let client = parse(CLIENT);
        let hotel = parse(HOTEL);
        let plant = compose(&[&client, &hotel], |_| false, usize::MAX).unwrap().unwrap();

        let projection = ProjectionFunction::new(Role::Requester);
        assert_eq!(projection.apply(&plant, 0).unwrap(), client);
        assert_eq!(projection.apply(&plant, 1).unwrap(), hotel);
    }

    #[test]
    fn test_necessary_side() {
        let plant = compose(&[&parse(CLIENT), &parse(HOTEL)], |_| false, usize::MAX)
            .unwrap()
            .unwrap();
        // With the offerer carrying necessity, the urgent match is permitted for the hotel
        // and urgent for the client.
        let projection = ProjectionFunction::new(Role::Offerer);
        let hotel = projection.apply(&plant, 1).unwrap();
        assert!(hotel.transitions().iter().all(|t| t.is_permitted()));
        let client = projection.apply(&plant, 0).unwrap();
        assert!(client.transitions().iter().any(|t| t.is_urgent()));
    }

    #[test]
    fn test_out_of_rank() {
        let plant = parse(CLIENT);
        assert!(matches!(
            ProjectionFunction::default().apply(&plant, 1),
            Err(Error::PrincipalOutOfRank { index: 1, rank: 1 })
        ));
    }
}
