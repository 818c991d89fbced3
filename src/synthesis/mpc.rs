//! Most permissive controller (MPC) synthesis.
//!
//! The plant is fully controllable: nothing is ever forbidden, and every transition that
//! fails the requirement or enters a bad state is pruned, urgent ones included. Lazy
//! (semi-controllable) transitions have no meaning here and are rejected.

use log::debug;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::model_checking::{self, Relabel};
use crate::requirement::Requirement;
use crate::synthesis::synthesize_controller;

#[derive(Debug, Clone, Default)]
pub struct MpcSynthesisOperator {
    requirement: Requirement,
    property: Option<Automaton>,
}

impl MpcSynthesisOperator {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            property: None,
        }
    }

    pub fn with_property(mut self, property: Automaton) -> Self {
        self.property = Some(property);
        self
    }

    /// # Errors
    ///
    /// [`Error::SemiControllable`] if `aut` has a lazy transition.
    pub fn apply(&self, aut: &Automaton) -> Result<Option<Automaton>> {
        if aut.transitions().iter().any(|t| t.is_lazy()) {
            return Err(Error::SemiControllable);
        }
        debug!("mpc synthesis ({})", self.requirement);
        match &self.property {
            Some(property) => match model_checking::restrict(aut, property, self.requirement, Relabel::Request)? {
                Some(restricted) => synthesize_controller(&restricted, self.requirement, None, |_| false),
                None => Ok(None),
            },
            None => synthesize_controller(aut, self.requirement, None, |_| false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse(s: &str) -> Automaton {
        s.parse().unwrap()
    }

    #[test]
    fn test_lazy_rejected() {
        let a = parse("Rank: 1\nInitial state: [0]\nFinal states: [[1]]\nTransitions: \n!L([0],[?a],[1])");
        assert!(matches!(
            MpcSynthesisOperator::new(Requirement::Agreement).apply(&a),
            Err(Error::SemiControllable)
        ));
    }

    #[test]
    fn test_urgent_violation_is_refused() {
        // An orchestrator could not avoid the urgent request; the controller simply refuses it.
        let plant = parse(
            "Rank: 2\nInitial state: [0, 0]\nFinal states: [[1][1]]\nTransitions: \n\
             !U([0, 0],[-,?a],[0, 1])\n([0, 0],[!b,?b],[1, 1])\n([0, 1],[!c,?c],[1, 1])",
        );
        let mpc = MpcSynthesisOperator::new(Requirement::Agreement).apply(&plant).unwrap().unwrap();
        assert_eq!(mpc.num_transitions(), 1);
        assert_eq!(mpc.transitions()[0].label().name(), "b");
    }

    #[test]
    fn test_no_controller() {
        let plant = parse("Rank: 2\nInitial state: [0, 0]\nFinal states: [[0][1]]\nTransitions: \n!U([0, 0],[-,?a],[0, 1])");
        assert!(MpcSynthesisOperator::new(Requirement::Agreement).apply(&plant).unwrap().is_none());
    }

    #[test]
    fn test_with_property() {
        let plant = parse(
            "Rank: 2\nInitial state: [0, 0]\nFinal states: [[1][1]]\nTransitions: \n\
             ([0, 0],[!b,?b],[1, 1])\n([0, 0],[!c,?c],[1, 1])",
        );
        let only_c = parse("Rank: 1\nInitial state: [p]\nFinal states: [[p]]\nTransitions: \n([p],[!c],[p])");
        let mpc = MpcSynthesisOperator::new(Requirement::StrongAgreement)
            .with_property(only_c)
            .apply(&plant)
            .unwrap()
            .unwrap();
        assert_eq!(mpc.num_transitions(), 1);
        assert_eq!(mpc.transitions()[0].label().name(), "c");
    }
}
