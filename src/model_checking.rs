//! Restricting a plant with a property monitor.
//!
//! The property is a rank-1 automaton over action names. It is composed as a passive extra
//! operand: a plant move synchronizes with a property move of the same action name, whatever
//! the polarity. A composite move in which only one side moves violates the property.
//!
//! Violations are resolved by modality:
//!
//! - permitted violations are dropped;
//! - an urgent violation is dropped and its target is never expanded (the product is
//!   rejected if it leaves the initial state);
//! - lazy violations are kept: synthesis decides about semi-controllable moves.
//!
//! Both rules are the pruning of [`CompositionFunction`], so the product holds no
//! unreachable fragment.
//!
//! [`restrict`] prepares the product for synthesis: the property coordinate is silenced and
//! every lazy violation is relabeled so that it fails the requirement of the role.

use log::debug;

use crate::action::Action;
use crate::automaton::Automaton;
use crate::composition::CompositionFunction;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::requirement::Requirement;
use crate::state::StateId;

pub struct ModelCheckingFunction<'a> {
    plant: &'a Automaton,
    property: &'a Automaton,
}

impl<'a> ModelCheckingFunction<'a> {
    pub fn new(plant: &'a Automaton, property: &'a Automaton) -> Result<Self> {
        if property.rank() != 1 {
            return Err(Error::PropertyRank(property.rank()));
        }
        Ok(Self { plant, property })
    }

    /// Does a label of the product violate the property?
    pub fn is_violation(&self, label: &Label) -> bool {
        let (plant, property) = label.actions().split_at(self.plant.rank());
        property.iter().all(Action::is_idle) || plant.iter().all(Action::is_idle)
    }

    /// Product of plant and property, explored up to `bound`. Rank is `rank(plant) + 1`.
    ///
    /// Violations are pruned during composition, lazy ones excepted.
    pub fn apply(&self, bound: usize) -> Result<Option<Automaton>> {
        let composition = CompositionFunction::with_matcher(&[self.plant, self.property], |plant: &Label, property: &Label| {
            plant.name() == property.name()
        })?
        .retaining_lazy();
        let product = composition.apply(|l| self.is_violation(l), bound)?;
        match &product {
            Some(p) => debug!("model checking: {} states, {} transitions", p.num_states(), p.num_transitions()),
            None => debug!("model checking: the property rejects the plant"),
        }
        Ok(product)
    }
}

/// How a lazy move forbidden by the property is reported to synthesis.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Relabel {
    /// As an unmatched request of its requester (orchestration, mpc).
    Request,
    /// As an unmatched offer of its offerer (choreography).
    Offer,
}

impl Relabel {
    fn apply(self, label: &Label) -> Result<Label> {
        match self {
            Relabel::Request => Label::request(label.rank(), label.requester()?, label.name()),
            Relabel::Offer => Label::offer(label.rank(), label.offerer()?, label.name()),
        }
    }
}

/// Restrict `plant` by `property` and silence the property coordinate.
///
/// The result keeps rank `rank(plant) + 1`; the last position is idle in every label.
pub fn restrict(
    plant: &Automaton,
    property: &Automaton,
    requirement: Requirement,
    relabel: Relabel,
) -> Result<Option<Automaton>> {
    let mc = ModelCheckingFunction::new(plant, property)?;
    let Some(product) = mc.apply(usize::MAX)? else {
        return Ok(None);
    };
    let position = plant.rank();
    let silenced = product.map_transitions(|t| {
        let label = t.label();
        if label.actions()[..position].iter().all(Action::is_idle) {
            return Ok(None);
        }
        let quiet = label.silence(position);
        let quiet = if t.is_lazy() && mc.is_violation(label) && requirement.test(&quiet) {
            relabel.apply(&quiet)?
        } else {
            quiet
        };
        Ok(Some(t.with_label(quiet)))
    });
    non_empty(silenced)
}

fn non_empty(aut: Result<Automaton>) -> Result<Option<Automaton>> {
    match aut {
        Ok(aut) => Ok(Some(aut)),
        Err(Error::EmptyAutomaton | Error::NoFinalState) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Local state of the property monitor in a product state.
pub fn property_state(product: &Automaton, state: StateId) -> &str {
    let s = product.state(state);
    s.local(s.rank() - 1).label()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitset::BitSet;
    use test_log::test;

    // Client pays or tips from c0; the hotel requests pay urgently, tip lazily.
    const PLANT: &str = "Rank: 2
Initial state: [c0, h0]
Final states: [[c1][h1]]
Transitions:
([c0, h0],[!pay,?pay],[c1, h1])
!L([c0, h0],[!tip,?tip],[c1, h1])
";

    fn property(actions: &[&str]) -> Automaton {
        let mut text = String::from("Rank: 1\nInitial state: [p]\nFinal states: [[p]]\nTransitions: \n");
        for a in actions {
            text.push_str(&format!("([p],[!{}],[p])\n", a));
        }
        text.parse().unwrap()
    }

    #[test]
    fn test_property_rank() {
        let plant: Automaton = PLANT.parse().unwrap();
        assert!(matches!(
            ModelCheckingFunction::new(&plant, &plant),
            Err(Error::PropertyRank(2))
        ));
    }

    #[test]
    fn test_allowed_moves_synchronize() {
        let plant: Automaton = PLANT.parse().unwrap();
        let prop = property(&["pay", "tip"]);
        let mc = ModelCheckingFunction::new(&plant, &prop).unwrap();
        let product = mc.apply(usize::MAX).unwrap().unwrap();
        assert_eq!(product.rank(), 3);
        assert_eq!(product.num_transitions(), 2);
        assert!(product.transitions().iter().all(|t| !mc.is_violation(t.label())));
        assert!(product.states().iter().all(|s| s.local(2).label() == "p"));
        assert_eq!(property_state(&product, product.initial()), "p");
    }

    #[test]
    fn test_lazy_violation_is_relabeled() {
        let plant: Automaton = PLANT.parse().unwrap();
        let prop = property(&["pay"]);
        let r = restrict(&plant, &prop, Requirement::Agreement, Relabel::Request).unwrap().unwrap();
        assert_eq!(r.rank(), 3);
        assert_eq!(r.num_transitions(), 2);
        let tip = r.transitions().iter().find(|t| t.label().name() == "tip").unwrap();
        assert!(tip.is_lazy());
        assert_eq!(tip.label(), &Label::request(3, 1, "tip").unwrap());
        let pay = r.transitions().iter().find(|t| t.label().name() == "pay").unwrap();
        assert_eq!(pay.label(), &Label::matched(3, 0, 1, "pay").unwrap());
    }

    #[test]
    fn test_urgent_violation_at_initial() {
        let plant: Automaton = PLANT.replace("([c0, h0],[!pay", "!U([c0, h0],[!pay").parse().unwrap();
        let prop = property(&["tip"]);
        let mc = ModelCheckingFunction::new(&plant, &prop).unwrap();
        assert!(mc.apply(usize::MAX).unwrap().is_none());
    }

    #[test]
    fn test_urgent_violation_keeps_legal_moves() {
        // From 1 the urgent a violates the property; y is still allowed.
        let plant: Automaton = "Rank: 1
Initial state: [0]
Final states: [[3]]
Transitions:
([0],[!x],[1])
!U([1],[!a],[2])
([1],[!y],[3])
([2],[!c],[3])
"
        .parse()
        .unwrap();
        let prop = property(&["x", "y", "c"]);
        let product = ModelCheckingFunction::new(&plant, &prop).unwrap().apply(usize::MAX).unwrap().unwrap();
        let names: Vec<&str> = product.transitions().iter().map(|t| t.label().name()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(product.states().iter().all(|s| s.local(0).label() != "2"));

        let all = BitSet::full(product.num_transitions());
        assert_eq!(product.forward_reachable(&all).len(), product.num_states());
    }

    #[test]
    fn test_permitted_violation_is_dropped() {
        let plant: Automaton = PLANT.parse().unwrap();
        let prop = property(&["tip"]);
        let product = ModelCheckingFunction::new(&plant, &prop).unwrap().apply(usize::MAX).unwrap().unwrap();
        assert_eq!(product.num_transitions(), 1);
        assert_eq!(product.transitions()[0].label().name(), "tip");
    }
}
