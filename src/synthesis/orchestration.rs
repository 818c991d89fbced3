//! Orchestration synthesis.
//!
//! An orchestrator schedules every move centrally. It cannot force offers, so necessary
//! offers are rejected up front; necessary requests are handled through
//! [`Controllability::Orchestration`].

use log::debug;

use crate::automaton::Automaton;
use crate::controllability::Controllability;
use crate::error::{Error, Result};
use crate::family::Configuration;
use crate::model_checking::{self, Relabel};
use crate::requirement::Requirement;
use crate::synthesis::synthesize_controller;

fn check_no_necessary_offers(aut: &Automaton) -> Result<()> {
    if aut.transitions().iter().any(|t| t.is_necessary() && t.label().is_offer()) {
        return Err(Error::NecessaryOffer);
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct OrchestrationSynthesisOperator {
    requirement: Requirement,
    property: Option<Automaton>,
}

impl OrchestrationSynthesisOperator {
    pub fn new(requirement: Requirement) -> Self {
        Self {
            requirement,
            property: None,
        }
    }

    /// Restrict the plant by a rank-1 property before synthesis.
    pub fn with_property(mut self, property: Automaton) -> Self {
        self.property = Some(property);
        self
    }

    /// The most permissive orchestration of `aut`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// [`Error::NecessaryOffer`] if `aut` has an urgent or lazy unmatched offer.
    pub fn apply(&self, aut: &Automaton) -> Result<Option<Automaton>> {
        check_no_necessary_offers(aut)?;
        debug!("orchestration synthesis ({})", self.requirement);
        let restricted;
        let plant = match &self.property {
            Some(property) => match model_checking::restrict(aut, property, self.requirement, Relabel::Request)? {
                Some(r) => {
                    restricted = r;
                    &restricted
                }
                None => return Ok(None),
            },
            None => aut,
        };
        synthesize_controller(plant, self.requirement, Some(Controllability::Orchestration), |_| false)
    }
}

/// Orchestration of one product of a family: forbidden actions are pruned and the
/// controller is rejected unless it exercises every required action.
pub struct ProductOrchestrationSynthesisOperator<C> {
    requirement: Requirement,
    configuration: C,
}

impl<C> ProductOrchestrationSynthesisOperator<C>
where
    C: Configuration + Sync,
{
    pub fn new(requirement: Requirement, configuration: C) -> Self {
        Self {
            requirement,
            configuration,
        }
    }

    pub fn apply(&self, aut: &Automaton) -> Result<Option<Automaton>> {
        check_no_necessary_offers(aut)?;
        let result = synthesize_controller(aut, self.requirement, Some(Controllability::Orchestration), |l| {
            self.configuration.is_forbidden(l)
        })?;
        Ok(result.filter(|r| {
            let ok = self.configuration.check_required(r);
            if !ok {
                debug!("product orchestration: required actions are not exercised");
            }
            ok
        }))
    }
}
