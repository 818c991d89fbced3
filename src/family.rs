//! Product configurations restricting which actions a controller may use.
//!
//! A feature is identified with the action name it enables.

use std::collections::BTreeSet;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::label::Label;

/// What a selected configuration demands of a synthesized controller.
pub trait Configuration {
    /// Must transitions with this label be removed?
    fn is_forbidden(&self, label: &Label) -> bool;

    /// Does `aut` exercise everything the configuration requires?
    fn check_required(&self, aut: &Automaton) -> bool;
}

/// A product: sets of required and forbidden features.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Product {
    required: BTreeSet<String>,
    forbidden: BTreeSet<String>,
}

impl Product {
    pub fn new<R, F>(required: R, forbidden: F) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        let required: BTreeSet<String> = required.into_iter().map(Into::into).collect();
        let forbidden: BTreeSet<String> = forbidden.into_iter().map(Into::into).collect();
        if let Some(both) = required.intersection(&forbidden).next() {
            return Err(Error::ConflictingFeature(both.clone()));
        }
        Ok(Self { required, forbidden })
    }

    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    pub fn forbidden(&self) -> impl Iterator<Item = &str> {
        self.forbidden.iter().map(String::as_str)
    }
}

impl Configuration for Product {
    fn is_forbidden(&self, label: &Label) -> bool {
        self.forbidden.contains(label.name())
    }

    fn check_required(&self, aut: &Automaton) -> bool {
        let names: BTreeSet<&str> = aut.transitions().iter().map(|t| t.label().name()).collect();
        self.required.iter().all(|f| names.contains(f.as_str()))
    }
}
