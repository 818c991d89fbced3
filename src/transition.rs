//! Modal transitions.

use std::fmt;

use crate::label::Label;
use crate::state::StateId;

/// How binding a transition is.
///
/// - [`Permitted`][Modality::Permitted]: optional, freely prunable.
/// - [`Lazy`][Modality::Lazy]: semi-controllable. It cannot be forced, and removing it is
///   only safe if a matched alternative survives.
/// - [`Urgent`][Modality::Urgent]: necessary. It must be preserved or the branch is illegal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum Modality {
    #[default]
    Permitted,
    Lazy,
    Urgent,
}

impl Modality {
    pub fn is_necessary(self) -> bool {
        !matches!(self, Modality::Permitted)
    }

    /// Modality of a match: necessity is inherited from either side, never invented.
    pub fn join(self, other: Modality) -> Modality {
        self.max(other)
    }

    /// Prefix used in the textual format.
    pub fn prefix(self) -> &'static str {
        match self {
            Modality::Permitted => "",
            Modality::Lazy => "!L",
            Modality::Urgent => "!U",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modality::Permitted => "permitted",
            Modality::Lazy => "lazy",
            Modality::Urgent => "urgent",
        };
        write!(f, "{}", s)
    }
}

/// Transition between two states of the same automaton arena.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ModalTransition {
    source: StateId,
    label: Label,
    target: StateId,
    modality: Modality,
}

impl ModalTransition {
    pub fn new(source: StateId, label: Label, target: StateId, modality: Modality) -> Self {
        Self {
            source,
            label,
            target,
            modality,
        }
    }

    pub fn source(&self) -> StateId {
        self.source
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn target(&self) -> StateId {
        self.target
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn is_permitted(&self) -> bool {
        self.modality == Modality::Permitted
    }

    pub fn is_lazy(&self) -> bool {
        self.modality == Modality::Lazy
    }

    pub fn is_urgent(&self) -> bool {
        self.modality == Modality::Urgent
    }

    pub fn is_necessary(&self) -> bool {
        self.modality.is_necessary()
    }

    pub(crate) fn with_label(&self, label: Label) -> Self {
        Self { label, ..self.clone() }
    }
}

/// Handle of a transition inside one automaton.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransitionId(u32);

impl TransitionId {
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        use Modality::*;
        assert_eq!(Permitted.join(Permitted), Permitted);
        assert_eq!(Permitted.join(Lazy), Lazy);
        assert_eq!(Lazy.join(Urgent), Urgent);
        assert_eq!(Urgent.join(Permitted), Urgent);
        assert!(Lazy.is_necessary());
        assert!(!Permitted.is_necessary());
    }
}
