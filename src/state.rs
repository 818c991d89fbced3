//! Local and composite states.

use std::fmt;
use std::sync::Arc;

/// Atomic state of one principal.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LocalState {
    label: Arc<str>,
    initial: bool,
    final_: bool,
}

impl LocalState {
    pub fn new(label: &str, initial: bool, final_: bool) -> Self {
        Self {
            label: Arc::from(label),
            initial,
            final_,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_initial(&self) -> bool {
        self.initial
    }

    pub fn is_final(&self) -> bool {
        self.final_
    }
}

impl fmt::Display for LocalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Composite state of rank R: one [`LocalState`] per principal slot.
///
/// # Invariants
///
/// - Initial (resp. final) iff every component is initial (resp. final).
/// - Equality is structural. Within one automaton the [key][State::key] (the sequence
///   of local labels) identifies a state; two arena entries with the same key make
///   the automaton ambiguous.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct State(Vec<LocalState>);

impl State {
    pub fn new(components: Vec<LocalState>) -> Self {
        State(components)
    }

    /// Rank-1 state, handy for single-principal contracts.
    pub fn single(label: &str, initial: bool, final_: bool) -> Self {
        State(vec![LocalState::new(label, initial, final_)])
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn components(&self) -> &[LocalState] {
        &self.0
    }

    /// Local state of principal `i`.
    pub fn local(&self, i: usize) -> &LocalState {
        &self.0[i]
    }

    pub fn is_initial(&self) -> bool {
        self.0.iter().all(|s| s.is_initial())
    }

    pub fn is_final(&self) -> bool {
        self.0.iter().all(|s| s.is_final())
    }

    pub fn key(&self) -> Vec<&str> {
        self.0.iter().map(|s| s.label()).collect()
    }

    /// Concatenation of the components of several states.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a State>) -> Self {
        State(parts.into_iter().flat_map(|s| s.0.iter().cloned()).collect())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

/// Handle of a state inside one automaton's arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}
