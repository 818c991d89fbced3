//! Automaton to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **States** are rendered as circles labeled with their local states; final states are
//!   double circles
//! - **The initial state** is pointed to by an edge from an invisible node
//! - **Transitions** are labeled with their label, styled by modality:
//!   - Solid lines represent permitted transitions
//!   - Dashed lines represent lazy transitions
//!   - Bold lines represent urgent transitions
//!
//! # Examples
//!
//! ```
//! use contract_automata::automaton::Automaton;
//!
//! let aut: Automaton = "Rank: 1\nInitial state: [0]\nFinal states: [[1]]\nTransitions: \n([0],[!a],[1])"
//!     .parse()
//!     .unwrap();
//! let dot = aut.to_dot().unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::automaton::Automaton;
use crate::transition::Modality;

/// Configuration options for DOT output generation.
///
/// ```
/// use contract_automata::dot::DotConfig;
///
/// let config = DotConfig {
///     urgent_style: "dotted",
///     ..DotConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for non-final states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for final states (default: "doublecircle")
    pub final_shape: &'static str,
    /// Style for permitted transitions (default: "solid")
    pub permitted_style: &'static str,
    /// Style for lazy transitions (default: "dashed")
    pub lazy_style: &'static str,
    /// Style for urgent transitions (default: "bold")
    pub urgent_style: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            final_shape: "doublecircle",
            permitted_style: "solid",
            lazy_style: "dashed",
            urgent_style: "bold",
        }
    }
}

impl DotConfig {
    fn style(&self, modality: Modality) -> &'static str {
        match modality {
            Modality::Permitted => self.permitted_style,
            Modality::Lazy => self.lazy_style,
            Modality::Urgent => self.urgent_style,
        }
    }
}

impl Automaton {
    /// Converts the automaton to DOT (Graphviz) format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the automaton to DOT format with custom configuration.
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "rankdir=LR;")?;
        writeln!(dot, "init [shape=point, style=invis];")?;

        for (i, state) in self.states().iter().enumerate() {
            let shape = if state.is_final() {
                config.final_shape
            } else {
                config.state_shape
            };
            writeln!(dot, "{} [shape={}, label=\"{}\"];", i, shape, state)?;
        }
        writeln!(dot, "init -> {};", self.initial().index())?;

        for t in self.transitions() {
            writeln!(
                dot,
                "{} -> {} [label=\"{}{}\", style={}];",
                t.source().index(),
                t.target().index(),
                t.modality().prefix(),
                t.label(),
                config.style(t.modality())
            )?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
