//! # contract-automata: service contracts as modal automata
//!
//! A **contract automaton** describes the behaviour of one or more *principals* (services).
//! Every transition carries a label with one action per principal: an offer `!a`, a request
//! `?a`, or idle `-`. Transitions are *permitted*, *lazy* or *urgent*: the latter two are
//! necessary and must be honoured by any controller.
//!
//! ## Key Features
//!
//! - **Composition**: [`compose`][crate::composition::compose] builds the product of several
//!   automata, matching offers with requests and interleaving the rest, under a pruning
//!   policy and a depth bound.
//! - **Synthesis**: a generic fixpoint [`SynthesisOperator`][crate::synthesis::SynthesisOperator]
//!   and the controller roles built on it:
//!   [orchestration][crate::synthesis::orchestration],
//!   [choreography][crate::synthesis::choreography] (with branching-condition refinement) and
//!   [most permissive controller][crate::synthesis::mpc].
//! - **Model checking**: restricting a plant with a property monitor.
//! - **Projection**, a textual `.data` format and Graphviz output.
//!
//! ## Basic Usage
//!
//! ```rust
//! use contract_automata::automaton::Automaton;
//! use contract_automata::composition::compose;
//! use contract_automata::requirement::Requirement;
//! use contract_automata::synthesis::orchestration::OrchestrationSynthesisOperator;
//!
//! let client: Automaton = "Rank: 1\nInitial state: [c0]\nFinal states: [[c1]]\nTransitions: \n([c0],[!pay],[c1])"
//!     .parse()
//!     .unwrap();
//! let hotel: Automaton = "Rank: 1\nInitial state: [h0]\nFinal states: [[h1]]\nTransitions: \n!U([h0],[?pay],[h1])"
//!     .parse()
//!     .unwrap();
//!
//! // 1. Compose: the urgent request is matched by the client's offer.
//! let plant = compose(&[&client, &hotel], |_| false, usize::MAX).unwrap().unwrap();
//! assert_eq!(plant.num_states(), 2);
//!
//! // 2. Synthesize: the match already satisfies agreement.
//! let orc = OrchestrationSynthesisOperator::new(Requirement::StrongAgreement)
//!     .apply(&plant)
//!     .unwrap();
//! assert_eq!(orc, Some(plant));
//! ```
//!
//! Operations distinguish malformed input (`Err`) from infeasibility (`Ok(None)`): an empty
//! composition or the absence of a controller is not an error.

pub mod action;
pub mod automaton;
pub mod bitset;
pub mod composition;
pub mod controllability;
pub mod dot;
pub mod error;
pub mod family;
pub mod io;
pub mod label;
pub mod model_checking;
pub mod projection;
pub mod requirement;
pub mod state;
pub mod synthesis;
pub mod table;
pub mod transition;
