//! Error type shared by all operators.
//!
//! Malformed input (structural violations, parse errors, role preconditions) is reported
//! through [`Error`]. Infeasibility is *not* an error: operators return `Ok(None)` instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("an automaton needs at least one transition")]
    EmptyAutomaton,

    #[error("rank mismatch: expected {expected}, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("not exactly one initial state found ({0} found)")]
    InitialStates(usize),

    #[error("no final states")]
    NoFinalState,

    #[error("ambiguous state {0}")]
    AmbiguousState(String),

    #[error("malformed action `{0}`")]
    MalformedAction(String),

    #[error("ill-formed label {label}: {reason}")]
    MalformedLabel { label: String, reason: &'static str },

    #[error("label {0} has no offerer")]
    NoOfferer(String),

    #[error("label {0} has no requester")]
    NoRequester(String),

    #[error("the automaton contains necessary offers that are not allowed in the orchestration synthesis")]
    NecessaryOffer,

    #[error("the automaton contains necessary requests that are not permitted in choreography synthesis")]
    NecessaryRequest,

    #[error("the automaton contains semi-controllable transitions that are not allowed in mpc synthesis")]
    SemiControllable,

    #[error("the violator choice did not return one of the violating transitions")]
    InvalidChoice,

    #[error("the property must have rank 1, found rank {0}")]
    PropertyRank(usize),

    #[error("principal {index} out of range for rank {rank}")]
    PrincipalOutOfRank { index: usize, rank: usize },

    #[error("nothing to compose")]
    NoOperands,

    #[error("feature `{0}` is both required and forbidden")]
    ConflictingFeature(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}
