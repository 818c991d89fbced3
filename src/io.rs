//! Reading and writing automata in the `.data` text format.
//!
//! # Format
//!
//! ```text
//! Rank: 2
//! Initial state: [c0, h0]
//! Final states: [[c1][h1]]
//! Transitions:
//! !U([c0, h0],[!pay,?pay],[c1, h1])
//! ([c1, h1],[-,?tip],[c1, h1])
//! ```
//!
//! - `Final states` lists, for every principal, its final local states.
//! - A transition is `(source,label,target)`, optionally prefixed by `!L` (lazy) or
//!   `!U` (urgent); no prefix means permitted.
//! - Actions are `!name` (offer), `?name` (request) or `-` (idle).
//!
//! A local state is initial (resp. final) when its label is listed, at its position,
//! in the initial state (resp. final states).

use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::debug;

use crate::action::Action;
use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::label::Label;
use crate::state::{LocalState, State};
use crate::transition::Modality;

impl Automaton {
    /// Saves the automaton to a `.data` file.
    ///
    /// ```no_run
    /// use contract_automata::automaton::Automaton;
    ///
    /// let aut = Automaton::load("hotel.data").unwrap();
    /// aut.save("copy.data").unwrap();
    /// ```
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_data_string())?;
        Ok(())
    }

    /// Reads an automaton from a `.data` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let aut = Self::from_data_string(&content)?;
        debug!("loaded {}: rank {}, {} transitions", path.display(), aut.rank(), aut.num_transitions());
        Ok(aut)
    }

    pub fn to_data_string(&self) -> String {
        self.to_string()
    }

    /// Parses an automaton from the `.data` text format.
    pub fn from_data_string(content: &str) -> Result<Self> {
        let mut rank: Option<usize> = None;
        let mut initial: Option<Vec<String>> = None;
        let mut finals: Option<Vec<BTreeSet<String>>> = None;
        let mut in_transitions = false;
        let mut raw = Vec::new();

        for (n, line) in content.lines().enumerate() {
            let n = n + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if in_transitions {
                raw.push(parse_transition(n, line)?);
            } else if let Some(rest) = line.strip_prefix("Rank:") {
                if rank.is_some() {
                    return Err(Error::parse(n, "repeated rank"));
                }
                let r = rest.trim().parse().map_err(|_| Error::parse(n, format!("invalid rank `{}`", rest.trim())))?;
                rank = Some(r);
            } else if let Some(rest) = line.strip_prefix("Initial state:") {
                let r = rank.ok_or_else(|| Error::parse(n, "missing rank"))?;
                let state = parse_list(n, rest)?;
                if state.len() != r {
                    return Err(Error::parse(n, "Initial state with different rank"));
                }
                initial = Some(state);
            } else if let Some(rest) = line.strip_prefix("Final states:") {
                let r = rank.ok_or_else(|| Error::parse(n, "missing rank"))?;
                let inner = rest
                    .trim()
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .ok_or_else(|| Error::parse(n, "final states must be enclosed in brackets"))?;
                let groups = groups(n, inner)?;
                if groups.len() != r {
                    return Err(Error::parse(n, "Final states with different rank"));
                }
                finals = Some(
                    groups
                        .iter()
                        .map(|g| split_items(g).map(str::to_string).collect())
                        .collect(),
                );
            } else if line.starts_with("Transitions:") {
                in_transitions = true;
            } else {
                return Err(Error::parse(n, format!("unexpected line `{}`", line)));
            }
        }

        let rank = rank.ok_or_else(|| Error::parse(0, "missing rank"))?;
        let initial = initial.ok_or_else(|| Error::parse(0, "missing initial state"))?;
        let finals = finals.ok_or_else(|| Error::parse(0, "missing final states"))?;

        let state = |labels: &[String]| {
            State::new(
                labels
                    .iter()
                    .enumerate()
                    .map(|(i, l)| LocalState::new(l, *l == initial[i], finals[i].contains(l)))
                    .collect(),
            )
        };

        let mut values = Vec::with_capacity(raw.len());
        for t in raw {
            if t.source.len() != rank || t.actions.len() != rank || t.target.len() != rank {
                return Err(Error::parse(t.line, "Ill-formed transitions, different ranks"));
            }
            let label = Label::new(t.actions)?;
            values.push((state(&t.source), label, state(&t.target), t.modality));
        }
        Automaton::new(values)
    }
}

struct RawTransition {
    line: usize,
    source: Vec<String>,
    actions: Vec<Action>,
    target: Vec<String>,
    modality: Modality,
}

fn parse_transition(n: usize, line: &str) -> Result<RawTransition> {
    let (modality, rest) = if let Some(rest) = line.strip_prefix("!U") {
        (Modality::Urgent, rest)
    } else if let Some(rest) = line.strip_prefix("!L") {
        (Modality::Lazy, rest)
    } else {
        (Modality::Permitted, line)
    };
    let body = rest
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| Error::parse(n, format!("malformed transition `{}`", line)))?;
    match groups(n, body)?.as_slice() {
        [source, label, target] => Ok(RawTransition {
            line: n,
            source: split_items(source).map(str::to_string).collect(),
            actions: label.split(',').map(str::parse).collect::<Result<Vec<Action>>>()?,
            target: split_items(target).map(str::to_string).collect(),
            modality,
        }),
        _ => Err(Error::parse(n, format!("malformed transition `{}`", line))),
    }
}

/// Parses `[a, b, c]`.
fn parse_list(n: usize, s: &str) -> Result<Vec<String>> {
    let inner = s
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| Error::parse(n, format!("expected a bracketed list, found `{}`", s.trim())))?;
    Ok(split_items(inner).map(str::to_string).collect())
}

/// Contents of the top-level `[...]` groups of `s`.
fn groups(n: usize, s: &str) -> Result<Vec<&str>> {
    let mut result = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        match (c, start) {
            ('[', None) => start = Some(i + 1),
            (']', Some(from)) => {
                result.push(&s[from..i]);
                start = None;
            }
            ('[', Some(_)) | (']', None) => return Err(Error::parse(n, "unbalanced brackets")),
            _ => {}
        }
    }
    if start.is_some() {
        return Err(Error::parse(n, "unbalanced brackets"));
    }
    Ok(result)
}

fn split_items(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|x| !x.is_empty())
}

impl FromStr for Automaton {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_data_string(s)
    }
}

impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rank: {}", self.rank())?;
        writeln!(f, "Initial state: {}", self.state(self.initial()))?;
        let mut finals = String::new();
        for i in 0..self.rank() {
            let labels: BTreeSet<&str> = self
                .states()
                .iter()
                .map(|s| s.local(i))
                .filter(|l| l.is_final())
                .map(LocalState::label)
                .collect();
            write!(finals, "[{}]", labels.into_iter().collect::<Vec<_>>().join(", "))?;
        }
        writeln!(f, "Final states: [{}]", finals)?;
        writeln!(f, "Transitions: ")?;
        for t in self.transitions() {
            writeln!(f, "{}", self.format_transition(t))?;
        }
        Ok(())
    }
}
