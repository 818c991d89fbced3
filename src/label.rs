//! Labels of rank R: one [`Action`] per principal.
//!
//! A well-formed label is either *unmatched* (exactly one non-idle action, an offer or a
//! request) or a *match* (exactly two non-idle actions: an offer and a request of the
//! same name, performed by two distinct principals).

use std::fmt;
use std::str::FromStr;

use crate::action::Action;
use crate::error::{Error, Result};

static IDLE: Action = Action::Idle;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label(Vec<Action>);

impl Label {
    /// Validates the shape of a label.
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        let label = Label(actions);
        if let Some(reason) = label.shape_error() {
            return Err(Error::MalformedLabel {
                label: label.to_string(),
                reason,
            });
        }
        Ok(label)
    }

    /// Skips validation. Used for intermediate labels that temporarily carry more than
    /// two moving principals (e.g. a plant move synchronized with a property monitor).
    pub(crate) fn unchecked(actions: Vec<Action>) -> Self {
        Label(actions)
    }

    /// Unmatched offer of `name` by `principal`.
    pub fn offer(rank: usize, principal: usize, name: &str) -> Result<Self> {
        Self::single(rank, principal, Action::offer(name))
    }

    /// Unmatched request of `name` by `principal`.
    pub fn request(rank: usize, principal: usize, name: &str) -> Result<Self> {
        Self::single(rank, principal, Action::request(name))
    }

    /// Match between `offerer` and `requester` on `name`.
    pub fn matched(rank: usize, offerer: usize, requester: usize, name: &str) -> Result<Self> {
        let mut actions = vec![Action::Idle; rank];
        if offerer >= rank || requester >= rank {
            return Err(Error::PrincipalOutOfRank {
                index: offerer.max(requester),
                rank,
            });
        }
        if offerer == requester {
            return Err(Error::MalformedLabel {
                label: format!("{}@{}", name, offerer),
                reason: "a principal cannot match with itself",
            });
        }
        actions[offerer] = Action::offer(name);
        actions[requester] = Action::request(name);
        Self::new(actions)
    }

    fn single(rank: usize, principal: usize, action: Action) -> Result<Self> {
        if principal >= rank {
            return Err(Error::PrincipalOutOfRank { index: principal, rank });
        }
        let mut actions = vec![Action::Idle; rank];
        actions[principal] = action;
        Self::new(actions)
    }

    fn shape_error(&self) -> Option<&'static str> {
        if self.0.is_empty() {
            return Some("empty label");
        }
        let moving: Vec<&Action> = self.0.iter().filter(|a| !a.is_idle()).collect();
        match moving.as_slice() {
            [] => Some("all actions are idle"),
            [_] => None,
            [a, b] if a.matches(b) => None,
            [_, _] => Some("the two actions do not match"),
            _ => Some("more than two principals move"),
        }
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// Positions of the principals that move.
    pub fn participants(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().filter(|(_, a)| !a.is_idle()).map(|(i, _)| i)
    }

    pub fn is_idle(&self) -> bool {
        self.0.iter().all(Action::is_idle)
    }

    pub fn is_match(&self) -> bool {
        self.participants().count() == 2
    }

    pub fn is_offer(&self) -> bool {
        !self.is_match() && self.0.iter().any(Action::is_offer)
    }

    pub fn is_request(&self) -> bool {
        !self.is_match() && self.0.iter().any(Action::is_request)
    }

    /// Position of the offering principal (offers and matches).
    pub fn offerer(&self) -> Result<usize> {
        self.0
            .iter()
            .position(Action::is_offer)
            .ok_or_else(|| Error::NoOfferer(self.to_string()))
    }

    /// Position of the requesting principal (requests and matches).
    pub fn requester(&self) -> Result<usize> {
        self.0
            .iter()
            .position(Action::is_request)
            .ok_or_else(|| Error::NoRequester(self.to_string()))
    }

    /// The single moving principal of an unmatched label.
    pub fn principal(&self) -> Option<usize> {
        let mut it = self.participants();
        match (it.next(), it.next()) {
            (Some(i), None) => Some(i),
            _ => None,
        }
    }

    /// The offer for offers and matches, the request for requests.
    pub fn action(&self) -> &Action {
        self.0
            .iter()
            .find(|a| a.is_offer())
            .or_else(|| self.0.iter().find(|a| !a.is_idle()))
            .unwrap_or(&IDLE)
    }

    pub fn co_action(&self) -> Action {
        self.action().co_action()
    }

    /// Name of the action performed (empty for an all-idle label).
    pub fn name(&self) -> &str {
        self.action().name().unwrap_or("")
    }

    /// Two unmatched labels of opposite polarity on the same action name.
    pub fn matches(&self, other: &Label) -> bool {
        !self.is_match() && !other.is_match() && self.action().matches(other.action())
    }

    /// Places the actions of several labels side by side.
    pub(crate) fn concat<'a>(parts: impl IntoIterator<Item = &'a [Action]>) -> Self {
        Label(parts.into_iter().flat_map(|a| a.iter().cloned()).collect())
    }

    /// Label of rank `rank` carrying `inner` at positions `offset..offset + inner.rank()`.
    pub(crate) fn lift(rank: usize, offset: usize, inner: &Label) -> Self {
        let mut actions = vec![Action::Idle; rank];
        actions[offset..offset + inner.rank()].clone_from_slice(&inner.0);
        Label(actions)
    }

    /// Copy of this label with the action at `position` set to idle.
    pub(crate) fn silence(&self, position: usize) -> Self {
        let mut actions = self.0.clone();
        actions[position] = Action::Idle;
        Label(actions)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, a) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, "]")
    }
}

impl FromStr for Label {
    type Err = Error;

    /// Parses `[!a,?a]`-style labels.
    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| Error::MalformedAction(s.to_string()))?;
        let actions = inner.split(',').map(str::parse).collect::<Result<Vec<Action>>>()?;
        Label::new(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_label() {
        let l = Label::matched(3, 0, 2, "pay").unwrap();
        assert!(l.is_match());
        assert!(!l.is_offer());
        assert!(!l.is_request());
        assert_eq!(l.offerer().unwrap(), 0);
        assert_eq!(l.requester().unwrap(), 2);
        assert_eq!(l.action(), &Action::offer("pay"));
        assert_eq!(l.co_action(), Action::request("pay"));
        assert_eq!(l.principal(), None);
        assert_eq!(l.to_string(), "[!pay,-,?pay]");
    }

    #[test]
    fn test_unmatched_labels() {
        let offer = Label::offer(2, 1, "pay").unwrap();
        let request = Label::request(1, 0, "pay").unwrap();
        assert!(offer.is_offer());
        assert!(request.is_request());
        assert_eq!(offer.principal(), Some(1));
        assert!(offer.matches(&request));
        assert!(matches!(request.offerer(), Err(Error::NoOfferer(_))));
        assert!(matches!(offer.requester(), Err(Error::NoRequester(_))));
    }

    #[test]
    fn test_ill_formed() {
        let two_offers = vec![Action::offer("a"), Action::offer("a")];
        assert!(matches!(Label::new(two_offers), Err(Error::MalformedLabel { .. })));
        let mismatch = vec![Action::offer("a"), Action::request("b")];
        assert!(Label::new(mismatch).is_err());
        assert!(Label::new(vec![Action::Idle, Action::Idle]).is_err());
        assert!(Label::new(vec![]).is_err());
        let three = vec![Action::offer("a"), Action::request("a"), Action::request("a")];
        assert!(Label::new(three).is_err());
        assert!(Label::offer(1, 1, "a").is_err());
    }

    #[test]
    fn test_parse() {
        let l: Label = "[!pay,?pay]".parse().unwrap();
        assert_eq!(l, Label::matched(2, 0, 1, "pay").unwrap());
        assert!("[!pay,!pay]".parse::<Label>().is_err());
        assert!("!pay".parse::<Label>().is_err());
        assert!(matches!("[pay]".parse::<Label>(), Err(Error::MalformedAction(_))));
    }

    #[test]
    fn test_lift_and_silence() {
        let inner = Label::offer(1, 0, "a").unwrap();
        let lifted = Label::lift(3, 1, &inner);
        assert_eq!(lifted, Label::offer(3, 1, "a").unwrap());
        let m = Label::matched(2, 0, 1, "a").unwrap();
        assert_eq!(m.silence(0), Label::request(2, 1, "a").unwrap());
    }
}
