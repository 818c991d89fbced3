//! Actions: the per-principal component of a label.
//!
//! Text syntax: `-` for idle, `!name` for an offer, `?name` for a request.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

/// What a single principal does in one move.
///
/// An [`Offer`][Action::Offer] and a [`Request`][Action::Request] with the same name
/// are the only pair of actions that match.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Action {
    Idle,
    Offer(Arc<str>),
    Request(Arc<str>),
}

impl Action {
    pub fn offer(name: &str) -> Self {
        Action::Offer(Arc::from(name))
    }

    pub fn request(name: &str) -> Self {
        Action::Request(Arc::from(name))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Action::Idle)
    }

    pub fn is_offer(&self) -> bool {
        matches!(self, Action::Offer(_))
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Action::Request(_))
    }

    /// Action name, or `None` for [`Idle`][Action::Idle].
    pub fn name(&self) -> Option<&str> {
        match self {
            Action::Idle => None,
            Action::Offer(name) | Action::Request(name) => Some(name),
        }
    }

    /// The action with the opposite polarity. Idle is its own co-action.
    pub fn co_action(&self) -> Self {
        match self {
            Action::Idle => Action::Idle,
            Action::Offer(name) => Action::Request(name.clone()),
            Action::Request(name) => Action::Offer(name.clone()),
        }
    }

    /// Offer/request of the same name, in either order.
    pub fn matches(&self, other: &Action) -> bool {
        match (self, other) {
            (Action::Offer(a), Action::Request(b)) | (Action::Request(a), Action::Offer(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Idle => write!(f, "-"),
            Action::Offer(name) => write!(f, "!{}", name),
            Action::Request(name) => write!(f, "?{}", name),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '[' | ']' | '(' | ')' | ',' | '!' | '?'))
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "-" {
            return Ok(Action::Idle);
        }
        match (s.strip_prefix('!'), s.strip_prefix('?')) {
            (Some(name), _) if is_valid_name(name) => Ok(Action::offer(name)),
            (_, Some(name)) if is_valid_name(name) => Ok(Action::request(name)),
            _ => Err(Error::MalformedAction(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching() {
        let offer = Action::offer("pay");
        let request = Action::request("pay");
        assert!(offer.matches(&request));
        assert!(request.matches(&offer));
        assert!(!offer.matches(&offer));
        assert!(!offer.matches(&Action::request("refund")));
        assert!(!Action::Idle.matches(&Action::Idle));
    }

    #[test]
    fn test_co_action() {
        assert_eq!(Action::offer("pay").co_action(), Action::request("pay"));
        assert_eq!(Action::request("pay").co_action(), Action::offer("pay"));
        assert_eq!(Action::Idle.co_action(), Action::Idle);
    }

    #[test]
    fn test_parse() {
        assert_eq!("-".parse::<Action>().unwrap(), Action::Idle);
        assert_eq!("!pay".parse::<Action>().unwrap(), Action::offer("pay"));
        assert_eq!(" ?pay ".parse::<Action>().unwrap(), Action::request("pay"));
        assert_eq!(Action::offer("pay").to_string(), "!pay");
    }

    #[test]
    fn test_parse_malformed() {
        for s in ["", "pay", "!", "?", "--", "!pa y", "?a,b", "!!a"] {
            assert!(
                matches!(s.parse::<Action>(), Err(Error::MalformedAction(_))),
                "`{}` should be rejected",
                s
            );
        }
    }
}
