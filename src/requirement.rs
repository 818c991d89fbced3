//! Invariants that synthesized controllers must enforce.

use std::fmt;

use crate::label::Label;

/// Structural test on the labels of accepted behaviour.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Requirement {
    /// No unmatched request: every request is served. Unmatched offers are fine.
    #[default]
    Agreement,
    /// Every move is a match.
    StrongAgreement,
}

impl Requirement {
    pub fn test(self, label: &Label) -> bool {
        match self {
            Requirement::Agreement => !label.is_request(),
            Requirement::StrongAgreement => label.is_match(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Agreement => write!(f, "agreement"),
            Requirement::StrongAgreement => write!(f, "strong agreement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirements() {
        let offer = Label::offer(2, 0, "a").unwrap();
        let request = Label::request(2, 1, "a").unwrap();
        let matched = Label::matched(2, 0, 1, "a").unwrap();
        assert!(Requirement::Agreement.test(&offer));
        assert!(!Requirement::Agreement.test(&request));
        assert!(Requirement::Agreement.test(&matched));
        assert!(!Requirement::StrongAgreement.test(&offer));
        assert!(!Requirement::StrongAgreement.test(&request));
        assert!(Requirement::StrongAgreement.test(&matched));
    }
}
