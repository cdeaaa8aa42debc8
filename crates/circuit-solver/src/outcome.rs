//! Tri-state evaluation outcome.

use crate::error::SolveError;

/// Result of evaluating a node.
///
/// `Broken` marks a subtree whose evaluation was cancelled or failed. It is
/// absorbing: a gate that sees it before deciding reports it as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    True,
    False,
    Broken,
}

impl Outcome {
    /// Logical negation; `Broken` stays `Broken`.
    #[inline]
    pub fn negate(self) -> Self {
        match self {
            Outcome::True => Outcome::False,
            Outcome::False => Outcome::True,
            Outcome::Broken => Outcome::Broken,
        }
    }

    pub fn is_broken(self) -> bool {
        self == Outcome::Broken
    }

    /// Boolean value, `None` when broken.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Outcome::True => Some(true),
            Outcome::False => Some(false),
            Outcome::Broken => None,
        }
    }
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value {
            Outcome::True
        } else {
            Outcome::False
        }
    }
}

impl From<Outcome> for Result<bool, SolveError> {
    fn from(outcome: Outcome) -> Self {
        outcome.as_bool().ok_or(SolveError::Broken)
    }
}

/// An outcome tagged with the position of the argument that produced it.
///
/// Arguments report in completion order, so the index is what tells a
/// parent which of its arguments a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexedOutcome {
    pub index: usize,
    pub outcome: Outcome,
}

impl IndexedOutcome {
    pub fn new(index: usize, outcome: Outcome) -> Self {
        Self { index, outcome }
    }
}
