//! Short-circuit aggregation policies.
//!
//! A policy folds the outcomes of a gate's arguments, one message at a
//! time and in whatever order they arrive, into the gate's own outcome.
//! Policies hold no threads or channels, so every arrival order can be
//! driven by hand.
//!
//! Driving a policy:
//!
//! 1. Ask [`Policy::decision`] before reading anything; some gates are
//!    decided by their shape alone (`AND()` with no arguments, `GT(t)` with
//!    `t >= n`).
//! 2. Feed each message to [`Policy::observe`] until it returns a decision.
//! 3. If all `n` messages were consumed without one, the result is
//!    [`Policy::exhausted`].

use circuit_core::{Node, NodeType};

use crate::error::EvalFault;
use crate::outcome::{IndexedOutcome, Outcome};

/// Aggregation state for one gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// FALSE or BROKEN decides; all TRUE gives TRUE.
    And { arity: usize, received: usize },
    /// TRUE or BROKEN decides; all FALSE gives FALSE.
    Or { arity: usize, received: usize },
    /// Negates its single argument.
    Not,
    /// Counts towards a threshold.
    Threshold(Threshold),
    /// Condition at index 0, branches at 1 and 2.
    If(Conditional),
}

impl Policy {
    /// Build the policy for a gate node.
    ///
    /// Leaves have no policy. NOT must have exactly one argument, IF exactly
    /// three, and GT/LT must carry a threshold.
    pub fn for_node(node: &Node) -> Result<Self, EvalFault> {
        let arity = node.args().len();
        let malformed = || EvalFault::Malformed {
            node_type: node.node_type(),
            arity,
        };

        Ok(match node.node_type() {
            NodeType::Leaf => return Err(malformed()),
            NodeType::And => Policy::And { arity, received: 0 },
            NodeType::Or => Policy::Or { arity, received: 0 },
            NodeType::Not if arity == 1 => Policy::Not,
            NodeType::If if arity == 3 => Policy::If(Conditional::default()),
            NodeType::Not | NodeType::If => return Err(malformed()),
            NodeType::Gt => {
                Policy::Threshold(Threshold::gt(node.threshold().ok_or_else(malformed)?, arity))
            }
            NodeType::Lt => {
                Policy::Threshold(Threshold::lt(node.threshold().ok_or_else(malformed)?, arity))
            }
        })
    }

    /// Decision available without reading further messages.
    pub fn decision(&self) -> Option<Outcome> {
        match self {
            Policy::And { arity, received } if received == arity => Some(Outcome::True),
            Policy::Or { arity, received } if received == arity => Some(Outcome::False),
            Policy::Threshold(threshold) => threshold.decision(),
            _ => None,
        }
    }

    /// Record one argument's outcome; returns the gate's outcome once it is
    /// determined.
    pub fn observe(&mut self, message: IndexedOutcome) -> Result<Option<Outcome>, EvalFault> {
        let outcome = message.outcome;
        Ok(match self {
            Policy::And { received, .. } => {
                *received += 1;
                match outcome {
                    Outcome::True => None,
                    decided => Some(decided),
                }
            }
            Policy::Or { received, .. } => {
                *received += 1;
                match outcome {
                    Outcome::False => None,
                    decided => Some(decided),
                }
            }
            Policy::Not => Some(outcome.negate()),
            Policy::Threshold(threshold) => threshold.observe(outcome),
            Policy::If(conditional) => conditional.observe(message)?,
        })
    }

    /// Outcome when every argument reported without a decision.
    pub fn exhausted(&self) -> Outcome {
        match self {
            Policy::And { .. } => Outcome::True,
            Policy::Or { .. } => Outcome::False,
            // A NOT decides on its only message.
            Policy::Not => Outcome::Broken,
            Policy::Threshold(_) => Outcome::False,
            Policy::If(_) => Outcome::Broken,
        }
    }
}

/// Direction of a threshold gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// More than `threshold` arguments are true.
    Above,
    /// Fewer than `threshold` arguments are true.
    Below,
}

/// Running counts of a GT/LT gate.
///
/// Counts are signed so that `arity - threshold` stays meaningful when the
/// threshold exceeds the arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Threshold {
    bound: Bound,
    threshold: i64,
    arity: i64,
    trues: i64,
    falses: i64,
}

impl Threshold {
    pub fn gt(threshold: usize, arity: usize) -> Self {
        Self::new(Bound::Above, threshold, arity)
    }

    pub fn lt(threshold: usize, arity: usize) -> Self {
        Self::new(Bound::Below, threshold, arity)
    }

    fn new(bound: Bound, threshold: usize, arity: usize) -> Self {
        Self {
            bound,
            threshold: saturate(threshold),
            arity: saturate(arity),
            trues: 0,
            falses: 0,
        }
    }

    fn observe(&mut self, outcome: Outcome) -> Option<Outcome> {
        match outcome {
            Outcome::True => self.trues += 1,
            Outcome::False => self.falses += 1,
            Outcome::Broken => return Some(Outcome::Broken),
        }
        self.decision()
    }

    fn decision(&self) -> Option<Outcome> {
        let slack = self.arity - self.threshold;
        match self.bound {
            Bound::Above if self.trues > self.threshold => Some(Outcome::True),
            Bound::Above if self.falses >= slack => Some(Outcome::False),
            Bound::Below if self.trues >= self.threshold => Some(Outcome::False),
            Bound::Below if self.falses > slack => Some(Outcome::True),
            _ => None,
        }
    }
}

/// Convert a count, clamping at `i64::MAX`.
///
/// A clamped threshold still lies beyond every reachable count, so the
/// decisions stay correct.
fn saturate(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Arrived values of an IF gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditional {
    condition: Option<Outcome>,
    then: Option<Outcome>,
    otherwise: Option<Outcome>,
}

impl Conditional {
    fn observe(&mut self, message: IndexedOutcome) -> Result<Option<Outcome>, EvalFault> {
        let value = message.outcome;
        Ok(match message.index {
            0 => {
                self.condition = Some(value);
                match value {
                    Outcome::Broken => Some(Outcome::Broken),
                    Outcome::True => self.then,
                    Outcome::False => self.otherwise,
                }
            }
            1 => {
                self.then = Some(value);
                if self.condition == Some(Outcome::True) || self.otherwise == Some(value) {
                    Some(value)
                } else {
                    None
                }
            }
            2 => {
                self.otherwise = Some(value);
                if self.condition == Some(Outcome::False) || self.then == Some(value) {
                    Some(value)
                } else {
                    None
                }
            }
            index => return Err(EvalFault::UnexpectedIndex(index)),
        })
    }
}
