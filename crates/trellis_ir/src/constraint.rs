//! Explicit ordering constraints between update-block events.

use crate::ids::{BlockId, MethodId, SignalId};
use serde::{Deserialize, Serialize};

/// One side of an ordering constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintSide {
    /// A specific update block.
    Block(BlockId),
    /// Every step reading a location that overlaps the signal.
    Read(SignalId),
    /// Every step writing a location that overlaps the signal.
    Write(SignalId),
    /// Every block calling the method port, or one connected to it.
    Call(MethodId),
}

/// An ordering edge: every step matched by `lhs` runs before every step
/// matched by `rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The earlier side.
    pub lhs: ConstraintSide,
    /// The later side.
    pub rhs: ConstraintSide,
}
