//! Signal definitions.
//!
//! A [`Signal`] is a named, typed storage location owned by one component.
//! Composite signals (structs and arrays) are expanded into child signals when
//! declared; slices are leaf signals that view a bit range of a root leaf.

use crate::ids::{ComponentId, SignalId, TypeId};
use serde::{Deserialize, Serialize};
use trellis_common::{BitRange, Ident};

/// The direction tag of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// An internal wire.
    Wire,
    /// An input port.
    In,
    /// An output port.
    Out,
}

impl Direction {
    /// Returns the opposite port direction. Wires stay wires.
    pub fn flip(self) -> Self {
        match self {
            Direction::Wire => Direction::Wire,
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// Returns `true` for `In` and `Out`.
    pub fn is_port(self) -> bool {
        !matches!(self, Direction::Wire)
    }
}

/// How a signal relates to the rest of its signal tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalShape {
    /// A plain bit-vector signal with its own storage.
    Leaf,
    /// A view onto `range` of the root leaf `root`.
    Slice {
        /// The root leaf the slice lies in.
        root: SignalId,
        /// The sliced bits, relative to the root.
        range: BitRange,
    },
    /// A struct expanded into one child per field, in declaration order.
    Struct {
        /// Field names and the child signals carrying them.
        fields: Vec<(Ident, SignalId)>,
    },
    /// An array expanded into one child per element.
    Array {
        /// The element signals, indexed from zero.
        elements: Vec<SignalId>,
    },
}

/// A signal within a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    /// The path of this signal inside its owner, such as `enq.msg` or `x[0:4]`.
    pub name: Ident,
    /// The declaring component.
    pub owner: ComponentId,
    /// The type of this signal.
    pub ty: TypeId,
    /// The total bit width.
    pub width: u32,
    /// The direction tag, inherited by every child and slice.
    pub direction: Direction,
    /// Leaf, slice, or composite structure.
    pub shape: SignalShape,
    /// The enclosing composite signal, if this is a field or element.
    pub parent: Option<SignalId>,
}

impl Signal {
    /// Returns `true` for plain bit vectors and slices.
    pub fn is_leaf(&self) -> bool {
        matches!(self.shape, SignalShape::Leaf | SignalShape::Slice { .. })
    }

    /// Returns `true` if this signal is a slice of another leaf.
    pub fn is_slice(&self) -> bool {
        matches!(self.shape, SignalShape::Slice { .. })
    }

    /// Returns the root leaf and bit range this signal occupies, if it is a leaf.
    ///
    /// `id` must be the ID this signal was allocated under.
    pub fn root_range(&self, id: SignalId) -> Option<(SignalId, BitRange)> {
        match &self.shape {
            SignalShape::Leaf => Some((id, BitRange::full(self.width))),
            SignalShape::Slice { root, range } => Some((*root, *range)),
            _ => None,
        }
    }
}
