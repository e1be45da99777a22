//! Opaque ID newtypes for every design and netlist entity.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`. Ordering follows allocation order, so comparing
//! two IDs of the same kind compares their declaration order.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the raw index as a `usize`, for indexing flat tables.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl ArenaId for $name {
            const KIND: &'static str = $kind;

            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a component in the hierarchy.
    ComponentId,
    "component"
);

define_id!(
    /// Opaque, copyable ID for a signal (leaf, slice, or composite).
    SignalId,
    "signal"
);

define_id!(
    /// Opaque, copyable ID for a constant bound into the connection graph.
    ConstId,
    "const"
);

define_id!(
    /// Opaque, copyable ID for a named interface bundle.
    InterfaceId,
    "interface"
);

define_id!(
    /// Opaque, copyable ID for a method port.
    MethodId,
    "method"
);

define_id!(
    /// Opaque, copyable ID for an update block.
    BlockId,
    "block"
);

define_id!(
    /// Opaque, copyable ID for an ordering constraint.
    ConstraintId,
    "constraint"
);

define_id!(
    /// Opaque, copyable ID for an interned type in the [`TypeDb`](crate::types::TypeDb).
    TypeId,
    "type"
);

define_id!(
    /// Opaque, copyable ID for a resolved net.
    NetId,
    "net"
);

define_id!(
    /// Opaque, copyable ID for a storage cell in an elaborated netlist.
    CellId,
    "cell"
);
