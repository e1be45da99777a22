//! The Trellis design model.
//!
//! This crate holds everything a collaborator declares before elaboration:
//! the component hierarchy, typed signals with eager composite expansion and
//! memoized slices, constants, interfaces and method ports, connection
//! requests, update blocks with their declared read/write sets, and explicit
//! ordering constraints. [`Design`] is the builder tying these together.

#![warn(missing_docs)]

pub mod access;
pub mod arena;
pub mod block;
pub mod component;
pub mod constraint;
pub mod design;
pub mod error;
pub mod ids;
pub mod interface;
pub mod signal;
pub mod types;

pub use access::{BlockError, SignalAccess};
pub use arena::{Arena, ArenaId};
pub use block::{BlockFn, BlockKind, BlockSpec, UpdateBlock};
pub use component::{Component, Const};
pub use constraint::{Constraint, ConstraintSide};
pub use design::{Design, Endpoint};
pub use error::DesignError;
pub use ids::*;
pub use interface::{FieldDecl, Interface, MethodPort, MethodRole};
pub use signal::{Direction, Signal, SignalShape};
pub use types::{Type, TypeDb};
