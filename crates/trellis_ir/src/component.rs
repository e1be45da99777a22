//! Components and constants.
//!
//! A [`Component`] is a node of the design hierarchy. It owns the signals,
//! interfaces, method ports, constants and update blocks declared on it.

use crate::ids::{ComponentId, SignalId};
use serde::{Deserialize, Serialize};
use trellis_common::{Bits, Ident};

/// A node of the design hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// The instance name, such as `q`.
    pub name: Ident,
    /// The enclosing component, `None` for the top.
    pub parent: Option<ComponentId>,
    /// Sub-components in declaration order.
    pub children: Vec<ComponentId>,
    /// Top-level signals declared on this component, in declaration order.
    pub signals: Vec<SignalId>,
    /// The implicit 1-bit `reset` input.
    pub reset: SignalId,
}

/// An immutable literal bound into the connection graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Const {
    /// The component that introduced the constant.
    pub owner: ComponentId,
    /// The value driven onto every signal it is connected to.
    pub value: Bits,
}
