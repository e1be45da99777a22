//! Interfaces and method ports.
//!
//! An [`Interface`] is a named bundle of signals connected field-by-field. A
//! [`MethodPort`] is the fixed bundle `{en, rdy, msg?, ret?}` implementing a
//! non-blocking call protocol on top of ordinary signals.

use crate::ids::{ComponentId, SignalId, TypeId};
use crate::signal::Direction;
use serde::{Deserialize, Serialize};
use trellis_common::Ident;

/// One field of an interface declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name, unique within the interface.
    pub name: String,
    /// Field type.
    pub ty: TypeId,
    /// Field direction.
    pub direction: Direction,
}

impl FieldDecl {
    /// Creates a field declaration.
    pub fn new(name: impl Into<String>, ty: TypeId, direction: Direction) -> Self {
        Self {
            name: name.into(),
            ty,
            direction,
        }
    }
}

/// A declared interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    /// The interface instance name.
    pub name: Ident,
    /// The declaring component.
    pub owner: ComponentId,
    /// Field names and their signals, in declaration order.
    pub fields: Vec<(Ident, SignalId)>,
}

impl Interface {
    /// Looks up a field signal by interned name.
    pub fn field(&self, name: Ident) -> Option<SignalId> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| *s)
    }
}

/// Which side of the call protocol a method port implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodRole {
    /// Implements the method: `en`/`msg` are inputs, `rdy`/`ret` are outputs.
    Callee,
    /// Invokes the method: `en`/`msg` are outputs, `rdy`/`ret` are inputs.
    Caller,
}

impl MethodRole {
    /// Direction of the `en` and `msg` signals for this role.
    pub fn request_direction(self) -> Direction {
        match self {
            MethodRole::Callee => Direction::In,
            MethodRole::Caller => Direction::Out,
        }
    }
}

/// A method port: the signals of one non-blocking call protocol.
///
/// A call writes `msg` and raises `en`, and reads `ret`. It is legal only
/// while `rdy` is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPort {
    /// The method name.
    pub name: Ident,
    /// The declaring component.
    pub owner: ComponentId,
    /// Callee or caller side.
    pub role: MethodRole,
    /// 1-bit enable, high while the method is being called.
    pub en: SignalId,
    /// 1-bit ready, high while the method may be called.
    pub rdy: SignalId,
    /// Argument, if the method takes one.
    pub msg: Option<SignalId>,
    /// Return value, if the method produces one.
    pub ret: Option<SignalId>,
}
