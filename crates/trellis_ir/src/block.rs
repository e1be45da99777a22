//! Update blocks and the builder used to register them.

use crate::access::{BlockError, SignalAccess};
use crate::ids::{ComponentId, MethodId, SignalId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use trellis_common::{Bits, Ident};

/// Executable logic of an update block.
pub type BlockFn = Arc<dyn Fn(&mut dyn SignalAccess) -> Result<(), BlockError> + Send + Sync>;

/// Whether a block settles within a tick or updates on the clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Runs during Settle; writes are visible immediately.
    Combinational,
    /// Runs during Commit; writes are published together after all blocks ran.
    Sequential,
}

/// Builder describing an update block before registration.
#[derive(Clone)]
pub struct BlockSpec {
    pub(crate) owner: ComponentId,
    pub(crate) name: String,
    pub(crate) kind: BlockKind,
    pub(crate) reads: Vec<SignalId>,
    pub(crate) writes: Vec<SignalId>,
    pub(crate) calls: Vec<MethodId>,
    pub(crate) reset_values: Vec<(SignalId, Bits)>,
    pub(crate) logic: BlockFn,
}

impl BlockSpec {
    fn new<F>(owner: ComponentId, name: impl Into<String>, kind: BlockKind, logic: F) -> Self
    where
        F: Fn(&mut dyn SignalAccess) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self {
            owner,
            name: name.into(),
            kind,
            reads: Vec::new(),
            writes: Vec::new(),
            calls: Vec::new(),
            reset_values: Vec::new(),
            logic: Arc::new(logic),
        }
    }

    /// Starts a combinational block.
    pub fn combinational<F>(owner: ComponentId, name: impl Into<String>, logic: F) -> Self
    where
        F: Fn(&mut dyn SignalAccess) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self::new(owner, name, BlockKind::Combinational, logic)
    }

    /// Starts a sequential block.
    pub fn sequential<F>(owner: ComponentId, name: impl Into<String>, logic: F) -> Self
    where
        F: Fn(&mut dyn SignalAccess) -> Result<(), BlockError> + Send + Sync + 'static,
    {
        Self::new(owner, name, BlockKind::Sequential, logic)
    }

    /// Adds signals to the read set.
    pub fn reads(mut self, signals: impl IntoIterator<Item = SignalId>) -> Self {
        self.reads.extend(signals);
        self
    }

    /// Adds signals to the write set.
    pub fn writes(mut self, signals: impl IntoIterator<Item = SignalId>) -> Self {
        self.writes.extend(signals);
        self
    }

    /// Declares that the block calls a method port.
    pub fn calls(mut self, method: MethodId) -> Self {
        self.calls.push(method);
        self
    }

    /// Declares the value a write target takes while reset is asserted.
    pub fn reset_value(mut self, signal: SignalId, value: Bits) -> Self {
        self.reset_values.push((signal, value));
        self
    }
}

impl fmt::Debug for BlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockSpec")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A registered update block. Never mutated after registration.
#[derive(Clone)]
pub struct UpdateBlock {
    /// The owning component.
    pub owner: ComponentId,
    /// Block name, unique within the owner.
    pub name: Ident,
    /// Combinational or sequential.
    pub kind: BlockKind,
    /// Declared reads, including `rdy`/`ret` of called methods.
    pub reads: Vec<SignalId>,
    /// Declared writes, including `en`/`msg` of called methods.
    pub writes: Vec<SignalId>,
    /// Called method ports.
    pub calls: Vec<MethodId>,
    /// Declared reset values. Write targets not listed reset to zero.
    pub reset_values: Vec<(SignalId, Bits)>,
    /// The executable logic.
    pub logic: BlockFn,
}

impl fmt::Debug for UpdateBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateBlock")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}
