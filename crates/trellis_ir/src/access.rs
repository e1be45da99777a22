//! The interface update blocks execute against.
//!
//! Block logic never touches storage directly. It reads and writes signals
//! through a [`SignalAccess`] implementation supplied by the simulation kernel,
//! which enforces the block's declared read and write sets.

use crate::ids::SignalId;
use crate::interface::MethodPort;
use trellis_common::{Bits, BitsError};

/// Errors raised while a block's logic runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// The block read a signal missing from its declared read set.
    #[error("read of undeclared signal `{signal}`")]
    UndeclaredRead {
        /// Hierarchical signal name.
        signal: String,
    },

    /// The block wrote a signal missing from its declared write set.
    #[error("write of undeclared signal `{signal}`")]
    UndeclaredWrite {
        /// Hierarchical signal name.
        signal: String,
    },

    /// A written value does not match the signal width.
    #[error("width mismatch writing `{signal}`: expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// Hierarchical signal name.
        signal: String,
        /// The signal width.
        expected: u32,
        /// The width of the written value.
        actual: u32,
    },

    /// A method was called while its `rdy` signal was low.
    #[error("method `{method}` called while not ready")]
    MethodNotReady {
        /// Hierarchical method name.
        method: String,
    },

    /// A method taking an argument was called without one.
    #[error("method `{method}` requires an argument")]
    MissingArgument {
        /// Hierarchical method name.
        method: String,
    },

    /// A bit-vector operation failed.
    #[error(transparent)]
    Bits(#[from] BitsError),

    /// Block-specific failure raised by user logic.
    #[error("{0}")]
    Logic(String),
}

/// Read/write access to signals from inside an update block.
pub trait SignalAccess {
    /// Reads the current value of a declared read.
    fn read(&self, signal: SignalId) -> Result<Bits, BlockError>;

    /// Writes a declared write target.
    fn write(&mut self, signal: SignalId, value: Bits) -> Result<(), BlockError>;

    /// Returns the width of a signal, or `None` if the ID is unknown.
    fn width(&self, signal: SignalId) -> Option<u32>;

    /// Returns the hierarchical name of a signal.
    fn signal_name(&self, signal: SignalId) -> String;

    /// Reads a signal of at most 64 bits as an integer.
    fn read_u64(&self, signal: SignalId) -> Result<u64, BlockError> {
        Ok(self.read(signal)?.to_u64()?)
    }

    /// Reads a signal as a boolean: `true` iff any bit is set.
    fn read_bool(&self, signal: SignalId) -> Result<bool, BlockError> {
        Ok(!self.read(signal)?.is_zero())
    }

    /// Writes an integer, truncated to the signal width.
    fn write_u64(&mut self, signal: SignalId, value: u64) -> Result<(), BlockError> {
        let width = self.width(signal).ok_or_else(|| BlockError::UndeclaredWrite {
            signal: self.signal_name(signal),
        })?;
        self.write(signal, Bits::from_u64(value, width))
    }

    /// Writes a 1-bit boolean.
    fn write_bool(&mut self, signal: SignalId, value: bool) -> Result<(), BlockError> {
        self.write_u64(signal, u64::from(value))
    }

    /// Invokes a method port.
    ///
    /// Fails with [`BlockError::MethodNotReady`] if `rdy` is low. Otherwise
    /// raises `en`, drives `msg` with `arg`, and returns `ret` if the method
    /// has one.
    fn call(&mut self, port: &MethodPort, arg: Option<Bits>) -> Result<Option<Bits>, BlockError> {
        if !self.read_bool(port.rdy)? {
            return Err(BlockError::MethodNotReady {
                method: method_name(self, port),
            });
        }
        self.write_bool(port.en, true)?;
        if let Some(msg) = port.msg {
            let arg = arg.ok_or_else(|| BlockError::MissingArgument {
                method: method_name(self, port),
            })?;
            self.write(msg, arg)?;
        }
        match port.ret {
            Some(ret) => Ok(Some(self.read(ret)?)),
            None => Ok(None),
        }
    }

    /// Leaves a method port uncalled for this evaluation by lowering `en`.
    fn idle(&mut self, port: &MethodPort) -> Result<(), BlockError> {
        self.write_bool(port.en, false)
    }
}

fn method_name<A: SignalAccess + ?Sized>(access: &A, port: &MethodPort) -> String {
    let en = access.signal_name(port.en);
    match en.strip_suffix(".en") {
        Some(base) => base.to_string(),
        None => en,
    }
}
