//! Simulation error types.
//!
//! All errors that can occur while building or driving a [`SimKernel`] are
//! represented as variants of [`SimError`].
//!
//! [`SimKernel`]: crate::SimKernel

use trellis_common::BitsError;
use trellis_elaborate::ElabError;
use trellis_ir::BlockError;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// The design failed to elaborate.
    #[error(transparent)]
    Elaboration(#[from] ElabError),

    /// An update block failed. The kernel is halted afterwards.
    #[error("block `{block}` failed at tick {tick}: {source}")]
    Block {
        /// The tick being executed.
        tick: u64,
        /// Hierarchical block name.
        block: String,
        /// What the block reported.
        #[source]
        source: BlockError,
    },

    /// A previous failure halted the kernel.
    #[error("kernel halted after a failure at tick {tick}")]
    Halted {
        /// The tick at which the kernel failed.
        tick: u64,
    },

    /// The signal is not a top-level port.
    #[error("`{signal}` is not a top-level port")]
    NotBoundary {
        /// Hierarchical signal name.
        signal: String,
    },

    /// The signal is not a top-level input.
    #[error("`{signal}` is not a top-level input")]
    NotWritable {
        /// Hierarchical signal name.
        signal: String,
    },

    /// The signal is a struct or array; only its leaves carry values.
    #[error("`{signal}` is a composite signal")]
    NotLeaf {
        /// Hierarchical signal name.
        signal: String,
    },

    /// A boundary write has the wrong width.
    #[error("width mismatch writing `{signal}`: expected {expected} bits, got {actual}")]
    WidthMismatch {
        /// Hierarchical signal name.
        signal: String,
        /// The signal width.
        expected: u32,
        /// The width of the written value.
        actual: u32,
    },

    /// No signal has the given name or ID.
    #[error("unknown signal `{name}`")]
    UnknownSignal {
        /// The name or ID that failed to resolve.
        name: String,
    },

    /// `run_until` gave up.
    #[error("condition not reached within {limit} ticks")]
    TickLimitExceeded {
        /// The configured limit.
        limit: u64,
    },

    /// A storage access or value conversion failed.
    #[error(transparent)]
    Bits(#[from] BitsError),
}
