//! Errors reported by elaboration.
//!
//! Every variant names the offending signals or blocks by hierarchical name so
//! the message is useful without access to the design.

use trellis_common::InternalError;
use trellis_ir::DesignError;

/// An elaboration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ElabError {
    /// The design itself was malformed.
    #[error(transparent)]
    Design(#[from] DesignError),

    /// Two slices covering overlapping bits are connected together or both written.
    #[error("overlapping slices `{first}` and `{second}`")]
    OverlappingSlice {
        /// The first slice.
        first: String,
        /// The second slice.
        second: String,
    },

    /// A net or signal is read but nothing drives some of its bits.
    #[error("`{net}` has no driver but is read by {}", .readers.join(", "))]
    NoDriver {
        /// The undriven net, named after its first member.
        net: String,
        /// Every step reading the undriven bits.
        readers: Vec<String>,
    },

    /// More than one driver writes the same bits.
    #[error("`{net}` has multiple drivers: {}", .drivers.join(", "))]
    MultipleDriver {
        /// The net or signal with conflicting drivers.
        net: String,
        /// Every contributing driver.
        drivers: Vec<String>,
    },

    /// Combinational steps depend on each other with no register in between.
    #[error("combinational cycle: {}", .blocks.join(" -> "))]
    CombinationalCycle {
        /// A minimal cycle, starting from its earliest-declared step.
        blocks: Vec<String>,
    },

    /// Ordering constraints among sequential blocks form a cycle.
    #[error("constraint cycle among sequential blocks: {}", .blocks.join(", "))]
    ConstraintCycle {
        /// The blocks that could not be ordered.
        blocks: Vec<String>,
    },

    /// A sequential block was constrained to run before a combinational step.
    #[error("sequential `{lhs}` cannot be ordered before combinational `{rhs}`")]
    CrossPhaseConstraint {
        /// The sequential side.
        lhs: String,
        /// The combinational side.
        rhs: String,
    },

    /// A bug in the elaborator.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
