//! Shared foundational types used across the Trellis simulation kernel.
//!
//! This crate provides interned identifiers, fixed-width 2-state bit vectors,
//! half-open bit ranges with overlap tests, content hashing, and the internal
//! error type shared by every pipeline stage.

#![warn(missing_docs)]

pub mod bits;
pub mod hash;
pub mod ident;
pub mod range;
pub mod result;

pub use bits::{Bits, BitsError};
pub use hash::{ContentHash, ContentHasher};
pub use ident::{Ident, Interner};
pub use range::BitRange;
pub use result::InternalError;
