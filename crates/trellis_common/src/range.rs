//! Half-open bit ranges used for slices and storage locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of bit indices `[start, stop)`.
///
/// Slices, storage locations, and write targets are all described by a
/// `BitRange` relative to the root signal they belong to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct BitRange {
    /// The lowest bit index (inclusive).
    pub start: u32,
    /// One past the highest bit index (exclusive).
    pub stop: u32,
}

impl BitRange {
    /// Creates a range `[start, stop)`.
    pub fn new(start: u32, stop: u32) -> Self {
        Self { start, stop }
    }

    /// Creates the range covering every bit of a `width`-bit value.
    pub fn full(width: u32) -> Self {
        Self {
            start: 0,
            stop: width,
        }
    }

    /// Returns the number of bits covered.
    pub fn width(self) -> u32 {
        self.stop.saturating_sub(self.start)
    }

    /// Returns `true` if the range covers no bits.
    pub fn is_empty(self) -> bool {
        self.stop <= self.start
    }

    /// Two ranges intersect iff neither lies strictly before the other.
    pub fn overlaps(self, other: BitRange) -> bool {
        if self.start <= other.start {
            other.start < self.stop
        } else {
            self.start < other.stop
        }
    }

    /// Returns `true` if `other` lies entirely within `self`.
    pub fn contains(self, other: BitRange) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }

    /// Returns `true` if this range lies within a value of the given width.
    pub fn fits(self, width: u32) -> bool {
        !self.is_empty() && self.stop <= width
    }

    /// Shifts the range up by `offset` bits.
    pub fn offset(self, offset: u32) -> Self {
        Self {
            start: self.start + offset,
            stop: self.stop + offset,
        }
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.start, self.stop)
    }
}
