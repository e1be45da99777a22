//! Fixed-width 2-state bit vectors carried on signals.

use crate::range::BitRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by out-of-range bit operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitsError {
    /// A range does not fit inside the value it addresses.
    #[error("bit range {range} out of range for width {width}")]
    OutOfRange {
        /// The offending range.
        range: BitRange,
        /// The width of the value being accessed.
        width: u32,
    },

    /// The value is too wide to convert to a machine integer.
    #[error("{width}-bit value does not fit in 64 bits")]
    TooWide {
        /// The width of the value.
        width: u32,
    },
}

/// A fixed-width vector of 2-state bits.
///
/// Values are opaque to the kernel: it only copies, slices and splices them.
/// Bits are packed 64 per `u64` word, least significant bit first. Bits beyond
/// `width` in the last word are always zero.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bits {
    width: u32,
    data: Vec<u64>,
}

/// Number of bits packed per u64 word.
const BITS_PER_WORD: u32 = 64;

impl Bits {
    /// Creates a zero-valued vector of the given width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a single-bit vector from a boolean.
    pub fn from_bool(value: bool) -> Self {
        Self::from_u64(u64::from(value), 1)
    }

    /// Creates a vector from a `u64`, truncating bits beyond `width`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        if let Some(word) = v.data.first_mut() {
            *word = value;
        }
        v.mask_top();
        v
    }

    /// Returns the number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.data[(index / BITS_PER_WORD) as usize];
        (word >> (index % BITS_PER_WORD)) & 1 != 0
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: bool) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = &mut self.data[(index / BITS_PER_WORD) as usize];
        let mask = 1u64 << (index % BITS_PER_WORD);
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Converts to a `u64`.
    pub fn to_u64(&self) -> Result<u64, BitsError> {
        if self.width > BITS_PER_WORD {
            return Err(BitsError::TooWide { width: self.width });
        }
        Ok(self.data.first().copied().unwrap_or(0))
    }

    /// Returns `true` if every bit is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|w| *w == 0)
    }

    /// Extracts the bits in `range` as a new vector.
    pub fn slice(&self, range: BitRange) -> Result<Bits, BitsError> {
        if !range.fits(self.width) {
            return Err(BitsError::OutOfRange {
                range,
                width: self.width,
            });
        }
        let mut out = Bits::new(range.width());
        for i in 0..range.width() {
            if self.get(range.start + i) {
                out.set(i, true);
            }
        }
        Ok(out)
    }

    /// Overwrites the bits starting at `start` with `value`.
    pub fn splice(&mut self, start: u32, value: &Bits) -> Result<(), BitsError> {
        let range = BitRange::new(start, start + value.width);
        if !range.fits(self.width) {
            return Err(BitsError::OutOfRange {
                range,
                width: self.width,
            });
        }
        for i in 0..value.width {
            self.set(start + i, value.get(i));
        }
        Ok(())
    }

    fn mask_top(&mut self) {
        let rem = self.width % BITS_PER_WORD;
        if rem != 0 {
            if let Some(last) = self.data.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", if self.get(i) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{self}", self.width)
    }
}

/// Returns the number of u64 words needed to store `width` bits.
fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zero() {
        let v = Bits::new(12);
        assert_eq!(v.width(), 12);
        assert!(v.is_zero());
        assert_eq!(v.to_u64().unwrap(), 0);
    }

    #[test]
    fn from_u64_truncates() {
        let v = Bits::from_u64(0x1ff, 8);
        assert_eq!(v.to_u64().unwrap(), 0xff);
    }

    #[test]
    fn get_set() {
        let mut v = Bits::new(70);
        v.set(0, true);
        v.set(69, true);
        assert!(v.get(0));
        assert!(v.get(69));
        assert!(!v.get(35));
        v.set(0, false);
        assert!(!v.get(0));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        Bits::new(4).get(4);
    }

    #[test]
    fn too_wide_for_u64() {
        let v = Bits::new(65);
        assert_eq!(v.to_u64(), Err(BitsError::TooWide { width: 65 }));
    }

    #[test]
    fn slice_extracts_bits() {
        let v = Bits::from_u64(0b1011_0110, 8);
        let s = v.slice(BitRange::new(2, 6)).unwrap();
        assert_eq!(s.width(), 4);
        assert_eq!(s.to_u64().unwrap(), 0b1101);
    }

    #[test]
    fn slice_out_of_range() {
        let v = Bits::new(8);
        let err = v.slice(BitRange::new(4, 9)).unwrap_err();
        assert_eq!(
            err,
            BitsError::OutOfRange {
                range: BitRange::new(4, 9),
                width: 8
            }
        );
    }

    #[test]
    fn splice_overwrites_window() {
        let mut v = Bits::from_u64(0xff, 8);
        v.splice(2, &Bits::from_u64(0, 3)).unwrap();
        assert_eq!(v.to_u64().unwrap(), 0b1110_0011);
    }

    #[test]
    fn splice_out_of_range() {
        let mut v = Bits::new(4);
        assert!(v.splice(2, &Bits::new(3)).is_err());
    }

    #[test]
    fn display_is_msb_first() {
        let mut v = Bits::new(6);
        v.set(5, true);
        v.set(0, true);
        assert_eq!(v.to_string(), "100001");
    }

    #[test]
    fn debug_shows_width() {
        let v = Bits::from_u64(5, 4);
        assert_eq!(format!("{v:?}"), "4'b0101");
    }

    #[test]
    fn serde_roundtrip() {
        let v = Bits::from_u64(0xabcd, 16);
        let json = serde_json::to_string(&v).unwrap();
        let back: Bits = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
