//! Content fingerprints for elaborated artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit XXH3 fingerprint.
///
/// Elaboration fingerprints its schedule so repeated runs over the same design
/// can be compared without walking both step lists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes a byte slice in one call.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Incremental builder for a [`ContentHash`].
///
/// Feeding the same sequence of values always yields the same hash as
/// [`ContentHash::from_bytes`] over their concatenated little-endian bytes.
#[derive(Clone)]
pub struct ContentHasher {
    state: Xxh3,
}

impl ContentHasher {
    /// Starts an empty hash.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds raw bytes.
    pub fn write(&mut self, bytes: &[u8]) -> &mut Self {
        self.state.update(bytes);
        self
    }

    /// Feeds one tag byte.
    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.write(&[value])
    }

    /// Feeds a `u32` in little-endian order.
    pub fn write_u32(&mut self, value: u32) -> &mut Self {
        self.write(&value.to_le_bytes())
    }

    /// Returns the hash of everything fed so far.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.state.digest128().to_le_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_is_deterministic() {
        let a = ContentHash::from_bytes(b"comb:0,1;seq:2");
        let b = ContentHash::from_bytes(b"comb:0,1;seq:2");
        assert_eq!(a, b);
        assert_ne!(a, ContentHash::from_bytes(b"comb:1,0;seq:2"));
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut h = ContentHasher::new();
        h.write_u8(1).write_u32(0x0403_0201).write(b"xy");
        assert_eq!(h.finish(), ContentHash::from_bytes(&[1, 1, 2, 3, 4, b'x', b'y']));
    }

    #[test]
    fn streaming_is_order_sensitive() {
        let mut a = ContentHasher::new();
        a.write_u32(0).write_u32(1);
        let mut b = ContentHasher::new();
        b.write_u32(1).write_u32(0);
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::from_bytes(b"schedule").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        let d = format!("{:?}", ContentHash::from_bytes(b"schedule"));
        assert!(d.starts_with("ContentHash(") && d.ends_with("..)"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::from_bytes(b"serde");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
