//! Interned names for components, signals and blocks.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Names are stored once in an [`Interner`] and referred to by a `u32` index,
/// giving O(1) equality and copying.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw index. Intended for tests.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32`, which always fits in `usize` on supported
// platforms. `try_from_usize` rejects values that do not fit in `u32`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Thread-safe string interner backed by [`lasso::ThreadedRodeo`].
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning the existing [`Ident`] if already present.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Joins resolved names with `.`, producing a hierarchical path such as
    /// `top.q.enq`.
    pub fn dotted(&self, parts: impl IntoIterator<Item = Ident>) -> String {
        let mut path = String::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                path.push('.');
            }
            path.push_str(self.resolve(part));
        }
        path
    }

    /// Returns the number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let interner = Interner::new();
        let id = interner.get_or_intern("enq.msg");
        assert_eq!(interner.resolve(id), "enq.msg");
    }

    #[test]
    fn same_string_same_ident() {
        let interner = Interner::new();
        assert_eq!(interner.get_or_intern("reset"), interner.get_or_intern("reset"));
    }

    #[test]
    fn get_does_not_intern() {
        let interner = Interner::new();
        assert_eq!(interner.get("missing"), None);
        let id = interner.get_or_intern("present");
        assert_eq!(interner.get("present"), Some(id));
    }

    #[test]
    fn dotted_paths() {
        let interner = Interner::new();
        let parts: Vec<Ident> = ["top", "q", "enq"]
            .iter()
            .map(|s| interner.get_or_intern(s))
            .collect();
        assert_eq!(interner.dotted(parts.iter().copied()), "top.q.enq");
        assert_eq!(interner.dotted(parts[..1].iter().copied()), "top");
        assert_eq!(interner.dotted(std::iter::empty()), "");
        assert_eq!(interner.len(), 3);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
