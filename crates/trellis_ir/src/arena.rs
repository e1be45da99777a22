//! Append-only storage for design entities.
//!
//! IDs are handed out in allocation order, which doubles as declaration order
//! for every entity the scheduler breaks ties on. Entities are never removed,
//! so an ID stays valid for the life of its [`Design`](crate::Design).

use crate::error::DesignError;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// An ID type that keys an [`Arena`].
pub trait ArenaId: Copy {
    /// Entity name reported by [`DesignError::UnknownReference`].
    const KIND: &'static str;

    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

/// Entities of one kind, indexed by their ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Appends an entity and returns its ID.
    pub fn alloc(&mut self, item: T) -> I {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    /// The ID the next [`Arena::alloc`] will return.
    pub fn next_id(&self) -> I {
        I::from_raw(self.items.len() as u32)
    }

    /// Returns the entity, or `UnknownReference` if `id` came from elsewhere.
    pub fn lookup(&self, id: I) -> Result<&T, DesignError> {
        self.items
            .get(id.as_raw() as usize)
            .ok_or(DesignError::UnknownReference {
                kind: I::KIND,
                index: id.as_raw(),
            })
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over entities with their IDs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }

    /// Iterates over IDs in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = I> {
        (0..self.items.len() as u32).map(I::from_raw)
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }
}
