//! Append-only arena with stable handles.
//!
//! Memo entries are created once and never removed, so unlike a slot arena
//! there is no free list: an [`EntryId`] stays valid for the lifetime of the
//! arena and indexes straight into the backing `Vec`.

use std::ops::{Index, IndexMut};

/// Stable handle to a value in an [`EntryArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct EntryArena<T> {
    entries: Vec<T>,
}

impl<T> EntryArena<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, value: T) -> EntryId {
        self.entries.push(value);
        EntryId(self.entries.len() - 1)
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.entries.get(id.0)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.entries.get_mut(id.0)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        id.0 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, value)| (EntryId(idx), value))
    }
}

impl<T> Default for EntryArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Panics if `id` was not issued by this arena.
impl<T> Index<EntryId> for EntryArena<T> {
    type Output = T;

    fn index(&self, id: EntryId) -> &T {
        &self.entries[id.0]
    }
}

impl<T> IndexMut<EntryId> for EntryArena<T> {
    fn index_mut(&mut self, id: EntryId) -> &mut T {
        &mut self.entries[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_arena_ids_are_stable() {
        let mut arena = EntryArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena[b], "b");

        for i in 0..100 {
            arena.insert("filler");
            assert!(arena.contains(EntryId(i + 2)));
        }
        assert_eq!(arena[a], "a");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn entry_arena_get_mut_and_iter() {
        let mut arena = EntryArena::with_capacity(4);
        assert!(arena.is_empty());
        assert!(arena.capacity() >= 4);
        let id = arena.insert(10);
        if let Some(v) = arena.get_mut(id) {
            *v = 20;
        }
        arena[id] += 1;
        let collected: Vec<_> = arena.iter().map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(collected, vec![(0, 21)]);
        assert_eq!(arena.get(EntryId(5)), None);
        assert!(!arena.contains(EntryId(1)));
    }
}
