use std::fmt;

use crate::{Error, Result};

/// Handle into a [`SlotArena`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out dense ids, reusing released ones most-recent first.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    next: u32,
    free: Vec<u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self) -> u32 {
        match self.free.pop() {
            Some(id) => id,
            None => {
                let id = self.next;
                self.next += 1;
                id
            }
        }
    }

    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next, "freeing id {id} that was never generated");
        debug_assert!(!self.free.contains(&id), "id {id} freed twice");
        self.free.push(id);
    }

    /// Ids handed out at least once.
    pub fn high_water_mark(&self) -> u32 {
        self.next
    }

    pub fn has_free(&self) -> bool {
        !self.free.is_empty()
    }

    pub fn reset(&mut self) {
        self.next = 0;
        self.free.clear();
    }
}

/// Fixed-capacity slot array keyed by generated ids.
///
/// The arena never grows. Lookups of ids that were never handed out, or were
/// already removed, return [`Error::InvalidId`].
pub struct SlotArena<T> {
    name: &'static str,
    slots: Vec<Option<T>>,
    ids: IdGenerator,
    capacity: usize,
    len: usize,
}

impl<T> SlotArena<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            slots: Vec::with_capacity(capacity),
            ids: IdGenerator::new(),
            capacity,
            len: 0,
        }
    }

    pub fn add(&mut self, value: T) -> Result<ResourceId> {
        if !self.ids.has_free() && self.ids.high_water_mark() as usize >= self.capacity {
            return Err(Error::CapacityExceeded {
                container: self.name,
                capacity: self.capacity,
            });
        }

        let id = self.ids.generate();
        let index = id as usize;
        if index == self.slots.len() {
            self.slots.push(Some(value));
        } else {
            self.slots[index] = Some(value);
        }
        self.len += 1;
        Ok(ResourceId(id))
    }

    /// Clears the slot and releases its id for reuse.
    pub fn remove(&mut self, id: ResourceId) -> Result<T> {
        let value = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidId {
                container: self.name,
                id: id.0,
            })?;
        self.ids.free(id.0);
        self.len -= 1;
        Ok(value)
    }

    pub fn get(&self, id: ResourceId) -> Result<&T> {
        self.slots
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidId {
                container: self.name,
                id: id.0,
            })
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.get(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Drops every stored value, most recently created slot first.
    pub fn clear(&mut self) {
        while let Some(slot) = self.slots.pop() {
            drop(slot);
        }
        self.ids.reset();
        self.len = 0;
    }
}

impl<T: Clone> SlotArena<T> {
    /// Shared handle for transient use, e.g. during one frame.
    pub fn get_cloned(&self, id: ResourceId) -> Result<T> {
        self.get(id).cloned()
    }
}

impl<T> Drop for SlotArena<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── id generator ──────────────────────────────────────────────────────

    #[test]
    fn generator_reuses_last_freed_first() {
        let mut ids = IdGenerator::new();
        let a = ids.generate();
        let b = ids.generate();
        let c = ids.generate();
        assert_eq!((a, b, c), (0, 1, 2));

        ids.free(a);
        ids.free(c);
        assert_eq!(ids.generate(), c);
        assert_eq!(ids.generate(), a);
        assert_eq!(ids.generate(), 3);
    }

    // ── arena ─────────────────────────────────────────────────────────────

    #[test]
    fn full_arena_reuses_removed_id() {
        let mut arena = SlotArena::new("meshes", 3);
        let ids: Vec<_> = (0..3).map(|i| arena.add(i).unwrap()).collect();
        assert_eq!(arena.len(), 3);

        assert_eq!(arena.remove(ids[1]).unwrap(), 1);
        let reused = arena.add(10).unwrap();
        assert_eq!(reused, ids[1]);
        assert_eq!(*arena.get(reused).unwrap(), 10);
    }

    #[test]
    fn adding_beyond_capacity_fails() {
        let mut arena = SlotArena::new("psos", 2);
        arena.add('a').unwrap();
        arena.add('b').unwrap();

        let err = arena.add('c').unwrap_err();
        assert!(matches!(
            err,
            Error::CapacityExceeded {
                container: "psos",
                capacity: 2
            }
        ));
        assert_eq!(arena.len(), 2);
        assert_eq!(*arena.get(ResourceId(0)).unwrap(), 'a');
        assert_eq!(*arena.get(ResourceId(1)).unwrap(), 'b');
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut arena = SlotArena::new("meshes", 4);
        assert!(matches!(
            arena.get(ResourceId(0)),
            Err(Error::InvalidId { id: 0, .. })
        ));

        let id = arena.add("mesh").unwrap();
        arena.remove(id).unwrap();
        assert!(arena.get(id).is_err());
        assert!(arena.remove(id).is_err());
        assert!(!arena.contains(ResourceId(99)));
    }

    #[test]
    fn get_cloned_shares_the_stored_handle() {
        let mut arena = SlotArena::new("root signatures", 1);
        let id = arena.add(std::rc::Rc::new(5)).unwrap();

        let handle = arena.get_cloned(id).unwrap();
        assert_eq!(std::rc::Rc::strong_count(&handle), 2);
        drop(handle);

        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.add(std::rc::Rc::new(6)).is_ok());
    }
}
