//! Node lifetime: a generational arena with per-slot owning counts.
//!
//! Every node of the graph lives in an [`Arena`] slot and is named by a
//! [`RawId`] (slot index + generation). Ids are plain `Copy` observers;
//! only the explicit [`retain`](Arena::retain) / [`release`](Arena::release)
//! pair moves the owning count. When the count reaches zero the slot is
//! vacated and its generation bumped, so every outstanding id to it goes
//! stale instead of aliasing whatever is allocated there next.
//!
//! Ownership edges are kept acyclic by construction: parents own their
//! children (module → function → block → instruction) and users own only
//! their constant operands. Every upward or sideways link is an observer.

use std::ops::{Index, IndexMut};

/// Generational slot handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawId {
    index: u32,
    generation: u32,
}

impl RawId {
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// The handle no longer names a live slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StaleHandle(pub RawId);

/// Outcome of [`Arena::release`].
#[derive(Debug)]
pub enum Released<T> {
    /// Other owners remain; carries the remaining count.
    Alive(u32),
    /// That was the last owner; the payload has left the arena.
    Freed(T),
}

struct Entry<T> {
    data: T,
    strong: u32,
}

struct Slot<T> {
    generation: u32,
    entry: Option<Entry<T>>,
}

/// Generational arena with owning counts.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `data` with one owning handle held by the caller.
    pub fn alloc(&mut self, data: T) -> RawId {
        let entry = Some(Entry { data, strong: 1 });
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            return RawId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("arena exceeded u32::MAX slots"));
        self.slots.push(Slot {
            generation: 0,
            entry,
        });
        RawId {
            index,
            generation: 0,
        }
    }

    fn entry(&self, id: RawId) -> Option<&Entry<T>> {
        let slot = self.slots.get(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: RawId) -> Option<&mut Entry<T>> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: RawId) -> bool {
        self.entry(id).is_some()
    }

    #[inline]
    pub fn get(&self, id: RawId) -> Option<&T> {
        self.entry(id).map(|e| &e.data)
    }

    #[inline]
    pub fn get_mut(&mut self, id: RawId) -> Option<&mut T> {
        self.entry_mut(id).map(|e| &mut e.data)
    }

    /// Number of owning handles, `None` if stale.
    pub fn strong_count(&self, id: RawId) -> Option<u32> {
        self.entry(id).map(|e| e.strong)
    }

    /// Copy an owning handle.
    pub fn retain(&mut self, id: RawId) -> Result<u32, StaleHandle> {
        let entry = self.entry_mut(id).ok_or(StaleHandle(id))?;
        entry.strong += 1;
        Ok(entry.strong)
    }

    /// Drop an owning handle, vacating the slot when it was the last one.
    pub fn release(&mut self, id: RawId) -> Result<Released<T>, StaleHandle> {
        let entry = self.entry_mut(id).ok_or(StaleHandle(id))?;
        entry.strong -= 1;
        if entry.strong > 0 {
            return Ok(Released::Alive(entry.strong));
        }
        self.take(id).map(Released::Freed).ok_or(StaleHandle(id))
    }

    /// Vacate a slot regardless of its owning count.
    ///
    /// Used when a whole subgraph is dropped together.
    pub fn take(&mut self, id: RawId) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(entry.data)
    }

    /// Number of live slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate live slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (RawId, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let entry = slot.entry.as_ref()?;
            let index = u32::try_from(i).ok()?;
            Some((
                RawId {
                    index,
                    generation: slot.generation,
                },
                &entry.data,
            ))
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<RawId> for Arena<T> {
    type Output = T;

    fn index(&self, id: RawId) -> &T {
        match self.get(id) {
            Some(data) => data,
            None => panic!("stale arena handle {id:?}"),
        }
    }
}

impl<T> IndexMut<RawId> for Arena<T> {
    fn index_mut(&mut self, id: RawId) -> &mut T {
        match self.get_mut(id) {
            Some(data) => data,
            None => panic!("stale arena handle {id:?}"),
        }
    }
}
