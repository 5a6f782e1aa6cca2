//! Generational arena keyed by typed handles.
//!
//! Bodies live in arenas so the world, the force registries and an external
//! renderer can all refer to the same body by a small `Copy` handle without
//! shared ownership. Removing an entry bumps its slot's generation, which
//! turns every outstanding handle to it into a miss instead of a silent alias.

use std::marker::PhantomData;

use ape_types::ArenaHandle;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage for `T`, addressed by handles of type `H`.
#[derive(Debug, Clone)]
pub struct Arena<H, T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
    _handle: PhantomData<fn() -> H>,
}

impl<H: ArenaHandle, T> Default for Arena<H, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ArenaHandle, T> Arena<H, T> {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _handle: PhantomData,
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store `value` and return its handle. Freed slots are reused first.
    pub fn insert(&mut self, value: T) -> H {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return H::from_raw_parts(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        H::from_raw_parts(index, 0)
    }

    /// Remove and return the entry behind `handle`, if it is still live.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.slot_mut(handle)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(value)
    }

    /// Whether `handle` refers to a live entry.
    #[must_use]
    pub fn contains(&self, handle: H) -> bool {
        self.get(handle).is_some()
    }

    /// Shared access to a live entry.
    #[must_use]
    pub fn get(&self, handle: H) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Exclusive access to a live entry.
    #[must_use]
    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        self.slot_mut(handle)?.value.as_mut()
    }

    /// Drop every entry. Outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(u32::try_from(index).unwrap_or(u32::MAX));
        }
        // Reuse low indices first.
        self.free.reverse();
        self.len = 0;
    }

    /// Iterate over live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            Some((Self::handle_at(index, slot.generation), value))
        })
    }

    /// Iterate mutably over live entries in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (H, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            let value = slot.value.as_mut()?;
            Some((Self::handle_at(index, generation), value))
        })
    }

    /// Handles of all live entries in slot order.
    pub fn handles(&self) -> impl Iterator<Item = H> + '_ {
        self.iter().map(|(handle, _)| handle)
    }

    /// Iterate over live entries only, without handles.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }

    /// Iterate mutably over live entries only, without handles.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }

    fn slot_mut(&mut self, handle: H) -> Option<&mut Slot<T>> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        (slot.generation == handle.generation()).then_some(slot)
    }

    fn handle_at(index: usize, generation: u32) -> H {
        H::from_raw_parts(u32::try_from(index).unwrap_or(u32::MAX), generation)
    }
}

#[cfg(feature = "parallel")]
impl<H: ArenaHandle, T: Send> Arena<H, T> {
    /// Mutable parallel iteration over live entries.
    pub fn par_values_mut(&mut self) -> impl ParallelIterator<Item = &mut T> {
        self.slots
            .par_iter_mut()
            .filter_map(|slot| slot.value.as_mut())
    }
}
