//! Generational handles into native-owned storage
//!
//! Handles are lightweight (8 bytes) references to objects the native store
//! owns. The generation counter makes a stale copy of a handle detectable
//! after its slot has been recycled.

use serde::{Deserialize, Serialize};

/// Opaque handle (generation-indexed for safety)
///
/// Format: [32-bit index | 32-bit generation]
/// - Index: Position in the owning table's slot array
/// - Generation: Incremented when the slot is released
///
/// Entity handles, per-type component handles and asset handles are distinct
/// numeric spaces; a handle is only meaningful to the table that issued it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Every bit set. Never issued by [`HandleAllocator`], so a native call
    /// routed to it can never land on a real object.
    pub const SENTINEL: Handle = Handle {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Serialize to 64-bit integer (for script ids/save files)
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Deserialize from 64-bit integer
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_sentinel() {
            write!(f, "Handle(<invalid>)")
        } else {
            write!(f, "Handle({}v{})", self.index, self.generation)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Slot table issuing [`Handle`]s.
///
/// Released indices go on a free list and are reused with a bumped
/// generation. A slot whose generation would wrap is retired instead, so a
/// stale handle can never alias a later object.
#[derive(Debug)]
pub struct HandleAllocator {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
    limit: u32,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    pub fn new() -> Self {
        // u32::MAX is reserved for the sentinel index.
        Self::with_limit(u32::MAX)
    }

    /// An allocator that never hands out more than `limit` slots.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            limit,
        }
    }

    /// Allocate a fresh handle, recycling a released slot when available.
    ///
    /// `None` once every slot is live or retired.
    pub fn allocate(&mut self) -> Option<Handle> {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                let index = self.slots.len() as u32;
                if index >= self.limit {
                    tracing::error!(limit = self.limit, "handle index space exhausted");
                    return None;
                }
                self.slots.push(Slot {
                    generation: 0,
                    alive: false,
                });
                index
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.alive = true;
        self.live += 1;
        Some(Handle::new(index, slot.generation))
    }

    /// Release a live handle. Returns `false` if the handle was already stale.
    pub fn release(&mut self, handle: Handle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        self.retire_or_recycle(handle.index);
        self.live -= 1;
        true
    }

    fn retire_or_recycle(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.alive = false;
        match slot.generation.checked_add(1) {
            Some(generation) => {
                slot.generation = generation;
                self.free_list.push(index);
            }
            None => tracing::debug!(index, "slot generation saturated, retiring"),
        }
    }

    /// Validate that a handle's generation matches its slot's current generation.
    pub fn is_alive(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.alive && slot.generation == handle.generation)
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Release everything. All outstanding handles become stale.
    pub fn clear(&mut self) {
        for index in 0..self.slots.len() as u32 {
            if self.slots[index as usize].alive {
                self.retire_or_recycle(index);
            }
        }
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_live() {
        let mut alloc = HandleAllocator::new();
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();

        assert_ne!(a, b);
        assert!(alloc.is_alive(a));
        assert!(alloc.is_alive(b));
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn test_recycled_slot_rejects_stale_handle() {
        let mut alloc = HandleAllocator::new();
        let old = alloc.allocate().unwrap();
        assert!(alloc.release(old));

        let new = alloc.allocate().unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(!alloc.is_alive(old));
        assert!(alloc.is_alive(new));
    }

    #[test]
    fn test_double_release_is_refused() {
        let mut alloc = HandleAllocator::new();
        let h = alloc.allocate().unwrap();
        assert!(alloc.release(h));
        assert!(!alloc.release(h));
        assert!(alloc.is_empty());
    }

    #[test]
    fn test_sentinel_is_never_alive() {
        let mut alloc = HandleAllocator::new();
        for _ in 0..8 {
            alloc.allocate().unwrap();
        }
        assert!(!alloc.is_alive(Handle::SENTINEL));
        assert_eq!(Handle::SENTINEL.to_bits(), u64::MAX);
    }

    #[test]
    fn test_saturated_slot_is_retired() {
        let mut alloc = HandleAllocator::new();
        let old = alloc.allocate().unwrap();
        alloc.slots[0].generation = u32::MAX;
        let last = Handle::new(0, u32::MAX);
        assert!(alloc.release(last));

        let fresh = alloc.allocate().unwrap();
        assert_eq!(fresh.index(), 1);
        assert!(!alloc.is_alive(last));
        assert!(!alloc.is_alive(old));
    }

    #[test]
    fn test_exhausted_allocator_returns_none() {
        let mut alloc = HandleAllocator::with_limit(2);
        let a = alloc.allocate().unwrap();
        alloc.allocate().unwrap();
        assert!(alloc.allocate().is_none());

        assert!(alloc.release(a));
        assert_eq!(alloc.allocate().map(|h| h.index()), Some(a.index()));
    }

    #[test]
    fn test_bits_roundtrip_preserves_generation() {
        let h = Handle::new(7, 3);
        assert_eq!(Handle::from_bits(h.to_bits()), h);
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut alloc = HandleAllocator::new();
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();
        alloc.clear();
        assert!(!alloc.is_alive(a));
        assert!(!alloc.is_alive(b));
        assert_eq!(alloc.len(), 0);
    }
}
