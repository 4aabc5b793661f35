//! Generational slot table

use tether_core::{Handle, HandleAllocator};

/// Values addressed by [`Handle`]. A stale handle reads as absent.
#[derive(Debug)]
pub(crate) struct Table<T> {
    handles: HandleAllocator,
    rows: Vec<Option<(Handle, T)>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            handles: HandleAllocator::new(),
            rows: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            handles: HandleAllocator::with_limit(limit),
            rows: Vec::new(),
        }
    }

    /// `None` when the table has run out of slots.
    pub fn insert(&mut self, value: T) -> Option<Handle> {
        let handle = self.handles.allocate()?;
        let index = handle.index() as usize;
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, || None);
        }
        self.rows[index] = Some((handle, value));
        Some(handle)
    }

    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        if !self.handles.release(handle) {
            return None;
        }
        self.rows
            .get_mut(handle.index() as usize)?
            .take()
            .map(|(_, value)| value)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.is_alive(handle)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.rows
            .get(handle.index() as usize)?
            .as_ref()
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }
        self.rows
            .get_mut(handle.index() as usize)?
            .as_mut()
            .map(|(_, value)| value)
    }

    /// Live rows in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.rows.iter().flatten().map(|(handle, value)| (*handle, value))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}
