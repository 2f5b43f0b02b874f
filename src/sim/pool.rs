//! Fixed-capacity slot arena with free-list recycling
//!
//! All storage is reserved up front; inserts and removals are O(1) and
//! never allocate. A full pool refuses new entries instead of growing.

/// Index of an occupied slot in a [`FixedPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct FixedPool<T> {
    slots: Box<[Option<T>]>,
    /// Indices of empty slots; popped from the back
    free: Vec<usize>,
    len: usize,
}

impl<T> FixedPool<T> {
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        // Reversed so the lowest index is handed out first
        let free: Vec<usize> = (0..capacity).rev().collect();
        Self {
            slots: slots.into_boxed_slice(),
            free,
            len: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Occupy a free slot. Returns `None` (and drops `value`) when full.
    pub fn insert(&mut self, value: T) -> Option<SlotId> {
        let index = self.free.pop()?;
        self.slots[index] = Some(value);
        self.len += 1;
        Some(SlotId(index))
    }

    /// Overwrite an occupied slot in place, returning the previous value
    pub fn replace(&mut self, id: SlotId, value: T) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if slot.is_none() {
            return None;
        }
        slot.replace(value)
    }

    /// Free a slot for reuse
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    /// Occupied slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (SlotId(i), v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    /// Keep only entries for which `keep` returns true; freed slots are recycled
    pub fn retain<F: FnMut(&mut T) -> bool>(&mut self, mut keep: F) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(value) = slot.as_mut() else {
                continue;
            };
            if !keep(value) {
                *slot = None;
                self.free.push(index);
                self.len -= 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.retain(|_| false);
    }
}
