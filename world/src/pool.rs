//! Fixed-capacity pool that recycles short-lived entities.

use scream_in_space_core::EntityId;

/// Errors reported by [`EntityPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Every slot is live, so nothing can be handed out.
    #[error("pool exhausted at {max_size} live entities")]
    Exhausted {
        /// Capacity that was reached.
        max_size: usize,
    },
    /// The handle does not refer to a live entity of this pool.
    #[error("entity {id:?} is not active in this pool")]
    NotActive {
        /// Handle that was released.
        id: EntityId,
    },
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    active_at: Option<usize>,
}

/// Reusable-object pool with a hard capacity.
///
/// Every slot is in exactly one of three places: the `active` list, the
/// `free` list, or retired after a capacity shrink. Retired slots are
/// revived before new storage is allocated. `free.len() + active.len()`
/// never exceeds `max_size`, unless the capacity was shrunk below the number
/// of live entities; then the free list stays empty until the live count
/// drops back under the cap.
#[derive(Debug)]
pub struct EntityPool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    active: Vec<u32>,
    retired: Vec<u32>,
    max_size: usize,
}

impl<T: Default> EntityPool<T> {
    /// Creates an empty pool that never holds more than `max_size` entities.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_size),
            free: Vec::new(),
            active: Vec::with_capacity(max_size),
            retired: Vec::new(),
            max_size,
        }
    }

    /// Hands out an entity, reusing a released one when possible.
    ///
    /// The returned entity is marked active. Its contents are whatever the
    /// previous occupant left behind, so callers must initialise every field.
    pub fn acquire(&mut self) -> Result<EntityId, PoolError> {
        let index = if let Some(index) = self.free.pop() {
            index
        } else if self.active.len() < self.max_size {
            self.construct()
        } else {
            return Err(PoolError::Exhausted {
                max_size: self.max_size,
            });
        };

        let slot = &mut self.slots[index as usize];
        slot.active_at = Some(self.active.len());
        self.active.push(index);
        Ok(EntityId::new(index, slot.generation))
    }

    fn construct(&mut self) -> u32 {
        if let Some(index) = self.retired.pop() {
            self.slots[index as usize].value = T::default();
            return index;
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: T::default(),
            generation: 0,
            active_at: None,
        });
        index
    }
}

impl<T> EntityPool<T> {
    /// Returns a live entity to the pool.
    ///
    /// Fails without touching either list when `id` is not currently live,
    /// which covers double releases and stale handles.
    pub fn release(&mut self, id: EntityId) -> Result<(), PoolError> {
        let position = self
            .active_position(id)
            .ok_or(PoolError::NotActive { id })?;

        let index = self.active.swap_remove(position);
        if let Some(&moved) = self.active.get(position) {
            self.slots[moved as usize].active_at = Some(position);
        }

        let slot = &mut self.slots[index as usize];
        slot.active_at = None;
        slot.generation = slot.generation.wrapping_add(1);

        if self.free.len() + self.active.len() < self.max_size {
            self.free.push(index);
        } else {
            self.retired.push(index);
        }
        Ok(())
    }

    /// Changes the capacity.
    ///
    /// Live entities are never evicted. When more entities are live than the
    /// new capacity allows, [`EntityPool::acquire`] refuses until enough of
    /// them are released. Surplus free slots are retired.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        let keep = max_size.saturating_sub(self.active.len());
        while self.free.len() > keep {
            if let Some(index) = self.free.pop() {
                self.retired.push(index);
            }
        }
    }

    /// Reports whether `id` refers to a live entity.
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.active_position(id).is_some()
    }

    /// Borrows a live entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&T> {
        self.active_position(id)
            .map(|_| &self.slots[id.index() as usize].value)
    }

    /// Mutably borrows a live entity.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if self.active_position(id).is_none() {
            return None;
        }
        Some(&mut self.slots[id.index() as usize].value)
    }

    /// Invokes `visit` for every live entity.
    pub fn for_each_active<F>(&self, mut visit: F)
    where
        F: FnMut(EntityId, &T),
    {
        for (id, value) in self.iter_active() {
            visit(id, value);
        }
    }

    /// Invokes `visit` with mutable access to every live entity.
    pub fn for_each_active_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(EntityId, &mut T),
    {
        for &index in &self.active {
            let slot = &mut self.slots[index as usize];
            visit(EntityId::new(index, slot.generation), &mut slot.value);
        }
    }

    /// Iterates over live entities.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.active.iter().map(move |&index| {
            let slot = &self.slots[index as usize];
            (EntityId::new(index, slot.generation), &slot.value)
        })
    }

    /// Copies the handles of every live entity.
    ///
    /// The snapshot is safe to iterate while releasing entities.
    #[must_use]
    pub fn active_snapshot(&self) -> Vec<EntityId> {
        self.iter_active().map(|(id, _)| id).collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of released entities ready for reuse.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Current capacity.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn active_position(&self, id: EntityId) -> Option<usize> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.active_at
    }
}
