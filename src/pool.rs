/// Bounded slot pool with a free list.
///
/// Slots are reused in place instead of reallocated. Every handle carries the
/// slot's generation so a handle kept past `release` can no longer reach the
/// object that later reuses the slot.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotId {
    pub index: usize,
    pub generation: u32,
}

#[derive(Debug)]
struct Slot<T> {
    item: T,
    active: bool,
    generation: u32,
    /// Acquisition order, used to find the oldest live slot.
    acquired_seq: u64,
}

#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    max_size: usize,
    active: usize,
    seq: u64,
}

impl<T: Default> Pool<T> {
    /// Pre-allocates `initial` inactive slots (never more than `max_size`).
    pub fn new(initial: usize, max_size: usize) -> Self {
        let initial = initial.min(max_size);
        let slots = (0..initial)
            .map(|_| Slot { item: T::default(), active: false, generation: 0, acquired_seq: 0 })
            .collect();
        // Pop from the back hands out index 0 first.
        let free = (0..initial).rev().collect();
        Pool { slots, free, max_size, active: 0, seq: 0 }
    }

    /// Claims a free slot, growing the pool up to `max_size`. `None` when full.
    pub fn acquire(&mut self) -> Option<SlotId> {
        if self.active >= self.max_size {
            return None;
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    item: T::default(),
                    active: false,
                    generation: 0,
                    acquired_seq: 0,
                });
                self.slots.len() - 1
            }
        };
        self.seq += 1;
        let slot = &mut self.slots[index];
        slot.active = true;
        slot.acquired_seq = self.seq;
        self.active += 1;
        Some(SlotId { index, generation: slot.generation })
    }

    /// Like `acquire`, but when full the oldest live slot is released and
    /// handed out again with a default item. For short-lived transients.
    pub fn acquire_or_recycle(&mut self) -> Option<SlotId> {
        if let Some(id) = self.acquire() {
            return Some(id);
        }
        let oldest = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.active)
            .min_by_key(|(_, s)| s.acquired_seq)
            .map(|(i, s)| SlotId { index: i, generation: s.generation })?;
        self.release(oldest);
        let id = self.acquire()?;
        self.slots[id.index].item = T::default();
        Some(id)
    }

    /// Returns the slot to the free list. Releasing a stale or already
    /// released handle is a no-op and returns `false`.
    pub fn release(&mut self, id: SlotId) -> bool {
        match self.slots.get_mut(id.index) {
            Some(slot) if slot.active && slot.generation == id.generation => {
                slot.active = false;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.active -= 1;
                true
            }
            _ => false,
        }
    }

    /// Releases every live slot whose item matches `pred`. Returns how many.
    pub fn release_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let doomed: Vec<SlotId> = self
            .iter_active()
            .filter(|(_, item)| pred(*item))
            .map(|(id, _)| id)
            .collect();
        doomed.into_iter().filter(|id| self.release(*id)).count()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slots
            .get(id.index)
            .filter(|s| s.active && s.generation == id.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.active && s.generation == id.generation)
            .map(|s| &mut s.item)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (SlotId, &T)> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(index, s)| {
            (SlotId { index, generation: s.generation }, &s.item)
        })
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter(|(_, s)| s.active).map(|(index, s)| {
            (SlotId { index, generation: s.generation }, &mut s.item)
        })
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    /// Slots allocated so far, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Lowering the limit never evicts live slots; it only blocks new ones.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }
}
