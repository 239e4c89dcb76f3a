//! Lifetime-tracked resource storage.
//!
//! A [`Pool`] owns values on behalf of many independent referencing objects.
//! Callers receive a clonable [`Handle`] instead of the value; when the last
//! clone of a handle is dropped, the pooled value is released without any
//! coordination between the owners. [`WeakHandle`] observes an entry without
//! keeping it alive.
//!
//! Lookups never fail loudly: a stale handle, a weak handle whose strong
//! copies are gone, or a handle minted by a different pool all resolve to
//! `None`.

mod handle;

pub use handle::{Handle, WeakHandle};

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use handle::HandleCore;

/// Process-wide counter so handles from one pool never resolve in another.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Slots retired by handle drops, reclaimed on the pool's next mutation.
pub(crate) type RetireQueue = Rc<RefCell<Vec<(u32, u32)>>>;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational arena that owns values referenced through [`Handle`]s.
///
/// The pool owns its storage outright; handles carry `(index, generation)`
/// and a shared liveness core, not a reference back to the pool. Either side
/// may be dropped first. Dropping the pool drops every remaining value;
/// surviving handles then simply stop resolving.
pub struct Pool<T> {
    id: u64,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    retired: RetireQueue,
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self {
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            retired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Takes ownership of `value` and returns a fresh strong handle.
    ///
    /// Amortized O(1); retired slots are reused before the arena grows.
    pub fn store(&mut self, value: T) -> Handle<T> {
        self.reclaim();

        let index = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                debug_assert!(slot.value.is_none());
                slot.value = Some(value);
                index
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                index
            }
        };

        let generation = self.slots[index as usize].generation;
        Handle::new(HandleCore::new(
            self.id,
            index,
            generation,
            Rc::downgrade(&self.retired),
        ))
    }

    /// Resolves a strong handle to a shared reference.
    ///
    /// `None` for handles minted by another pool.
    pub fn get(&self, handle: &Handle<T>) -> Option<&T> {
        let slot = self.slot_of(handle.core())?;
        slot.value.as_ref()
    }

    /// Resolves a strong handle to an exclusive reference.
    pub fn get_mut(&mut self, handle: &Handle<T>) -> Option<&mut T> {
        self.reclaim();
        let core = handle.core().clone();
        let slot = self.slot_of_mut(&core)?;
        slot.value.as_mut()
    }

    /// Resolves a weak handle; `None` once every strong clone is gone.
    pub fn get_weak(&self, handle: &WeakHandle<T>) -> Option<&T> {
        let core = handle.upgrade_core()?;
        let slot = self.slot_of(&core)?;
        slot.value.as_ref()
    }

    /// Resolves a weak handle to an exclusive reference.
    pub fn get_weak_mut(&mut self, handle: &WeakHandle<T>) -> Option<&mut T> {
        self.reclaim();
        let core = handle.upgrade_core()?;
        let slot = self.slot_of_mut(&core)?;
        slot.value.as_mut()
    }

    /// Number of live entries.
    ///
    /// Entries whose last handle dropped since the previous mutation are not
    /// counted even though their reclamation is still pending.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value.is_some()).count()
            - self.pending_retired()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy iteration over live values in unspecified order.
    ///
    /// Restartable per call. Mutating the pool while iterating is prevented
    /// by the borrow; drop the iterator first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let retired = self.retired.borrow();
        let pending: Vec<(u32, u32)> = retired.clone();
        drop(retired);
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            let dead = pending
                .iter()
                .any(|&(i, g)| i as usize == index && g == slot.generation);
            if dead { None } else { slot.value.as_ref() }
        })
    }

    /// Drops values whose handles are gone and recycles their slots.
    ///
    /// Runs implicitly on every mutating operation; exposed for callers that
    /// want deterministic release points (for example before tearing down a
    /// device that the pooled values reference).
    pub fn reclaim(&mut self) {
        let retired: Vec<(u32, u32)> = self.retired.borrow_mut().drain(..).collect();
        for (index, generation) in retired {
            let Some(slot) = self.slots.get_mut(index as usize) else {
                continue;
            };
            if slot.generation != generation || slot.value.is_none() {
                continue;
            }
            slot.value = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(index);
        }
    }

    fn pending_retired(&self) -> usize {
        self.retired
            .borrow()
            .iter()
            .filter(|&&(index, generation)| {
                self.slots
                    .get(index as usize)
                    .is_some_and(|slot| slot.generation == generation && slot.value.is_some())
            })
            .count()
    }

    fn slot_of(&self, core: &Rc<HandleCore>) -> Option<&Slot<T>> {
        if core.pool() != self.id {
            return None;
        }
        let slot = self.slots.get(core.index() as usize)?;
        (slot.generation == core.generation()).then_some(slot)
    }

    fn slot_of_mut(&mut self, core: &Rc<HandleCore>) -> Option<&mut Slot<T>> {
        if core.pool() != self.id {
            return None;
        }
        let slot = self.slots.get_mut(core.index() as usize)?;
        (slot.generation == core.generation()).then_some(slot)
    }
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── store / get ───────────────────────────────────────────────────────

    #[test]
    fn store_then_get_returns_value() {
        let mut pool = Pool::new();
        let handle = pool.store(42u32);
        assert_eq!(pool.get(&handle), Some(&42));
    }

    #[test]
    fn get_mut_mutates_in_place() {
        let mut pool = Pool::new();
        let handle = pool.store(String::from("a"));
        pool.get_mut(&handle).unwrap().push('b');
        assert_eq!(pool.get(&handle).map(String::as_str), Some("ab"));
    }

    #[test]
    fn clones_resolve_to_same_value() {
        let mut pool = Pool::new();
        let handle = pool.store(7i32);
        let copy = handle.clone();
        assert_eq!(pool.get(&handle), Some(&7));
        assert_eq!(pool.get(&copy), Some(&7));
    }

    // ── handle drop ───────────────────────────────────────────────────────

    #[test]
    fn drop_of_last_clone_releases_entry() {
        let mut pool = Pool::new();
        let handle = pool.store(1u8);
        let copy = handle.clone();
        drop(handle);
        assert_eq!(pool.get(&copy), Some(&1));
        drop(copy);
        pool.reclaim();
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn slot_reuse_does_not_resurrect_old_handles() {
        let mut pool = Pool::new();
        let first = pool.store(1u32);
        let weak = first.downgrade();
        drop(first);
        let second = pool.store(2u32);
        assert_eq!(pool.get_weak(&weak), None);
        assert_eq!(pool.get(&second), Some(&2));
    }

    #[test]
    fn foreign_handle_resolves_to_none() {
        let mut a = Pool::new();
        let mut b = Pool::new();
        let in_a = a.store(5u32);
        let _in_b = b.store(6u32);
        assert_eq!(b.get(&in_a), None);
    }

    #[test]
    fn pool_may_outlive_handles_and_vice_versa() {
        let mut pool = Pool::new();
        let handle = pool.store(3u64);
        drop(pool);
        // The handle is now dangling but harmless.
        let mut other = Pool::new();
        let _ = other.store(9u64);
        assert_eq!(other.get(&handle), None);
    }

    // ── weak handles ──────────────────────────────────────────────────────

    #[test]
    fn weak_resolves_while_strong_lives() {
        let mut pool = Pool::new();
        let handle = pool.store(11u32);
        let weak = handle.downgrade();
        assert_eq!(pool.get_weak(&weak), Some(&11));
        assert_eq!(pool.get_weak(&weak), pool.get(&handle));
    }

    #[test]
    fn weak_dies_with_last_strong_even_among_live_entries() {
        let mut pool = Pool::new();
        let keep = pool.store(1u32);
        let doomed = pool.store(2u32);
        let weak = doomed.downgrade();
        drop(doomed);
        assert_eq!(pool.get_weak(&weak), None);
        assert_eq!(pool.get(&keep), Some(&1));
    }

    // ── iteration ─────────────────────────────────────────────────────────

    #[test]
    fn iteration_yields_every_live_entry() {
        let mut pool = Pool::new();
        let handles: Vec<_> = (0..5).map(|i| pool.store(i)).collect();
        let mut seen: Vec<i32> = pool.iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        drop(handles);
    }

    #[test]
    fn drop_between_iterations_leaves_rest_intact() {
        let mut pool = Pool::new();
        let mut handles: Vec<_> = (0..4).map(|i| pool.store(i * 10)).collect();
        handles.swap_remove(1);
        let mut seen: Vec<i32> = pool.iter().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 20, 30]);
        for handle in &handles {
            assert!(pool.get(handle).is_some());
        }
    }

    #[test]
    fn len_tracks_drops_before_reclaim() {
        let mut pool = Pool::new();
        let a = pool.store(1);
        let b = pool.store(2);
        assert_eq!(pool.len(), 2);
        drop(a);
        assert_eq!(pool.len(), 1);
        drop(b);
        assert!(pool.is_empty());
    }
}
