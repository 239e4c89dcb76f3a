use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Shared liveness record behind every clone of one handle.
///
/// Dropping the last clone retires the slot into the owning pool's queue.
/// The queue is held weakly so a handle outliving its pool degrades to a
/// no-op instead of keeping pool storage alive.
pub(crate) struct HandleCore {
    pool: u64,
    index: u32,
    generation: u32,
    retired: Weak<RefCell<Vec<(u32, u32)>>>,
}

impl HandleCore {
    pub(crate) fn new(
        pool: u64,
        index: u32,
        generation: u32,
        retired: Weak<RefCell<Vec<(u32, u32)>>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            pool,
            index,
            generation,
            retired,
        })
    }

    pub(crate) fn pool(&self) -> u64 {
        self.pool
    }

    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

impl Drop for HandleCore {
    fn drop(&mut self) {
        if let Some(queue) = self.retired.upgrade() {
            queue.borrow_mut().push((self.index, self.generation));
        }
    }
}

/// Strong reference to a pooled value.
///
/// Clones are cheap and share one liveness record; the pooled value is
/// released when the last clone is dropped. A handle says nothing about
/// which pool it belongs to at the type level, so lookups against the wrong
/// pool are well defined and return `None`.
pub struct Handle<T> {
    core: Rc<HandleCore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(core: Rc<HandleCore>) -> Self {
        Self {
            core,
            _marker: PhantomData,
        }
    }

    pub(crate) fn core(&self) -> &Rc<HandleCore> {
        &self.core
    }

    /// Creates a non-owning observer of the same entry.
    pub fn downgrade(&self) -> WeakHandle<T> {
        WeakHandle {
            core: Rc::downgrade(&self.core),
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("index", &self.core.index)
            .field("generation", &self.core.generation)
            .finish()
    }
}

/// Non-owning observer of a pooled value.
///
/// Resolves identically to the strong handle it came from while any strong
/// clone lives, then resolves to `None`. Never extends the value's lifetime.
pub struct WeakHandle<T> {
    core: Weak<HandleCore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> WeakHandle<T> {
    pub(crate) fn upgrade_core(&self) -> Option<Rc<HandleCore>> {
        self.core.upgrade()
    }

    /// True once every strong clone of the originating handle is gone.
    pub fn is_dangling(&self) -> bool {
        self.core.strong_count() == 0
    }
}

impl<T> Clone for WeakHandle<T> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for WeakHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakHandle")
            .field("dangling", &self.is_dangling())
            .finish()
    }
}
