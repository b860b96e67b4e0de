//! Reuse pool for request-scoped buffers.
//!
//! Under sustained load every attempt needs somewhere to read the response
//! body; allocating per attempt would dominate the allocator. The pool hands
//! out objects with an RAII guard so release happens exactly once on every
//! exit path, including early returns and panics.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// A simple acquire/release object pool.
///
/// `acquire` pops a previously released object or creates a fresh one; the
/// returned [`Pooled`] guard pushes the object back when dropped.
pub struct ObjectPool<T> {
    items: Mutex<Vec<T>>,
    init: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("idle", &self.idle())
            .finish()
    }
}

impl<T> ObjectPool<T> {
    /// Create a pool that builds new objects with `init`.
    pub fn new(init: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            init: Box::new(init),
        }
    }

    /// Take an object out of the pool, creating one if none is idle.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let recycled = self.items.lock().map_or(None, |mut items| items.pop());
        Pooled {
            value: Some(recycled.unwrap_or_else(|| (self.init)())),
            pool: self,
        }
    }

    /// Number of idle objects currently held by the pool.
    pub fn idle(&self) -> usize {
        self.items.lock().map_or(0, |items| items.len())
    }

    fn release(&self, value: T) {
        if let Ok(mut items) = self.items.lock() {
            items.push(value);
        }
    }
}

/// Guard over a pooled object; returns it to the pool on drop.
pub struct Pooled<'a, T> {
    value: Option<T>,
    pool: &'a ObjectPool<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Pooled<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Pooled").field(&self.value).finish()
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // value is only None after drop
        self.value.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(value) = self.value.take() {
            self.pool.release(value);
        }
    }
}
