//! Mutex-guarded cell shared by client implementations

use parking_lot::Mutex;

/// A value guarded by a mutex with closure-scoped access.
///
/// Writers are serialized; a read observes the latest committed write. The
/// guard never escapes the closure, so no lock is held across an `.await`.
#[derive(Debug, Default)]
pub struct Locked<T> {
    inner: Mutex<T>,
}

impl<T> Locked<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Run `f` with exclusive access to the value
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Replace the value, returning the previous one
    pub fn set(&self, value: T) -> T {
        std::mem::replace(&mut *self.inner.lock(), value)
    }
}

impl<T: Clone> Locked<T> {
    /// Clone out the current value
    pub fn get(&self) -> T {
        self.inner.lock().clone()
    }
}
