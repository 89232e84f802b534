//! Shared scalar values published by components.
//!
//! A [`Signal`] is a cheaply clonable handle to one value. The owning
//! component writes through its clone; stop conditions and the registry
//! read (and, on restore, write) through theirs.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Shared handle to a single value.
///
/// # Examples
///
/// ```
/// use simloop_core::Signal;
///
/// let speed = Signal::new(0.0_f64);
/// let observer = speed.clone();
/// speed.set(12.5);
/// assert_eq!(observer.get(), 12.5);
/// assert!(speed.same_as(&observer));
/// ```
pub struct Signal<T> {
    cell: Arc<Mutex<T>>,
}

impl<T> Signal<T> {
    /// Create a new signal holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(Mutex::new(value)),
        }
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.cell.lock() = value;
    }

    /// Run `f` with a shared reference to the value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.lock())
    }

    /// Run `f` with a mutable reference to the value.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.lock())
    }

    /// Whether both handles point at the same value.
    pub fn same_as(&self, other: &Signal<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: Copy> Signal<T> {
    /// Copy out the current value.
    pub fn get(&self) -> T {
        *self.cell.lock()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&*self.cell.lock()).finish()
    }
}
