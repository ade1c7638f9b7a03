//! Shared value handle — the engine's window into caller-owned state.
//!
//! A `Value<T>` is a cheaply clonable handle to a single value. Nodes
//! built from a `Value` re-read it on every render, so mutating the
//! handle and requesting a render is how dynamic content works. There is
//! no change notification: renders are requested explicitly through the
//! app loop.

use std::cell::RefCell;
use std::rc::Rc;

/// A shared, mutable value read by the render pipeline each frame.
///
/// Cloning produces another handle to the same underlying value.
pub struct Value<T>(Rc<RefCell<T>>);

impl<T> Value<T> {
    /// Create a new value handle.
    #[must_use]
    pub fn new(value: T) -> Self {
        Value(Rc::new(RefCell::new(value)))
    }

    /// Read a copy of the value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    /// Borrow the value and apply a function.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Update the value in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.0.borrow_mut());
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value(Rc::clone(&self.0))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({:?})", self.0.borrow())
    }
}

impl<T: Default> Default for Value<T> {
    fn default() -> Self {
        Value::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_get_roundtrip() {
        let v = Value::new(42);
        assert_eq!(v.get(), 42);
    }

    #[test]
    fn set_changes_value() {
        let v = Value::new(10);
        v.set(20);
        assert_eq!(v.get(), 20);
    }

    #[test]
    fn update_modifies_in_place() {
        let v = Value::new(vec![1, 2, 3]);
        v.update(|x| x.push(4));
        assert_eq!(v.get(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn with_borrows_without_clone() {
        let v = Value::new(String::from("hello"));
        let len = v.with(|s| s.len());
        assert_eq!(len, 5);
    }

    #[test]
    fn clone_shares_state() {
        let v = Value::new(1);
        let v2 = v.clone();
        v.set(2);
        assert_eq!(v2.get(), 2);
    }
}
