//! Signal - observable state cell
//!
//! A `Signal` holds one value and an explicit list of subscribers. Writes are
//! last-write-wins: the cell keeps only the newest value, and every live
//! subscriber is pushed a copy of it. Subscribers whose receiver has been
//! dropped are pruned on the next write.
//!
//! ```text
//! upstream event ──► signal.set(v) ──► version += 1
//!                                        │
//!                                        ├──► subscriber 1 (UnboundedReceiver<T>)
//!                                        └──► subscriber 2
//! ```
//!
//! Signals are single-threaded (`Rc<RefCell<..>>`), matching the cooperative
//! scheduling of the front end. Cloning a `Signal` clones the handle, not the
//! value.

use futures::channel::mpsc;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct Cell<T> {
    value: T,
    version: u64,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
}

pub struct Signal<T> {
    inner: Rc<RefCell<Cell<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + Default> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &cell.value)
            .field("version", &cell.version)
            .field("subscribers", &cell.subscribers.len())
            .finish()
    }
}

impl<T: Clone> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Cell { value, version: 0, subscribers: Vec::new() })),
        }
    }

    /// Current value (cloned).
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of writes since creation.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn set(&self, value: T) {
        let mut cell = self.inner.borrow_mut();
        cell.value = value;
        Self::publish(&mut cell);
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut cell = self.inner.borrow_mut();
        f(&mut cell.value);
        Self::publish(&mut cell);
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded();
        self.inner.borrow_mut().subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn publish(cell: &mut Cell<T>) {
        cell.version += 1;
        let value = cell.value.clone();
        cell.subscribers.retain(|tx| tx.unbounded_send(value.clone()).is_ok());
    }
}

impl<T: Clone + PartialEq> Signal<T> {
    /// Write only if the value differs. Returns whether a write happened.
    pub fn set_if_changed(&self, value: T) -> bool {
        if self.with(|current| *current == value) {
            return false;
        }
        self.set(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let signal = Signal::new(1u32);
        signal.set(2);
        signal.set(3);
        assert_eq!(signal.get(), 3);
        assert_eq!(signal.version(), 2);
    }

    #[test]
    fn subscribers_see_every_write() {
        let signal = Signal::new(String::from("a"));
        let mut rx = signal.subscribe();
        signal.set("b".into());
        signal.update(|s| s.push('!'));
        assert_eq!(rx.try_next().unwrap(), Some("b".to_string()));
        assert_eq!(rx.try_next().unwrap(), Some("b!".to_string()));
        assert!(rx.try_next().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let signal = Signal::new(0u8);
        let rx = signal.subscribe();
        let _kept = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 2);
        drop(rx);
        signal.set(1);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn set_if_changed_skips_equal_values() {
        let signal = Signal::new(false);
        assert!(!signal.set_if_changed(false));
        assert_eq!(signal.version(), 0);
        assert!(signal.set_if_changed(true));
        assert_eq!(signal.version(), 1);
    }

    #[test]
    fn clones_share_the_cell() {
        let a = Signal::new(5i64);
        let b = a.clone();
        b.set(7);
        assert_eq!(a.get(), 7);
    }
}
