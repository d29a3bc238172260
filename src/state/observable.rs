//! Single-writer observable cells
//!
//! An [`Observable`] is the only handle that can change a value. Readers get a
//! [`ReadOnly`] view that sees every update and can wait for the next one, but
//! has no way to write. [`Derived`] recomputes a value from a view on each read
//! so it can never go stale.

use std::sync::Arc;
use tokio::sync::watch;

/// Writable cell. Clones share the same value.
#[derive(Debug)]
pub struct Observable<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the value and notify readers, even when nobody is listening
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn read_only(&self) -> ReadOnly<T> {
        ReadOnly {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

/// Read side of an [`Observable`]
#[derive(Debug)]
pub struct ReadOnly<T> {
    rx: watch::Receiver<T>,
}

impl<T> Clone for ReadOnly<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> ReadOnly<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.rx.borrow())
    }

    /// True if the value changed since this view last observed it
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Mark the current value as seen
    pub fn mark_seen(&mut self) {
        self.rx.borrow_and_update();
    }

    /// Wait for the next update. Returns false once the writer is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn map<U>(&self, f: fn(&T) -> U) -> Derived<T, U> {
        Derived {
            source: self.clone(),
            f,
        }
    }
}

impl<T: Clone> ReadOnly<T> {
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }
}

/// Value computed from a [`ReadOnly`] on every read
#[derive(Debug)]
pub struct Derived<T, U> {
    source: ReadOnly<T>,
    f: fn(&T) -> U,
}

impl<T, U> Clone for Derived<T, U> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: self.f,
        }
    }
}

impl<T, U> Derived<T, U> {
    pub fn get(&self) -> U {
        self.source.with(self.f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers_see_writes() {
        let cell = Observable::new(1);
        let view = cell.read_only();
        assert_eq!(view.get(), 1);

        cell.set(2);
        assert_eq!(view.get(), 2);
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn test_set_without_readers() {
        let cell = Observable::new(String::new());
        cell.set("kept".to_string());
        assert_eq!(cell.get(), "kept");
    }

    #[test]
    fn test_derived_recomputes() {
        let cell: Observable<Vec<u8>> = Observable::default();
        let non_empty = cell.read_only().map(|v| !v.is_empty());
        assert!(!non_empty.get());

        cell.set(vec![1, 2]);
        assert!(non_empty.get());

        cell.set(Vec::new());
        assert!(!non_empty.get());
    }

    #[test]
    fn test_change_tracking() {
        let cell = Observable::new(0);
        let mut view = cell.read_only();
        assert!(!view.has_changed());

        cell.set(5);
        assert!(view.has_changed());
        view.mark_seen();
        assert!(!view.has_changed());
    }

    #[tokio::test]
    async fn test_changed_wakes_reader() {
        let cell = Observable::new(0);
        let mut view = cell.read_only();

        let writer = cell.clone();
        tokio::spawn(async move {
            writer.set(7);
        });

        assert!(view.changed().await);
        assert_eq!(view.get(), 7);
    }
}
