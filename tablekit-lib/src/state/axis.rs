//! Controlled and uncontrolled state axes.

use std::fmt;
use std::sync::Arc;

/// Setter invoked with the requested next value of an externally owned axis.
pub type ChangeFn<V> = Arc<dyn Fn(V) + Send + Sync>;

/// An externally owned value and the setter that requests changes to it.
///
/// The table never updates a controlled value optimistically: it forwards the
/// change and keeps rendering the old value until the owner pushes the new
/// one back with [`Table::receive`](super::Table::receive).
pub struct Controlled<V> {
    pub value: V,
    pub on_change: ChangeFn<V>,
}

impl<V> Controlled<V> {
    pub fn new(value: V, on_change: impl Fn(V) + Send + Sync + 'static) -> Self {
        Self {
            value,
            on_change: Arc::new(on_change),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Controlled<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controlled")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// One state axis, owned by the table (internal) or by the caller (external).
pub(crate) struct Axis<V> {
    value: V,
    on_change: Option<ChangeFn<V>>,
}

impl<V: Clone + Send + 'static> Axis<V> {
    pub fn internal(value: V) -> Self {
        Self {
            value,
            on_change: None,
        }
    }

    /// External when `controlled` is given, internal with `default` otherwise.
    pub fn new(controlled: Option<Controlled<V>>, default: V) -> Self {
        match controlled {
            Some(c) => Self {
                value: c.value,
                on_change: Some(c.on_change),
            },
            None => Self::internal(default),
        }
    }

    pub fn get(&self) -> &V {
        &self.value
    }

    /// Request a change.
    ///
    /// Internal axes take the value immediately and return `true`. External
    /// axes queue the setter on `outbox` and return `false`.
    pub fn set(&mut self, next: V, outbox: &mut Outbox) -> bool {
        match &self.on_change {
            Some(on_change) => {
                let on_change = Arc::clone(on_change);
                outbox.push(move || on_change(next));
                false
            }
            None => {
                self.value = next;
                true
            }
        }
    }

    /// Take a value pushed by the owner.
    pub fn receive(&mut self, value: V) {
        self.value = value;
    }
}

impl<V: fmt::Debug> fmt::Debug for Axis<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("value", &self.value)
            .field("external", &self.on_change.is_some())
            .finish()
    }
}

/// Callbacks collected while the state lock is held, run after it is released.
#[derive(Default)]
pub(crate) struct Outbox(Vec<Box<dyn FnOnce() + Send>>);

impl Outbox {
    pub fn push(&mut self, f: impl FnOnce() + Send + 'static) {
        self.0.push(Box::new(f));
    }

    pub fn deliver(self) {
        for f in self.0 {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_internal_applies_immediately() {
        let mut axis = Axis::internal(1);
        let mut outbox = Outbox::default();
        assert!(axis.set(2, &mut outbox));
        assert_eq!(*axis.get(), 2);
        assert!(outbox.0.is_empty());
    }

    #[test]
    fn test_external_forwards_without_applying() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut axis = Axis::new(
            Some(Controlled::new(1, move |v| sink.lock().unwrap().push(v))),
            0,
        );

        let mut outbox = Outbox::default();
        assert!(!axis.set(5, &mut outbox));
        assert_eq!(*axis.get(), 1);
        assert!(seen.lock().unwrap().is_empty());

        outbox.deliver();
        assert_eq!(*seen.lock().unwrap(), vec![5]);

        axis.receive(5);
        assert_eq!(*axis.get(), 5);
    }
}
