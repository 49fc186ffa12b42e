#![forbid(unsafe_code)]

//! Observed leaf cell: the private slot behind one model property.
//!
//! # Design
//!
//! A [`LeafCell`] holds the last written [`Value`], a version counter, and
//! the subscriber callbacks interested in that exact property. Writes go
//! through [`LeafCell::replace`], which applies the strict-inequality guard
//! and reports whether anything changed. Delivering the change is the
//! dispatcher's job (see [`super::dispatch`]), so a cell never calls back into
//! user code while it is borrowed.
//!
//! # Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `get()` | O(1) + value clone |
//! | `replace()` | O(1) |
//! | `subscribe()` | O(1) amortized |
//! | `live_subscribers()` | O(S) where S = subscribers |

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::value::Value;

/// A subscriber callback stored as a strong `Rc` by its [`Subscription`] and
/// as a `Weak` by the cell.
pub(crate) type Callback = Rc<dyn Fn(&Value)>;
type CallbackWeak = Weak<dyn Fn(&Value)>;

struct LeafInner {
    value: Value,
    version: u64,
    /// Dead entries are pruned when subscribers are collected.
    subscribers: Vec<CallbackWeak>,
}

/// The observed slot of a single leaf property.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. `replace(v)` where `v == current` is a no-op.
/// 3. Subscribers are returned in registration order.
pub(crate) struct LeafCell {
    inner: RefCell<LeafInner>,
}

impl LeafCell {
    pub(crate) fn new(value: Value) -> Self {
        Self {
            inner: RefCell::new(LeafInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            }),
        }
    }

    /// A clone of the current value.
    pub(crate) fn get(&self) -> Value {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    pub(crate) fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Store `value` if it differs from the current one.
    ///
    /// Returns `true` when the value changed (and the version was bumped).
    pub(crate) fn replace(&self, value: Value) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.value == value {
            return false;
        }
        inner.value = value;
        inner.version += 1;
        true
    }

    /// Store `value` without the equality guard, bumping the version.
    pub(crate) fn overwrite(&self, value: Value) {
        let mut inner = self.inner.borrow_mut();
        inner.value = value;
        inner.version += 1;
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&Value) + 'static) -> Subscription {
        let strong: Callback = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Registered subscribers, including dead ones not yet pruned.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Prune dead subscribers and return the live ones.
    ///
    /// The borrow is released before returning, so callers may invoke the
    /// callbacks freely.
    pub(crate) fn live_subscribers(&self) -> Vec<Callback> {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|w| w.strong_count() > 0);
        inner
            .subscribers
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl std::fmt::Debug for LeafCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("LeafCell")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc`; the `Weak` kept by the
/// cell then fails to upgrade and is pruned on the next delivery.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
