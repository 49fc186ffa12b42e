#![forbid(unsafe_code)]

//! Lifetime management for groups of subscriptions.

use super::cell::Subscription;

/// Collects the subscriptions belonging to one logical owner (a bound view,
/// a host widget).
///
/// When the scope is dropped, all held subscriptions are released and their
/// callbacks stop firing.
///
/// # Invariants
///
/// 1. After drop, no callbacks from this scope will fire.
/// 2. `clear()` releases all subscriptions immediately (reusable scope).
/// 3. `len()` is always the number of held subscriptions.
#[derive(Default)]
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `sub` until the scope is dropped or cleared.
    pub fn hold(&mut self, sub: Subscription) -> &mut Self {
        self.subscriptions.push(sub);
        self
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions immediately.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl Extend<Subscription> for BindingScope {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}
