#![forbid(unsafe_code)]

//! Change delivery with bounded re-entrancy.
//!
//! Every changed write is handed to the [`Dispatcher`]. The first write on
//! the stack becomes the *outermost* write and drains the queue; a write
//! issued from inside a subscriber callback is queued instead of recursing,
//! and is delivered after the current callback round returns.
//!
//! # Invariants
//!
//! 1. Callbacks never run nested inside another callback's delivery; the
//!    stack depth of a cascade is constant.
//! 2. Queued changes are delivered in FIFO order.
//! 3. A single outermost write delivers at most `max_cascade` changes. When
//!    the cap is hit the remaining queue is discarded and reported.
//! 4. The draining flag is reset even if a callback panics, and changes
//!    still queued behind the panicking callback are dropped.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tether_core::PathId;

use super::cell::Callback;
use crate::value::Value;

/// Default cap on deliveries per outermost write.
pub const DEFAULT_MAX_CASCADE: usize = 1024;

/// Outcome of handing a change to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// Drained by this call; holds the number of changes delivered.
    Delivered(usize),
    /// Queued behind a drain already in progress.
    Deferred,
}

/// The cascade cap was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CascadeOverflow {
    pub(crate) limit: usize,
    pub(crate) discarded: usize,
}

struct Pending {
    id: PathId,
    value: Value,
}

pub(crate) struct Dispatcher {
    draining: Cell<bool>,
    queue: RefCell<VecDeque<Pending>>,
    max_cascade: usize,
}

/// Ends a drain. On unwind the queue still holds changes from the aborted
/// cascade; they are stale and must not leak into the next write.
struct DrainGuard<'a>(&'a Dispatcher);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut queue) = self.0.queue.try_borrow_mut() {
            queue.clear();
        }
        self.0.draining.set(false);
    }
}

impl Dispatcher {
    pub(crate) fn new(max_cascade: usize) -> Self {
        Self {
            draining: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
            max_cascade: max_cascade.max(1),
        }
    }

    pub(crate) fn max_cascade(&self) -> usize {
        self.max_cascade
    }

    /// Queue a change and, unless a drain is already running, drain.
    ///
    /// `subscribers` is consulted at delivery time, so callbacks registered
    /// while a cascade is running see later changes.
    pub(crate) fn dispatch<F>(
        &self,
        id: PathId,
        value: Value,
        subscribers: F,
    ) -> Result<Dispatch, CascadeOverflow>
    where
        F: Fn(PathId) -> Vec<Callback>,
    {
        self.queue.borrow_mut().push_back(Pending { id, value });
        if self.draining.get() {
            return Ok(Dispatch::Deferred);
        }

        self.draining.set(true);
        let _guard = DrainGuard(self);
        let mut delivered = 0usize;
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(pending) = next else {
                break;
            };
            if delivered == self.max_cascade {
                let discarded = {
                    let mut queue = self.queue.borrow_mut();
                    let n = queue.len() + 1;
                    queue.clear();
                    n
                };
                tracing::warn!(
                    limit = self.max_cascade,
                    discarded,
                    "change cascade exceeded its cap; remaining notifications dropped"
                );
                return Err(CascadeOverflow {
                    limit: self.max_cascade,
                    discarded,
                });
            }
            delivered += 1;
            for callback in subscribers(pending.id) {
                callback(&pending.value);
            }
        }
        Ok(Dispatch::Delivered(delivered))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("draining", &self.draining.get())
            .field("queued", &self.queue.borrow().len())
            .field("max_cascade", &self.max_cascade)
            .finish()
    }
}
