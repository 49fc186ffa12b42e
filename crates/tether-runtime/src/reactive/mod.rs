#![forbid(unsafe_code)]

//! Change-tracking primitives behind the observed model.
//!
//! - `LeafCell`: the private slot of one observed property (value, version,
//!   subscribers). Internal; reached through [`Model`](crate::Model).
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: holds the subscriptions of one owner.
//! - `Dispatcher`: delivers changes, queueing re-entrant writes.
//!
//! # Architecture
//!
//! All state is single-threaded (`Rc`/`RefCell`). Cells store subscribers as
//! `Weak` function pointers, cleaned up lazily at delivery time. Cells never
//! invoke callbacks themselves: a changed write is handed to the dispatcher,
//! which drains a FIFO queue from the outermost write only.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per write that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Writing a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    delivery.
//! 5. A write from inside a callback is applied immediately but delivered
//!    after the current callback returns.

pub(crate) mod cell;
pub(crate) mod dispatch;
pub mod scope;

pub use cell::Subscription;
pub use dispatch::DEFAULT_MAX_CASCADE;
pub use scope::BindingScope;
