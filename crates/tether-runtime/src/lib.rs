#![forbid(unsafe_code)]

//! Reactive side of Tether.
//!
//! This crate provides:
//! - [`Model`], the observed model tree with change notification
//! - [`Value`], the scalar values held by model leaves
//! - [`apply_all`] and [`BoundSet`], the full and targeted painters
//! - [`DataBind`] and [`BoundView`], the binding controller and its handle
//! - [`BindConfig`], marker syntax, absent policies and cascade cap
//!
//! Everything here is single-threaded: handles are `Rc`-based and `!Send`.

pub mod apply;
pub mod binder;
pub mod config;
pub mod model;
pub mod reactive;
pub mod value;

pub use apply::{AbsentPolicies, AbsentPolicy, BoundSet, PaintStats, apply_all, apply_targeted};
pub use binder::{BindError, BoundView, DataBind};
#[cfg(feature = "policy-config")]
pub use config::ConfigError;
pub use config::BindConfig;
pub use model::{Model, ModelError, Resolved};
pub use reactive::{BindingScope, DEFAULT_MAX_CASCADE, Subscription};
pub use value::Value;
