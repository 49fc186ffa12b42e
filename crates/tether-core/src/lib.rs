#![forbid(unsafe_code)]

//! Core, non-reactive building blocks for Tether.
//!
//! This crate provides:
//! - [`Path`] / [`PathTable`] for pre-split, interned model addresses
//! - [`Marker`] for classifying `data-bind` / `data-bind-<name>` attributes
//! - [`ViewNode`] plus the in-memory [`Document`] / [`Element`] view tree
//! - [`index`](index::index) for the one-shot scan that finds bound elements

pub mod classify;
pub mod index;
pub mod path;
pub mod view;

pub use classify::{Classified, Marker, MarkerError, Target};
pub use index::{BoundElement, Declaration};
pub use path::{Path, PathError, PathId, PathTable};
pub use view::{Document, Element, ViewNode};
