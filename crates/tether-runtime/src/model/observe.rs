#![forbid(unsafe_code)]

//! The one-shot observation walk.
//!
//! Turns a plain JSON object into the observed tree: internal nodes for
//! nested objects, [`LeafCell`]s for everything else, and a [`PathTable`]
//! entry for every property. The walk is depth-first and registers a
//! property only after its subtree, so ids are assigned in post-order.
//!
//! Object-valued properties get a cell too. It stays unused until the
//! property itself is written; from then on the written value shadows the
//! observed subtree for reads.

use std::cell::Cell;
use std::collections::BTreeMap;

use tether_core::{Path, PathId, PathTable, path::SEPARATOR};

use crate::reactive::cell::LeafCell;
use crate::value::Value;

/// A node of the observed tree.
#[derive(Debug)]
pub(crate) enum Node {
    Leaf(PathId),
    Object {
        id: PathId,
        children: BTreeMap<Box<str>, Node>,
    },
}

/// What lives behind a [`PathId`].
#[derive(Debug)]
pub(crate) enum Slot {
    Leaf(LeafCell),
    Object(ObjectSlot),
}

/// The slot of an object-valued property.
#[derive(Debug)]
pub(crate) struct ObjectSlot {
    cell: LeafCell,
    replaced: Cell<bool>,
}

impl ObjectSlot {
    fn new() -> Self {
        Self {
            cell: LeafCell::new(Value::Null),
            replaced: Cell::new(false),
        }
    }
}

impl Slot {
    /// The cell holding subscribers and, once written, the current value.
    pub(crate) fn cell(&self) -> &LeafCell {
        match self {
            Self::Leaf(cell) => cell,
            Self::Object(slot) => &slot.cell,
        }
    }

    /// Apply a write. Returns whether the value changed.
    ///
    /// The first write to an object slot always counts as a change: nothing
    /// scalar can equal the observed subtree.
    pub(crate) fn write(&self, value: Value) -> bool {
        match self {
            Self::Leaf(cell) => cell.replace(value),
            Self::Object(slot) if slot.replaced.get() => slot.cell.replace(value),
            Self::Object(slot) => {
                slot.cell.overwrite(value);
                slot.replaced.set(true);
                true
            }
        }
    }

    /// The value written over an object slot, if any.
    pub(crate) fn replacement(&self) -> Option<Value> {
        match self {
            Self::Object(slot) if slot.replaced.get() => Some(slot.cell.get()),
            Self::Leaf(_) | Self::Object(_) => None,
        }
    }
}

/// Output of the walk.
#[derive(Debug, Default)]
pub(crate) struct Observed {
    pub(crate) root: BTreeMap<Box<str>, Node>,
    pub(crate) table: PathTable,
    pub(crate) slots: Vec<Slot>,
    pub(crate) skipped: usize,
}

impl Observed {
    pub(crate) fn from_object(object: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut observed = Self::default();
        observed.root = observed.walk(object, None);
        observed
    }

    fn register(&mut self, path: Path, slot: Slot) -> PathId {
        let id = self.table.intern(path);
        debug_assert_eq!(id.index(), self.slots.len(), "paths are unique per walk");
        self.slots.push(slot);
        id
    }

    fn walk(
        &mut self,
        object: serde_json::Map<String, serde_json::Value>,
        prefix: Option<&Path>,
    ) -> BTreeMap<Box<str>, Node> {
        let mut children = BTreeMap::new();
        for (name, value) in object {
            // Such keys cannot be addressed by a dotted path.
            if name.is_empty() || name.contains(SEPARATOR) {
                tracing::debug!(key = %name, "skipping unaddressable model key");
                self.skipped += 1;
                continue;
            }
            let path = match prefix {
                Some(parent) => parent.join(name.as_str()),
                None => Path::single(name.as_str()),
            };
            let node = match value {
                serde_json::Value::Object(inner) => {
                    let children = self.walk(inner, Some(&path));
                    let id = self.register(path, Slot::Object(ObjectSlot::new()));
                    Node::Object { id, children }
                }
                leaf => {
                    let cell = LeafCell::new(Value::from_json(leaf));
                    Node::Leaf(self.register(path, Slot::Leaf(cell)))
                }
            };
            children.insert(name.into_boxed_str(), node);
        }
        children
    }
}
