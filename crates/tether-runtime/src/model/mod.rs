#![forbid(unsafe_code)]

//! The observed model.
//!
//! [`Model::observe`] walks a plain JSON object once and builds an explicit
//! tree: nested objects become internal nodes, everything else becomes an
//! observed leaf holding its current value and its subscribers. Properties
//! are identified by [`PathId`]s assigned during that walk. Object-valued
//! properties are observed too: they can be watched, and writing one
//! replaces it.
//!
//! A [`Model`] is a cheap, shared handle (`Rc`); clones see the same values
//! and the same subscribers.
//!
//! # Invariants
//!
//! 1. The set of observed properties is fixed at `observe` time. Writes to
//!    any other path fail with [`ModelError::UnknownPath`].
//! 2. `set(p, v)` with `v == get(p)` delivers nothing.
//! 3. A changed write is delivered to the subscribers of exactly that path;
//!    ancestors, descendants and siblings are not notified, even when the
//!    written path is an object.
//! 4. Every write returns only after its notifications (and any cascade they
//!    trigger) have been delivered.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Root not an object | `observe(json!(1))` | `ModelError::RootNotObject` |
//! | Malformed path | `set("a..b", _)` | `ModelError::InvalidPath` |
//! | Unobserved path | Key absent at observe time | `ModelError::UnknownPath` |
//! | Runaway cascade | Callbacks keep writing | `ModelError::CascadeLimit` |
//! | Unresolvable read | Missing or non-object intermediate | `Resolved::Absent` |

mod observe;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tether_core::{Path, PathError, PathId, PathTable};

use crate::reactive::Subscription;
use crate::reactive::cell::Callback;
use crate::reactive::dispatch::{DEFAULT_MAX_CASCADE, Dispatch, Dispatcher};
use crate::value::Value;
use observe::{Node, Observed, Slot};

/// Errors from model operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The value passed to `observe` was not a JSON object.
    RootNotObject,
    /// A path string could not be parsed.
    InvalidPath(PathError),
    /// The path was not present when the model was observed.
    UnknownPath(String),
    /// A cascade of re-entrant writes exceeded the configured cap.
    CascadeLimit {
        /// The cap that was hit.
        limit: usize,
        /// Notifications discarded when the cap was hit.
        discarded: usize,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotObject => write!(f, "model root must be an object"),
            Self::InvalidPath(e) => write!(f, "invalid path: {e}"),
            Self::UnknownPath(p) => write!(f, "path '{p}' is not an observed property"),
            Self::CascadeLimit { limit, discarded } => write!(
                f,
                "change cascade exceeded {limit} notifications ({discarded} discarded)"
            ),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPath(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PathError> for ModelError {
    fn from(e: PathError) -> Self {
        Self::InvalidPath(e)
    }
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// The path names a leaf, or an object that was written over.
    Value(Value),
    /// The path names a nested object.
    Object,
    /// Nothing lives at the path.
    Absent,
}

impl Resolved {
    /// The leaf value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Object | Self::Absent => None,
        }
    }
}

struct ModelInner {
    root: BTreeMap<Box<str>, Node>,
    table: PathTable,
    slots: Vec<Slot>,
    dispatcher: Dispatcher,
}

/// Shared handle to an observed model.
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// Observe `json` with the default cascade cap.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RootNotObject`] when `json` is not an object.
    pub fn observe(json: serde_json::Value) -> Result<Self, ModelError> {
        Self::observe_with(json, DEFAULT_MAX_CASCADE)
    }

    /// Observe `json`, capping re-entrant cascades at `max_cascade`
    /// deliveries per outermost write.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::RootNotObject`] when `json` is not an object.
    pub fn observe_with(json: serde_json::Value, max_cascade: usize) -> Result<Self, ModelError> {
        let serde_json::Value::Object(object) = json else {
            return Err(ModelError::RootNotObject);
        };
        let Observed {
            root,
            table,
            slots,
            skipped,
        } = Observed::from_object(object);
        tracing::debug!(
            properties = table.len(),
            skipped,
            max_cascade,
            "observed model"
        );
        Ok(Self {
            inner: Rc::new(ModelInner {
                root,
                table,
                slots,
                dispatcher: Dispatcher::new(max_cascade),
            }),
        })
    }

    /// Resolve `path` by walking the tree from the root.
    ///
    /// An object property that has been written over resolves to the
    /// written value, and its observed subtree is no longer reachable.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> Resolved {
        let mut children = &self.inner.root;
        let mut current: Option<&Node> = None;
        for segment in path.segments() {
            if let Some(node) = current {
                match node {
                    Node::Object { id, children: inner } if self.replacement(*id).is_none() => {
                        children = inner;
                    }
                    // Scalars, strings, null and replaced objects have no properties.
                    Node::Leaf(_) | Node::Object { .. } => return Resolved::Absent,
                }
            }
            match children.get(segment) {
                Some(node) => current = Some(node),
                None => return Resolved::Absent,
            }
        }
        match current {
            Some(Node::Leaf(id)) => self
                .slot(*id)
                .map_or(Resolved::Absent, |slot| Resolved::Value(slot.cell().get())),
            Some(Node::Object { id, .. }) => self
                .replacement(*id)
                .map_or(Resolved::Object, Resolved::Value),
            None => Resolved::Absent,
        }
    }

    /// Resolve a dotted path string. Malformed paths resolve to absent.
    #[must_use]
    pub fn resolve_str(&self, path: &str) -> Resolved {
        Path::parse(path).map_or(Resolved::Absent, |p| self.resolve(&p))
    }

    /// Current value at `path`, unless it is absent or an unwritten object.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Value> {
        self.resolve_str(path).into_value()
    }

    /// Write `value` to the observed property at `path`.
    ///
    /// Returns `Ok(true)` when the value changed and subscribers were
    /// notified, `Ok(false)` when it was equal to the current value.
    ///
    /// Writing an object-valued property replaces it as a whole. Only the
    /// subscribers of that exact path are notified; its descendants keep
    /// their cells and subscribers.
    ///
    /// # Errors
    ///
    /// See [`ModelError`].
    pub fn set(&self, path: &str, value: impl Into<Value>) -> Result<bool, ModelError> {
        let path = Path::parse(path)?;
        self.set_path(&path, value)
    }

    /// [`set`](Self::set) with a pre-parsed path.
    ///
    /// # Errors
    ///
    /// See [`ModelError`].
    pub fn set_path(&self, path: &Path, value: impl Into<Value>) -> Result<bool, ModelError> {
        let id = self
            .id_of(path)
            .ok_or_else(|| ModelError::UnknownPath(path.to_string()))?;
        self.set_id(id, value)
    }

    /// [`set`](Self::set) addressed by id.
    ///
    /// # Errors
    ///
    /// See [`ModelError`].
    pub fn set_id(&self, id: PathId, value: impl Into<Value>) -> Result<bool, ModelError> {
        let slot = self
            .slot(id)
            .ok_or_else(|| ModelError::UnknownPath(id.to_string()))?;
        let value = value.into();
        if !slot.write(value.clone()) {
            return Ok(false);
        }
        tracing::trace!(path = %self.describe(id), ?value, "model write");
        match self
            .inner
            .dispatcher
            .dispatch(id, value, |id| self.subscribers(id))
        {
            Ok(Dispatch::Delivered(n)) if n > 1 => {
                tracing::trace!(delivered = n, "drained change cascade");
            }
            Ok(_) => {}
            Err(overflow) => {
                return Err(ModelError::CascadeLimit {
                    limit: overflow.limit,
                    discarded: overflow.discarded,
                });
            }
        }
        Ok(true)
    }

    /// Subscribe to changes of the property at `path`.
    ///
    /// The callback receives the new value after every changed write. Dropping
    /// the returned [`Subscription`] unsubscribes.
    ///
    /// # Errors
    ///
    /// [`ModelError::InvalidPath`] or [`ModelError::UnknownPath`].
    pub fn watch(
        &self,
        path: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<Subscription, ModelError> {
        let path = Path::parse(path)?;
        self.id_of(&path)
            .and_then(|id| self.watch_id(id, callback))
            .ok_or_else(|| ModelError::UnknownPath(path.to_string()))
    }

    /// Subscribe by id. Returns `None` when `id` is not from this model.
    pub fn watch_id(
        &self,
        id: PathId,
        callback: impl Fn(&Value) + 'static,
    ) -> Option<Subscription> {
        self.slot(id).map(|slot| slot.cell().subscribe(callback))
    }

    /// The id of an observed property.
    #[must_use]
    pub fn id_of(&self, path: &Path) -> Option<PathId> {
        self.inner.table.get(path)
    }

    /// The path of an observed property.
    #[must_use]
    pub fn path_of(&self, id: PathId) -> Option<&Path> {
        self.inner.table.path(id)
    }

    /// Whether `id` was observed as a leaf (as opposed to a nested object).
    #[must_use]
    pub fn is_leaf(&self, id: PathId) -> bool {
        matches!(self.slot(id), Some(Slot::Leaf(_)))
    }

    /// Number of value-changing writes seen by the property at `path`.
    #[must_use]
    pub fn version(&self, path: &str) -> Option<u64> {
        let path = Path::parse(path).ok()?;
        self.slot(self.id_of(&path)?).map(|slot| slot.cell().version())
    }

    /// Number of registered subscribers on the property at `id`.
    #[must_use]
    pub fn subscriber_count(&self, id: PathId) -> usize {
        self.slot(id).map_or(0, |slot| slot.cell().subscriber_count())
    }

    /// All observed property paths, in observation (post-)order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> + '_ {
        self.inner.table.iter().map(|(_, p)| p)
    }

    /// Cap on notifications delivered per outermost write.
    #[must_use]
    pub fn max_cascade(&self) -> usize {
        self.inner.dispatcher.max_cascade()
    }

    /// Number of observed properties (leaves and objects).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.table.len()
    }

    /// Whether the model has no observed property.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.table.is_empty()
    }

    /// Snapshot the current values as JSON.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.object_json(&self.inner.root)
    }

    fn object_json(&self, children: &BTreeMap<Box<str>, Node>) -> serde_json::Value {
        let map = children
            .iter()
            .map(|(name, node)| {
                let value = match node {
                    Node::Leaf(id) => self.slot(*id).map_or(serde_json::Value::Null, |slot| {
                        slot.cell().with(Value::to_json)
                    }),
                    Node::Object { id, children } => match self.replacement(*id) {
                        Some(value) => value.to_json(),
                        None => self.object_json(children),
                    },
                };
                (name.to_string(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }

    fn slot(&self, id: PathId) -> Option<&Slot> {
        self.inner.slots.get(id.index())
    }

    fn replacement(&self, id: PathId) -> Option<Value> {
        self.slot(id).and_then(Slot::replacement)
    }

    fn subscribers(&self, id: PathId) -> Vec<Callback> {
        self.slot(id)
            .map(|slot| slot.cell().live_subscribers())
            .unwrap_or_default()
    }

    fn describe(&self, id: PathId) -> String {
        self.path_of(id)
            .map_or_else(|| id.to_string(), ToString::to_string)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("properties", &self.inner.table.len())
            .field("dispatcher", &self.inner.dispatcher)
            .finish()
    }
}
