#![forbid(unsafe_code)]

//! One-shot indexing of bound elements.
//!
//! [`index`] filters an element collection down to the elements that carry at
//! least one binding attribute, and resolves each kept element's full set of
//! [`Declaration`]s. The result is immutable: later view mutations are never
//! re-scanned.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Invalid path value | `data-bind=""`, `data-bind="a..b"` | Declaration dropped |
//! | No valid declaration left | All binding paths invalid | Element dropped |
//! | Malformed attribute name | `data-bind-`, `data-bind2` | Not a binding |

use crate::classify::{Marker, Target};
use crate::path::Path;
use crate::view::ViewNode;

/// A single `(target, path)` binding declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Where the resolved value is written.
    pub target: Target,
    /// The model path the value is read from.
    pub path: Path,
}

/// A view element plus its resolved declarations.
#[derive(Debug, Clone)]
pub struct BoundElement<E> {
    element: E,
    declarations: Vec<Declaration>,
}

impl<E: ViewNode> BoundElement<E> {
    /// The element handle.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    /// The declarations, in attribute order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// The content declaration, if any.
    #[must_use]
    pub fn content(&self) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.target == Target::Content)
    }
}

/// Resolve the declarations of a single element.
///
/// Returns `None` when the element carries no valid declaration.
#[must_use]
pub fn declarations_of<E: ViewNode>(element: &E, marker: &Marker) -> Option<Vec<Declaration>> {
    let mut declarations = Vec::new();
    for (name, value) in element.attributes() {
        let Some(target) = marker.classify(&name).target() else {
            continue;
        };
        match Path::parse(&value) {
            Ok(path) => declarations.push(Declaration { target, path }),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attribute = %name,
                    value = %value,
                    error = %_err,
                    "dropping binding declaration with invalid path"
                );
            }
        }
    }
    (!declarations.is_empty()).then_some(declarations)
}

/// Scan `elements` once and keep the bound ones.
#[must_use]
pub fn index<E, I>(elements: I, marker: &Marker) -> Vec<BoundElement<E>>
where
    E: ViewNode,
    I: IntoIterator<Item = E>,
{
    let bound: Vec<_> = elements
        .into_iter()
        .filter(|el| {
            el.attributes()
                .iter()
                .any(|(name, _)| marker.is_binding(name))
        })
        .filter_map(|element| {
            declarations_of(&element, marker).map(|declarations| BoundElement {
                element,
                declarations,
            })
        })
        .collect();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        bound = bound.len(),
        marker = marker.token(),
        "indexed bound elements"
    );

    bound
}
