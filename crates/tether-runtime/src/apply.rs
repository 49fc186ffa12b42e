#![forbid(unsafe_code)]

//! Writing model values into bound elements.
//!
//! Two entry points:
//!
//! - [`apply_all`]: the full paint. Resolves every declaration of every bound
//!   element against the model and writes the result.
//! - [`BoundSet::apply_targeted`]: the incremental paint. Writes one changed
//!   value to exactly the declarations whose path id equals the changed id.
//!
//! A [`BoundSet`] is built once per initialization. It resolves each
//! declaration's path to a [`PathId`] and groups declarations by id, so a
//! targeted paint is a single hash lookup and never re-scans the view.
//!
//! # Absent values
//!
//! Null, opaque values (arrays) and nested objects are not rendered. What
//! happens to the target is decided per target kind by [`AbsentPolicies`]:
//! content is blanked and attributes are left untouched unless configured
//! otherwise.

use std::borrow::Cow;

use ahash::AHashMap;
use tether_core::{BoundElement, Declaration, PathId, Target, ViewNode};

use crate::model::{Model, Resolved};
use crate::value::Value;

/// What to do with a target whose path resolves to nothing renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(rename_all = "lowercase"))]
pub enum AbsentPolicy {
    /// Keep whatever the element currently shows.
    #[default]
    Leave,
    /// Write the empty string.
    Blank,
}

/// Absent policies per target kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsentPolicies {
    /// Policy for content (`data-bind`) targets.
    pub content: AbsentPolicy,
    /// Policy for attribute (`data-bind-<name>`) targets.
    pub attribute: AbsentPolicy,
}

impl Default for AbsentPolicies {
    fn default() -> Self {
        Self {
            content: AbsentPolicy::Blank,
            attribute: AbsentPolicy::Leave,
        }
    }
}

impl AbsentPolicies {
    /// The policy governing `target`.
    #[must_use]
    pub fn for_target(&self, target: &Target) -> AbsentPolicy {
        match target {
            Target::Content => self.content,
            Target::Attribute(_) => self.attribute,
        }
    }
}

/// Counters from a full paint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Targets that received a resolved value.
    pub written: usize,
    /// Targets blanked because their path was absent.
    pub blanked: usize,
    /// Targets left untouched because their path was absent.
    pub skipped: usize,
}

impl PaintStats {
    /// Total number of declarations visited.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written + self.blanked + self.skipped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Written,
    Blanked,
    Skipped,
}

fn write_target<E: ViewNode>(
    element: &E,
    target: &Target,
    rendered: Option<Cow<'_, str>>,
    policies: &AbsentPolicies,
) -> Outcome {
    let (text, outcome) = match rendered {
        Some(text) => (text, Outcome::Written),
        None => match policies.for_target(target) {
            AbsentPolicy::Leave => return Outcome::Skipped,
            AbsentPolicy::Blank => (Cow::Borrowed(""), Outcome::Blanked),
        },
    };
    match target {
        Target::Content => element.set_text(&text),
        Target::Attribute(name) => element.set_attribute(name, &text),
    }
    outcome
}

fn rendered(resolved: &Resolved) -> Option<Cow<'_, str>> {
    match resolved {
        Resolved::Value(value) => value.render(),
        Resolved::Object | Resolved::Absent => None,
    }
}

/// Paint every declaration of every element in `bound`.
pub fn apply_all<E: ViewNode>(
    model: &Model,
    bound: &[BoundElement<E>],
    policies: &AbsentPolicies,
) -> PaintStats {
    let mut stats = PaintStats::default();
    for el in bound {
        for Declaration { target, path } in el.declarations() {
            let resolved = model.resolve(path);
            match write_target(el.element(), target, rendered(&resolved), policies) {
                Outcome::Written => stats.written += 1,
                Outcome::Blanked => stats.blanked += 1,
                Outcome::Skipped => stats.skipped += 1,
            }
        }
    }
    stats
}

/// Bound elements plus a fan-out table from observed property to
/// declarations.
#[derive(Debug)]
pub struct BoundSet<E> {
    elements: Vec<BoundElement<E>>,
    fanout: AHashMap<PathId, Vec<(u32, u32)>>,
    unresolved: usize,
}

impl<E: ViewNode> BoundSet<E> {
    /// Resolve every declaration against `model` and build the fan-out table.
    ///
    /// Every observed property, leaf or object, can be written and so gets
    /// an entry. Declarations whose path was not observed can never change;
    /// they only take part in full paints.
    #[must_use]
    pub fn new(elements: Vec<BoundElement<E>>, model: &Model) -> Self {
        let mut fanout: AHashMap<PathId, Vec<(u32, u32)>> = AHashMap::new();
        let mut unresolved = 0;
        for (ei, el) in elements.iter().enumerate() {
            for (di, decl) in el.declarations().iter().enumerate() {
                match model.id_of(&decl.path) {
                    Some(id) => fanout.entry(id).or_default().push((ei as u32, di as u32)),
                    None => unresolved += 1,
                }
            }
        }
        Self {
            elements,
            fanout,
            unresolved,
        }
    }

    /// The bound elements, in document order.
    #[must_use]
    pub fn elements(&self) -> &[BoundElement<E>] {
        &self.elements
    }

    /// Number of bound elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no element is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Declarations whose path was not observed.
    #[must_use]
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Observed properties referenced by at least one declaration.
    pub fn watched_ids(&self) -> impl Iterator<Item = PathId> + '_ {
        self.fanout.keys().copied()
    }

    /// `(element, declaration)` pairs bound to `id`.
    pub fn targets_for(&self, id: PathId) -> impl Iterator<Item = (&E, &Declaration)> + '_ {
        self.fanout.get(&id).into_iter().flatten().filter_map(|&(ei, di)| {
            let el = self.elements.get(ei as usize)?;
            Some((el.element(), el.declarations().get(di as usize)?))
        })
    }

    /// Full paint of this set.
    pub fn apply_all(&self, model: &Model, policies: &AbsentPolicies) -> PaintStats {
        apply_all(model, &self.elements, policies)
    }

    /// Write `value` to the declarations bound to `changed`.
    ///
    /// Returns the number of targets touched.
    pub fn apply_targeted(&self, changed: PathId, value: &Value, policies: &AbsentPolicies) -> usize {
        let mut touched = 0;
        for (element, decl) in self.targets_for(changed) {
            if write_target(element, &decl.target, value.render(), policies) != Outcome::Skipped {
                touched += 1;
            }
        }
        touched
    }
}

/// Free-function form of [`BoundSet::apply_targeted`].
pub fn apply_targeted<E: ViewNode>(
    bound: &BoundSet<E>,
    changed: PathId,
    value: &Value,
    policies: &AbsentPolicies,
) -> usize {
    bound.apply_targeted(changed, value, policies)
}
