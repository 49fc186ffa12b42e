#![forbid(unsafe_code)]

//! The binding controller.
//!
//! [`DataBind`] holds the model and configuration, and [`DataBind::init`]
//! runs the one bind pass:
//!
//! 1. build the classifier from the configured marker,
//! 2. index the supplied elements once,
//! 3. resolve declarations to path ids ([`BoundSet`]),
//! 4. paint everything,
//! 5. subscribe one targeted painter per watched property.
//!
//! The result is a [`BoundView`]: an explicit handle that owns the
//! subscriptions. Writes made through [`BoundView::model`] (or any clone of
//! the model) repaint exactly the affected targets before returning. Dropping
//! the view unbinds it; the model stays usable.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tether_core::{Document, Element};
//! use tether_runtime::{BindConfig, DataBind};
//!
//! let title = Element::new("h2").with_attr("data-bind", "subtitle");
//! let doc = Document::with_body([title.clone()]);
//!
//! let view = DataBind::initialize(
//!     BindConfig::default(),
//!     json!({ "subtitle": "Hooray!" }),
//!     doc.elements(),
//! )
//! .unwrap();
//! assert_eq!(title.text(), "Hooray!");
//!
//! view.model().set("subtitle", "new content value").unwrap();
//! assert_eq!(title.text(), "new content value");
//! ```

use std::fmt;
use std::rc::Rc;

use tether_core::{MarkerError, ViewNode, index::index};

use crate::apply::{AbsentPolicies, BoundSet, PaintStats};
use crate::config::BindConfig;
use crate::model::{Model, ModelError};
use crate::reactive::BindingScope;

/// Errors from setting up a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// `init` was called before a model was supplied.
    MissingModel,
    /// The configured marker cannot classify attributes.
    InvalidMarker(MarkerError),
    /// The model could not be observed.
    Model(ModelError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingModel => write!(f, "no model set; call set_model before init"),
            Self::InvalidMarker(e) => write!(f, "invalid binding marker: {e}"),
            Self::Model(e) => write!(f, "model error: {e}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingModel => None,
            Self::InvalidMarker(e) => Some(e),
            Self::Model(e) => Some(e),
        }
    }
}

impl From<ModelError> for BindError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<MarkerError> for BindError {
    fn from(e: MarkerError) -> Self {
        Self::InvalidMarker(e)
    }
}

/// Binding controller: configuration plus the current model.
#[derive(Debug, Default)]
pub struct DataBind {
    config: BindConfig,
    model: Option<Model>,
}

impl DataBind {
    /// A controller with no model yet.
    #[must_use]
    pub fn new(config: BindConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// Observe `json` and make it the model for the next `init`.
    ///
    /// # Errors
    ///
    /// [`BindError::Model`] when `json` is not an object.
    pub fn set_model(&mut self, json: serde_json::Value) -> Result<&Model, BindError> {
        let model = Model::observe_with(json, self.config.max_cascade)?;
        Ok(self.model.insert(model))
    }

    /// Use an already observed model, shared with other views.
    ///
    /// The model keeps the cascade cap it was observed with;
    /// [`BindConfig::max_cascade`] only applies to [`set_model`](Self::set_model).
    /// Use [`Model::observe_with`] to choose the cap of a shared model.
    pub fn set_observed_model(&mut self, model: Model) -> &mut Self {
        self.model = Some(model);
        self
    }

    /// The current model, if one was set.
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Index `elements`, paint them and subscribe to model changes.
    ///
    /// # Errors
    ///
    /// [`BindError::MissingModel`] without a model,
    /// [`BindError::InvalidMarker`] for an empty marker.
    pub fn init<E, I>(&self, elements: I) -> Result<BoundView<E>, BindError>
    where
        E: ViewNode,
        I: IntoIterator<Item = E>,
    {
        let model = self.model.clone().ok_or(BindError::MissingModel)?;
        let marker = self.config.marker()?;
        let policies = self.config.absent_policies();

        let bound = Rc::new(BoundSet::new(index(elements, &marker), &model));
        let stats = bound.apply_all(&model, &policies);

        let mut scope = BindingScope::new();
        for id in bound.watched_ids() {
            let set = Rc::clone(&bound);
            let painter = move |value: &crate::Value| {
                let touched = set.apply_targeted(id, value, &policies);
                tracing::trace!(path = %id, touched, "targeted paint");
            };
            if let Some(sub) = model.watch_id(id, painter) {
                scope.hold(sub);
            }
        }

        tracing::debug!(
            elements = bound.len(),
            watched = scope.len(),
            unresolved = bound.unresolved(),
            written = stats.written,
            blanked = stats.blanked,
            skipped = stats.skipped,
            "bound view initialized"
        );

        Ok(BoundView {
            model,
            bound,
            policies,
            scope,
            initial: stats,
        })
    }

    /// One-call form: observe `json`, then `init(elements)`.
    ///
    /// # Errors
    ///
    /// See [`set_model`](Self::set_model) and [`init`](Self::init).
    pub fn initialize<E, I>(
        config: BindConfig,
        json: serde_json::Value,
        elements: I,
    ) -> Result<BoundView<E>, BindError>
    where
        E: ViewNode,
        I: IntoIterator<Item = E>,
    {
        let mut binder = Self::new(config);
        binder.set_model(json)?;
        binder.init(elements)
    }
}

/// A live binding between a model and a set of elements.
///
/// # Invariants
///
/// 1. While the view is alive, every changed write to a bound property
///    repaints the targets bound to exactly that path before the write
///    returns.
/// 2. After drop, no write touches the view.
pub struct BoundView<E> {
    model: Model,
    bound: Rc<BoundSet<E>>,
    policies: AbsentPolicies,
    scope: BindingScope,
    initial: PaintStats,
}

impl<E: ViewNode> BoundView<E> {
    /// The model handle. Writes through it update the view.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Number of bound elements.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bound.len()
    }

    /// The bound elements and their declarations.
    #[must_use]
    pub fn bound(&self) -> &BoundSet<E> {
        &self.bound
    }

    /// Number of model subscriptions held by this view.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.scope.len()
    }

    /// Counters from the paint performed by `init`.
    #[must_use]
    pub fn initial_paint(&self) -> PaintStats {
        self.initial
    }

    /// Repaint every bound target from the current model.
    pub fn repaint(&self) -> PaintStats {
        self.bound.apply_all(&self.model, &self.policies)
    }
}

impl<E> fmt::Debug for BoundView<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("model", &self.model)
            .field("scope", &self.scope)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}
