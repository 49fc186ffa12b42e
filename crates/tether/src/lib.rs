#![forbid(unsafe_code)]

//! Tether public facade.
//!
//! Binds a plain JSON model to a tree of view elements through
//! `data-bind` / `data-bind-<name>` attributes and keeps the view in sync as
//! the model is written.
//!
//! # Example
//!
//! ```
//! use tether::prelude::*;
//!
//! let heading = Element::new("h1").with_attr("data-bind", "label");
//! let badge = Element::new("div").with_attr("data-bind-class", "x.y.zet");
//! let doc = Document::with_body([heading.clone(), badge.clone()]);
//!
//! let view = DataBind::initialize(
//!     BindConfig::default(),
//!     json!({ "label": "Schibsted", "x": { "y": { "zet": "super-duper-class-name" } } }),
//!     doc.elements(),
//! )?;
//! assert_eq!(heading.text(), "Schibsted");
//! assert_eq!(badge.attribute("class").as_deref(), Some("super-duper-class-name"));
//!
//! view.model().set("x.y.zet", "highlight")?;
//! assert_eq!(badge.attribute("class").as_deref(), Some("highlight"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use serde_json;

pub use tether_core::{
    BoundElement, Classified, Declaration, Document, Element, Marker, MarkerError, Path,
    PathError, PathId, Target, ViewNode,
};
#[cfg(feature = "policy-config")]
pub use tether_runtime::ConfigError;
pub use tether_runtime::{
    AbsentPolicies, AbsentPolicy, BindConfig, BindError, BindingScope, BoundSet, BoundView,
    DataBind, Model, ModelError, PaintStats, Resolved, Subscription, Value,
};

/// Standard error type for Tether APIs.
#[derive(Debug)]
pub enum Error {
    /// Setting up a binding failed.
    Bind(BindError),
    /// A model operation failed.
    Model(ModelError),
    /// Loading configuration failed.
    #[cfg(feature = "policy-config")]
    Config(ConfigError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind(e) => write!(f, "{e}"),
            Self::Model(e) => write!(f, "{e}"),
            #[cfg(feature = "policy-config")]
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind(e) => e.source(),
            Self::Model(e) => e.source(),
            #[cfg(feature = "policy-config")]
            Self::Config(e) => e.source(),
        }
    }
}

impl From<BindError> for Error {
    fn from(e: BindError) -> Self {
        Self::Bind(e)
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

#[cfg(feature = "policy-config")]
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Standard result type for Tether APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything needed to bind a model to a view.
pub mod prelude {
    pub use crate::{
        AbsentPolicy, BindConfig, BoundView, DataBind, Document, Element, Model, Value, ViewNode,
    };
    pub use serde_json::json;
}
