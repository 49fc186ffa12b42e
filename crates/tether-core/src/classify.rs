#![forbid(unsafe_code)]

//! Binding attribute classification.
//!
//! A view attribute is a binding declaration when its name is the marker
//! token (`data-bind` by default) or the marker token followed by the
//! separator and a non-empty suffix (`data-bind-title`).
//!
//! | Attribute name | Classification |
//! |----------------|----------------|
//! | `data-bind` | [`Classified::Content`] |
//! | `data-bind-title` | [`Classified::Attribute`]`("title")` |
//! | `data-bind-` | [`Classified::Plain`] (empty suffix) |
//! | `data-bind2` | [`Classified::Plain`] (bare prefix) |
//! | `Data-Bind` | [`Classified::Plain`] (case-sensitive) |

use std::fmt;

/// Default marker token.
pub const DEFAULT_MARKER: &str = "data-bind";

/// Default separator between the marker token and an attribute suffix.
pub const DEFAULT_SEPARATOR: char = '-';

/// Errors from constructing a [`Marker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// The marker token was empty.
    EmptyToken,
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "binding marker token must not be empty"),
        }
    }
}

impl std::error::Error for MarkerError {}

/// Result of classifying a single attribute name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Binds the element's text content.
    Content,
    /// Binds the named view attribute.
    Attribute(&'a str),
    /// Not a binding declaration.
    Plain,
}

impl Classified<'_> {
    /// Whether this classification is a binding of any kind.
    #[must_use]
    pub fn is_binding(&self) -> bool {
        !matches!(self, Self::Plain)
    }

    /// The owned target, if this is a binding.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match *self {
            Self::Content => Some(Target::Content),
            Self::Attribute(name) => Some(Target::Attribute(name.to_owned())),
            Self::Plain => None,
        }
    }
}

/// The view property a declaration writes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// The element's textual body.
    Content,
    /// A named attribute.
    Attribute(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Attribute(name) => write!(f, "attribute:{name}"),
        }
    }
}

/// The binding marker: token plus separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    token: String,
    separator: char,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            token: DEFAULT_MARKER.to_owned(),
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl Marker {
    /// Create a marker from a token and separator.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError::EmptyToken`] when `token` is empty.
    pub fn new(token: impl Into<String>, separator: char) -> Result<Self, MarkerError> {
        let token = token.into();
        if token.is_empty() {
            return Err(MarkerError::EmptyToken);
        }
        Ok(Self { token, separator })
    }

    /// The marker token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The separator between token and suffix.
    #[must_use]
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Classify an attribute name.
    #[must_use]
    pub fn classify<'a>(&self, name: &'a str) -> Classified<'a> {
        let Some(rest) = name.strip_prefix(self.token.as_str()) else {
            return Classified::Plain;
        };
        if rest.is_empty() {
            return Classified::Content;
        }
        match rest.strip_prefix(self.separator) {
            Some(suffix) if !suffix.is_empty() => Classified::Attribute(suffix),
            _ => Classified::Plain,
        }
    }

    /// Whether `name` classifies as any binding.
    #[must_use]
    pub fn is_binding(&self, name: &str) -> bool {
        self.classify(name).is_binding()
    }
}
