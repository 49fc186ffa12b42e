#![forbid(unsafe_code)]

//! Binding configuration.
//!
//! [`BindConfig`] collects the knobs of one initialization: the binding
//! marker, the attribute-name separator, the absent policies and the cascade
//! cap. The defaults reproduce the stock `data-bind` / `data-bind-<name>`
//! syntax.
//!
//! # Serialization
//!
//! With the `policy-config` feature enabled, `BindConfig` derives
//! `Serialize` and `Deserialize` and can be loaded from TOML or JSON. Missing
//! keys take their default:
//!
//! ```toml
//! marker = "x-bind"
//! content_absent = "leave"
//! max_cascade = 64
//! ```

use tether_core::{Marker, MarkerError};
use tether_core::classify::{DEFAULT_MARKER, DEFAULT_SEPARATOR};

use crate::apply::{AbsentPolicies, AbsentPolicy};
use crate::reactive::DEFAULT_MAX_CASCADE;

/// Configuration for [`DataBind`](crate::DataBind).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct BindConfig {
    /// Attribute name marking a content binding.
    pub marker: String,
    /// Character between the marker and an attribute target's name.
    pub separator: char,
    /// What to do with content targets whose path is absent.
    pub content_absent: AbsentPolicy,
    /// What to do with attribute targets whose path is absent.
    pub attribute_absent: AbsentPolicy,
    /// Cap on notifications delivered per outermost model write.
    pub max_cascade: usize,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_owned(),
            separator: DEFAULT_SEPARATOR,
            content_absent: AbsentPolicy::Blank,
            attribute_absent: AbsentPolicy::Leave,
            max_cascade: DEFAULT_MAX_CASCADE,
        }
    }
}

impl BindConfig {
    /// Use `marker` as the binding attribute token.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Use `separator` between marker and attribute name.
    #[must_use]
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set both absent policies.
    #[must_use]
    pub fn with_absent(mut self, content: AbsentPolicy, attribute: AbsentPolicy) -> Self {
        self.content_absent = content;
        self.attribute_absent = attribute;
        self
    }

    /// Set the cascade cap (clamped to at least 1 when used).
    #[must_use]
    pub fn with_max_cascade(mut self, max_cascade: usize) -> Self {
        self.max_cascade = max_cascade;
        self
    }

    /// Build the attribute classifier.
    ///
    /// # Errors
    ///
    /// Returns [`MarkerError`] when the marker is empty.
    pub fn marker(&self) -> Result<Marker, MarkerError> {
        Marker::new(self.marker.as_str(), self.separator)
    }

    /// The absent policies as one value.
    #[must_use]
    pub fn absent_policies(&self) -> AbsentPolicies {
        AbsentPolicies {
            content: self.content_absent,
            attribute: self.attribute_absent,
        }
    }
}

#[cfg(feature = "policy-config")]
pub use loader::ConfigError;

#[cfg(feature = "policy-config")]
mod loader {
    use std::fmt;
    use std::path::Path;

    use super::BindConfig;

    /// Errors from loading a [`BindConfig`].
    #[derive(Debug)]
    pub enum ConfigError {
        /// The file could not be read.
        Io(std::io::Error),
        /// The document did not parse into a config.
        Parse(String),
        /// The file extension is neither `.toml` nor `.json`.
        UnsupportedFormat(String),
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Io(e) => write!(f, "config I/O error: {e}"),
                Self::Parse(msg) => write!(f, "config parse error: {msg}"),
                Self::UnsupportedFormat(ext) => {
                    write!(f, "unsupported config format '{ext}' (expected toml or json)")
                }
            }
        }
    }

    impl std::error::Error for ConfigError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Io(e) => Some(e),
                Self::Parse(_) | Self::UnsupportedFormat(_) => None,
            }
        }
    }

    impl From<std::io::Error> for ConfigError {
        fn from(e: std::io::Error) -> Self {
            Self::Io(e)
        }
    }

    impl BindConfig {
        /// Parse a TOML document.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed input or unknown keys.
        pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
            toml::from_str(src).map_err(|e| ConfigError::Parse(e.to_string()))
        }

        /// Parse a JSON document.
        ///
        /// # Errors
        ///
        /// [`ConfigError::Parse`] on malformed input or unknown keys.
        pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
            serde_json::from_str(src).map_err(|e| ConfigError::Parse(e.to_string()))
        }

        /// Load from a `.toml` or `.json` file, chosen by extension.
        ///
        /// # Errors
        ///
        /// See [`ConfigError`].
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            let src = match ext.as_str() {
                "toml" | "json" => std::fs::read_to_string(path)?,
                _ => return Err(ConfigError::UnsupportedFormat(ext)),
            };
            let config = if ext == "toml" {
                Self::from_toml_str(&src)?
            } else {
                Self::from_json_str(&src)?
            };
            tracing::debug!(path = %path.display(), marker = %config.marker, "loaded bind config");
            Ok(config)
        }
    }
}
