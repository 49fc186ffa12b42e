#![forbid(unsafe_code)]

//! Leaf values held by observed model properties.
//!
//! Only primitives are meaningfully bound. `Null` and `Opaque` (arrays, or
//! anything else that is not a scalar) are stored and serialized, but render
//! as "absent".

use std::borrow::Cow;

/// A model leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. Equality is IEEE (`NaN != NaN`).
    Number(f64),
    /// A string. The empty string is a real value, not "absent".
    Text(String),
    /// A non-scalar kept as-is and never recursed into.
    Opaque(serde_json::Value),
}

impl Value {
    /// Convert a JSON leaf. Objects and arrays become [`Value::Opaque`].
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Opaque(other),
        }
    }

    /// Convert back to JSON. Integral numbers serialize as integers and
    /// non-finite numbers as `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_json::Value::from(*n as i64)
            }
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Opaque(v) => v.clone(),
        }
    }

    /// Whether this value counts as absent when painting.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Null | Self::Opaque(_))
    }

    /// The text written into a view target, or `None` when absent.
    #[must_use]
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null | Self::Opaque(_) => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Number(n) => Some(Cow::Owned(format_number(*n))),
            Self::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// The string slice, if this is [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form carries an explicit sign: `1e+21`, `1e-7`.
        let exp = format!("{n:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        n.to_string()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Self::from_json(json)
    }
}
