//! Resolved Values
//!
//! Every node in the dependency graph resolves to a [`Value`]. Values are
//! dynamically typed at the engine level; each node carries a declared
//! [`ValueType`] that is used to decode string-encoded values supplied from
//! outside the graph (seeded caches, tab-separated feature files).
//!
//! # Absence
//!
//! [`Value::Absent`] is the explicit "no upstream data" marker, e.g. the text
//! of a parent revision that does not exist. It is ordinary data: it flows
//! through the graph like any other value and compute functions decide what
//! it means for them.
//!
//! # Text Encoding
//!
//! | Value   | Encoding                       |
//! |---------|--------------------------------|
//! | Absent  | `None`                         |
//! | Bool    | `True` / `False`               |
//! | Int     | decimal integer                |
//! | Real    | decimal float                  |
//! | Text    | the raw string                 |
//! | Words   | JSON array of strings          |
//!
//! Values/labels files quote `Text` as a JSON string so that tabs, newlines
//! and the absence marker survive a round trip (see
//! [`crate::scoring::tsv`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Encoding used for [`Value::Absent`].
pub const ABSENT: &str = "None";

/// The declared type of a node's resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Real,
    Text,
    /// An ordered sequence of strings.
    Words,
}

impl ValueType {
    /// Decode a string-encoded value according to this type.
    ///
    /// The absence marker `None` decodes to [`Value::Absent`] for every type.
    pub fn decode(&self, raw: &str) -> Result<Value, DecodeError> {
        if raw == ABSENT {
            return Ok(Value::Absent);
        }

        let invalid = || DecodeError::Invalid {
            expected: *self,
            raw: raw.to_string(),
        };

        match self {
            ValueType::Bool => match raw.trim() {
                "True" | "true" | "1" => Ok(Value::Bool(true)),
                "False" | "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            ValueType::Int => raw.trim().parse().map(Value::Int).map_err(|_| invalid()),
            ValueType::Real => raw.trim().parse().map(Value::Real).map_err(|_| invalid()),
            ValueType::Text => Ok(Value::Text(raw.to_string())),
            ValueType::Words => serde_json::from_str::<Vec<String>>(raw)
                .map(Value::Words)
                .map_err(|source| DecodeError::Words {
                    raw: raw.to_string(),
                    source,
                }),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Real => "real",
            ValueType::Text => "text",
            ValueType::Words => "words",
        };
        f.write_str(name)
    }
}

/// A string could not be decoded into a node's declared type.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("expected a {expected} value, found {raw:?}")]
    Invalid { expected: ValueType, raw: String },

    #[error("malformed word list {raw:?}: {source}")]
    Words {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A resolved node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Optional upstream data is not available.
    Absent,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Words(Vec<String>),
}

impl Value {
    /// The runtime type of this value, or `None` for [`Value::Absent`].
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Absent => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Real(_) => Some(ValueType::Real),
            Value::Text(_) => Some(ValueType::Text),
            Value::Words(_) => Some(ValueType::Words),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value. Booleans map to `0.0` / `1.0`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_words(&self) -> Option<&[String]> {
        match self {
            Value::Words(words) => Some(words),
            _ => None,
        }
    }

    /// Encode the value for a tab-separated column.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str(ABSENT),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Words(words) => {
                let json = serde_json::to_string(words).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Words(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Absent)
    }
}
