//! Value types shared by the question graph, resolver, and renderer
//!
//! Answers are either booleans (toggles) or text. The field's
//! [`FieldKind`] decides which prompt asks for it and how a raw flag or
//! environment string is parsed.

use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// Kind of a configurable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum FieldKind {
    /// Yes/no toggle
    Boolean,
    /// Single-line text such as a hostname or address
    ShortText,
    /// Text that must never be echoed or logged
    SecretText,
    /// Text chosen from a fixed list
    EnumerableText,
    /// Unconstrained text such as a path
    FreeText,
}

impl FieldKind {
    /// Whether values of this kind are stored as [`Value::Bool`]
    pub fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Whether values of this kind must be kept out of logs
    pub fn is_secret(self) -> bool {
        matches!(self, Self::SecretText)
    }
}

/// A concrete answer for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Text(String),
}

impl Value {
    /// Text form of the value, as validators see it
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Which source supplied a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Flag,
    Environment,
    Prompt,
    Default,
}

/// Parse a boolean as written on a command line or in the environment.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
