//! Indexable property values and their encoding.
//!
//! A value reaches the index engine in one of two encodings:
//! - string (default): the value's canonical textual form
//! - native numeric: the number itself, enabling range queries
//!
//! The encoding is chosen explicitly by the caller through
//! [`ValueEncoding::index_numeric`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// A non-null property value handed to an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Whether the value is of a numeric kind.
    pub fn is_numeric(&self) -> bool {
        matches!(self, PropertyValue::Int(_) | PropertyValue::Float(_))
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            PropertyValue::Int(v) => Some(Number::Int(*v)),
            PropertyValue::Float(v) => Some(Number::Float(*v)),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(v) => write!(f, "{}", v),
            PropertyValue::Int(v) => write!(f, "{}", v),
            // Debug keeps the trailing ".0" on integral floats
            PropertyValue::Float(v) => write!(f, "{:?}", v),
            PropertyValue::String(v) => f.write_str(v),
        }
    }
}

/// A number in its native representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// The value actually handed to the index engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    Numeric(Number),
    Text(String),
}

impl ResolvedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResolvedValue::Text(s) => Some(s),
            ResolvedValue::Numeric(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            ResolvedValue::Numeric(n) => Some(*n),
            ResolvedValue::Text(_) => None,
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Numeric(n) => n.fmt(f),
            ResolvedValue::Text(s) => f.write_str(s),
        }
    }
}

/// A property value together with its requested index encoding.
///
/// String-encoded unless [`index_numeric`](Self::index_numeric) succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueEncoding {
    value: PropertyValue,
    numeric: bool,
}

impl ValueEncoding {
    /// Wrap a value with the default (string) encoding.
    pub fn new(value: impl Into<PropertyValue>) -> Self {
        Self {
            value: value.into(),
            numeric: false,
        }
    }

    /// Wrap a value and request native numeric encoding in one step.
    pub fn numeric(value: impl Into<PropertyValue>) -> Result<Self, IndexError> {
        Self::new(value).index_numeric()
    }

    /// Switch to native numeric encoding.
    ///
    /// Fails with [`IndexError::InvalidValueKind`] when the wrapped value is
    /// not a number. Calling it again on a numeric value is a no-op.
    pub fn index_numeric(mut self) -> Result<Self, IndexError> {
        if !self.value.is_numeric() {
            return Err(IndexError::InvalidValueKind {
                value: self.value.to_string(),
                kind: self.value.kind(),
            });
        }
        self.numeric = true;
        Ok(self)
    }

    /// Whether native numeric encoding was requested.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }

    /// The wrapped value.
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Resolve to the value passed to the index engine.
    pub fn resolve(&self) -> ResolvedValue {
        match self.value.as_number() {
            Some(number) if self.numeric => ResolvedValue::Numeric(number),
            _ => ResolvedValue::Text(self.value.to_string()),
        }
    }
}

impl fmt::Display for ValueEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl From<PropertyValue> for ValueEncoding {
    fn from(value: PropertyValue) -> Self {
        Self::new(value)
    }
}

macro_rules! impl_from_primitive {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl From<$ty> for PropertyValue {
                fn from(value: $ty) -> Self {
                    PropertyValue::$variant(value.into())
                }
            }

            impl From<$ty> for ValueEncoding {
                fn from(value: $ty) -> Self {
                    ValueEncoding::new(value)
                }
            }
        )+
    };
}

impl_from_primitive!(Bool => bool);
impl_from_primitive!(Int => i8, i16, i32, i64, u8, u16, u32);
impl_from_primitive!(Float => f32, f64);
impl_from_primitive!(String => String, &str);
