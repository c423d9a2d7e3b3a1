//! Scalar values used by filters and orderings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Comparable scalar bound into filters.
///
/// Ordering matches SQLite's default `BINARY` collation: integers sort
/// before text, text compares bytewise.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    /// Whether both values are integers or both are text.
    ///
    /// Filter predicates only compare values of the same kind.
    pub fn same_kind(&self, other: &Value) -> bool {
        matches!(
            (self, other),
            (Self::Int(_), Self::Int(_)) | (Self::Text(_), Self::Text(_))
        )
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "`{value}`"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Read access to a record's fields by a store-specific field enum.
///
/// `None` stands for NULL, and also for fields the record shape does not
/// carry. NULL never satisfies a filter predicate.
pub trait FieldSource<F> {
    fn field_value(&self, field: F) -> Option<Value>;
}
