use std::fmt;

use thiserror::Error;

/// A single SQL value, either bound as a parameter or decoded from a column.
///
/// ```rust
/// use libsql_driver::prelude::*;
///
/// let params = vec![
///     Value::Integer(1),
///     Value::from("alice"),
///     Value::Null,
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL; carries nothing
    Null,
    /// Integer value (64-bit)
    Integer(i64),
    /// Floating point value (64-bit)
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

/// Storage class of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        })
    }
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Integer(_) => ValueKind::Integer,
            Self::Real(_) => ValueKind::Real,
            Self::Text(_) => ValueKind::Text,
            Self::Blob(_) => ValueKind::Blob,
        }
    }

    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        if let Value::Real(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Build a parameter slice: `params![1_i64, "text", blob.as_slice()]`.
#[macro_export]
macro_rules! params {
    () => {
        &[][..]
    };
    ($($val:expr),+ $(,)?) => {
        &[$($crate::Value::from($val)),+][..]
    };
}

/// Why a value could not be decoded into the requested type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("value is NULL")]
    Null,
    #[error("cannot convert {0}")]
    Mismatch(ValueKind),
    #[error("integer {0} out of range")]
    OutOfRange(i64),
}

/// Decode a column value into a Rust type.
///
/// NULL decodes into `Option::None` or [`Value::Null`]; every other target
/// rejects it with [`ValueError::Null`] rather than inventing a zero value.
pub trait FromValue: Sized {
    /// # Errors
    /// Returns [`ValueError`] when the stored kind or range does not fit.
    fn from_value(value: &Value) -> Result<Self, ValueError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn mismatch<T>(value: &Value) -> Result<T, ValueError> {
    match value {
        Value::Null => Err(ValueError::Null),
        other => Err(ValueError::Mismatch(other.kind())),
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Integer(i) => Ok(*i),
            other => mismatch(other),
        }
    }
}

macro_rules! from_value_narrow_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, ValueError> {
                    let wide = i64::from_value(value)?;
                    <$t>::try_from(wide).map_err(|_| ValueError::OutOfRange(wide))
                }
            }
        )*
    };
}

from_value_narrow_int!(i32, u32, u64, usize);

impl FromValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Real(f) => Ok(*f),
            // REAL-affinity columns may hand back integral values as INTEGER.
            Value::Integer(i) => Ok(*i as f64),
            other => mismatch(other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            Value::Integer(i) => Err(ValueError::OutOfRange(*i)),
            other => mismatch(other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch(other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            other => mismatch(other),
        }
    }
}

/// Outcome of an effect-only statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    rows_affected: u64,
    last_insert_id: i64,
}

impl ExecResult {
    #[must_use]
    pub fn new(rows_affected: u64, last_insert_id: i64) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }

    /// Rows changed by the statement itself (0 for DDL and SELECT).
    #[must_use]
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Rowid of the most recent successful INSERT on the connection.
    #[must_use]
    pub fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }
}
