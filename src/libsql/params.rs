use deadpool_libsql::libsql;

use crate::types::Value;

/// Container for libsql parameters
pub struct Params(pub Vec<libsql::Value>);

impl Params {
    /// Convert bridge values to libsql parameters.
    #[must_use]
    pub fn convert(params: &[Value]) -> Params {
        Params(params.iter().map(to_libsql).collect())
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_slice(&self) -> &[libsql::Value] {
        &self.0
    }

    /// Convert to owned vector for use with libsql API
    #[must_use]
    pub fn into_vec(self) -> Vec<libsql::Value> {
        self.0
    }
}

fn to_libsql(value: &Value) -> libsql::Value {
    match value {
        Value::Null => libsql::Value::Null,
        Value::Integer(i) => libsql::Value::Integer(*i),
        Value::Real(f) => libsql::Value::Real(*f),
        Value::Text(s) => libsql::Value::Text(s.clone()),
        Value::Blob(bytes) => libsql::Value::Blob(bytes.clone()),
    }
}

/// Map a libsql column value to the bridge's value type.
pub(crate) fn from_libsql(value: libsql::Value) -> Value {
    match value {
        libsql::Value::Null => Value::Null,
        libsql::Value::Integer(i) => Value::Integer(i),
        libsql::Value::Real(f) => Value::Real(f),
        libsql::Value::Text(s) => Value::Text(s),
        libsql::Value::Blob(bytes) => Value::Blob(bytes),
    }
}

