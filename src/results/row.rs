use std::sync::Arc;

use crate::error::DriverError;
use crate::types::{FromValue, Value, ValueKind};

/// A row from a database query result
///
/// Values are in select-list order; column names are shared by every row of
/// the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Index of the first column called `name`. Duplicate names are legal in
    /// SQL; later ones are reachable by index only.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Storage class of the value at `index`.
    #[must_use]
    pub fn kind(&self, index: usize) -> Option<ValueKind> {
        self.values.get(index).map(Value::kind)
    }

    /// Decode the value at `index` into `T`.
    ///
    /// # Errors
    /// `ColumnIndex` when out of range, `Column` when the value does not fit
    /// `T` (including NULL into a non-`Option` target).
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, DriverError> {
        let value = self.values.get(index).ok_or(DriverError::ColumnIndex {
            index,
            count: self.values.len(),
        })?;
        T::from_value(value).map_err(|source| DriverError::Column {
            index,
            target: std::any::type_name::<T>(),
            source,
        })
    }

    /// Decode the first column named `name` into `T`.
    ///
    /// # Errors
    /// `ColumnNotFound`, or the same decoding errors as [`Row::get`].
    pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T, DriverError> {
        let index = self
            .column_index(name)
            .ok_or_else(|| DriverError::ColumnNotFound(name.to_string()))?;
        self.get(index)
    }

    /// Decode every column at once into a tuple, one element per column.
    ///
    /// ```rust,ignore
    /// let (null, id, name): (Option<i64>, i64, String) = row.scan()?;
    /// ```
    ///
    /// # Errors
    /// `ScanArity` if the tuple length differs from the column count, or any
    /// per-column decoding error.
    pub fn scan<R: FromRow>(&self) -> Result<R, DriverError> {
        R::from_row(self)
    }

    fn expect_columns(&self, expected: usize) -> Result<(), DriverError> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(DriverError::ScanArity {
                expected,
                actual: self.values.len(),
            })
        }
    }
}

/// Types a whole row can be decoded into.
pub trait FromRow: Sized {
    /// # Errors
    /// Returns the first column that fails to decode.
    fn from_row(row: &Row) -> Result<Self, DriverError>;
}

macro_rules! impl_from_row_tuple {
    ($len:expr => $($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRow for ($($name,)+) {
            fn from_row(row: &Row) -> Result<Self, DriverError> {
                row.expect_columns($len)?;
                Ok(($(row.get::<$name>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(1 => A: 0);
impl_from_row_tuple!(2 => A: 0, B: 1);
impl_from_row_tuple!(3 => A: 0, B: 1, C: 2);
impl_from_row_tuple!(4 => A: 0, B: 1, C: 2, D: 3);
impl_from_row_tuple!(5 => A: 0, B: 1, C: 2, D: 3, E: 4);
impl_from_row_tuple!(6 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_from_row_tuple!(7 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_from_row_tuple!(8 => A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);
