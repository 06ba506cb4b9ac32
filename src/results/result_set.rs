use std::sync::Arc;

use super::row::Row;

/// A result set from a database query
///
/// Fully materialized rows, produced by draining a [`Rows`](super::Rows)
/// cursor.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<Row>,
    column_names: Arc<[String]>,
}

impl ResultSet {
    pub(crate) fn with_capacity(column_names: Arc<[String]>, capacity: usize) -> ResultSet {
        ResultSet {
            results: Vec::with_capacity(capacity),
            column_names,
        }
    }

    /// Get the column names for this result set
    #[must_use]
    pub fn get_column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub(crate) fn add_row(&mut self, row: Row) {
        self.results.push(row);
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
