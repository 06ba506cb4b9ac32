use std::fmt;
use std::sync::Arc;

use super::result_set::ResultSet;
use super::row::Row;
use crate::engine::EngineCursor;
use crate::error::{DriverError, ErrorContext};
use crate::pool::PooledSession;

/// Lazy, forward-only cursor over a query's rows.
///
/// Nothing is fetched until [`Rows::next`] is called. Engine resources (and,
/// for handle-level queries, the pooled session) are released as soon as the
/// rows are exhausted, a fetch fails, [`Rows::close`] is called, or the value
/// is dropped. After that `next` keeps returning `Ok(None)`.
pub struct Rows {
    columns: Arc<[String]>,
    // dropped before `lease`: the cursor may still reference the session
    cursor: Option<Box<dyn EngineCursor>>,
    lease: Option<PooledSession>,
}

impl Rows {
    pub(crate) fn new(cursor: Box<dyn EngineCursor>, lease: Option<PooledSession>) -> Self {
        Self {
            columns: Arc::from(cursor.columns()),
            cursor: Some(cursor),
            lease,
        }
    }

    /// Column names in select-list order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    /// Advance to the next row.
    ///
    /// # Errors
    /// Returns the translated engine error if fetching fails; the cursor is
    /// released first.
    pub async fn next(&mut self) -> Result<Option<Row>, DriverError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        let fetched = cursor.fetch_row().await;
        match fetched {
            Ok(Some(values)) => Ok(Some(Row::new(Arc::clone(&self.columns), values))),
            Ok(None) => {
                self.release();
                Ok(None)
            }
            Err(e) => {
                self.release();
                Err(e.in_context(ErrorContext::FetchRow))
            }
        }
    }

    /// Release the cursor early. Calling it again is a no-op.
    pub fn close(&mut self) {
        self.release();
    }

    /// Drain the remaining rows into a [`ResultSet`].
    ///
    /// # Errors
    /// Returns the first fetch error.
    pub async fn into_result_set(mut self) -> Result<ResultSet, DriverError> {
        let mut result_set = ResultSet::with_capacity(Arc::clone(&self.columns), 10);
        while let Some(row) = self.next().await? {
            result_set.add_row(row);
        }
        Ok(result_set)
    }

    fn release(&mut self) {
        if self.cursor.take().is_some() {
            tracing::trace!("row cursor released");
        }
        self.lease = None;
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .field("closed", &self.is_closed())
            .field("pooled", &self.lease.is_some())
            .finish()
    }
}
