use async_trait::async_trait;
use deadpool_libsql::libsql;

use super::engine_error;
use super::params::from_libsql;
use crate::engine::EngineCursor;
use crate::error::EngineError;
use crate::types::Value;

/// Row cursor over a running libsql statement.
pub struct LibsqlCursor {
    rows: libsql::Rows,
    columns: Vec<String>,
}

impl LibsqlCursor {
    pub(crate) fn new(rows: libsql::Rows) -> Self {
        let columns = (0..rows.column_count())
            .map(|i| {
                rows.column_name(i)
                    .map_or_else(|| format!("column_{i}"), str::to_string)
            })
            .collect();
        Self { rows, columns }
    }
}

#[async_trait]
impl EngineCursor for LibsqlCursor {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    async fn fetch_row(&mut self) -> Result<Option<Vec<Value>>, EngineError> {
        let Some(row) = self.rows.next().await.map_err(engine_error)? else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.columns.len());
        for i in 0..self.columns.len() {
            let idx = i32::try_from(i)
                .map_err(|e| EngineError::generic(format!("Invalid column index: {e}")))?;
            values.push(libsql_extract_value(&row, idx)?);
        }
        Ok(Some(values))
    }
}

/// Extract a `Value` from a libsql row at the given index
fn libsql_extract_value(row: &libsql::Row, idx: i32) -> Result<Value, EngineError> {
    row.get_value(idx).map(from_libsql).map_err(engine_error)
}
