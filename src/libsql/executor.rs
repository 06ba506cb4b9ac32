use async_trait::async_trait;
use deadpool_libsql::libsql;

use super::engine_error;
use super::params::Params;
use super::query::LibsqlCursor;
use crate::engine::{EngineConnection, EngineCursor};
use crate::error::EngineError;
use crate::types::{ExecResult, Value};

/// A libsql session.
pub struct LibsqlConnection {
    conn: libsql::Connection,
}

impl LibsqlConnection {
    pub(crate) fn new(conn: libsql::Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl EngineConnection for LibsqlConnection {
    /// Steps the statement to completion through the query path, so a
    /// row-returning statement is accepted and its rows discarded. Only the
    /// first statement of `sql` is compiled and run.
    ///
    /// The affected count is `sqlite3_changes` for the statement: rows written
    /// by triggers are not included, and statements that change nothing
    /// (DDL, SELECT) report 0 rather than a stale count.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult, EngineError> {
        let before = self.conn.total_changes();
        let mut rows = self
            .conn
            .query(sql, Params::convert(params).into_vec())
            .await
            .map_err(engine_error)?;
        while rows.next().await.map_err(engine_error)?.is_some() {}

        let rows_affected = if self.conn.total_changes() == before {
            0
        } else {
            self.conn.changes()
        };
        Ok(ExecResult::new(rows_affected, self.conn.last_insert_rowid()))
    }

    async fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Box<dyn EngineCursor>, EngineError> {
        let rows = self
            .conn
            .query(sql, Params::convert(params).into_vec())
            .await
            .map_err(engine_error)?;
        Ok(Box::new(LibsqlCursor::new(rows)))
    }

    // The session ends when `conn` is dropped along with this value.
    async fn close(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}
