use std::fmt;
use std::sync::Weak;

use tokio_util::sync::CancellationToken;

use crate::cancel;
use crate::database::{Database, DatabaseInner};
use crate::engine::EngineConnection;
use crate::error::{DriverError, ErrorContext};
use crate::results::Rows;
use crate::types::{ExecResult, Value};

/// A dedicated session on a [`Database`].
///
/// Closing it releases only this session; the handle and sibling
/// connections are untouched. Any use after [`Connection::close`] returns
/// `DriverError::ConnectionClosed`.
pub struct Connection {
    id: u64,
    session: Option<Box<dyn EngineConnection>>,
    database: Weak<DatabaseInner>,
}

impl Connection {
    pub(crate) fn new(
        id: u64,
        session: Box<dyn EngineConnection>,
        database: Weak<DatabaseInner>,
    ) -> Self {
        Self {
            id,
            session: Some(session),
            database,
        }
    }

    /// Identifier unique among the connections of one handle.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    /// The handle this connection came from, if it is still alive.
    #[must_use]
    pub fn database(&self) -> Option<Database> {
        self.database.upgrade().map(Database::from_inner)
    }

    fn session(&mut self) -> Result<&mut Box<dyn EngineConnection>, DriverError> {
        self.session.as_mut().ok_or(DriverError::ConnectionClosed)
    }

    /// Run an effect-only statement; any rows it yields are discarded.
    ///
    /// `sql` is a single statement. Text after the first statement is not
    /// executed, so `"CREATE TABLE a(x); CREATE TABLE b(y)"` creates only `a`.
    ///
    /// # Errors
    /// `ConnectionClosed`, `Cancelled`, or the translated engine error.
    pub async fn execute(
        &mut self,
        ctx: &CancellationToken,
        sql: &str,
        params: &[Value],
    ) -> Result<ExecResult, DriverError> {
        let id = self.id;
        let session = self.session()?;
        cancel::run(ctx, async {
            tracing::trace!(connection = id, sql, params = params.len(), "execute");
            session
                .execute(sql, params)
                .await
                .map_err(|e| e.in_context(ErrorContext::Execute(sql.to_string())))
        })
        .await
    }

    /// Start a row-producing statement.
    ///
    /// # Errors
    /// `ConnectionClosed`, `Cancelled`, or the translated engine error.
    pub async fn query(
        &mut self,
        ctx: &CancellationToken,
        sql: &str,
        params: &[Value],
    ) -> Result<Rows, DriverError> {
        let id = self.id;
        let session = self.session()?;
        cancel::run(ctx, async {
            tracing::trace!(connection = id, sql, params = params.len(), "query");
            let cursor = session
                .query(sql, params)
                .await
                .map_err(|e| e.in_context(ErrorContext::Execute(sql.to_string())))?;
            Ok(Rows::new(cursor, None))
        })
        .await
    }

    /// Release the session.
    ///
    /// # Errors
    /// `ConnectionClosed` if already closed, or the engine's close failure.
    pub async fn close(&mut self) -> Result<(), DriverError> {
        let mut session = self.session.take().ok_or(DriverError::ConnectionClosed)?;
        tracing::debug!(connection = self.id, "connection closed");
        session
            .close()
            .await
            .map_err(|e| e.in_context(ErrorContext::CloseConnection))
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
