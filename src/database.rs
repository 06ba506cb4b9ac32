//! Database handles.
//!
//! Opening a handle only records the DSN. The first connect moves the handle
//! out of `Unvalidated`: the DSN is checked, the driver initialized and the
//! engine database opened. The outcome is kept, so a bad DSN fails every
//! connect with the same error, and a good one is opened once.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::cancel;
use crate::config::DatabaseOptions;
use crate::connection::Connection;
use crate::driver::Driver;
use crate::dsn::Dsn;
use crate::engine::EngineDatabase;
use crate::error::{DriverError, EngineError, ErrorContext};
use crate::pool::{self, SessionManager, SessionPool};
use crate::results::Rows;
use crate::types::{ExecResult, Value};

enum HandleState {
    Unvalidated,
    Ready(Arc<Opened>),
    Failed(DriverError),
    Closed,
}

struct Opened {
    db: Arc<dyn EngineDatabase>,
    pool: SessionPool,
}

pub(crate) struct DatabaseInner {
    driver: Arc<Driver>,
    dsn: Dsn,
    options: DatabaseOptions,
    state: Mutex<HandleState>,
    next_connection_id: AtomicU64,
}

/// A handle on one database target.
///
/// Clones share the same underlying handle. A handle serves any number of
/// concurrently open [`Connection`]s and also pools sessions for its own
/// [`execute`](Database::execute) and [`query`](Database::query).
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Create a handle for `dsn` on `driver`. Performs no I/O and accepts
    /// any bytes; DSN problems surface on the first connect.
    ///
    /// # Errors
    /// Returns `DriverError::ConfigError` for invalid options.
    pub fn open_with(
        driver: Arc<Driver>,
        dsn: impl Into<Dsn>,
        options: DatabaseOptions,
    ) -> Result<Self, DriverError> {
        options.validate()?;
        let dsn = dsn.into();
        tracing::debug!(driver = %driver.name(), %dsn, "database handle created");
        Ok(Self {
            inner: Arc::new(DatabaseInner {
                driver,
                dsn,
                options,
                state: Mutex::new(HandleState::Unvalidated),
                next_connection_id: AtomicU64::new(1),
            }),
        })
    }

    pub(crate) fn from_inner(inner: Arc<DatabaseInner>) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn dsn(&self) -> &Dsn {
        &self.inner.dsn
    }

    #[must_use]
    pub fn driver_name(&self) -> &str {
        self.inner.driver.name()
    }

    #[must_use]
    pub fn options(&self) -> &DatabaseOptions {
        &self.inner.options
    }

    /// Open a dedicated connection.
    ///
    /// # Errors
    /// - the translated `failed to open database` error for a malformed or
    ///   unsupported DSN, or an engine open failure
    /// - `DatabaseClosed` after [`Database::close`]
    /// - `Cancelled` if `ctx` fires first
    pub async fn connect(&self, ctx: &CancellationToken) -> Result<Connection, DriverError> {
        cancel::run(ctx, async {
            let opened = self.opened().await?;
            let session =
                pool::open_session(opened.db.as_ref(), &self.inner.dsn, &self.inner.options)
                    .await?;
            let id = self.inner.next_connection_id.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(dsn = %self.inner.dsn, connection = id, "connection opened");
            Ok(Connection::new(id, session, Arc::downgrade(&self.inner)))
        })
        .await
    }

    /// Make sure the database can be opened and a session obtained.
    ///
    /// # Errors
    /// Same as [`Database::connect`].
    pub async fn ping(&self, ctx: &CancellationToken) -> Result<(), DriverError> {
        cancel::run(ctx, async {
            let opened = self.opened().await?;
            pool::checkout(&opened.pool).await.map(drop)
        })
        .await
    }

    /// Run an effect-only statement on a pooled session. Statements that
    /// return rows are accepted; the rows are discarded. As with
    /// [`Connection::execute`], only the first statement of `sql` runs.
    ///
    /// Successive calls may land on different sessions. For `:memory:` each
    /// session is its own private database, so schema created through one
    /// pooled session is not visible from another (or from a
    /// [`Connection`]). Use a single [`Connection`] for in-memory work.
    ///
    /// # Errors
    /// Translated engine errors, plus the errors of [`Database::connect`].
    pub async fn execute(
        &self,
        ctx: &CancellationToken,
        sql: &str,
        params: &[Value],
    ) -> Result<ExecResult, DriverError> {
        cancel::run(ctx, async {
            let opened = self.opened().await?;
            let mut session = pool::checkout(&opened.pool).await?;
            tracing::trace!(sql, params = params.len(), "execute");
            session
                .execute(sql, params)
                .await
                .map_err(|e| e.in_context(ErrorContext::Execute(sql.to_string())))
        })
        .await
    }

    /// Start a query on a pooled session. The session stays with the returned
    /// [`Rows`] until they are closed, exhausted or dropped; while it is held,
    /// other handle-level calls use another session (see
    /// [`Database::execute`] for what that means with `:memory:`).
    ///
    /// # Errors
    /// Translated engine errors, plus the errors of [`Database::connect`].
    pub async fn query(
        &self,
        ctx: &CancellationToken,
        sql: &str,
        params: &[Value],
    ) -> Result<Rows, DriverError> {
        cancel::run(ctx, async {
            let opened = self.opened().await?;
            let mut session = pool::checkout(&opened.pool).await?;
            tracing::trace!(sql, params = params.len(), "query");
            let cursor = session
                .query(sql, params)
                .await
                .map_err(|e| e.in_context(ErrorContext::Execute(sql.to_string())))?;
            Ok(Rows::new(cursor, Some(session)))
        })
        .await
    }

    /// Release the engine database.
    ///
    /// Connections still open keep whatever the engine lets them keep; new
    /// connects fail with `DatabaseClosed`.
    ///
    /// # Errors
    /// `DatabaseClosed` on a second close; a translated engine error if the
    /// engine fails to close.
    pub async fn close(&self) -> Result<(), DriverError> {
        let previous = {
            let mut state = self.inner.state.lock().await;
            std::mem::replace(&mut *state, HandleState::Closed)
        };
        match previous {
            HandleState::Closed => Err(DriverError::DatabaseClosed),
            HandleState::Unvalidated | HandleState::Failed(_) => {
                tracing::debug!(dsn = %self.inner.dsn, "database handle closed before opening");
                Ok(())
            }
            HandleState::Ready(opened) => {
                opened.pool.close();
                tracing::debug!(dsn = %self.inner.dsn, "closing database");
                opened
                    .db
                    .close()
                    .await
                    .map_err(|e| e.in_context(ErrorContext::CloseDatabase(self.inner.dsn.clone())))
            }
        }
    }

    async fn opened(&self) -> Result<Arc<Opened>, DriverError> {
        let mut state = self.inner.state.lock().await;
        match &*state {
            HandleState::Ready(opened) => return Ok(Arc::clone(opened)),
            HandleState::Failed(err) => return Err(err.clone()),
            HandleState::Closed => return Err(DriverError::DatabaseClosed),
            HandleState::Unvalidated => {}
        }
        match self.inner.open_engine().await {
            Ok(opened) => {
                let opened = Arc::new(opened);
                *state = HandleState::Ready(Arc::clone(&opened));
                Ok(opened)
            }
            Err(err) => {
                tracing::debug!(dsn = %self.inner.dsn, error = %err, "database open failed");
                *state = HandleState::Failed(err.clone());
                Err(err)
            }
        }
    }
}

impl DatabaseInner {
    async fn open_engine(&self) -> Result<Opened, DriverError> {
        let open_failed = |e: EngineError| e.in_context(ErrorContext::OpenDatabase(self.dsn.clone()));

        let target = self.dsn.target().map_err(open_failed)?;
        self.driver.ensure_initialized()?;
        let db = self
            .driver
            .engine()
            .open(&target)
            .await
            .map_err(|e| {
                open_failed(EngineError::new(
                    e.code,
                    format!("Error opening URL {}: {}", self.dsn, e.message),
                ))
            })?;
        tracing::debug!(driver = %self.driver.name(), dsn = %self.dsn, "database opened");

        let manager = SessionManager::new(Arc::clone(&db), self.dsn.clone(), self.options.clone());
        let pool = pool::build_pool(manager, self.options.max_connections)?;
        Ok(Opened { db, pool })
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("driver", &self.inner.driver.name())
            .field("dsn", &self.inner.dsn)
            .finish_non_exhaustive()
    }
}
