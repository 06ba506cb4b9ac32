//! Engine sessions: creation, per-session configuration, and the idle pool
//! behind handle-level `execute`/`query`.

use std::sync::Arc;

use deadpool::managed::{self, Metrics, RecycleResult};

use crate::config::DatabaseOptions;
use crate::dsn::Dsn;
use crate::engine::{EngineConnection, EngineDatabase};
use crate::error::{DriverError, ErrorContext};

pub(crate) type SessionPool = managed::Pool<SessionManager>;
pub(crate) type PooledSession = managed::Object<SessionManager>;

/// Open a new engine session and apply the handle's options to it.
pub(crate) async fn open_session(
    db: &dyn EngineDatabase,
    dsn: &Dsn,
    options: &DatabaseOptions,
) -> Result<Box<dyn EngineConnection>, DriverError> {
    let mut conn = db
        .connect()
        .await
        .map_err(|e| e.in_context(ErrorContext::Connect(dsn.clone())))?;

    if let Some(mode) = options.journal_mode {
        let sql = format!("PRAGMA journal_mode = {}", mode.as_sql());
        // in-memory and read-only databases may refuse; keep their default
        if let Err(e) = conn.execute(&sql, &[]).await {
            tracing::warn!(%dsn, error = %e, "journal mode not applied");
        }
    }

    if let Some(millis) = options.busy_timeout_ms {
        let sql = format!("PRAGMA busy_timeout = {millis}");
        conn.execute(&sql, &[])
            .await
            .map_err(|e| e.in_context(ErrorContext::Execute(sql.clone())))?;
    }

    Ok(conn)
}

/// `deadpool` manager producing configured engine sessions.
pub(crate) struct SessionManager {
    db: Arc<dyn EngineDatabase>,
    dsn: Dsn,
    options: DatabaseOptions,
}

impl SessionManager {
    pub(crate) fn new(db: Arc<dyn EngineDatabase>, dsn: Dsn, options: DatabaseOptions) -> Self {
        Self { db, dsn, options }
    }
}

impl managed::Manager for SessionManager {
    type Type = Box<dyn EngineConnection>;
    type Error = DriverError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        tracing::trace!(dsn = %self.dsn, "opening pooled session");
        open_session(self.db.as_ref(), &self.dsn, &self.options).await
    }

    async fn recycle(&self, _conn: &mut Self::Type, _metrics: &Metrics) -> RecycleResult<Self::Error> {
        Ok(())
    }
}

pub(crate) fn build_pool(manager: SessionManager, max_size: usize) -> Result<SessionPool, DriverError> {
    managed::Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| DriverError::Pool(format!("failed to create session pool: {e}")))
}

pub(crate) async fn checkout(pool: &SessionPool) -> Result<PooledSession, DriverError> {
    pool.get().await.map_err(|e| match e {
        managed::PoolError::Backend(err) => err,
        managed::PoolError::Closed => DriverError::DatabaseClosed,
        other => DriverError::Pool(other.to_string()),
    })
}
