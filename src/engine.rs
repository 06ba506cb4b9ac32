//! The boundary to the wrapped storage engine.
//!
//! The bridge only ever talks to an engine through these traits, so DSN
//! handling, error templating and value decoding stay independent of how the
//! engine is linked. Engines report failures as [`EngineError`] (code plus
//! diagnostic text); the bridge adds the operation context.

use std::sync::Arc;

use async_trait::async_trait;

use crate::dsn::Target;
use crate::error::EngineError;
use crate::types::{ExecResult, Value};

/// An engine that can open databases.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    /// Process-wide setup. Run at most once per registered driver, before
    /// the first `open`.
    ///
    /// # Errors
    /// Returns the engine's failure; it is reported on every later connect.
    fn initialize(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Open the database named by an already validated target.
    async fn open(&self, target: &Target) -> Result<Arc<dyn EngineDatabase>, EngineError>;
}

/// One opened database; hands out independent sessions.
#[async_trait]
pub trait EngineDatabase: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>, EngineError>;

    /// Release engine-side resources. Called once by the bridge.
    async fn close(&self) -> Result<(), EngineError>;
}

/// A single session. Cursors it returns must not borrow from it.
#[async_trait]
pub trait EngineConnection: Send + Sync {
    /// Run a statement to completion, discarding any rows it produces.
    /// `rows_affected` counts only rows the statement itself changed.
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecResult, EngineError>;

    /// Compile and start a statement; rows are produced on demand.
    async fn query(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Box<dyn EngineCursor>, EngineError>;

    async fn close(&mut self) -> Result<(), EngineError>;
}

/// Forward-only row source for a running statement.
#[async_trait]
pub trait EngineCursor: Send {
    /// Column names in select-list order.
    fn columns(&self) -> Vec<String>;

    /// The next row's values in column order, or `None` once exhausted.
    async fn fetch_row(&mut self) -> Result<Option<Vec<Value>>, EngineError>;
}
