use std::sync::Arc;

use async_trait::async_trait;
use deadpool_libsql::libsql;

use super::engine_error;
use super::executor::LibsqlConnection;
use crate::dsn::{MEMORY_DSN, Target};
use crate::engine::{EngineConnection, EngineDatabase, StorageEngine};
use crate::error::EngineError;

/// The bundled engine behind the `libsql` driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibsqlEngine;

#[async_trait]
impl StorageEngine for LibsqlEngine {
    async fn open(&self, target: &Target) -> Result<Arc<dyn EngineDatabase>, EngineError> {
        let path = match target {
            Target::Memory => MEMORY_DSN,
            Target::File(path) => path.as_str(),
            // Built without a network transport.
            Target::Remote(url) => {
                return Err(EngineError::generic(format!(
                    "Failed to connect to database: `Unable to open remote database {url} with Database::open()`"
                )));
            }
        };

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(engine_error)?;
        tracing::debug!(path, "libsql database built");
        Ok(Arc::new(LibsqlDatabase { db }))
    }
}

/// An opened libsql database.
pub struct LibsqlDatabase {
    db: libsql::Database,
}

#[async_trait]
impl EngineDatabase for LibsqlDatabase {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>, EngineError> {
        let conn = self.db.connect().map_err(engine_error)?;
        Ok(Box::new(LibsqlConnection::new(conn)))
    }

    // libsql releases the database when the last handle to it is dropped.
    async fn close(&self) -> Result<(), EngineError> {
        Ok(())
    }
}
