//! `LibSQL` engine (local files and in-memory databases).
//!
//! Mirrors the layout of the other engine glue:
//! - `config`: opening a database from a validated target
//! - `params`: parameter conversion from [`Value`](crate::Value) to `LibSQL` values
//! - `query`: the row cursor and per-column value extraction
//! - `executor`: sessions and statement execution

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

use deadpool_libsql::libsql;

pub use config::{LibsqlDatabase, LibsqlEngine};
pub use executor::LibsqlConnection;
pub use query::LibsqlCursor;

use crate::error::{EngineError, GENERIC_ERROR_CODE};

/// Keep libsql's result code and message; anything libsql raises without a
/// code is reported as a generic failure with its rendered text.
pub(crate) fn engine_error(err: libsql::Error) -> EngineError {
    match err {
        libsql::Error::SqliteFailure(code, message) => EngineError::new(code, message),
        other => EngineError::new(GENERIC_ERROR_CODE, other.to_string()),
    }
}
