//! Async driver bridge for embedded SQL engines.
//!
//! A [`Database`] handle is opened from a DSN without touching the engine;
//! the DSN is validated and the engine database opened on the first
//! [`Database::connect`]. Connections run effect-only statements
//! ([`Connection::execute`]) and row-producing queries ([`Connection::query`])
//! whose [`Rows`] are fetched lazily and decoded into [`Value`]s or plain Rust
//! types. Engine failures keep their numeric code and message:
//!
//! ```text
//! failed to open database http://example.com/test
//! error code = 1: Error opening URL http://example.com/test: ...
//! ```
//!
//! ```rust,no_run
//! use libsql_driver::prelude::*;
//!
//! # async fn demo() -> Result<(), DriverError> {
//! let ctx = CancellationToken::new();
//! let db = libsql_driver::open("libsql", ":memory:")?;
//! let mut conn = db.connect(&ctx).await?;
//! conn.execute(&ctx, "CREATE TABLE t (id INTEGER, name TEXT)", params![]).await?;
//! conn.execute(&ctx, "INSERT INTO t VALUES (?1, ?2)", params![1_i64, "a"]).await?;
//! let mut rows = conn.query(&ctx, "SELECT id, name FROM t", params![]).await?;
//! while let Some(row) = rows.next().await? {
//!     let (id, name): (i64, Option<String>) = row.scan()?;
//!     println!("{id} {name:?}");
//! }
//! conn.close().await?;
//! db.close().await?;
//! # Ok(())
//! # }
//! ```

mod cancel;
pub mod config;
pub mod connection;
pub mod database;
pub mod driver;
pub mod dsn;
pub mod engine;
pub mod error;
#[cfg(feature = "libsql")]
pub mod libsql;
mod pool;
pub mod prelude;
pub mod results;
pub mod types;

pub use config::{DatabaseOptions, DatabaseOptionsBuilder, JournalMode};
pub use connection::Connection;
pub use database::Database;
pub use driver::{Driver, LIBSQL_DRIVER_NAME, drivers, open, register};
pub use dsn::{Dsn, Target};
pub use error::{DriverError, EngineError, ErrorContext, translate};
pub use results::{FromRow, ResultSet, Row, Rows};
pub use types::{ExecResult, FromValue, Value, ValueError, ValueKind};
