//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{DatabaseOptions, JournalMode};
pub use crate::connection::Connection;
pub use crate::database::Database;
pub use crate::error::DriverError;
pub use crate::params;
pub use crate::results::{FromRow, ResultSet, Row, Rows};
pub use crate::types::{ExecResult, FromValue, Value, ValueKind};

pub use tokio_util::sync::CancellationToken;
