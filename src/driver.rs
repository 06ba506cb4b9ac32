//! Named driver registry.
//!
//! Callers open databases by driver name, the way a generic SQL client API
//! selects its backend. The `libsql` driver is registered on first use when
//! the `libsql` feature is enabled; further engines can be added with
//! [`register`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lazy_static::lazy_static;

use crate::config::DatabaseOptions;
use crate::database::Database;
use crate::dsn::Dsn;
use crate::engine::StorageEngine;
use crate::error::{DriverError, EngineError, ErrorContext};

/// Name the bundled libsql engine is registered under.
pub const LIBSQL_DRIVER_NAME: &str = "libsql";

/// A storage engine bound to a name, plus its one-time initialization state.
pub struct Driver {
    name: String,
    engine: Arc<dyn StorageEngine>,
    init: OnceLock<Result<(), EngineError>>,
}

impl Driver {
    #[must_use]
    pub fn new(name: impl Into<String>, engine: Arc<dyn StorageEngine>) -> Self {
        Self {
            name: name.into(),
            engine,
            init: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Run the engine's global setup exactly once, however many handles race
    /// to connect. The outcome, success or failure, is remembered.
    pub(crate) fn ensure_initialized(&self) -> Result<(), DriverError> {
        self.init
            .get_or_init(|| {
                tracing::debug!(driver = %self.name, "initializing storage engine");
                self.engine.initialize()
            })
            .clone()
            .map_err(|e| e.in_context(ErrorContext::InitializeDriver(self.name.clone())))
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("initialized", &self.init.get().is_some())
            .finish_non_exhaustive()
    }
}

type Registry = RwLock<HashMap<String, Arc<Driver>>>;

lazy_static! {
    static ref DRIVERS: Registry = RwLock::new(builtin_drivers());
}

fn builtin_drivers() -> HashMap<String, Arc<Driver>> {
    #[allow(unused_mut)]
    let mut drivers = HashMap::new();
    #[cfg(feature = "libsql")]
    drivers.insert(
        LIBSQL_DRIVER_NAME.to_string(),
        Arc::new(Driver::new(
            LIBSQL_DRIVER_NAME,
            Arc::new(crate::libsql::LibsqlEngine),
        )),
    );
    drivers
}

fn read_registry() -> RwLockReadGuard<'static, HashMap<String, Arc<Driver>>> {
    // A panic while holding the lock cannot leave the map half-written.
    DRIVERS.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write_registry() -> RwLockWriteGuard<'static, HashMap<String, Arc<Driver>>> {
    DRIVERS.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Make `engine` available under `name`.
///
/// # Errors
/// Returns `DriverError::DuplicateDriver` if the name is taken.
pub fn register(
    name: impl Into<String>,
    engine: Arc<dyn StorageEngine>,
) -> Result<Arc<Driver>, DriverError> {
    let name = name.into();
    let mut drivers = write_registry();
    if drivers.contains_key(&name) {
        return Err(DriverError::DuplicateDriver(name));
    }
    let driver = Arc::new(Driver::new(name.clone(), engine));
    drivers.insert(name, Arc::clone(&driver));
    tracing::debug!(driver = %driver.name(), "registered driver");
    Ok(driver)
}

/// Sorted names of all registered drivers.
#[must_use]
pub fn drivers() -> Vec<String> {
    let mut names: Vec<String> = read_registry().keys().cloned().collect();
    names.sort();
    names
}

pub(crate) fn lookup(name: &str) -> Result<Arc<Driver>, DriverError> {
    read_registry()
        .get(name)
        .cloned()
        .ok_or_else(|| DriverError::UnknownDriver(name.to_string()))
}

/// Open `dsn` with the named driver and default options.
///
/// No I/O happens here; the DSN is checked and the database opened on the
/// first connect.
///
/// # Errors
/// Returns `DriverError::UnknownDriver` if no driver has that name.
pub fn open(driver: &str, dsn: impl Into<Dsn>) -> Result<Database, DriverError> {
    Database::open_with(lookup(driver)?, dsn, DatabaseOptions::default())
}
