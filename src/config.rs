use clap::ValueEnum;
use serde::Deserialize;

use crate::database::Database;
use crate::dsn::Dsn;
use crate::error::DriverError;

/// `SQLite` journal modes that can be requested for every new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

/// Options applied to a database handle and each connection it creates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseOptions {
    /// Upper bound on pooled connections used by `Database::execute`/`query`.
    pub max_connections: usize,
    /// Best effort: engines that reject the mode (in-memory databases and WAL)
    /// keep their default.
    pub journal_mode: Option<JournalMode>,
    pub busy_timeout_ms: Option<u64>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 8,
            journal_mode: None,
            busy_timeout_ms: None,
        }
    }
}

impl DatabaseOptions {
    #[must_use]
    pub fn builder() -> DatabaseOptionsBuilder {
        DatabaseOptionsBuilder::default()
    }

    /// Parse options from a JSON document; missing fields take defaults.
    ///
    /// # Errors
    /// Returns `DriverError::ConfigError` if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, DriverError> {
        serde_json::from_str(json)
            .map_err(|e| DriverError::ConfigError(format!("invalid database options: {e}")))
    }

    pub(crate) fn validate(&self) -> Result<(), DriverError> {
        if self.max_connections == 0 {
            return Err(DriverError::ConfigError(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`DatabaseOptions`].
#[derive(Debug, Clone, Default)]
pub struct DatabaseOptionsBuilder {
    opts: DatabaseOptions,
}

impl DatabaseOptionsBuilder {
    #[must_use]
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.opts.max_connections = max_connections;
        self
    }

    #[must_use]
    pub fn journal_mode(mut self, mode: JournalMode) -> Self {
        self.opts.journal_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn busy_timeout_ms(mut self, millis: u64) -> Self {
        self.opts.busy_timeout_ms = Some(millis);
        self
    }

    #[must_use]
    pub fn finish(self) -> DatabaseOptions {
        self.opts
    }

    /// Open `dsn` with the named driver using these options.
    ///
    /// # Errors
    /// Returns `UnknownDriver` or `ConfigError`; nothing is connected yet.
    pub fn open(self, driver: &str, dsn: impl Into<Dsn>) -> Result<Database, DriverError> {
        let driver = crate::driver::lookup(driver)?;
        Database::open_with(driver, dsn, self.finish())
    }
}
