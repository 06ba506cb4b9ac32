use std::fmt;

use thiserror::Error;

use crate::dsn::Dsn;
use crate::types::ValueError;

/// Result code engines use for a generic failure (`SQLITE_ERROR`).
pub const GENERIC_ERROR_CODE: i32 = 1;

/// A failure reported by a storage engine: its numeric result code and its
/// diagnostic text, both carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error code = {code}: {message}")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for an error carrying [`GENERIC_ERROR_CODE`].
    #[must_use]
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(GENERIC_ERROR_CODE, message)
    }

    /// Attach the operation that failed, producing the caller-facing error.
    #[must_use]
    pub fn in_context(self, context: ErrorContext) -> DriverError {
        DriverError::Engine {
            context,
            error: self,
        }
    }
}

/// The bridge operation during which an engine error surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    InitializeDriver(String),
    OpenDatabase(Dsn),
    Connect(Dsn),
    Execute(String),
    FetchRow,
    CloseConnection,
    CloseDatabase(Dsn),
}

impl ErrorContext {
    /// Raw-byte rendering; identical to `Display` except that DSN bytes are
    /// emitted as given instead of escaped.
    fn to_bytes(&self) -> Vec<u8> {
        let (prefix, dsn) = match self {
            Self::OpenDatabase(dsn) => ("failed to open database ", dsn),
            Self::Connect(dsn) => ("failed to connect to database ", dsn),
            Self::CloseDatabase(dsn) => ("failed to close database ", dsn),
            other => return other.to_string().into_bytes(),
        };
        let mut out = prefix.as_bytes().to_vec();
        out.extend_from_slice(dsn.as_bytes());
        out
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializeDriver(name) => write!(f, "failed to initialize driver {name}"),
            Self::OpenDatabase(dsn) => write!(f, "failed to open database {dsn}"),
            Self::Connect(dsn) => write!(f, "failed to connect to database {dsn}"),
            Self::Execute(sql) => write!(f, "failed to execute query {sql}"),
            Self::FetchRow => f.write_str("failed to fetch row"),
            Self::CloseConnection => f.write_str("failed to close connection"),
            Self::CloseDatabase(dsn) => write!(f, "failed to close database {dsn}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// An engine failure. Renders as `{context}\nerror code = {code}: {message}`.
    #[error("{context}\n{error}")]
    Engine {
        context: ErrorContext,
        error: EngineError,
    },

    #[error("database is closed")]
    DatabaseClosed,

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("context canceled")]
    Cancelled,

    #[error("unknown driver {0:?} (forgotten registration?)")]
    UnknownDriver(String),

    #[error("driver {0:?} is already registered")]
    DuplicateDriver(String),

    #[error("column index {index} out of range: row has {count} columns")]
    ColumnIndex { index: usize, count: usize },

    #[error("no column named {0:?}")]
    ColumnNotFound(String),

    #[error("expected {expected} destination arguments in scan, row has {actual} columns")]
    ScanArity { expected: usize, actual: usize },

    #[error("cannot decode column {index} into {target}: {source}")]
    Column {
        index: usize,
        target: &'static str,
        #[source]
        source: ValueError,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection pool error: {0}")]
    Pool(String),
}

impl DriverError {
    /// The engine's numeric code, when the failure came from the engine.
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Engine { error, .. } => Some(error.code),
            _ => None,
        }
    }

    /// The engine's diagnostic text, verbatim.
    #[must_use]
    pub fn engine_message(&self) -> Option<&str> {
        match self {
            Self::Engine { error, .. } => Some(&error.message),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Render the message with any DSN embedded as its original bytes.
    ///
    /// `Display` has to produce valid UTF-8 and therefore escapes invalid DSN
    /// bytes as `\xNN`; this keeps them raw.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Engine { context, error } => {
                let mut out = context.to_bytes();
                out.push(b'\n');
                out.extend_from_slice(error.to_string().as_bytes());
                out
            }
            other => other.to_string().into_bytes(),
        }
    }
}

/// Funnel an engine code and message into the caller-facing error shape.
#[must_use]
pub fn translate(code: i32, message: impl Into<String>, context: ErrorContext) -> DriverError {
    EngineError::new(code, message).in_context(context)
}
