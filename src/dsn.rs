//! Data source names.
//!
//! A DSN arrives as arbitrary bytes and is only inspected when a connection is
//! first requested. Three shapes are recognized:
//! - `:memory:` for an ephemeral in-process database
//! - a URL with a network scheme (`libsql://`, `http://`, ...) for a remote target
//! - anything else, taken as a filesystem path

use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;

/// The DSN naming an ephemeral in-process database.
pub const MEMORY_DSN: &str = ":memory:";

const REMOTE_SCHEMES: [&str; 5] = ["libsql://", "http://", "https://", "ws://", "wss://"];

/// The DSN bytes exactly as the caller supplied them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dsn(Arc<[u8]>);

/// What a validated DSN points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Memory,
    File(String),
    Remote(String),
}

impl Dsn {
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Syntactic classification; no file is touched and no host is contacted.
    ///
    /// # Errors
    /// Returns an engine-coded `Wrong URL` error naming the first invalid
    /// UTF-8 byte run or the first interior NUL byte.
    pub fn target(&self) -> Result<Target, EngineError> {
        let text = std::str::from_utf8(&self.0)
            .map_err(|e| EngineError::generic(format!("Wrong URL: {e}")))?;
        // paths and URLs are handed to the engine as C strings
        if let Some(pos) = text.bytes().position(|b| b == 0) {
            return Err(EngineError::generic(format!(
                "Wrong URL: nul byte found in provided data at position: {pos}"
            )));
        }
        if text == MEMORY_DSN {
            return Ok(Target::Memory);
        }
        let lowered = text.to_ascii_lowercase();
        if REMOTE_SCHEMES
            .iter()
            .any(|scheme| lowered.starts_with(scheme))
        {
            Ok(Target::Remote(text.to_string()))
        } else {
            Ok(Target::File(text.to_string()))
        }
    }
}

impl From<&str> for Dsn {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for Dsn {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&[u8]> for Dsn {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for Dsn {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

/// Valid UTF-8 is written as-is; each invalid byte becomes `\xNN`.
impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            for byte in chunk.invalid() {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dsn(\"{self}\")")
    }
}
