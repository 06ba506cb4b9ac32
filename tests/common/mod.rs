//! Scripted in-memory engine for exercising the bridge without libsql.
//!
//! Statements understood by the fake:
//! - `execute`: `HANG` never completes, `FAIL...` reports a constraint
//!   violation, anything else succeeds and affects one row
//! - `query`: `SELECT ROWS` yields three rows, `SELECT BROKEN` yields one row
//!   then fails, `HANG` never completes, anything else is a syntax error

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use libsql_driver::engine::{EngineConnection, EngineCursor, EngineDatabase, StorageEngine};
use libsql_driver::{
    Database, DatabaseOptions, Driver, EngineError, ExecResult, Target, Value,
};

pub const ROWS_QUERY: &str = "SELECT ROWS";
pub const BROKEN_QUERY: &str = "SELECT BROKEN";
pub const HANG: &str = "HANG";

#[derive(Debug, Default)]
pub struct Stats {
    pub initializations: AtomicUsize,
    pub opens: AtomicUsize,
    pub database_closes: AtomicUsize,
    pub sessions_opened: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub live_sessions: AtomicI64,
    pub live_cursors: AtomicI64,
    pub statements: AtomicUsize,
}

impl Stats {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn live(counter: &AtomicI64) -> i64 {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct FakeEngine {
    pub stats: Arc<Stats>,
    pub fail_init: bool,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_init() -> Arc<Self> {
        Arc::new(Self {
            fail_init: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl StorageEngine for FakeEngine {
    fn initialize(&self) -> Result<(), EngineError> {
        self.stats.initializations.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            Err(EngineError::new(21, "library routine called out of sequence"))
        } else {
            Ok(())
        }
    }

    async fn open(&self, target: &Target) -> Result<Arc<dyn EngineDatabase>, EngineError> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        match target {
            Target::Remote(url) => Err(EngineError::generic(format!("no transport for {url}"))),
            Target::File(path) if path.ends_with("unopenable") => {
                Err(EngineError::new(14, "unable to open database file"))
            }
            _ => Ok(Arc::new(FakeDatabase {
                stats: Arc::clone(&self.stats),
            })),
        }
    }
}

struct FakeDatabase {
    stats: Arc<Stats>,
}

#[async_trait]
impl EngineDatabase for FakeDatabase {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>, EngineError> {
        self.stats.sessions_opened.fetch_add(1, Ordering::SeqCst);
        self.stats.live_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            stats: Arc::clone(&self.stats),
            last_insert_id: 0,
        }))
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.stats.database_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeConnection {
    stats: Arc<Stats>,
    last_insert_id: i64,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.stats.live_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineConnection for FakeConnection {
    async fn execute(&mut self, sql: &str, _params: &[Value]) -> Result<ExecResult, EngineError> {
        if sql == HANG {
            return std::future::pending().await;
        }
        if sql.starts_with("FAIL") {
            return Err(EngineError::new(19, "UNIQUE constraint failed: t.id"));
        }
        self.stats.statements.fetch_add(1, Ordering::SeqCst);
        self.last_insert_id += 1;
        Ok(ExecResult::new(1, self.last_insert_id))
    }

    async fn query(
        &mut self,
        sql: &str,
        _params: &[Value],
    ) -> Result<Box<dyn EngineCursor>, EngineError> {
        let (rows, fail_at_end) = match sql {
            HANG => return std::future::pending().await,
            ROWS_QUERY => (sample_rows(3), false),
            BROKEN_QUERY => (sample_rows(1), true),
            other => {
                return Err(EngineError::new(1, format!("near \"{other}\": syntax error")));
            }
        };
        self.stats.live_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeCursor {
            stats: Arc::clone(&self.stats),
            rows,
            fail_at_end,
        }))
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.stats.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn sample_rows(count: i64) -> VecDeque<Vec<Value>> {
    (0..count)
        .map(|i| {
            vec![
                Value::Null,
                Value::Integer(i),
                Value::Text(i.to_string()),
                Value::Real(i as f64 + 0.5),
                Value::Blob(vec![u8::try_from(i).unwrap_or(0); 10]),
            ]
        })
        .collect()
}

struct FakeCursor {
    stats: Arc<Stats>,
    rows: VecDeque<Vec<Value>>,
    fail_at_end: bool,
}

impl Drop for FakeCursor {
    fn drop(&mut self) {
        self.stats.live_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EngineCursor for FakeCursor {
    fn columns(&self) -> Vec<String> {
        ["NULL", "id", "name", "gpa", "cv"]
            .iter()
            .map(|c| (*c).to_string())
            .collect()
    }

    async fn fetch_row(&mut self) -> Result<Option<Vec<Value>>, EngineError> {
        match self.rows.pop_front() {
            Some(row) => Ok(Some(row)),
            None if self.fail_at_end => {
                Err(EngineError::new(11, "database disk image is malformed"))
            }
            None => Ok(None),
        }
    }
}

/// A handle on the fake engine, bypassing the global registry.
pub fn fake_database(dsn: &str) -> (Database, Arc<Stats>) {
    fake_database_with(dsn, DatabaseOptions::default())
}

pub fn fake_database_with(dsn: &str, options: DatabaseOptions) -> (Database, Arc<Stats>) {
    let engine = FakeEngine::new();
    let stats = Arc::clone(&engine.stats);
    let driver = Arc::new(Driver::new("fake", engine));
    let db = Database::open_with(driver, dsn, options).expect("valid options");
    (db, stats)
}
