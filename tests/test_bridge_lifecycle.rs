mod common;

use std::sync::Arc;

use common::{FakeEngine, Stats, fake_database};
use libsql_driver::prelude::*;
use libsql_driver::{Driver, ErrorContext};

#[tokio::test]
async fn open_is_lazy_and_connect_opens_once() -> Result<(), DriverError> {
    let (db, stats) = fake_database(":memory:");
    assert_eq!(Stats::get(&stats.opens), 0);
    assert_eq!(Stats::get(&stats.initializations), 0);

    let ctx = CancellationToken::new();
    let mut first = db.connect(&ctx).await?;
    let mut second = db.connect(&ctx).await?;
    assert_ne!(first.id(), second.id());
    assert_eq!(Stats::get(&stats.opens), 1);
    assert_eq!(Stats::get(&stats.initializations), 1);
    assert_eq!(Stats::get(&stats.sessions_opened), 2);

    first.close().await?;
    second.close().await?;
    db.close().await?;
    assert_eq!(Stats::get(&stats.database_closes), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_connects_share_one_engine_database() -> Result<(), Box<dyn std::error::Error>> {
    let (db, stats) = fake_database("shared.db");
    let mut tasks = Vec::new();
    for _ in 0..16 {
        let db = db.clone();
        tasks.push(tokio::spawn(async move {
            let ctx = CancellationToken::new();
            let mut conn = db.connect(&ctx).await?;
            conn.execute(&ctx, "CREATE TABLE t (id INTEGER)", params![]).await?;
            conn.close().await
        }));
    }
    for task in tasks {
        task.await??;
    }
    assert_eq!(Stats::get(&stats.opens), 1);
    assert_eq!(Stats::get(&stats.sessions_opened), 16);
    assert_eq!(Stats::get(&stats.sessions_closed), 16);
    assert_eq!(Stats::live(&stats.live_sessions), 0);
    db.close().await?;
    Ok(())
}

#[tokio::test]
async fn driver_initializes_once_across_handles() -> Result<(), DriverError> {
    let engine = FakeEngine::new();
    let stats = Arc::clone(&engine.stats);
    let driver = Arc::new(Driver::new("fake-once", engine));
    let ctx = CancellationToken::new();

    for dsn in [":memory:", "a.db", "b.db"] {
        let db = Database::open_with(Arc::clone(&driver), dsn, DatabaseOptions::default())?;
        db.ping(&ctx).await?;
        db.close().await?;
    }
    assert_eq!(Stats::get(&stats.initializations), 1);
    assert_eq!(Stats::get(&stats.opens), 3);
    Ok(())
}

#[tokio::test]
async fn failed_initialization_is_reported_on_every_handle() {
    let driver = Arc::new(Driver::new("fake-broken", FakeEngine::failing_init()));
    let ctx = CancellationToken::new();
    for _ in 0..2 {
        let db = Database::open_with(Arc::clone(&driver), ":memory:", DatabaseOptions::default())
            .unwrap();
        let err = db.connect(&ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to initialize driver fake-broken\nerror code = 21: library routine called out of sequence"
        );
    }
}

#[tokio::test]
async fn open_failure_is_cached_per_handle() {
    let (db, stats) = fake_database("/nowhere/unopenable");
    let ctx = CancellationToken::new();
    let first = db.connect(&ctx).await.unwrap_err();
    let second = db.connect(&ctx).await.unwrap_err();
    assert_eq!(
        first.to_string(),
        "failed to open database /nowhere/unopenable\nerror code = 14: Error opening URL /nowhere/unopenable: unable to open database file"
    );
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(Stats::get(&stats.opens), 1);
    // a handle that never opened still closes cleanly
    db.close().await.unwrap();
}

#[tokio::test]
async fn invalid_dsn_never_reaches_the_engine() {
    let engine = FakeEngine::new();
    let stats = Arc::clone(&engine.stats);
    let driver = Arc::new(Driver::new("fake-dsn", engine));
    let db = Database::open_with(driver, b"db\xffname".to_vec(), DatabaseOptions::default())
        .unwrap();
    let err = db.connect(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to open database db\\xffname\nerror code = 1: Wrong URL: invalid utf-8 sequence of 1 bytes from index 2"
    );
    assert!(matches!(
        err,
        DriverError::Engine {
            context: ErrorContext::OpenDatabase(_),
            ..
        }
    ));
    assert_eq!(Stats::get(&stats.initializations), 0);
    assert_eq!(Stats::get(&stats.opens), 0);
}

#[tokio::test]
async fn closing_a_connection_leaves_handle_and_siblings_usable() -> Result<(), DriverError> {
    let (db, _stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    let mut first = db.connect(&ctx).await?;
    let mut sibling = db.connect(&ctx).await?;

    first.close().await?;
    assert!(first.is_closed());
    sibling.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await?;

    let mut third = db.connect(&ctx).await?;
    third.execute(&ctx, "INSERT INTO t VALUES (2)", params![]).await?;
    third.close().await?;
    sibling.close().await?;
    db.close().await
}

#[tokio::test]
async fn connection_use_after_close_is_an_error() -> Result<(), DriverError> {
    let (db, _stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    let mut conn = db.connect(&ctx).await?;
    assert!(conn.database().is_some());
    conn.close().await?;

    assert!(matches!(conn.close().await, Err(DriverError::ConnectionClosed)));
    assert!(matches!(
        conn.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await,
        Err(DriverError::ConnectionClosed)
    ));
    assert!(matches!(
        conn.query(&ctx, common::ROWS_QUERY, params![]).await,
        Err(DriverError::ConnectionClosed)
    ));
    db.close().await
}

#[tokio::test]
async fn database_double_close_and_use_after_close() -> Result<(), DriverError> {
    let (db, stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    db.ping(&ctx).await?;
    db.close().await?;

    assert!(matches!(db.close().await, Err(DriverError::DatabaseClosed)));
    assert!(matches!(db.connect(&ctx).await, Err(DriverError::DatabaseClosed)));
    assert!(matches!(
        db.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await,
        Err(DriverError::DatabaseClosed)
    ));
    assert_eq!(Stats::get(&stats.database_closes), 1);
    Ok(())
}

#[tokio::test]
async fn connection_outliving_its_handle_does_not_crash() -> Result<(), DriverError> {
    let (db, _stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    let mut conn = db.connect(&ctx).await?;
    db.close().await?;
    drop(db);
    assert!(conn.database().is_none());
    // engine-defined outcome; the fake keeps the session alive
    conn.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await?;
    conn.close().await
}

#[tokio::test]
async fn engine_errors_keep_code_and_message() -> Result<(), DriverError> {
    let (db, _stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    let mut conn = db.connect(&ctx).await?;

    let err = conn
        .execute(&ctx, "FAIL INSERT INTO t VALUES (1)", params![])
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to execute query FAIL INSERT INTO t VALUES (1)\nerror code = 19: UNIQUE constraint failed: t.id"
    );
    assert_eq!(err.code(), Some(19));

    let err = conn.query(&ctx, "SELEC 1", params![]).await.unwrap_err();
    assert_eq!(err.code(), Some(1));
    assert_eq!(err.engine_message(), Some("near \"SELEC 1\": syntax error"));

    // the connection stays usable after engine errors
    conn.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await?;
    conn.close().await?;
    db.close().await
}

#[tokio::test]
async fn cancellation_surfaces_as_an_error() -> Result<(), DriverError> {
    let (db, _stats) = fake_database(":memory:");
    let ctx = CancellationToken::new();
    let mut conn = db.connect(&ctx).await?;

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    assert!(conn
        .execute(&cancelled, "INSERT INTO t VALUES (1)", params![])
        .await
        .unwrap_err()
        .is_cancelled());
    assert!(db.connect(&cancelled).await.unwrap_err().is_cancelled());

    let deadline = CancellationToken::new();
    let trigger = deadline.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        trigger.cancel();
    });
    let err = conn.query(&deadline, common::HANG, params![]).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "context canceled");

    // a cancelled call leaves the connection usable
    conn.execute(&ctx, "INSERT INTO t VALUES (1)", params![]).await?;
    conn.close().await?;
    db.close().await
}
