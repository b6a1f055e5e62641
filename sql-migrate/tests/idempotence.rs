//! Exercises the migration engine end-to-end against an in-memory SQLite
//! database, the way `engine.rs`'s own unit tests do but from outside the
//! crate.

use sql_core::dialect::SqliteDialect;
use sql_migrate::{MigrateError, MigrationEngine};
use sqlx::any::{AnyPool, AnyPoolOptions};
use std::fs;
use std::io::Write as _;
use std::path::Path;

async fn memory_pool() -> AnyPool {
    sqlx::any::install_default_drivers();
    AnyPoolOptions::new().connect("sqlite::memory:").await.unwrap()
}

fn write_migration(dir: &Path, sequence: u32, name: &str, body: &str) {
    let path = dir.join(format!("{sequence:04}_{name}.sql"));
    let mut file = fs::File::create(path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
}

#[tokio::test]
async fn reapplying_a_fully_applied_directory_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(
        dir.path(),
        1,
        "create_accounts",
        "-- +migrate Up\nCREATE TABLE accounts (id INTEGER PRIMARY KEY, name TEXT NOT NULL);\n-- +migrate Down\nDROP TABLE accounts;\n",
    );
    write_migration(
        dir.path(),
        2,
        "add_balance",
        "-- +migrate Up\nALTER TABLE accounts ADD COLUMN balance INTEGER NOT NULL DEFAULT 0;\n-- +migrate Down\nALTER TABLE accounts DROP COLUMN balance;\n",
    );

    let pool = memory_pool().await;
    let dialect = SqliteDialect::default();
    let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app");

    let applied = engine.apply_all().await.unwrap();
    assert_eq!(applied, vec!["0001_create_accounts.sql".to_string(), "0002_add_balance.sql".to_string()]);

    for _ in 0..3 {
        let reapplied = engine.apply_all().await.unwrap();
        assert!(reapplied.is_empty());
    }

    assert!(engine.pending().await.unwrap().is_empty());
    engine.verify_integrity().await.unwrap();
}

#[tokio::test]
async fn ignore_errors_keeps_applying_after_a_failing_migration() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), 1, "create_accounts", "-- +migrate Up\nCREATE TABLE accounts (id INTEGER PRIMARY KEY);\n");
    write_migration(dir.path(), 2, "broken", "-- +migrate Up\nCREATE TABLE accounts (id INTEGER PRIMARY KEY);\n");
    write_migration(dir.path(), 3, "create_sessions", "-- +migrate Up\nCREATE TABLE sessions (id INTEGER PRIMARY KEY);\n");

    let pool = memory_pool().await;
    let dialect = SqliteDialect::default();
    let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app").ignore_errors(true);

    let err = engine.apply_all().await.unwrap_err();
    assert!(matches!(err, MigrateError::AggregateFailure { ref failed } if failed == &vec!["0002_broken.sql".to_string()]));

    let applied_ids = engine.applied_ids().await.unwrap();
    assert!(applied_ids.contains("0001_create_accounts.sql"));
    assert!(applied_ids.contains("0003_create_sessions.sql"));
    assert!(!applied_ids.contains("0002_broken.sql"));
}

#[tokio::test]
async fn halts_on_first_failure_without_ignore_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_migration(dir.path(), 1, "create_accounts", "-- +migrate Up\nCREATE TABLE accounts (id INTEGER PRIMARY KEY);\n");
    write_migration(dir.path(), 2, "broken", "-- +migrate Up\nCREATE TABLE accounts (id INTEGER PRIMARY KEY);\n");
    write_migration(dir.path(), 3, "create_sessions", "-- +migrate Up\nCREATE TABLE sessions (id INTEGER PRIMARY KEY);\n");

    let pool = memory_pool().await;
    let dialect = SqliteDialect::default();
    let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app");

    let err = engine.apply_all().await.unwrap_err();
    assert!(matches!(err, MigrateError::AggregateFailure { .. }));

    let applied_ids = engine.applied_ids().await.unwrap();
    assert!(applied_ids.contains("0001_create_accounts.sql"));
    assert!(!applied_ids.contains("0003_create_sessions.sql"));
}
