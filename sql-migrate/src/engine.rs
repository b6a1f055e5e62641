//! File-based, replication-safe migration engine (C8).
//!
//! Migrations are plain `.sql` files named `NNNN_description.sql` under a
//! directory, optionally split into `-- +migrate Up` / `-- +migrate Down`
//! sections (see `sql_core::splitter::split_migration_sections`). Applying
//! a migration records one row per file in a tracking table so a second
//! run against the same database is a no-op — the same property the
//! teacher's `MigrationHistory` table gives a compile-time migration list,
//! carried over to a file-scan-driven one.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::any::AnyPool;
use sqlx::Row;
use tracing::{debug, info, warn};

use sql_core::dialect::Dialect;
use sql_core::splitter::{split_migration_sections, split_statements};

use crate::error::{MigrateError, Result};

/// A migration file discovered on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub sequence: u32,
    pub name: String,
    pub path: PathBuf,
}

impl MigrationFile {
    /// The identifier recorded in the tracking table: the file's basename
    /// (e.g. `0001_create_widgets.sql`).
    #[must_use]
    pub fn id(&self) -> String {
        self.path.file_name().and_then(|n| n.to_str()).map_or_else(
            || format!("{:04}_{}.sql", self.sequence, self.name),
            ToString::to_string,
        )
    }
}

fn parse_filename(path: &Path) -> Option<(u32, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (seq_part, name_part) = stem.split_once('_')?;
    let sequence: u32 = seq_part.parse().ok()?;
    Some((sequence, name_part.to_string()))
}

/// Drives migration discovery, application, and rollback against a single
/// database, under a tracking table namespaced by `service_owner`.
pub struct MigrationEngine<'a> {
    pool: &'a AnyPool,
    dialect: &'a dyn Dialect,
    migrations_dir: PathBuf,
    table_name: String,
    dry_run: bool,
    ignore_errors: bool,
}

impl<'a> MigrationEngine<'a> {
    #[must_use]
    pub fn new(pool: &'a AnyPool, dialect: &'a dyn Dialect, migrations_dir: impl Into<PathBuf>, service_owner: &str) -> Self {
        let normalized = service_owner.to_ascii_lowercase().replace('-', "_");
        let table_name =
            if normalized.is_empty() { "gorp_migrations".to_string() } else { format!("{normalized}_migrations") };
        Self { pool, dialect, migrations_dir: migrations_dir.into(), table_name, dry_run: false, ignore_errors: false }
    }

    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// When set, a file that fails to apply does not halt the run: it is
    /// logged, its `Down` section is attempted best-effort, and the engine
    /// continues to the remaining pending files before reporting an
    /// aggregate failure.
    #[must_use]
    pub const fn ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    #[must_use]
    pub fn tracking_table(&self) -> &str {
        &self.table_name
    }

    /// Creates the tracking table if it does not already exist.
    pub async fn ensure_tracking_table(&self) -> Result<()> {
        let table = dialect_escaped(self.dialect, &self.table_name);
        let id_type = self.dialect.default_type_name("varchar");
        let ts_type = self.dialect.default_type_name("time");
        let sql =
            format!("CREATE TABLE IF NOT EXISTS {table} (id {id_type} NOT NULL PRIMARY KEY, applied_at {ts_type})");
        sqlx::query(&sql).execute(self.pool).await?;
        Ok(())
    }

    /// Scans `migrations_dir` for `NNNN_name.sql` files, sorted by
    /// sequence number.
    pub fn scan_migrations(&self) -> Result<Vec<MigrationFile>> {
        if !self.migrations_dir.is_dir() {
            return Err(MigrateError::MigrationsDirNotFound(self.migrations_dir.clone()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.migrations_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sql") {
                continue;
            }
            let Some((sequence, name)) = parse_filename(&path) else {
                warn!(path = %path.display(), "skipping migration file with unrecognized name");
                continue;
            };
            files.push(MigrationFile { sequence, name, path });
        }
        files.sort_by(|a, b| a.id().cmp(&b.id()));
        Ok(files)
    }

    /// Returns the set of migration ids already recorded as applied.
    pub async fn applied_ids(&self) -> Result<HashSet<String>> {
        let table = dialect_escaped(self.dialect, &self.table_name);
        let rows = sqlx::query(&format!("SELECT id FROM {table}")).fetch_all(self.pool).await?;
        Ok(rows.into_iter().filter_map(|row| row.try_get::<String, _>("id").ok()).collect())
    }

    /// Returns migration files not yet recorded as applied, in
    /// ascending sequence order.
    pub async fn pending(&self) -> Result<Vec<MigrationFile>> {
        let applied = self.applied_ids().await?;
        Ok(self.scan_migrations()?.into_iter().filter(|f| !applied.contains(&f.id())).collect())
    }

    /// Confirms every id recorded as applied still has a matching file on
    /// disk. A tracking table row with no backing file means the
    /// migrations directory and database have drifted apart — most
    /// commonly because a deploy shipped a database without its
    /// migrations directory, or a file was renamed after being applied.
    pub async fn verify_integrity(&self) -> Result<()> {
        let applied = self.applied_ids().await?;
        let known: HashSet<String> = self.scan_migrations()?.into_iter().map(|f| f.id()).collect();
        let missing: Vec<String> = applied.difference(&known).cloned().collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MigrateError::SomeFilesNotFound { count: missing.len(), names: missing })
        }
    }

    /// Applies every pending migration in order, returning the ids applied.
    ///
    /// With `ignore_errors` unset (the default), the first failing file
    /// halts the run; its `Down` section is attempted best-effort before the
    /// error is returned. With `ignore_errors` set, a failing file is logged
    /// and the run continues through the remaining pending files; every
    /// failed file's `Down` section is attempted best-effort at the end and
    /// the aggregate failure is reported.
    pub async fn apply_all(&self) -> Result<Vec<String>> {
        self.ensure_tracking_table().await?;
        self.verify_integrity().await?;
        let mut applied = Vec::new();
        let mut failed = Vec::new();
        for file in self.pending().await? {
            match self.apply_one(&file).await {
                Ok(()) => applied.push(file.id()),
                Err(err) => {
                    warn!(migration = %file.id(), error = %err, "migration failed to apply");
                    failed.push(file);
                    if !self.ignore_errors {
                        break;
                    }
                }
            }
        }

        if failed.is_empty() {
            return Ok(applied);
        }

        let failed_ids: Vec<String> = failed.iter().map(MigrationFile::id).collect();
        for file in &failed {
            if let Err(err) = self.rollback_file(file).await {
                warn!(migration = %file.id(), error = %err, "best-effort rollback of failed migration also failed");
            }
        }
        Err(MigrateError::AggregateFailure { failed: failed_ids })
    }

    /// Applies a single migration file's `up` section and records it.
    pub async fn apply_one(&self, file: &MigrationFile) -> Result<()> {
        let id = file.id();
        let text = fs::read_to_string(&file.path)?;
        let (up, _down) = split_migration_sections(&text);
        let up = up.unwrap_or_default();

        if self.dry_run {
            info!(migration = %id, "dry run: would apply migration");
            for statement in split_statements(&up)? {
                debug!(migration = %id, sql = %statement.text, "dry run statement");
            }
            return Ok(());
        }

        info!(migration = %id, "applying migration");
        for statement in split_statements(&up)? {
            if statement.text.trim_start().starts_with("--") {
                continue;
            }
            sqlx::query(&statement.text).execute(self.pool).await?;
        }

        let table = dialect_escaped(self.dialect, &self.table_name);
        sqlx::query(&format!("INSERT INTO {table} (id, applied_at) VALUES (?, ?)"))
            .bind(&id)
            .bind(Utc::now().to_rfc3339())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Rolls back the most recently applied migration using its `down`
    /// section. Returns `Err(MigrateError::NotReversible)` if the file has
    /// no `down` section.
    pub async fn rollback_last(&self) -> Result<Option<String>> {
        let applied = self.applied_ids().await?;
        let Some(file) = self.scan_migrations()?.into_iter().filter(|f| applied.contains(&f.id())).next_back() else {
            return Ok(None);
        };
        let id = file.id();
        self.rollback_file(&file).await?;
        Ok(Some(id))
    }

    /// Executes `file`'s `Down` section and removes its tracking row.
    /// Returns `Err(MigrateError::NotReversible)` if the file has no `Down`
    /// section.
    async fn rollback_file(&self, file: &MigrationFile) -> Result<()> {
        let id = file.id();
        let text = fs::read_to_string(&file.path)?;
        let (_up, down) = split_migration_sections(&text);
        let Some(down) = down else {
            return Err(MigrateError::NotReversible { name: id });
        };

        if self.dry_run {
            info!(migration = %id, "dry run: would roll back migration");
            return Ok(());
        }

        info!(migration = %id, "rolling back migration");
        for statement in split_statements(&down)? {
            sqlx::query(&statement.text).execute(self.pool).await?;
        }

        let table = dialect_escaped(self.dialect, &self.table_name);
        sqlx::query(&format!("DELETE FROM {table} WHERE id = ?")).bind(&id).execute(self.pool).await?;
        Ok(())
    }
}

fn dialect_escaped(dialect: &dyn Dialect, name: &str) -> String {
    dialect.escape_table_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sql_core::dialect::SqliteDialect;
    use sqlx::any::AnyPoolOptions;
    use std::io::Write;

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
    async fn applying_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(
            dir.path(),
            1,
            "create_widgets",
            "-- +migrate Up\nCREATE TABLE widgets (id INTEGER PRIMARY KEY);\n-- +migrate Down\nDROP TABLE widgets;\n",
        );

        let pool = memory_pool().await;
        let dialect = SqliteDialect::default();
        let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app");

        let first_run = engine.apply_all().await.unwrap();
        assert_eq!(first_run, vec!["0001_create_widgets.sql".to_string()]);

        let second_run = engine.apply_all().await.unwrap();
        assert!(second_run.is_empty());
    }

    #[tokio::test]
    async fn rollback_requires_down_section() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(dir.path(), 1, "create_widgets", "-- +migrate Up\nCREATE TABLE widgets (id INTEGER PRIMARY KEY);\n");

        let pool = memory_pool().await;
        let dialect = SqliteDialect::default();
        let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app");
        engine.apply_all().await.unwrap();

        let err = engine.rollback_last().await.unwrap_err();
        assert!(matches!(err, MigrateError::NotReversible { .. }));
    }

    #[tokio::test]
    async fn verify_integrity_flags_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(dir.path(), 1, "create_widgets", "-- +migrate Up\nCREATE TABLE widgets (id INTEGER PRIMARY KEY);\n");

        let pool = memory_pool().await;
        let dialect = SqliteDialect::default();
        let engine = MigrationEngine::new(&pool, &dialect, dir.path(), "app");
        engine.apply_all().await.unwrap();

        fs::remove_file(dir.path().join("0001_create_widgets.sql")).unwrap();
        let err = engine.verify_integrity().await.unwrap_err();
        assert!(matches!(err, MigrateError::SomeFilesNotFound { count: 1, .. }));
    }
}
