//! Dialect transformer (C5).
//!
//! A `Dialect` translates the builder's abstract intent (escape this
//! identifier, paginate this query, emit an upsert) into the concrete SQL
//! text a specific database expects. Default method bodies cover the
//! lowest common denominator; each dialect overrides only what it actually
//! does differently.

pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod registry;
pub mod sqlite;

pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use registry::{lookup, register};
pub use sqlite::SqliteDialect;

/// A column participating in an upsert, for `build_upsert_sql`.
#[derive(Debug, Clone)]
pub struct UpsertColumn {
    pub name: String,
    pub is_conflict_key: bool,
}

/// Dialect transformer contract (C5).
pub trait Dialect: Send + Sync {
    /// Short dialect identifier, e.g. `"mysql"`, used for registry lookup
    /// and error messages.
    fn name(&self) -> &'static str;

    /// Escapes a table (or schema-qualified table) name per this dialect's
    /// reserved-word policy.
    fn escape_table_name(&self, name: &str) -> String;

    /// Escapes a column name per this dialect's reserved-word policy.
    fn escape_column_name(&self, name: &str) -> String;

    /// Renders a bind-parameter placeholder for the given logical name.
    /// Every dialect emits the same `:name` token in the statement text;
    /// translating that to a driver-native `?` or `$N` style is the client
    /// layer's job (`connect_string`'s driver selects the translator), not
    /// the builder's. `position` is accepted for dialects that need it to
    /// drive that downstream translation but is unused by the default.
    fn parameter_placeholder(&self, name: &str, position: usize) -> String {
        let _ = position;
        format!(":{name}")
    }

    /// Appends a `LIMIT`/`OFFSET` clause (or dialect equivalent) to `sql`.
    fn build_pagination(&self, sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    /// Whether this dialect supports a native `REPLACE INTO` statement.
    fn supports_replace(&self) -> bool {
        false
    }

    /// Whether `build_upsert_sql` needs a declared conflict key to target
    /// its `ON CONFLICT`/`MERGE` clause. MySQL's `ON DUPLICATE KEY UPDATE`
    /// relies on the table's own unique constraints instead, so it is the
    /// one dialect that can upsert without a declared primary key.
    fn requires_primary_key_for_upsert(&self) -> bool {
        true
    }

    /// Builds a `REPLACE`-semantics statement (insert-or-overwrite) for
    /// dialects that support it natively. `primary_keys` names the declared
    /// conflict-key columns, needed by dialects (PostgreSQL) whose native
    /// replace form must target an `ON CONFLICT` clause. Returns `None`
    /// when the dialect has no native REPLACE, or lacks what it needs to
    /// emit one (e.g. PostgreSQL with no declared primary key), and the
    /// builder must fall back to a `build_upsert_sql`-based emulation
    /// instead.
    fn build_replace_sql(&self, table: &str, columns: &[String], primary_keys: &[String]) -> Option<String> {
        let _ = primary_keys;
        if !self.supports_replace() {
            return None;
        }
        let escaped_table = self.escape_table_name(table);
        let escaped_cols: Vec<String> = columns.iter().map(|c| self.escape_column_name(c)).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| self.parameter_placeholder(c, 0)).collect();
        Some(format!(
            "REPLACE INTO {escaped_table} ({}) VALUES ({})",
            escaped_cols.join(", "),
            placeholders.join(", ")
        ))
    }

    /// Builds an `INSERT ... ON CONFLICT/DUPLICATE KEY`-style upsert
    /// statement. `columns` marks which columns form the conflict key.
    fn build_upsert_sql(&self, table: &str, columns: &[UpsertColumn]) -> String;

    /// The column names in the exact left-to-right order their named
    /// placeholders occur in `build_upsert_sql`'s output, including
    /// repeats. Most dialects bind each column once (MySQL's
    /// `VALUES(col)` and SQLite's `excluded.col` reference the insert
    /// value without a second bind); PostgreSQL's `ON CONFLICT DO UPDATE`
    /// re-binds every column by name in its `SET` clause and overrides
    /// this to reflect that.
    fn upsert_param_names(&self, columns: &[UpsertColumn]) -> Vec<String> {
        columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Whether this dialect can execute multiple statements in a single
    /// batch round-trip (affects how the migration engine drives it).
    fn supports_batch(&self) -> bool {
        true
    }

    /// Default SQL type name for a given logical column type, used by the
    /// migration engine when generating `CREATE TABLE`/`ALTER TABLE` DDL.
    fn default_type_name(&self, logical_type: &str) -> String {
        logical_type.to_ascii_uppercase()
    }

    /// Builds a connection string / DSN for this dialect from the given
    /// components. Used by the client manager (C9) when no full DSN was
    /// supplied directly.
    fn connect_string(&self, host: &str, port: u16, database: &str) -> String {
        format!("{}://{host}:{port}/{database}", self.name())
    }
}
