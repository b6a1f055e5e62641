//! PostgreSQL dialect.

use crate::ident::{IdentifierPolicy, QuoteStyle};

use super::{Dialect, UpsertColumn};

const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
    "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
    "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
    "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
    "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

/// PostgreSQL dialect transformer.
pub struct PostgresDialect {
    idents: IdentifierPolicy,
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self { idents: IdentifierPolicy::new(QuoteStyle::DoubleQuote, RESERVED) }
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn escape_table_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn escape_column_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn build_pagination(&self, sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn supports_replace(&self) -> bool {
        true
    }

    /// PostgreSQL has no `REPLACE INTO`; its replace-semantics form is an
    /// insert that does nothing on a primary-key conflict rather than
    /// overwriting the row. Requires a declared primary key to target the
    /// `ON CONFLICT` clause; falls back to `None` without one, which sends
    /// the builder down the upsert-emulation path (and its own
    /// missing-primary-key error).
    fn build_replace_sql(&self, table: &str, columns: &[String], primary_keys: &[String]) -> Option<String> {
        if primary_keys.is_empty() {
            return None;
        }
        let escaped_table = self.escape_table_name(table);
        let escaped_cols: Vec<String> = columns.iter().map(|c| self.escape_column_name(c)).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{c}")).collect();
        let conflict_cols: Vec<String> = primary_keys.iter().map(|c| self.escape_column_name(c)).collect();
        Some(format!(
            "INSERT INTO {escaped_table} ({}) VALUES ({}) ON CONFLICT ({}) DO NOTHING",
            escaped_cols.join(", "),
            placeholders.join(", "),
            conflict_cols.join(", ")
        ))
    }

    fn build_upsert_sql(&self, table: &str, columns: &[UpsertColumn]) -> String {
        let escaped_table = self.escape_table_name(table);
        let escaped_cols: Vec<String> = columns.iter().map(|c| self.escape_column_name(&c.name)).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{}", c.name)).collect();
        let conflict_cols: Vec<String> = columns
            .iter()
            .filter(|c| c.is_conflict_key)
            .map(|c| self.escape_column_name(&c.name))
            .collect();
        // Every column, conflict keys included, is re-bound by name in the
        // SET clause rather than referenced via `EXCLUDED.col`, matching how
        // the rest of the toolkit treats `:name` as the one binding style.
        let updates: Vec<String> =
            columns.iter().map(|c| format!("{} = :{}", self.escape_column_name(&c.name), c.name)).collect();

        let mut sql = format!(
            "INSERT INTO {escaped_table} ({}) VALUES ({})",
            escaped_cols.join(", "),
            placeholders.join(", ")
        );
        if conflict_cols.is_empty() {
            sql.push_str(" ON CONFLICT DO NOTHING");
        } else {
            sql.push_str(&format!(" ON CONFLICT ({}) DO UPDATE SET {}", conflict_cols.join(", "), updates.join(", ")));
        }
        sql
    }

    fn upsert_param_names(&self, columns: &[UpsertColumn]) -> Vec<String> {
        let mut names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        names.extend(columns.iter().map(|c| c.name.clone()));
        names
    }

    fn default_type_name(&self, logical_type: &str) -> String {
        match logical_type {
            "int" | "integer" => "INTEGER".to_string(),
            "bigint" => "BIGINT".to_string(),
            "text" | "string" | "varchar" => "TEXT".to_string(),
            "float" | "double" => "DOUBLE PRECISION".to_string(),
            "bool" | "boolean" => "BOOLEAN".to_string(),
            "blob" | "bytes" | "binary" => "BYTEA".to_string(),
            "time" => "TIMESTAMP".to_string(),
            "json" => "JSONB".to_string(),
            "bit" => "BIT(1)".to_string(),
            other => other.to_ascii_uppercase(),
        }
    }

    fn connect_string(&self, host: &str, port: u16, database: &str) -> String {
        format!("postgres://{host}:{port}/{database}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_placeholder_is_always_named() {
        let dialect = PostgresDialect::default();
        assert_eq!(dialect.parameter_placeholder("a", 1), ":a");
    }

    #[test]
    fn upsert_rebinds_every_column_by_name() {
        let dialect = PostgresDialect::default();
        let sql = dialect.build_upsert_sql(
            "t",
            &[
                UpsertColumn { name: "id".into(), is_conflict_key: true },
                UpsertColumn { name: "name".into(), is_conflict_key: false },
                UpsertColumn { name: "age".into(), is_conflict_key: false },
            ],
        );
        assert_eq!(
            sql,
            "INSERT INTO t (id, name, age) VALUES (:id, :name, :age) ON CONFLICT (id) DO UPDATE SET id = :id, name = :name, age = :age"
        );
    }
}
