//! SQLite dialect.

use crate::ident::{IdentifierPolicy, QuoteStyle};

use super::{Dialect, UpsertColumn};

const RESERVED: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "analyze", "and", "as", "asc", "attach",
    "autoincrement", "before", "begin", "between", "by", "cascade", "case", "cast", "check",
    "collate", "column", "commit", "conflict", "constraint", "create", "cross", "current",
    "database", "default", "deferrable", "deferred", "delete", "desc", "detach", "distinct",
    "drop", "each", "else", "end", "escape", "except", "exclusive", "exists", "explain", "fail",
    "for", "foreign", "from", "full", "glob", "group", "having", "if", "ignore", "immediate",
    "in", "index", "indexed", "initially", "inner", "insert", "instead", "intersect", "into",
    "is", "isnull", "join", "key", "left", "like", "limit", "match", "natural", "no", "not",
    "notnull", "null", "of", "offset", "on", "or", "order", "outer", "plan", "pragma", "primary",
    "query", "raise", "recursive", "references", "regexp", "reindex", "release", "rename",
    "replace", "restrict", "right", "rollback", "row", "savepoint", "select", "set", "table",
    "temp", "temporary", "then", "to", "transaction", "trigger", "union", "unique", "update",
    "using", "vacuum", "values", "view", "virtual", "when", "where", "with", "without",
];

/// SQLite dialect transformer.
pub struct SqliteDialect {
    idents: IdentifierPolicy,
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self { idents: IdentifierPolicy::new(QuoteStyle::DoubleQuote, RESERVED) }
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn escape_table_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn escape_column_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn supports_replace(&self) -> bool {
        true
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
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !c.is_conflict_key)
            .map(|c| {
                let col = self.escape_column_name(&c.name);
                format!("{col} = excluded.{col}")
            })
            .collect();

        let mut sql = format!(
            "INSERT INTO {escaped_table} ({}) VALUES ({})",
            escaped_cols.join(", "),
            placeholders.join(", ")
        );
        if conflict_cols.is_empty() || updates.is_empty() {
            sql.push_str(" ON CONFLICT DO NOTHING");
        } else {
            sql.push_str(&format!(" ON CONFLICT ({}) DO UPDATE SET {}", conflict_cols.join(", "), updates.join(", ")));
        }
        sql
    }

    fn default_type_name(&self, logical_type: &str) -> String {
        match logical_type {
            "int" | "integer" | "bigint" => "INTEGER".to_string(),
            "text" | "varchar" | "string" => "TEXT".to_string(),
            "float" | "double" | "real" => "REAL".to_string(),
            "bool" | "boolean" => "INTEGER".to_string(),
            "blob" | "bytes" | "binary" => "BLOB".to_string(),
            "time" => "TEXT".to_string(),
            "json" => "TEXT".to_string(),
            "bit" => "INTEGER".to_string(),
            other => other.to_ascii_uppercase(),
        }
    }

    fn connect_string(&self, host: &str, _port: u16, database: &str) -> String {
        if host.is_empty() || host == "." {
            format!("sqlite://{database}")
        } else {
            format!("sqlite://{host}/{database}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_column_is_quoted() {
        let dialect = SqliteDialect::default();
        assert_eq!(dialect.escape_column_name("order"), "\"order\"");
        assert_eq!(dialect.escape_column_name("email"), "email");
    }

    #[test]
    fn upsert_emits_conflict_clause() {
        let dialect = SqliteDialect::default();
        let sql = dialect.build_upsert_sql(
            "users",
            &[
                UpsertColumn { name: "id".into(), is_conflict_key: true },
                UpsertColumn { name: "email".into(), is_conflict_key: false },
            ],
        );
        assert_eq!(
            sql,
            "INSERT INTO users (id, email) VALUES (:id, :email) ON CONFLICT (id) DO UPDATE SET email = excluded.email"
        );
    }
}
