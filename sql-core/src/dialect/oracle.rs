//! Oracle dialect.

use crate::ident::{IdentifierPolicy, QuoteStyle};

use super::{Dialect, UpsertColumn};

const RESERVED: &[&str] = &[
    "access", "add", "all", "alter", "and", "any", "as", "asc", "audit", "between", "by",
    "char", "check", "cluster", "column", "comment", "compress", "connect", "create",
    "current", "date", "decimal", "default", "delete", "desc", "distinct", "drop", "else",
    "exclusive", "exists", "file", "float", "for", "from", "grant", "group", "having",
    "identified", "immediate", "in", "increment", "index", "initial", "insert", "integer",
    "intersect", "into", "is", "level", "like", "lock", "long", "maxextents", "minus",
    "mlslabel", "mode", "modify", "noaudit", "nocompress", "not", "nowait", "null", "number",
    "of", "offline", "on", "online", "option", "or", "order", "pctfree", "prior", "privileges",
    "public", "raw", "rename", "resource", "revoke", "row", "rowid", "rownum", "rows",
    "select", "session", "set", "share", "size", "smallint", "start", "successful", "synonym",
    "sysdate", "table", "then", "to", "trigger", "uid", "union", "unique", "update", "user",
    "validate", "values", "varchar", "varchar2", "view", "whenever", "where", "with",
];

/// Oracle dialect transformer.
pub struct OracleDialect {
    idents: IdentifierPolicy,
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self { idents: IdentifierPolicy::new(QuoteStyle::DoubleQuote, RESERVED).uppercasing() }
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn escape_table_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn escape_column_name(&self, name: &str) -> String {
        self.idents.escape(name)
    }

    fn build_pagination(&self, sql: &mut String, limit: Option<i64>, offset: Option<i64>) {
        if let Some(offset) = offset {
            sql.push_str(&format!(" OFFSET {offset} ROWS"));
        }
        if let Some(limit) = limit {
            sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
        }
    }

    fn build_upsert_sql(&self, table: &str, columns: &[UpsertColumn]) -> String {
        // Oracle has no INSERT ... ON CONFLICT; the canonical idiom is
        // MERGE. Conflict-key columns drive the ON clause, the rest drive
        // the UPDATE SET and the INSERT column list.
        let escaped_table = self.escape_table_name(table);
        let conflict_cols: Vec<&UpsertColumn> = columns.iter().filter(|c| c.is_conflict_key).collect();
        let non_conflict_cols: Vec<&UpsertColumn> = columns.iter().filter(|c| !c.is_conflict_key).collect();

        let on_clause = conflict_cols
            .iter()
            .map(|c| {
                let col = self.escape_column_name(&c.name);
                format!("target.{col} = source.{col}")
            })
            .collect::<Vec<_>>()
            .join(" AND ");

        let source_cols: Vec<String> = columns
            .iter()
            .map(|c| {
                let col = self.escape_column_name(&c.name);
                format!("{} AS {col}", self.parameter_placeholder(&c.name, 0))
            })
            .collect();

        let mut sql = format!(
            "MERGE INTO {escaped_table} target USING (SELECT {} FROM dual) source ON ({on_clause})",
            source_cols.join(", ")
        );

        if !non_conflict_cols.is_empty() {
            let updates: Vec<String> = non_conflict_cols
                .iter()
                .map(|c| {
                    let col = self.escape_column_name(&c.name);
                    format!("target.{col} = source.{col}")
                })
                .collect();
            sql.push_str(&format!(" WHEN MATCHED THEN UPDATE SET {}", updates.join(", ")));
        }

        let insert_cols: Vec<String> = columns.iter().map(|c| self.escape_column_name(&c.name)).collect();
        let insert_vals: Vec<String> = columns.iter().map(|c| format!("source.{}", self.escape_column_name(&c.name))).collect();
        sql.push_str(&format!(
            " WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
            insert_cols.join(", "),
            insert_vals.join(", ")
        ));
        sql
    }

    fn default_type_name(&self, logical_type: &str) -> String {
        match logical_type {
            "int" | "integer" | "bigint" => "NUMBER".to_string(),
            "text" | "string" | "varchar" => "VARCHAR2(4000)".to_string(),
            "float" | "double" => "FLOAT".to_string(),
            "bool" | "boolean" => "NUMBER(1)".to_string(),
            "blob" | "bytes" | "binary" => "BLOB".to_string(),
            "time" => "TIMESTAMP".to_string(),
            "json" => "CLOB".to_string(),
            "bit" => "NUMBER(1)".to_string(),
            other => other.to_ascii_uppercase(),
        }
    }

    fn connect_string(&self, host: &str, port: u16, database: &str) -> String {
        format!("oracle://{host}:{port}/{database}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unquoted_identifier_is_uppercased() {
        let dialect = OracleDialect::default();
        assert_eq!(dialect.escape_column_name("email"), "EMAIL");
    }

    #[test]
    fn reserved_identifier_is_quoted_not_uppercased() {
        let dialect = OracleDialect::default();
        assert_eq!(dialect.escape_column_name("table"), "\"table\"");
    }

    #[test]
    fn upsert_emits_merge() {
        let dialect = OracleDialect::default();
        let sql = dialect.build_upsert_sql(
            "users",
            &[
                UpsertColumn { name: "id".into(), is_conflict_key: true },
                UpsertColumn { name: "email".into(), is_conflict_key: false },
            ],
        );
        assert!(sql.starts_with("MERGE INTO USERS"));
        assert!(sql.contains("WHEN MATCHED THEN UPDATE SET"));
        assert!(sql.contains("WHEN NOT MATCHED THEN INSERT"));
    }
}
