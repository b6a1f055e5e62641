//! MySQL dialect.

use crate::ident::{IdentifierPolicy, QuoteStyle};

use super::{Dialect, UpsertColumn};

const RESERVED: &[&str] = &[
    "accessible", "add", "all", "alter", "analyze", "and", "as", "asc", "asensitive", "before",
    "between", "bigint", "binary", "blob", "both", "by", "call", "cascade", "case", "change",
    "char", "character", "check", "collate", "column", "condition", "constraint", "continue",
    "convert", "create", "cross", "current_date", "current_time", "current_timestamp",
    "current_user", "cursor", "database", "databases", "day_hour", "day_microsecond",
    "day_minute", "day_second", "dec", "decimal", "declare", "default", "delayed", "delete",
    "desc", "describe", "deterministic", "distinct", "distinctrow", "div", "double", "drop",
    "dual", "each", "else", "elseif", "enclosed", "escaped", "exists", "exit", "explain",
    "false", "fetch", "float", "float4", "float8", "for", "force", "foreign", "from", "fulltext",
    "grant", "group", "having", "high_priority", "hour_microsecond", "hour_minute",
    "hour_second", "if", "ignore", "in", "index", "infile", "inner", "inout", "insensitive",
    "insert", "int", "int1", "int2", "int3", "int4", "int8", "integer", "interval", "into",
    "is", "iterate", "join", "key", "keys", "kill", "leading", "leave", "left", "like", "limit",
    "linear", "lines", "load", "localtime", "localtimestamp", "lock", "long", "longblob",
    "longtext", "loop", "low_priority", "master_ssl_verify_server_cert", "match", "maxvalue",
    "mediumblob", "mediumint", "mediumtext", "middleint", "minute_microsecond",
    "minute_second", "mod", "modifies", "natural", "not", "no_write_to_binlog", "null",
    "numeric", "on", "optimize", "option", "optionally", "or", "order", "out", "outer",
    "outfile", "over", "precision", "primary", "procedure", "purge", "range", "read",
    "reads", "read_write", "real", "references", "regexp", "release", "rename", "repeat",
    "replace", "require", "resignal", "restrict", "return", "revoke", "right", "rlike",
    "rows", "schema", "schemas", "second_microsecond", "select", "sensitive", "separator",
    "set", "show", "signal", "smallint", "spatial", "specific", "sql", "sqlexception",
    "sqlstate", "sqlwarning", "sql_big_result", "sql_calc_found_rows", "sql_small_result",
    "ssl", "starting", "straight_join", "table", "terminated", "then", "tinyblob",
    "tinyint", "tinytext", "to", "trailing", "trigger", "true", "undo", "union", "unique",
    "unlock", "unsigned", "update", "usage", "use", "using", "utc_date", "utc_time",
    "utc_timestamp", "values", "varbinary", "varchar", "varcharacter", "varying", "when",
    "where", "while", "with", "write", "xor", "year_month", "zerofill",
];

/// MySQL dialect transformer.
pub struct MySqlDialect {
    idents: IdentifierPolicy,
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self { idents: IdentifierPolicy::new(QuoteStyle::Backtick, RESERVED) }
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
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

    fn requires_primary_key_for_upsert(&self) -> bool {
        false
    }

    fn build_upsert_sql(&self, table: &str, columns: &[UpsertColumn]) -> String {
        let escaped_table = self.escape_table_name(table);
        let escaped_cols: Vec<String> = columns.iter().map(|c| self.escape_column_name(&c.name)).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{}", c.name)).collect();
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !c.is_conflict_key)
            .map(|c| {
                let col = self.escape_column_name(&c.name);
                format!("{col} = VALUES({col})")
            })
            .collect();

        let mut sql = format!(
            "INSERT INTO {escaped_table} ({}) VALUES ({})",
            escaped_cols.join(", "),
            placeholders.join(", ")
        );
        if updates.is_empty() {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            let keep_alive: Vec<String> = columns
                .iter()
                .map(|c| {
                    let col = self.escape_column_name(&c.name);
                    format!("{col} = {col}")
                })
                .collect();
            sql.push_str(&keep_alive.join(", "));
        } else {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            sql.push_str(&updates.join(", "));
        }
        sql
    }

    fn default_type_name(&self, logical_type: &str) -> String {
        match logical_type {
            "int" | "integer" => "INT".to_string(),
            "bigint" => "BIGINT".to_string(),
            "text" | "string" => "TEXT".to_string(),
            "varchar" => "VARCHAR(255)".to_string(),
            "float" | "double" => "DOUBLE".to_string(),
            "bool" | "boolean" => "TINYINT(1)".to_string(),
            "blob" | "bytes" | "binary" => "BLOB".to_string(),
            "time" => "DATETIME".to_string(),
            "json" => "JSON".to_string(),
            "bit" => "BIT(1)".to_string(),
            other => other.to_ascii_uppercase(),
        }
    }

    fn connect_string(&self, host: &str, port: u16, database: &str) -> String {
        format!("mysql://{host}:{port}/{database}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_identifier_uses_backticks() {
        let dialect = MySqlDialect::default();
        assert_eq!(dialect.escape_column_name("order"), "`order`");
    }

    #[test]
    fn upsert_uses_values_function() {
        let dialect = MySqlDialect::default();
        let sql = dialect.build_upsert_sql(
            "users",
            &[
                UpsertColumn { name: "id".into(), is_conflict_key: true },
                UpsertColumn { name: "email".into(), is_conflict_key: false },
            ],
        );
        assert!(sql.contains("VALUES (:id, :email)"));
        assert!(sql.contains("ON DUPLICATE KEY UPDATE `email` = VALUES(`email`)"));
    }
}
