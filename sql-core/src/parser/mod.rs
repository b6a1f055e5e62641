//! SQL text → `Builder` parser (C7).
//!
//! Supports the same statement shapes the builder can emit: `SELECT`
//! (with joins, `WHERE`, `GROUP BY`/`HAVING`, `ORDER BY`, `LIMIT`/`OFFSET`),
//! `INSERT ... VALUES` (single or multi-row), `UPDATE ... SET ... WHERE`,
//! and `DELETE ... WHERE`. Not supported, by design: DDL, transactions,
//! set operations (`UNION`/`INTERSECT`/`EXCEPT`), window functions, CTEs,
//! and `NATURAL JOIN`.

mod builder_parser;
mod pratt;

pub use builder_parser::parse_statement;
pub use pratt::ExprParser;
