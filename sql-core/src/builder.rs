//! Unified statement builder (C4).
//!
//! Unlike a typestate builder that encodes "has a table" / "has columns" in
//! the type itself, `Builder` is a single runtime-validated value: the
//! statement kind (SELECT/INSERT/UPDATE/DELETE/REPLACE/UPSERT) is chosen at
//! runtime and `build` reports missing-prerequisite errors through
//! `BuilderError` rather than through the type system. That lets a caller
//! decide between REPLACE and UPSERT emission after inspecting a row, which
//! a compile-time state machine can't express without collapsing back to
//! one type anyway.

use crate::dialect::{Dialect, UpsertColumn};
use crate::error::BuilderError;
use crate::expr::{BoundParam, Expr};
use crate::predicate::Where;
use crate::table_source::TableSource;
use crate::value::SqlValue;

const MAX_SUBQUERY_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationKind {
    Select,
    Count,
    Insert,
    Update,
    Delete,
    Replace,
    Upsert,
}

impl OperationKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Count => "SELECT COUNT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
            Self::Upsert => "UPSERT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct JoinClause {
    kind: JoinKind,
    source: TableSource,
    on: Option<Where>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
struct OrderByClause {
    expr: Expr,
    direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    column: String,
    value: Expr,
}

/// The rendered result of `Builder::build`: SQL text plus the bound
/// parameters in the order they must be supplied to the driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltStatement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

/// Single mutable statement builder covering every operation kind (C4).
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    operation: OperationKind,
    database: Option<String>,
    table: Option<TableSource>,
    fields: Vec<Expr>,
    distinct: bool,
    insert_columns: Vec<String>,
    values_rows: Vec<Vec<Expr>>,
    subquery_values: Option<Box<Self>>,
    assignments: Vec<Assignment>,
    primary_keys: Vec<String>,
    where_clause: Option<Where>,
    joins: Vec<JoinClause>,
    group_by: Vec<Expr>,
    having: Option<Where>,
    order_by: Vec<OrderByClause>,
    limit: Option<i64>,
    offset: Option<i64>,
    limit_placeholder: Option<String>,
    offset_placeholder: Option<String>,
}

impl Builder {
    fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            database: None,
            table: None,
            fields: Vec::new(),
            distinct: false,
            insert_columns: Vec::new(),
            values_rows: Vec::new(),
            subquery_values: None,
            assignments: Vec::new(),
            primary_keys: Vec::new(),
            where_clause: None,
            joins: Vec::new(),
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            limit_placeholder: None,
            offset_placeholder: None,
        }
    }

    #[must_use]
    pub fn select() -> Self {
        Self::new(OperationKind::Select)
    }

    #[must_use]
    pub fn count() -> Self {
        Self::new(OperationKind::Count)
    }

    #[must_use]
    pub fn insert() -> Self {
        Self::new(OperationKind::Insert)
    }

    #[must_use]
    pub fn update() -> Self {
        Self::new(OperationKind::Update)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(OperationKind::Delete)
    }

    #[must_use]
    pub fn replace() -> Self {
        Self::new(OperationKind::Replace)
    }

    #[must_use]
    pub fn upsert() -> Self {
        Self::new(OperationKind::Upsert)
    }

    #[must_use]
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = Some(TableSource::table(name));
        self
    }

    #[must_use]
    pub fn table_source(mut self, source: TableSource) -> Self {
        self.table = Some(source);
        self
    }

    #[must_use]
    pub fn database(mut self, schema: impl Into<String>) -> Self {
        self.database = Some(schema.into());
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: Vec<Expr>) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn primary_keys(mut self, keys: Vec<String>) -> Self {
        self.primary_keys = keys;
        self
    }

    #[must_use]
    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.insert_columns = columns;
        self
    }

    #[must_use]
    pub fn values(mut self, row: Vec<Expr>) -> Self {
        self.values_rows = vec![row];
        self
    }

    #[must_use]
    pub fn values_append(mut self, row: Vec<Expr>) -> Self {
        self.values_rows.push(row);
        self
    }

    #[must_use]
    pub fn subquery_values(mut self, inner: Self) -> Self {
        self.subquery_values = Some(Box::new(inner));
        self
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.assignments.push(Assignment { column: column.into(), value: value.into() });
        self
    }

    #[must_use]
    pub fn where_clause(mut self, predicate: Where) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    #[must_use]
    pub fn and_where(mut self, predicate: Where) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn or_where(mut self, predicate: Where) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.or(predicate),
            None => predicate,
        });
        self
    }

    fn join_generic(mut self, kind: JoinKind, source: TableSource, on: Option<Where>) -> Self {
        self.joins.push(JoinClause { kind, source, on });
        self
    }

    #[must_use]
    pub fn join(self, source: TableSource, on: Where) -> Self {
        self.join_generic(JoinKind::Inner, source, Some(on))
    }

    #[must_use]
    pub fn left_join(self, source: TableSource, on: Where) -> Self {
        self.join_generic(JoinKind::Left, source, Some(on))
    }

    #[must_use]
    pub fn right_join(self, source: TableSource, on: Where) -> Self {
        self.join_generic(JoinKind::Right, source, Some(on))
    }

    #[must_use]
    pub fn cross_join(self, source: TableSource) -> Self {
        self.join_generic(JoinKind::Cross, source, None)
    }

    #[must_use]
    pub fn group_by(mut self, fields: Vec<Expr>) -> Self {
        self.group_by = fields;
        self
    }

    #[must_use]
    pub fn having(mut self, predicate: Where) -> Self {
        self.having = Some(predicate);
        self
    }

    #[must_use]
    pub fn and_having(mut self, predicate: Where) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn or_having(mut self, predicate: Where) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.or(predicate),
            None => predicate,
        });
        self
    }

    #[must_use]
    pub fn order_by(mut self, expr: Expr) -> Self {
        self.order_by.push(OrderByClause { expr, direction: OrderDirection::Asc });
        self
    }

    #[must_use]
    pub fn order_by_desc(mut self, expr: Expr) -> Self {
        self.order_by.push(OrderByClause { expr, direction: OrderDirection::Desc });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn limit_placeholder(mut self, name: impl Into<String>) -> Self {
        self.limit_placeholder = Some(name.into());
        self
    }

    #[must_use]
    pub fn offset_placeholder(mut self, name: impl Into<String>) -> Self {
        self.offset_placeholder = Some(name.into());
        self
    }

    fn table_name(&self) -> Option<&str> {
        match &self.table {
            Some(TableSource::Table { name, .. }) => Some(name.as_str()),
            _ => None,
        }
    }

    fn check_self_reference(&self, depth: usize) -> Result<(), BuilderError> {
        if depth > MAX_SUBQUERY_DEPTH {
            return Err(BuilderError::SelfReferential);
        }
        Ok(())
    }

    /// Assembles this builder into SQL text against `dialect`.
    pub fn build(&self, dialect: &dyn Dialect) -> Result<BuiltStatement, BuilderError> {
        self.build_at_depth(dialect, 0)
    }

    /// Renders against the default SQLite dialect without a caller-supplied
    /// `Dialect`, for debugging and logging call sites that don't have one
    /// in hand. Not meant for statements that are actually executed.
    pub fn to_sql_unchecked(&self) -> Result<BuiltStatement, BuilderError> {
        self.build(&crate::dialect::SqliteDialect::default())
    }

    fn build_at_depth(&self, dialect: &dyn Dialect, depth: usize) -> Result<BuiltStatement, BuilderError> {
        self.check_self_reference(depth)?;
        let mut idx = 0usize;
        match self.operation {
            OperationKind::Select | OperationKind::Count => self.build_select(dialect, &mut idx),
            OperationKind::Insert => self.build_insert(dialect, &mut idx),
            OperationKind::Update => self.build_update(dialect, &mut idx),
            OperationKind::Delete => self.build_delete(dialect, &mut idx),
            OperationKind::Replace => self.build_replace(dialect, &mut idx),
            OperationKind::Upsert => self.build_upsert(dialect),
        }
    }

    fn qualified_table(&self, dialect: &dyn Dialect) -> Result<String, BuilderError> {
        let source = self.table.as_ref().ok_or(BuilderError::MissingTable { operation: self.operation.label() })?;
        let (sql, _) = source.render(dialect, &mut 0);
        match &self.database {
            Some(schema) if matches!(source, TableSource::Table { .. }) => {
                Ok(format!("{}.{sql}", dialect.escape_table_name(schema)))
            }
            _ => Ok(sql),
        }
    }

    fn build_select(&self, dialect: &dyn Dialect, idx: &mut usize) -> Result<BuiltStatement, BuilderError> {
        if self.operation == OperationKind::Select && self.fields.is_empty() {
            return Err(BuilderError::MissingFields);
        }

        let table_sql = self.qualified_table(dialect)?;
        let mut params = Vec::new();
        let mut sql = String::from("SELECT ");

        if self.operation == OperationKind::Count {
            let distinct_prefix = if self.distinct { "DISTINCT " } else { "" };
            let arg = match self.fields.first() {
                Some(field) => {
                    let (field_sql, field_params) = field.render(dialect, idx);
                    params.extend(field_params);
                    field_sql
                }
                None => "1".to_string(),
            };
            sql.push_str(&format!("COUNT({distinct_prefix}{arg})"));
        } else {
            if self.distinct {
                sql.push_str("DISTINCT ");
            }
            let mut rendered_fields = Vec::with_capacity(self.fields.len());
            for field in &self.fields {
                let (field_sql, field_params) = field.render(dialect, idx);
                rendered_fields.push(field_sql);
                params.extend(field_params);
            }
            sql.push_str(&rendered_fields.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&table_sql);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.as_sql());
            sql.push(' ');
            let (join_sql, join_params) = join.source.render(dialect, idx);
            sql.push_str(&join_sql);
            params.extend(join_params);
            if let Some(on) = &join.on {
                let (on_sql, on_params) = on.render(dialect, idx);
                sql.push_str(" ON ");
                sql.push_str(&on_sql);
                params.extend(on_params);
            }
        }

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.render(dialect, idx);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        if !self.group_by.is_empty() {
            let mut rendered = Vec::with_capacity(self.group_by.len());
            for expr in &self.group_by {
                let (expr_sql, expr_params) = expr.render(dialect, idx);
                rendered.push(expr_sql);
                params.extend(expr_params);
            }
            sql.push_str(" GROUP BY ");
            sql.push_str(&rendered.join(", "));
        }

        if let Some(having) = &self.having {
            let (having_sql, having_params) = having.render(dialect, idx);
            sql.push_str(" HAVING ");
            sql.push_str(&having_sql);
            params.extend(having_params);
        }

        // COUNT mode answers "how many rows", so an ORDER BY or a
        // LIMIT/OFFSET over that single row is meaningless and skipped.
        if self.operation != OperationKind::Count {
            if !self.order_by.is_empty() {
                let mut rendered = Vec::with_capacity(self.order_by.len());
                for clause in &self.order_by {
                    let (expr_sql, expr_params) = clause.expr.render(dialect, idx);
                    let direction = match clause.direction {
                        OrderDirection::Asc => "ASC",
                        OrderDirection::Desc => "DESC",
                    };
                    rendered.push(format!("{expr_sql} {direction}"));
                    params.extend(expr_params);
                }
                sql.push_str(" ORDER BY ");
                sql.push_str(&rendered.join(", "));
            }

            match (&self.limit_placeholder, &self.offset_placeholder) {
                (Some(limit_name), Some(offset_name)) => {
                    *idx += 1;
                    sql.push_str(&format!(" LIMIT {}", dialect.parameter_placeholder(limit_name, *idx)));
                    params.push(BoundParam { name: limit_name.clone(), value: SqlValue::Null });
                    *idx += 1;
                    sql.push_str(&format!(" OFFSET {}", dialect.parameter_placeholder(offset_name, *idx)));
                    params.push(BoundParam { name: offset_name.clone(), value: SqlValue::Null });
                }
                (Some(limit_name), None) => {
                    *idx += 1;
                    sql.push_str(&format!(" LIMIT {}", dialect.parameter_placeholder(limit_name, *idx)));
                    params.push(BoundParam { name: limit_name.clone(), value: SqlValue::Null });
                    if let Some(offset) = self.offset {
                        sql.push_str(&format!(" OFFSET {offset}"));
                    }
                }
                (None, _) => {
                    dialect.build_pagination(&mut sql, self.limit, self.offset);
                }
            }
        }

        Ok(BuiltStatement { sql, params })
    }

    fn build_insert(&self, dialect: &dyn Dialect, idx: &mut usize) -> Result<BuiltStatement, BuilderError> {
        let table_sql = self.qualified_table(dialect)?;

        if let Some(subquery) = &self.subquery_values {
            let inner = subquery.build_at_depth(dialect, 1)?;
            let escaped_cols: Vec<String> = self.insert_columns.iter().map(|c| dialect.escape_column_name(c)).collect();
            let sql = format!("INSERT INTO {table_sql} ({}) {}", escaped_cols.join(", "), inner.sql);
            return Ok(BuiltStatement { sql, params: inner.params });
        }

        if self.values_rows.is_empty() {
            return Err(BuilderError::MissingValues { operation: "INSERT" });
        }

        let mut params = Vec::new();
        let mut row_groups = Vec::with_capacity(self.values_rows.len());
        for (row_index, row) in self.values_rows.iter().enumerate() {
            if !self.insert_columns.is_empty() && row.len() != self.insert_columns.len() {
                return Err(BuilderError::ColumnValueMismatch {
                    row: row_index,
                    columns: self.insert_columns.len(),
                    values: row.len(),
                });
            }
            let mut rendered = Vec::with_capacity(row.len());
            for value in row {
                let (value_sql, value_params) = value.render(dialect, idx);
                rendered.push(value_sql);
                params.extend(value_params);
            }
            row_groups.push(format!("({})", rendered.join(", ")));
        }

        let escaped_cols: Vec<String> = self.insert_columns.iter().map(|c| dialect.escape_column_name(c)).collect();
        let sql = if escaped_cols.is_empty() {
            format!("INSERT INTO {table_sql} VALUES {}", row_groups.join(", "))
        } else {
            format!("INSERT INTO {table_sql} ({}) VALUES {}", escaped_cols.join(", "), row_groups.join(", "))
        };

        Ok(BuiltStatement { sql, params })
    }

    fn build_update(&self, dialect: &dyn Dialect, idx: &mut usize) -> Result<BuiltStatement, BuilderError> {
        let table_sql = self.qualified_table(dialect)?;
        if self.assignments.is_empty() {
            return Err(BuilderError::MissingAssignments);
        }

        let mut params = Vec::new();
        let mut rendered = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            let (value_sql, value_params) = assignment.value.render(dialect, idx);
            rendered.push(format!("{} = {value_sql}", dialect.escape_column_name(&assignment.column)));
            params.extend(value_params);
        }

        let mut sql = format!("UPDATE {table_sql} SET {}", rendered.join(", "));

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.render(dialect, idx);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        Ok(BuiltStatement { sql, params })
    }

    fn build_delete(&self, dialect: &dyn Dialect, idx: &mut usize) -> Result<BuiltStatement, BuilderError> {
        let table_sql = self.qualified_table(dialect)?;
        let mut sql = format!("DELETE FROM {table_sql}");
        let mut params = Vec::new();

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.render(dialect, idx);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        Ok(BuiltStatement { sql, params })
    }

    fn build_replace(&self, dialect: &dyn Dialect, idx: &mut usize) -> Result<BuiltStatement, BuilderError> {
        let table_name = self.table_name().ok_or(BuilderError::MissingTable { operation: "REPLACE" })?;
        if self.insert_columns.is_empty() || self.values_rows.len() != 1 {
            return Err(BuilderError::MissingValues { operation: "REPLACE" });
        }

        // Dialects with a native `REPLACE INTO` (MySQL, SQLite) don't need a
        // declared primary key; the database's own unique constraints pick
        // the row to overwrite. Falling back to upsert emulation does need
        // one, since `ON CONFLICT`/`MERGE` must name a conflict target.
        if let Some(native_sql) = dialect.build_replace_sql(table_name, &self.insert_columns, &self.primary_keys) {
            let row = &self.values_rows[0];
            let mut params = Vec::with_capacity(row.len());
            for value in row {
                let (_, value_params) = value.render(dialect, idx);
                params.extend(value_params);
            }
            return Ok(BuiltStatement { sql: native_sql, params });
        }

        if self.primary_keys.is_empty() {
            return Err(BuilderError::MissingPrimaryKey);
        }
        self.build_upsert(dialect)
    }

    fn build_upsert(&self, dialect: &dyn Dialect) -> Result<BuiltStatement, BuilderError> {
        let table_name = self.table_name().ok_or(BuilderError::MissingTable { operation: "UPSERT" })?;
        if self.primary_keys.is_empty() && dialect.requires_primary_key_for_upsert() {
            return Err(BuilderError::MissingPrimaryKey);
        }
        if self.insert_columns.is_empty() || self.values_rows.len() != 1 {
            return Err(BuilderError::MissingValues { operation: "UPSERT" });
        }

        let columns: Vec<UpsertColumn> = self
            .insert_columns
            .iter()
            .map(|name| UpsertColumn { name: name.clone(), is_conflict_key: self.primary_keys.contains(name) })
            .collect();

        let sql = dialect.build_upsert_sql(table_name, &columns);
        let mut idx = 0;
        let row = &self.values_rows[0];
        let mut row_params = Vec::with_capacity(row.len());
        for value in row {
            let (_, value_params) = value.render(dialect, &mut idx);
            row_params.extend(value_params);
        }

        // `build_upsert_sql` may reference a column's placeholder more than
        // once (PostgreSQL's `ON CONFLICT DO UPDATE` re-binds every column
        // by name in its `SET` clause); `ParamOrder` must repeat the bound
        // value for each textual occurrence, not just once per column.
        let params = dialect
            .upsert_param_names(&columns)
            .into_iter()
            .map(|name| {
                row_params
                    .iter()
                    .find(|p| p.name == name)
                    .cloned()
                    .unwrap_or(BoundParam { name, value: SqlValue::Null })
            })
            .collect();

        Ok(BuiltStatement { sql, params })
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Literal(crate::value::SqlValue::Text(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Literal(crate::value::SqlValue::Text(value.to_string()))
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Literal(crate::value::SqlValue::Int(value))
    }
}

impl From<crate::value::SqlValue> for Expr {
    fn from(value: crate::value::SqlValue) -> Self {
        Self::Literal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::oracle::OracleDialect;
    use crate::dialect::sqlite::SqliteDialect;
    use crate::value::SqlValue;

    #[test]
    fn select_without_fields_errors() {
        let dialect = SqliteDialect::default();
        let err = Builder::select().table("users").build(&dialect).unwrap_err();
        assert_eq!(err, BuilderError::MissingFields);
    }

    #[test]
    fn select_renders_where_and_order_and_limit() {
        let dialect = SqliteDialect::default();
        let built = Builder::select()
            .table("users")
            .fields(vec![Expr::field("id"), Expr::field("email")])
            .where_clause(Where::leaf(Expr::field("active").eq(Expr::literal(SqlValue::Bool(true)))))
            .order_by_desc(Expr::field("created_at"))
            .limit(10)
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "SELECT id, email FROM users WHERE active = 1 ORDER BY created_at DESC LIMIT 10");
        assert!(built.params.is_empty());
    }

    #[test]
    fn select_with_parameter_contributes_to_param_order() {
        let dialect = SqliteDialect::default();
        let built = Builder::select()
            .table("users")
            .fields(vec![Expr::field("id")])
            .where_clause(Where::leaf(Expr::field("status").eq(Expr::param("status"))))
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "SELECT id FROM users WHERE status = :status");
        assert_eq!(built.params.len(), 1);
        assert_eq!(built.params[0].name, "status");
    }

    #[test]
    fn count_with_no_fields_counts_rows() {
        let dialect = SqliteDialect::default();
        let built = Builder::count().table("users").build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT COUNT(1) FROM users");
    }

    #[test]
    fn count_with_a_field_counts_that_field() {
        let dialect = SqliteDialect::default();
        let built = Builder::count().table("users").fields(vec![Expr::field("id")]).build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT COUNT(id) FROM users");
    }

    #[test]
    fn count_distinct_wraps_the_field_not_the_select() {
        let dialect = SqliteDialect::default();
        let built =
            Builder::count().table("users").fields(vec![Expr::field("email")]).distinct().build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT COUNT(DISTINCT email) FROM users");
    }

    #[test]
    fn count_ignores_order_by_and_pagination() {
        let dialect = SqliteDialect::default();
        let built = Builder::count()
            .table("users")
            .order_by_desc(Expr::field("id"))
            .limit(10)
            .offset(5)
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "SELECT COUNT(1) FROM users");
    }

    #[test]
    fn insert_multi_row() {
        let dialect = SqliteDialect::default();
        let built = Builder::insert()
            .table("users")
            .columns(vec!["id".into(), "email".into()])
            .values(vec![Expr::literal(1_i64), Expr::literal("a@example.com")])
            .values_append(vec![Expr::literal(2_i64), Expr::literal("b@example.com")])
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "INSERT INTO users (id, email) VALUES (1, 'a@example.com'), (2, 'b@example.com')");
        assert!(built.params.is_empty());
    }

    #[test]
    fn insert_with_named_parameters() {
        let dialect = OracleDialect::default();
        let built = Builder::insert()
            .table("LOGS")
            .columns(vec!["ID".into(), "MSG".into()])
            .values(vec![Expr::param("ID"), Expr::param("MSG")])
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "INSERT INTO LOGS (ID, MSG) VALUES (:ID, :MSG)");
        assert_eq!(built.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["ID", "MSG"]);
    }

    #[test]
    fn insert_column_value_mismatch_errors() {
        let dialect = SqliteDialect::default();
        let err = Builder::insert()
            .table("users")
            .columns(vec!["id".into(), "email".into()])
            .values(vec![Expr::literal(1_i64)])
            .build(&dialect)
            .unwrap_err();
        assert_eq!(err, BuilderError::ColumnValueMismatch { row: 0, columns: 2, values: 1 });
    }

    #[test]
    fn update_requires_assignments() {
        let dialect = SqliteDialect::default();
        let err = Builder::update().table("users").build(&dialect).unwrap_err();
        assert_eq!(err, BuilderError::MissingAssignments);
    }

    #[test]
    fn update_renders_set_and_where() {
        let dialect = SqliteDialect::default();
        let built = Builder::update()
            .table("users")
            .set("email", "new@example.com")
            .where_clause(Where::leaf(Expr::field("id").eq(Expr::literal(1_i64))))
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "UPDATE users SET email = 'new@example.com' WHERE id = 1");
    }

    #[test]
    fn delete_without_where_has_no_clause() {
        let dialect = SqliteDialect::default();
        let built = Builder::delete().table("users").build(&dialect).unwrap();
        assert_eq!(built.sql, "DELETE FROM users");
    }

    #[test]
    fn upsert_requires_primary_key() {
        let dialect = SqliteDialect::default();
        let err = Builder::upsert()
            .table("users")
            .columns(vec!["id".into(), "email".into()])
            .values(vec![Expr::literal(1_i64), Expr::literal("a@example.com")])
            .build(&dialect)
            .unwrap_err();
        assert_eq!(err, BuilderError::MissingPrimaryKey);
    }

    #[test]
    fn upsert_renders_conflict_clause() {
        let dialect = SqliteDialect::default();
        let built = Builder::upsert()
            .table("users")
            .primary_keys(vec!["id".into()])
            .columns(vec!["id".into(), "email".into()])
            .values(vec![Expr::param("id"), Expr::param("email")])
            .build(&dialect)
            .unwrap();
        assert!(built.sql.contains("ON CONFLICT (id) DO UPDATE SET email = excluded.email"));
    }

    #[test]
    fn upsert_on_postgres_rebinds_every_column() {
        let dialect = crate::dialect::postgres::PostgresDialect::default();
        let built = Builder::upsert()
            .table("t")
            .primary_keys(vec!["id".into()])
            .columns(vec!["id".into(), "name".into(), "age".into()])
            .values(vec![Expr::param("id"), Expr::param("name"), Expr::param("age")])
            .build(&dialect)
            .unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO t (id, name, age) VALUES (:id, :name, :age) ON CONFLICT (id) DO UPDATE SET id = :id, name = :name, age = :age"
        );
        let param_order: Vec<&str> = built.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(param_order, vec!["id", "name", "age", "id", "name", "age"]);
    }

    #[test]
    fn replace_on_postgres_emits_do_nothing_on_conflict() {
        let dialect = crate::dialect::postgres::PostgresDialect::default();
        let built = Builder::replace()
            .table("t")
            .primary_keys(vec!["id".into()])
            .columns(vec!["id".into(), "name".into()])
            .values(vec![Expr::param("id"), Expr::param("name")])
            .build(&dialect)
            .unwrap();
        assert_eq!(built.sql, "INSERT INTO t (id, name) VALUES (:id, :name) ON CONFLICT (id) DO NOTHING");
    }

    #[test]
    fn replace_on_postgres_without_primary_key_errors() {
        let dialect = crate::dialect::postgres::PostgresDialect::default();
        let err = Builder::replace()
            .table("t")
            .columns(vec!["id".into(), "name".into()])
            .values(vec![Expr::param("id"), Expr::param("name")])
            .build(&dialect)
            .unwrap_err();
        assert_eq!(err, BuilderError::MissingPrimaryKey);
    }

    #[test]
    fn mysql_upsert_does_not_require_primary_key() {
        let dialect = crate::dialect::mysql::MySqlDialect::default();
        let built = Builder::upsert()
            .table("users")
            .columns(vec!["id".into(), "email".into()])
            .values(vec![Expr::param("id"), Expr::param("email")])
            .build(&dialect)
            .unwrap();
        assert!(built.sql.contains("ON DUPLICATE KEY UPDATE"));
    }
}
