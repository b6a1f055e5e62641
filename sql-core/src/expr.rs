//! Expression model (C2).
//!
//! `Expr` is a tagged sum type covering every expression shape the builder
//! and parser need to share: bound parameters, literals, column references,
//! arithmetic/comparison, function calls, `CASE`, and subqueries. Rendering
//! is dialect-aware and returns the contributed bind parameters alongside
//! the SQL text so the caller can splice them into the statement's overall
//! parameter order.

use crate::dialect::Dialect;
use crate::value::SqlValue;

/// A bound parameter contributed while rendering an expression.
///
/// Builder-level parameters are always named; the parser assigns synthetic
/// names (`p0`, `p1`, ...) to positional `?` placeholders it encounters so
/// both forms flow through the same rendering path.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: String,
    pub value: SqlValue,
}

/// Binary arithmetic/comparison/logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
    NotLike,
}

impl BinaryOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        }
    }

    /// Lower number binds looser; mirrors the C-family precedence table
    /// used to decide when a child needs parentheses.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 3,
            Self::Like | Self::NotLike => 4,
            Self::Concat => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
        }
    }
}

/// A `WHEN cond THEN result` arm of a `CASE` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expr,
    pub result: Expr,
}

/// Expression tree shared by the builder and the text parser (C2).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value, spliced into the emitted SQL text inline.
    Literal(SqlValue),
    /// A column reference, optionally table-qualified.
    Field { table: Option<String>, name: String },
    /// `expr AS alias`.
    Alias { expr: Box<Expr>, alias: String },
    /// A named bind parameter placeholder (`:name`).
    Parameter(String),
    /// `left op right`.
    Binary { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    /// Logical negation: `NOT expr`.
    Not(Box<Expr>),
    /// `expr IS [NOT] NULL`.
    IsNull { expr: Box<Expr>, negated: bool },
    /// `expr [NOT] IN (list)`.
    In { expr: Box<Expr>, list: Vec<Expr>, negated: bool },
    /// `expr [NOT] BETWEEN low AND high`.
    Between { expr: Box<Expr>, low: Box<Expr>, high: Box<Expr>, negated: bool },
    /// `name(args)`, optionally `DISTINCT`-qualified.
    Func { name: String, args: Vec<Expr>, distinct: bool },
    /// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`.
    Case { operand: Option<Box<Expr>>, when_clauses: Vec<WhenClause>, else_clause: Option<Box<Expr>> },
    /// A parenthesized subquery, rendered from its own builder tree.
    Subquery(Box<crate::builder::Builder>),
    /// An already-parenthesized expression; preserved so round-tripped SQL
    /// keeps explicit grouping the author wrote.
    Paren(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { table: None, name: name.into() }
    }

    #[must_use]
    pub fn qualified_field(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Field { table: Some(table.into()), name: name.into() }
    }

    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self::Alias { expr: Box::new(self), alias: alias.into() }
    }

    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    #[must_use]
    pub fn literal(value: impl Into<SqlValue>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn binary(self, op: BinaryOp, rhs: Self) -> Self {
        Self::Binary { left: Box::new(self), op, right: Box::new(rhs) }
    }

    #[must_use]
    pub fn eq(self, rhs: Self) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    #[must_use]
    pub fn is_null(self) -> Self {
        Self::IsNull { expr: Box::new(self), negated: false }
    }

    #[must_use]
    pub fn is_not_null(self) -> Self {
        Self::IsNull { expr: Box::new(self), negated: true }
    }

    #[must_use]
    pub fn in_list(self, list: Vec<Self>) -> Self {
        Self::In { expr: Box::new(self), list, negated: false }
    }

    #[must_use]
    pub fn not_in_list(self, list: Vec<Self>) -> Self {
        Self::In { expr: Box::new(self), list, negated: true }
    }

    #[must_use]
    pub fn between(self, low: Self, high: Self) -> Self {
        Self::Between { expr: Box::new(self), low: Box::new(low), high: Box::new(high), negated: false }
    }

    #[must_use]
    pub fn not_between(self, low: Self, high: Self) -> Self {
        Self::Between { expr: Box::new(self), low: Box::new(low), high: Box::new(high), negated: true }
    }

    fn own_precedence(&self) -> Option<u8> {
        match self {
            Self::Binary { op, .. } => Some(op.precedence()),
            _ => None,
        }
    }

    /// Renders this expression to SQL text against `dialect`, returning the
    /// bound parameters contributed in left-to-right order. Only
    /// `Expr::Parameter` leaves contribute; literals splice their value
    /// inline and contribute nothing to `next_param_index`.
    pub fn render(&self, dialect: &dyn Dialect, next_param_index: &mut usize) -> (String, Vec<BoundParam>) {
        match self {
            Self::Literal(value) => (value.to_sql_inline(), Vec::new()),
            Self::Field { table, name } => {
                let rendered_name = dialect.escape_column_name(name);
                match table {
                    Some(t) => (format!("{}.{}", dialect.escape_table_name(t), rendered_name), Vec::new()),
                    None => (rendered_name, Vec::new()),
                }
            }
            Self::Alias { expr, alias } => {
                let (sql, params) = expr.render(dialect, next_param_index);
                (format!("{sql} AS {alias}"), params)
            }
            Self::Parameter(name) => {
                *next_param_index += 1;
                let placeholder = dialect.parameter_placeholder(name, *next_param_index);
                (placeholder, vec![BoundParam { name: name.clone(), value: SqlValue::Null }])
            }
            Self::Binary { left, op, right } => {
                let (mut left_sql, mut params) = left.render(dialect, next_param_index);
                if left.own_precedence().is_some_and(|p| p < op.precedence()) {
                    left_sql = format!("({left_sql})");
                }
                let (mut right_sql, right_params) = right.render(dialect, next_param_index);
                let right_needs_parens = right.own_precedence().is_some_and(|p| {
                    p < op.precedence()
                        || (p == op.precedence() && matches!(op, BinaryOp::Sub | BinaryOp::Div))
                });
                if right_needs_parens {
                    right_sql = format!("({right_sql})");
                }
                params.extend(right_params);
                (format!("{left_sql} {} {right_sql}", op.as_sql()), params)
            }
            Self::Not(inner) => {
                let (sql, params) = inner.render(dialect, next_param_index);
                (format!("NOT {sql}"), params)
            }
            Self::IsNull { expr, negated } => {
                let (sql, params) = expr.render(dialect, next_param_index);
                let suffix = if *negated { "IS NOT NULL" } else { "IS NULL" };
                (format!("{sql} {suffix}"), params)
            }
            Self::In { expr, list, negated } => {
                let (expr_sql, mut params) = expr.render(dialect, next_param_index);
                let mut items = Vec::with_capacity(list.len());
                for item in list {
                    let (item_sql, item_params) = item.render(dialect, next_param_index);
                    items.push(item_sql);
                    params.extend(item_params);
                }
                let keyword = if *negated { "NOT IN" } else { "IN" };
                (format!("{expr_sql} {keyword} ({})", items.join(", ")), params)
            }
            Self::Between { expr, low, high, negated } => {
                let (expr_sql, mut params) = expr.render(dialect, next_param_index);
                let (low_sql, low_params) = low.render(dialect, next_param_index);
                let (high_sql, high_params) = high.render(dialect, next_param_index);
                params.extend(low_params);
                params.extend(high_params);
                let keyword = if *negated { "NOT BETWEEN" } else { "BETWEEN" };
                (format!("{expr_sql} {keyword} {low_sql} AND {high_sql}"), params)
            }
            Self::Func { name, args, distinct } => {
                let mut params = Vec::new();
                let mut rendered_args = Vec::with_capacity(args.len());
                for arg in args {
                    let (arg_sql, arg_params) = arg.render(dialect, next_param_index);
                    rendered_args.push(arg_sql);
                    params.extend(arg_params);
                }
                let distinct_prefix = if *distinct { "DISTINCT " } else { "" };
                (format!("{name}({distinct_prefix}{})", rendered_args.join(", ")), params)
            }
            Self::Case { operand, when_clauses, else_clause } => {
                let mut params = Vec::new();
                let mut sql = String::from("CASE");
                if let Some(operand) = operand {
                    let (operand_sql, operand_params) = operand.render(dialect, next_param_index);
                    sql.push(' ');
                    sql.push_str(&operand_sql);
                    params.extend(operand_params);
                }
                for when in when_clauses {
                    let (cond_sql, cond_params) = when.condition.render(dialect, next_param_index);
                    let (result_sql, result_params) = when.result.render(dialect, next_param_index);
                    sql.push_str(&format!(" WHEN {cond_sql} THEN {result_sql}"));
                    params.extend(cond_params);
                    params.extend(result_params);
                }
                if let Some(else_clause) = else_clause {
                    let (else_sql, else_params) = else_clause.render(dialect, next_param_index);
                    sql.push_str(&format!(" ELSE {else_sql}"));
                    params.extend(else_params);
                }
                sql.push_str(" END");
                (sql, params)
            }
            Self::Subquery(builder) => {
                let rendered = builder.build(dialect).unwrap_or_default();
                (format!("({})", rendered.sql), rendered.params)
            }
            Self::Paren(inner) => {
                let (sql, params) = inner.render(dialect, next_param_index);
                (format!("({sql})"), params)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::SqliteDialect;

    #[test]
    fn binary_nesting_adds_parens_only_when_needed() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let expr = Expr::field("a")
            .binary(BinaryOp::Add, Expr::field("b"))
            .binary(BinaryOp::Mul, Expr::field("c"));
        let (sql, _) = expr.render(&dialect, &mut idx);
        assert_eq!(sql, "(a + b) * c");
    }

    #[test]
    fn subtraction_parenthesizes_a_same_precedence_right_child() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let expr = Expr::field("a").binary(BinaryOp::Sub, Expr::field("b").binary(BinaryOp::Sub, Expr::field("c")));
        let (sql, _) = expr.render(&dialect, &mut idx);
        assert_eq!(sql, "a - (b - c)");
    }

    #[test]
    fn division_parenthesizes_a_same_precedence_right_child() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let expr = Expr::field("a").binary(BinaryOp::Div, Expr::field("b").binary(BinaryOp::Div, Expr::field("c")));
        let (sql, _) = expr.render(&dialect, &mut idx);
        assert_eq!(sql, "a / (b / c)");
    }

    #[test]
    fn addition_does_not_parenthesize_a_same_precedence_right_child() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let expr = Expr::field("a").binary(BinaryOp::Add, Expr::field("b").binary(BinaryOp::Add, Expr::field("c")));
        let (sql, _) = expr.render(&dialect, &mut idx);
        assert_eq!(sql, "a + b + c");
    }

    #[test]
    fn in_list_renders_literals_inline() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let expr = Expr::field("id").in_list(vec![Expr::literal(1_i64), Expr::literal(2_i64)]);
        let (sql, params) = expr.render(&dialect, &mut idx);
        assert_eq!(sql, "id IN (1, 2)");
        assert!(params.is_empty());
    }

    #[test]
    fn parameter_renders_as_named_bind_token_and_contributes_to_param_order() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let (sql, params) = Expr::param("status").render(&dialect, &mut idx);
        assert_eq!(sql, ":status");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "status");
    }

    #[test]
    fn is_null_negated() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let (sql, _) = Expr::field("deleted_at").is_not_null().render(&dialect, &mut idx);
        assert_eq!(sql, "deleted_at IS NOT NULL");
    }

    #[test]
    fn alias_renders_with_as_keyword() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let (sql, _) = Expr::qualified_field("a", "id").alias("A").render(&dialect, &mut idx);
        assert_eq!(sql, "a.id AS A");
    }
}
