//! Where/predicate model (C3).
//!
//! `Where` composes `Expr` leaves into AND/OR trees. Combinators flatten
//! nested groups of the same kind, collapse empty groups to nothing, and
//! unwrap singleton groups, so a builder that calls `WhereAnd` in a loop
//! over zero, one, or many conditions never needs special-case handling at
//! the call site.

use crate::dialect::Dialect;
use crate::expr::{BoundParam, Expr};

/// A predicate tree used in `WHERE`/`HAVING`/`ON` clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    Leaf(Expr),
    And(Vec<Where>),
    Or(Vec<Where>),
    /// `[NOT] EXISTS (subquery)`; `subquery` is typically `Expr::Subquery`.
    Exists { subquery: Box<Expr>, negated: bool },
    /// A predicate that cannot be re-encoded structurally; spliced into the
    /// `WHERE`/`HAVING`/`ON` clause verbatim, contributing no parameters.
    Raw(String),
}

impl Where {
    #[must_use]
    pub const fn leaf(expr: Expr) -> Self {
        Self::Leaf(expr)
    }

    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    #[must_use]
    pub fn exists(subquery: Expr) -> Self {
        Self::Exists { subquery: Box::new(subquery), negated: false }
    }

    #[must_use]
    pub fn not_exists(subquery: Expr) -> Self {
        Self::Exists { subquery: Box::new(subquery), negated: true }
    }

    /// Combines `self` and `other` with AND, flattening nested `And` groups
    /// and dropping empty operands rather than producing a degenerate
    /// `AND` with one real side.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::combine(self, other, true)
    }

    /// Combines `self` and `other` with OR, with the same flattening and
    /// empty-operand handling as `and`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::combine(self, other, false)
    }

    fn combine(left: Self, right: Self, is_and: bool) -> Self {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() {
            return left;
        }

        let mut items = Vec::new();
        match (is_and, left) {
            (true, Self::And(inner)) => items.extend(inner),
            (false, Self::Or(inner)) => items.extend(inner),
            (_, other) => items.push(other),
        }
        match (is_and, right) {
            (true, Self::And(inner)) => items.extend(inner),
            (false, Self::Or(inner)) => items.extend(inner),
            (_, other) => items.push(other),
        }

        if is_and {
            Self::And(items)
        } else {
            Self::Or(items)
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::And(items) | Self::Or(items) if items.is_empty())
    }

    /// Renders this predicate tree against `dialect`, accumulating bound
    /// parameters in left-to-right order. A nested group of the opposite
    /// kind (an `Or` inside an `And`, or vice versa) is parenthesized; a
    /// single-element group is unwrapped with no parentheses.
    pub fn render(&self, dialect: &dyn Dialect, next_param_index: &mut usize) -> (String, Vec<BoundParam>) {
        match self {
            Self::Leaf(expr) => expr.render(dialect, next_param_index),
            Self::And(items) => Self::render_group(items, " AND ", dialect, next_param_index),
            Self::Or(items) => Self::render_group(items, " OR ", dialect, next_param_index),
            Self::Exists { subquery, negated } => {
                let (sql, params) = subquery.render(dialect, next_param_index);
                let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
                (format!("{keyword} {sql}"), params)
            }
            Self::Raw(text) => (text.clone(), Vec::new()),
        }
    }

    fn render_group(
        items: &[Self],
        joiner: &str,
        dialect: &dyn Dialect,
        next_param_index: &mut usize,
    ) -> (String, Vec<BoundParam>) {
        if items.len() == 1 {
            return items[0].render(dialect, next_param_index);
        }

        let is_and = joiner.trim() == "AND";
        let mut params = Vec::new();
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let (mut sql, item_params) = item.render(dialect, next_param_index);
            let needs_parens = match item {
                Self::And(inner) => !is_and && inner.len() > 1,
                Self::Or(inner) => is_and && inner.len() > 1,
                Self::Leaf(_) | Self::Exists { .. } | Self::Raw(_) => false,
            };
            if needs_parens {
                sql = format!("({sql})");
            }
            rendered.push(sql);
            params.extend(item_params);
        }
        (rendered.join(joiner), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::SqliteDialect;
    use crate::value::SqlValue;

    fn eq(col: &str, v: i64) -> Where {
        Where::leaf(Expr::field(col).eq(Expr::literal(SqlValue::Int(v))))
    }

    #[test]
    fn empty_and_returns_other_operand() {
        let combined = Where::And(vec![]).and(eq("a", 1));
        assert_eq!(combined, eq("a", 1));
    }

    #[test]
    fn nested_and_flattens() {
        let combined = eq("a", 1).and(eq("b", 2)).and(eq("c", 3));
        assert_eq!(combined, Where::And(vec![eq("a", 1), eq("b", 2), eq("c", 3)]));
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let inner = eq("a", 1).or(eq("b", 2));
        let combined = inner.and(eq("c", 3));
        let (sql, _) = combined.render(&dialect, &mut idx);
        assert_eq!(sql, "(a = 1 OR b = 2) AND c = 3");
    }

    #[test]
    fn singleton_group_has_no_parens() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let single = Where::And(vec![eq("a", 1)]);
        let (sql, _) = single.render(&dialect, &mut idx);
        assert_eq!(sql, "a = 1");
    }

    #[test]
    fn raw_predicate_passes_through_verbatim() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let (sql, params) = Where::raw("EXTRACT(YEAR FROM created_at) = 2024").render(&dialect, &mut idx);
        assert_eq!(sql, "EXTRACT(YEAR FROM created_at) = 2024");
        assert!(params.is_empty());
    }

    #[test]
    fn exists_wraps_subquery_expression() {
        let dialect = SqliteDialect::default();
        let mut idx = 0;
        let inner = crate::builder::Builder::select().table("orders").fields(vec![Expr::literal(1_i64)]);
        let (sql, _) = Where::exists(Expr::Subquery(Box::new(inner))).render(&dialect, &mut idx);
        assert_eq!(sql, "EXISTS (SELECT 1 FROM orders)");
    }
}
