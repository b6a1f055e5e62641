//! SQL text → `Builder` parser (C7).
//!
//! Recognizes the same MySQL-flavored DML subset the lexer's keyword table
//! covers: `SELECT`, `INSERT`, `UPDATE`, `DELETE`, with `WHERE`, `ORDER BY`,
//! `GROUP BY`, `HAVING`, `LIMIT`/`OFFSET`, and joins. DDL, set operations,
//! window functions, and CTEs are out of scope, matching the builder's own
//! emission coverage — there is no point parsing a shape the builder
//! cannot render back out.

use crate::builder::Builder;
use crate::error::ParseError;
use crate::expr::Expr;
use crate::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::predicate::Where;
use crate::table_source::TableSource;

use super::pratt::ExprParser;

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    const fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek() == &TokenKind::Keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{keyword:?}"),
                found: format!("{:?}", self.peek()),
                position: self.pos,
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.advance() {
            TokenKind::Identifier(name) => Ok(name),
            other => {
                Err(ParseError::UnexpectedToken { expected: "identifier".to_string(), found: format!("{other:?}"), position: self.pos })
            }
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut parser = ExprParser::new(&self.tokens[self.pos..]);
        let expr = parser.parse_expr()?;
        self.pos += parser.position();
        Ok(expr)
    }

    /// Parses an expression at the precedence floor used for `WHERE`/`ON`
    /// predicate operands (`AND`/`OR` connect whole predicates, not
    /// sub-expressions, so each operand parses up to but not including
    /// that level here; the predicate connectives are handled by
    /// `parse_predicate`).
    fn parse_predicate(&mut self) -> Result<Where, ParseError> {
        let mut left = Where::leaf(self.parse_expr()?);
        loop {
            if self.eat_keyword(Keyword::And) {
                left = left.and(Where::leaf(self.parse_expr()?));
            } else if self.eat_keyword(Keyword::Or) {
                left = left.or(Where::leaf(self.parse_expr()?));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof | TokenKind::Semicolon)
    }

    /// Consumes a trailing `[AS] alias` after a select-list expression or a
    /// table reference, if one is present.
    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat_keyword(Keyword::As) {
            return Ok(Some(self.expect_identifier()?));
        }
        if let TokenKind::Identifier(_) = self.peek() {
            return Ok(Some(self.expect_identifier()?));
        }
        Ok(None)
    }
}

/// Parses a single SQL statement into a `Builder` tree.
pub fn parse_statement(sql: &str) -> Result<Builder, ParseError> {
    let tokens = Lexer::new(sql).tokenize();
    let mut cursor = Cursor::new(&tokens);

    match cursor.peek().clone() {
        TokenKind::Keyword(Keyword::Select) => parse_select(&mut cursor),
        TokenKind::Keyword(Keyword::Insert) => parse_insert(&mut cursor),
        TokenKind::Keyword(Keyword::Replace) => parse_replace(&mut cursor),
        TokenKind::Keyword(Keyword::Update) => parse_update(&mut cursor),
        TokenKind::Keyword(Keyword::Delete) => parse_delete(&mut cursor),
        other => Err(ParseError::UnsupportedStatement { keyword: format!("{other:?}") }),
    }
}

fn parse_select(cursor: &mut Cursor) -> Result<Builder, ParseError> {
    cursor.expect_keyword(Keyword::Select)?;
    let distinct = cursor.eat_keyword(Keyword::Distinct);

    let mut fields = Vec::new();
    if cursor.peek() == &TokenKind::Star {
        cursor.advance();
        fields.push(Expr::Field { table: None, name: "*".to_string() });
    } else {
        loop {
            let mut field = cursor.parse_expr()?;
            if let Some(alias) = cursor.parse_optional_alias()? {
                field = field.alias(alias);
            }
            fields.push(field);
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
    }

    cursor.expect_keyword(Keyword::From)?;
    let table_name = cursor.expect_identifier()?;
    let table_alias = cursor.parse_optional_alias()?;
    let table_source = match table_alias {
        Some(alias) => TableSource::table_with_alias(table_name, alias),
        None => TableSource::table(table_name),
    };
    let mut builder = Builder::select().table_source(table_source).fields(fields);
    if distinct {
        builder = builder.distinct();
    }

    loop {
        let keyword = match cursor.peek() {
            TokenKind::Keyword(k @ (Keyword::Join | Keyword::Inner | Keyword::Left | Keyword::Right)) => *k,
            _ => break,
        };
        cursor.advance();
        if keyword != Keyword::Join {
            cursor.eat_keyword(Keyword::Outer);
            cursor.expect_keyword(Keyword::Join)?;
        }
        let join_table_name = cursor.expect_identifier()?;
        let join_alias = cursor.parse_optional_alias()?;
        let join_source = match join_alias {
            Some(alias) => TableSource::table_with_alias(join_table_name, alias),
            None => TableSource::table(join_table_name),
        };
        cursor.expect_keyword(Keyword::On)?;
        let on = cursor.parse_predicate()?;
        builder = match keyword {
            Keyword::Left => builder.left_join(join_source, on),
            Keyword::Right => builder.right_join(join_source, on),
            _ => builder.join(join_source, on),
        };
    }

    if cursor.eat_keyword(Keyword::Where) {
        builder = builder.where_clause(cursor.parse_predicate()?);
    }

    if cursor.eat_keyword(Keyword::Group) {
        cursor.expect_keyword(Keyword::By)?;
        let mut group_fields = Vec::new();
        loop {
            group_fields.push(cursor.parse_expr()?);
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
        builder = builder.group_by(group_fields);
    }

    if cursor.eat_keyword(Keyword::Having) {
        builder = builder.having(cursor.parse_predicate()?);
    }

    if cursor.eat_keyword(Keyword::Order) {
        cursor.expect_keyword(Keyword::By)?;
        loop {
            let expr = cursor.parse_expr()?;
            if cursor.eat_keyword(Keyword::Desc) {
                builder = builder.order_by_desc(expr);
            } else {
                cursor.eat_keyword(Keyword::Asc);
                builder = builder.order_by(expr);
            }
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
    }

    if cursor.eat_keyword(Keyword::Limit) {
        builder = match cursor.advance() {
            TokenKind::Integer(n) => builder.limit(n),
            TokenKind::NamedParam(name) => builder.limit_placeholder(name),
            other => {
                return Err(ParseError::UnexpectedToken {
                    expected: "integer or named parameter".to_string(),
                    found: format!("{other:?}"),
                    position: cursor.pos,
                });
            }
        };
        if cursor.eat_keyword(Keyword::Offset) {
            builder = match cursor.advance() {
                TokenKind::Integer(n) => builder.offset(n),
                TokenKind::NamedParam(name) => builder.offset_placeholder(name),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "integer or named parameter".to_string(),
                        found: format!("{other:?}"),
                        position: cursor.pos,
                    });
                }
            };
        }
    }

    if !cursor.at_statement_end() {
        return Err(ParseError::UnexpectedToken {
            expected: "end of statement".to_string(),
            found: format!("{:?}", cursor.peek()),
            position: cursor.pos,
        });
    }

    Ok(builder)
}

/// Parses `table_name (cols)? VALUES (...), (...)`, common to both `INSERT`
/// and `REPLACE`, returning the table name, column list, and value rows.
fn parse_insert_body(cursor: &mut Cursor) -> Result<(String, Vec<String>, Vec<Vec<Expr>>), ParseError> {
    let table_name = cursor.expect_identifier()?;

    let mut columns = Vec::new();
    if cursor.peek() == &TokenKind::LeftParen {
        cursor.advance();
        loop {
            columns.push(cursor.expect_identifier()?);
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
        if cursor.peek() == &TokenKind::RightParen {
            cursor.advance();
        } else {
            return Err(ParseError::UnexpectedToken {
                expected: ")".to_string(),
                found: format!("{:?}", cursor.peek()),
                position: cursor.pos,
            });
        }
    }

    cursor.expect_keyword(Keyword::Values)?;
    let mut rows = Vec::new();

    loop {
        if cursor.peek() == &TokenKind::LeftParen {
            cursor.advance();
        } else {
            return Err(ParseError::UnexpectedToken {
                expected: "(".to_string(),
                found: format!("{:?}", cursor.peek()),
                position: cursor.pos,
            });
        }
        let mut row = Vec::new();
        loop {
            row.push(cursor.parse_expr()?);
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
        if cursor.peek() == &TokenKind::RightParen {
            cursor.advance();
        } else {
            return Err(ParseError::UnexpectedToken {
                expected: ")".to_string(),
                found: format!("{:?}", cursor.peek()),
                position: cursor.pos,
            });
        }

        rows.push(row);

        if cursor.peek() == &TokenKind::Comma {
            cursor.advance();
        } else {
            break;
        }
    }

    Ok((table_name, columns, rows))
}

fn push_rows(mut builder: Builder, rows: Vec<Vec<Expr>>) -> Builder {
    let mut first_row = true;
    for row in rows {
        builder = if first_row { builder.values(row) } else { builder.values_append(row) };
        first_row = false;
    }
    builder
}

/// `INSERT INTO ... VALUES ...`, optionally followed by
/// `ON DUPLICATE KEY UPDATE col = VALUES(col), ...`, which flips the
/// statement kind to UPSERT.
fn parse_insert(cursor: &mut Cursor) -> Result<Builder, ParseError> {
    cursor.expect_keyword(Keyword::Insert)?;
    cursor.expect_keyword(Keyword::Into)?;
    let (table_name, columns, rows) = parse_insert_body(cursor)?;

    if cursor.eat_keyword(Keyword::On) {
        cursor.expect_keyword(Keyword::Duplicate)?;
        cursor.expect_keyword(Keyword::Key)?;
        cursor.expect_keyword(Keyword::Update)?;
        let mut updated_columns = Vec::new();
        loop {
            updated_columns.push(cursor.expect_identifier()?);
            cursor.advance(); // '='
            cursor.parse_expr()?;
            if cursor.peek() == &TokenKind::Comma {
                cursor.advance();
            } else {
                break;
            }
        }
        // Columns named in the SET list are the ones the source SQL chose
        // to update on conflict; everything else is conflict-key material,
        // matching how `build_upsert` derives `is_conflict_key` from
        // `primary_keys` membership.
        let conflict_keys: Vec<String> = columns.iter().filter(|c| !updated_columns.contains(c)).cloned().collect();
        let builder = Builder::upsert().table(table_name).primary_keys(conflict_keys).columns(columns);
        return Ok(push_rows(builder, rows));
    }

    let builder = Builder::insert().table(table_name).columns(columns);
    Ok(push_rows(builder, rows))
}

/// `REPLACE INTO ... VALUES ...`.
fn parse_replace(cursor: &mut Cursor) -> Result<Builder, ParseError> {
    cursor.expect_keyword(Keyword::Replace)?;
    cursor.expect_keyword(Keyword::Into)?;
    let (table_name, columns, rows) = parse_insert_body(cursor)?;
    let builder = Builder::replace().table(table_name).columns(columns);
    Ok(push_rows(builder, rows))
}

fn parse_update(cursor: &mut Cursor) -> Result<Builder, ParseError> {
    cursor.expect_keyword(Keyword::Update)?;
    let table_name = cursor.expect_identifier()?;
    cursor.expect_keyword(Keyword::Set)?;

    let mut builder = Builder::update().table(table_name);
    loop {
        let column = cursor.expect_identifier()?;
        if cursor.peek() != &TokenKind::Eq {
            return Err(ParseError::UnexpectedToken { expected: "=".to_string(), found: format!("{:?}", cursor.peek()), position: cursor.pos });
        }
        cursor.advance();
        let value = cursor.parse_expr()?;
        builder = builder.set(column, value);
        if cursor.peek() == &TokenKind::Comma {
            cursor.advance();
        } else {
            break;
        }
    }

    if cursor.eat_keyword(Keyword::Where) {
        builder = builder.where_clause(cursor.parse_predicate()?);
    }

    Ok(builder)
}

fn parse_delete(cursor: &mut Cursor) -> Result<Builder, ParseError> {
    cursor.expect_keyword(Keyword::Delete)?;
    cursor.expect_keyword(Keyword::From)?;
    let table_name = cursor.expect_identifier()?;
    let mut builder = Builder::delete().table(table_name);

    if cursor.eat_keyword(Keyword::Where) {
        builder = builder.where_clause(cursor.parse_predicate()?);
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::sqlite::SqliteDialect;

    #[test]
    fn round_trips_simple_select() {
        let builder = parse_statement("SELECT id, email FROM users WHERE active = 1 ORDER BY id DESC LIMIT 10").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT id, email FROM users WHERE active = 1 ORDER BY id DESC LIMIT 10");
    }

    #[test]
    fn round_trips_insert() {
        let builder = parse_statement("INSERT INTO users (id, email) VALUES (1, 'a@example.com')").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "INSERT INTO users (id, email) VALUES (1, 'a@example.com')");
    }

    #[test]
    fn round_trips_update_with_where() {
        let builder = parse_statement("UPDATE users SET email = 'new@example.com' WHERE id = 1").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "UPDATE users SET email = 'new@example.com' WHERE id = 1");
    }

    #[test]
    fn round_trips_delete() {
        let builder = parse_statement("DELETE FROM users WHERE id = 1").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "DELETE FROM users WHERE id = 1");
    }

    #[test]
    fn round_trips_named_parameters() {
        let builder = parse_statement("SELECT id FROM users WHERE email = :email").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT id FROM users WHERE email = :email");
        assert_eq!(built.params.len(), 1);
        assert_eq!(built.params[0].name, "email");
    }

    #[test]
    fn parses_join_with_on_clause() {
        let builder = parse_statement("SELECT id FROM orders LEFT JOIN users ON orders.user_id = users.id").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert!(built.sql.contains("LEFT JOIN users ON orders.user_id = users.id"));
    }

    #[test]
    fn unsupported_statement_errors() {
        let err = parse_statement("CREATE TABLE t (id int)").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedStatement { .. }));
    }

    #[test]
    fn round_trips_select_with_aliases_and_placeholder_pagination() {
        let builder = parse_statement("SELECT a.id AS A FROM A a LIMIT :limit OFFSET :offset").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "SELECT a.id AS A FROM A a LIMIT :limit OFFSET :offset");
        assert_eq!(built.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["limit", "offset"]);
    }

    #[test]
    fn on_duplicate_key_update_flips_to_upsert() {
        let builder = parse_statement(
            "INSERT INTO users (id, email) VALUES (1, 'a@example.com') ON DUPLICATE KEY UPDATE email = VALUES(email)",
        )
        .unwrap();
        let dialect = crate::dialect::mysql::MySqlDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(
            built.sql,
            "INSERT INTO users (id, email) VALUES (:id, :email) ON DUPLICATE KEY UPDATE email = VALUES(email)"
        );
    }

    #[test]
    fn parses_replace_into() {
        let builder = parse_statement("REPLACE INTO users (id, email) VALUES (1, 'a@example.com')").unwrap();
        let dialect = SqliteDialect::default();
        let built = builder.build(&dialect).unwrap();
        assert_eq!(built.sql, "REPLACE INTO users (id, email) VALUES (1, 'a@example.com')");
    }
}
