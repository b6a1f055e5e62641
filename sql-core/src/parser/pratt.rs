//! Operator-precedence (Pratt) expression parser.
//!
//! Walks the token stream produced by `crate::lexer::Lexer` and builds an
//! `Expr` tree, climbing precedence the same way `BinaryOp::precedence`
//! orders operators for rendering — so a round-tripped expression needs no
//! extra parentheses beyond what the original precedence already implied.

use crate::error::ParseError;
use crate::expr::{BinaryOp, Expr, WhenClause};
use crate::lexer::{Keyword, Token, TokenKind};
use crate::value::SqlValue;

pub struct ExprParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> ExprParser<'t> {
    #[must_use]
    pub const fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
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

    fn expect(&mut self, expected: &TokenKind) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{expected:?}"),
                found: format!("{:?}", self.peek()),
                position: self.pos,
            })
        }
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        match self.peek() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Mod),
            TokenKind::Eq => Some(BinaryOp::Eq),
            TokenKind::NotEq => Some(BinaryOp::NotEq),
            TokenKind::Lt => Some(BinaryOp::Lt),
            TokenKind::LtEq => Some(BinaryOp::LtEq),
            TokenKind::Gt => Some(BinaryOp::Gt),
            TokenKind::GtEq => Some(BinaryOp::GtEq),
            TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
            TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
            TokenKind::Keyword(Keyword::Like) => Some(BinaryOp::Like),
            _ => None,
        }
    }

    /// Parses a full expression at minimum precedence 0.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_precedence(0)
    }

    fn parse_precedence(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_postfix()?;

        loop {
            let Some(op) = self.binary_op() else { break };
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_precedence(precedence + 1)?;
            left = left.binary(op, right);
        }

        Ok(left)
    }

    /// Parses postfix constructs that bind to a primary expression:
    /// `IS [NOT] NULL`, `[NOT] IN (...)`, `[NOT] BETWEEN x AND y`.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;

        loop {
            match self.peek() {
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = if self.peek() == &TokenKind::Keyword(Keyword::Not) {
                        self.advance();
                        true
                    } else {
                        false
                    };
                    self.expect(&TokenKind::Keyword(Keyword::Null))?;
                    expr = Expr::IsNull { expr: Box::new(expr), negated };
                }
                TokenKind::Keyword(Keyword::Not) if self.peek_is_in_or_between_after_not() => {
                    self.advance();
                    expr = self.parse_in_or_between(expr, true)?;
                }
                TokenKind::Keyword(Keyword::In) => {
                    expr = self.parse_in_or_between(expr, false)?;
                }
                TokenKind::Keyword(Keyword::Between) => {
                    expr = self.parse_in_or_between(expr, false)?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn peek_is_in_or_between_after_not(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(TokenKind::Keyword(Keyword::In | Keyword::Between))
        )
    }

    fn parse_in_or_between(&mut self, expr: Expr, negated: bool) -> Result<Expr, ParseError> {
        match self.advance() {
            TokenKind::Keyword(Keyword::In) => {
                self.expect(&TokenKind::LeftParen)?;
                let mut list = Vec::new();
                if self.peek() != &TokenKind::RightParen {
                    loop {
                        list.push(self.parse_expr()?);
                        if self.peek() == &TokenKind::Comma {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::In { expr: Box::new(expr), list, negated })
            }
            TokenKind::Keyword(Keyword::Between) => {
                let low = self.parse_precedence(BinaryOp::Like.precedence() + 1)?;
                self.expect(&TokenKind::Keyword(Keyword::And))?;
                let high = self.parse_precedence(BinaryOp::Like.precedence() + 1)?;
                Ok(Expr::Between { expr: Box::new(expr), low: Box::new(low), high: Box::new(high), negated })
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "IN or BETWEEN".to_string(),
                found: format!("{other:?}"),
                position: self.pos,
            }),
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek() == &TokenKind::Keyword(Keyword::Not) {
            self.advance();
            let inner = self.parse_precedence(BinaryOp::And.precedence())?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        if self.peek() == &TokenKind::Minus {
            self.advance();
            let inner = self.parse_postfix()?;
            return Ok(Expr::Literal(SqlValue::Int(0)).binary(BinaryOp::Sub, inner));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            TokenKind::Integer(i) => Ok(Expr::Literal(SqlValue::Int(i))),
            TokenKind::Float(f) => Ok(Expr::Literal(SqlValue::Float(f))),
            TokenKind::String(s) => Ok(Expr::Literal(SqlValue::Text(s))),
            TokenKind::Keyword(Keyword::Null) => Ok(Expr::Literal(SqlValue::Null)),
            TokenKind::Keyword(Keyword::True) => Ok(Expr::Literal(SqlValue::Bool(true))),
            TokenKind::Keyword(Keyword::False) => Ok(Expr::Literal(SqlValue::Bool(false))),
            TokenKind::NamedParam(name) => Ok(Expr::Parameter(name)),
            TokenKind::Question => Ok(Expr::Parameter(format!("p{}", self.pos))),
            TokenKind::LeftParen => {
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case(),
            TokenKind::Identifier(name) => self.parse_identifier_or_call(name),
            other => Err(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                found: format!("{other:?}"),
                position: self.pos,
            }),
        }
    }

    fn parse_identifier_or_call(&mut self, name: String) -> Result<Expr, ParseError> {
        if self.peek() == &TokenKind::Dot {
            self.advance();
            match self.advance() {
                TokenKind::Identifier(column) => return Ok(Expr::qualified_field(name, column)),
                TokenKind::Star => return Ok(Expr::Field { table: Some(name), name: "*".to_string() }),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "identifier after '.'".to_string(),
                        found: format!("{other:?}"),
                        position: self.pos,
                    });
                }
            }
        }

        if self.peek() == &TokenKind::LeftParen {
            self.advance();
            let distinct = if self.peek() == &TokenKind::Keyword(Keyword::Distinct) {
                self.advance();
                true
            } else {
                false
            };
            let mut args = Vec::new();
            if self.peek() != &TokenKind::RightParen {
                loop {
                    args.push(self.parse_expr()?);
                    if self.peek() == &TokenKind::Comma {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RightParen)?;
            return Ok(Expr::Func { name, args, distinct });
        }

        Ok(Expr::field(name))
    }

    fn parse_case(&mut self) -> Result<Expr, ParseError> {
        let operand = if self.peek() == &TokenKind::Keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };

        let mut when_clauses = Vec::new();
        while self.peek() == &TokenKind::Keyword(Keyword::When) {
            self.advance();
            let condition = self.parse_expr()?;
            self.expect(&TokenKind::Keyword(Keyword::Then))?;
            let result = self.parse_expr()?;
            when_clauses.push(WhenClause { condition, result });
        }

        let else_clause = if self.peek() == &TokenKind::Keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        self.expect(&TokenKind::Keyword(Keyword::End))?;
        Ok(Expr::Case { operand, when_clauses, else_clause })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Expr {
        let tokens = Lexer::new(input).tokenize();
        ExprParser::new(&tokens).parse_expr().unwrap()
    }

    #[test]
    fn precedence_climbing_matches_math() {
        let expr = parse("1 + 2 * 3");
        assert_eq!(
            expr,
            Expr::Literal(SqlValue::Int(1))
                .binary(BinaryOp::Add, Expr::Literal(SqlValue::Int(2)).binary(BinaryOp::Mul, Expr::Literal(SqlValue::Int(3))))
        );
    }

    #[test]
    fn parses_in_list() {
        let expr = parse("id IN (1, 2, 3)");
        assert!(matches!(expr, Expr::In { negated: false, .. }));
    }

    #[test]
    fn parses_not_between() {
        let expr = parse("age NOT BETWEEN 1 AND 10");
        assert!(matches!(expr, Expr::Between { negated: true, .. }));
    }

    #[test]
    fn parses_qualified_column() {
        let expr = parse("users.email");
        assert_eq!(expr, Expr::qualified_field("users", "email"));
    }

    #[test]
    fn parses_function_call() {
        let expr = parse("COUNT(DISTINCT id)");
        assert_eq!(expr, Expr::Func { name: "COUNT".to_string(), args: vec![Expr::field("id")], distinct: true });
    }

    #[test]
    fn parses_named_parameter() {
        let expr = parse("email = :email");
        assert_eq!(expr, Expr::field("email").eq(Expr::param("email")));
    }
}
