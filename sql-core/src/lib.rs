//! Dialect-agnostic SQL query builder, AST-driven parser, and streaming
//! statement tokenizer.
//!
//! ```
//! use sql_core::builder::Builder;
//! use sql_core::dialect::SqliteDialect;
//! use sql_core::expr::Expr;
//!
//! let dialect = SqliteDialect::default();
//! let built = Builder::select()
//!     .table("users")
//!     .fields(vec![Expr::field("id"), Expr::field("email")])
//!     .build(&dialect)
//!     .unwrap();
//! assert_eq!(built.sql, "SELECT id, email FROM users");
//! ```
//!
//! Every value that reaches the final SQL string is either a quoted
//! identifier or a bound parameter placeholder — there is no path from a
//! caller-supplied value to inline SQL text, which is what makes the
//! builder safe against injection by construction.

pub mod builder;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod ident;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod splitter;
pub mod table_source;
pub mod value;

pub use builder::{Builder, BuiltStatement};
pub use error::{BuilderError, ParseError, TokenizeError};
pub use expr::{BoundParam, Expr};
pub use predicate::Where;
pub use table_source::TableSource;
pub use value::SqlValue;
