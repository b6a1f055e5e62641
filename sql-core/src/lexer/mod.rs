//! Character-level SQL lexer.
//!
//! This is the token scanner used by the text-to-builder parser
//! (`parser::builder_parser`). It is distinct from `crate::splitter`, which
//! operates line-by-line over whole statements rather than tokens.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
