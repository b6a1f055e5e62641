//! Shared error types for the builder, tokenizer, and parser.

use thiserror::Error;

/// Errors raised while assembling a `Builder` into SQL text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuilderError {
    #[error("no table set for {operation} builder")]
    MissingTable { operation: &'static str },

    #[error("no fields set for SELECT builder")]
    MissingFields,

    #[error("no values set for {operation} builder")]
    MissingValues { operation: &'static str },

    #[error("UPDATE builder has no SET assignments")]
    MissingAssignments,

    #[error("REPLACE/UPSERT requires at least one primary key column")]
    MissingPrimaryKey,

    #[error("column count ({columns}) does not match value count ({values}) in row {row}")]
    ColumnValueMismatch { row: usize, columns: usize, values: usize },

    #[error("builder references itself as a subquery source")]
    SelfReferential,

    #[error("dialect {dialect} does not support {feature}")]
    UnsupportedFeature { dialect: &'static str, feature: &'static str },
}

/// Errors raised while splitting raw SQL text into discrete statements
/// (C6).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("line {line_number}: unterminated string literal starting at column {column}")]
    UnterminatedString { line_number: usize, column: usize },

    #[error("line {line_number}: unterminated block comment")]
    UnterminatedComment { line_number: usize },

    #[error("line {line_number}: unterminated dollar-quoted block (tag \"{tag}\")")]
    UnterminatedDollarQuote { line_number: usize, tag: String },

    #[error("line {line_number}: DELIMITER directive missing an argument")]
    MissingDelimiterArgument { line_number: usize },
}

/// Errors raised while parsing SQL text into a `Builder` tree (C7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected token {found:?} at byte {position}, expected {expected}")]
    UnexpectedToken { expected: String, found: String, position: usize },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unsupported statement kind: {keyword}")]
    UnsupportedStatement { keyword: String },

    #[error(transparent)]
    Builder(#[from] BuilderError),
}
