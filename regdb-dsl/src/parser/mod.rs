//! Parser module for the regdb DSL
//!
//! Two recursive-descent parsers, one per entity kind, share a token cursor.
//! `QueryParser` picks the parser from the first keywords of the input.

pub mod args;
pub mod ast;
mod cursor;
pub mod dispatch;
pub mod model;
pub mod regspace;

pub use args::{parse_args, validate_args};
pub use ast::*;
pub use dispatch::QueryParser;
pub use model::ModelParser;
pub use regspace::RegSpaceParser;

use crate::lexer::LexError;
use regdb_core::EntityKind;
use thiserror::Error;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// Errors raised while turning DSL text into a `Statement`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error at byte {position}: expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unexpected {found} at byte {position} after end of statement")]
    TrailingInput { found: String, position: usize },

    #[error(
        "{kind} arguments must have exactly the keys [{}] (missing: [{}], unexpected: [{}])",
        .kind.required_arg_keys().join(", "),
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    Schema {
        kind: EntityKind,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("invalid JSON arguments: {reason}")]
    InvalidJson { reason: String },

    #[error("unknown statement: {found}")]
    UnknownStatement { found: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse one DSL statement of either entity kind.
pub fn parse(input: &str) -> ParseResult<Statement> {
    QueryParser::parse_query(input)
}
