//! Lexer token types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// TOKENS
// ============================================================================

/// Token kinds for the regdb DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Bare word (`CREATE`, `model`, `Global`). Case is preserved.
    Keyword,
    /// Contents of a `'...'` literal with escapes resolved.
    StringLiteral,
    /// Raw source of a balanced `{...}` span.
    Json,
    /// `;` or `,`
    Symbol,
    Number,
    /// `(` or `)`
    Parenthesis,
    EndOfInput,
    /// Any other single character.
    Unknown,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Json => "JSON",
            TokenKind::Symbol => "symbol",
            TokenKind::Number => "number",
            TokenKind::Parenthesis => "parenthesis",
            TokenKind::EndOfInput => "end of input",
            TokenKind::Unknown => "unknown character",
        };
        f.write_str(label)
    }
}

/// Byte range of a token in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A token with its kind, text and source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Case-insensitive keyword match.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, symbol: char) -> bool {
        self.kind == TokenKind::Symbol && self.text.starts_with(symbol)
    }

    pub fn is_paren(&self, paren: char) -> bool {
        self.kind == TokenKind::Parenthesis && self.text.starts_with(paren)
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// Human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            kind => format!("{} '{}'", kind, self.text),
        }
    }
}

// ============================================================================
// LEX ERRORS
// ============================================================================

/// Errors raised while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string literal starting at byte {start}")]
    UnterminatedLiteral { start: usize },

    #[error("unterminated JSON document starting at byte {start}")]
    UnterminatedJson { start: usize },
}

impl LexError {
    /// Byte offset where the offending token began.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnterminatedLiteral { start } | LexError::UnterminatedJson { start } => *start,
        }
    }
}
