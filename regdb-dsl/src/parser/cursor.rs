//! One-token cursor over the lazy lexer, with the grammar helpers both
//! entity parsers share.

use super::{parse_args, ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};
use regdb_core::{EntityKind, Scope};
use serde_json::Value;

/// Leading statement keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Create,
    Delete,
    Update,
    Get,
}

impl Verb {
    pub(crate) fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "CREATE" => Some(Verb::Create),
            "DELETE" => Some(Verb::Delete),
            "UPDATE" => Some(Verb::Update),
            "GET" => Some(Verb::Get),
            _ => None,
        }
    }
}

/// Entity keyword as written after `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Plurality {
    Singular,
    Plural,
}

pub(crate) struct TokenCursor<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> TokenCursor<'a> {
    pub(crate) fn new(input: &'a str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    pub(crate) fn current(&self) -> &Token {
        &self.current
    }

    /// Move to the next token, returning the one just consumed.
    pub(crate) fn advance(&mut self) -> ParseResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(crate) fn error(&self, expected: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            expected: expected.into(),
            found: self.current.describe(),
            position: self.current.span.start,
        }
    }

    pub(crate) fn expect_verb(&mut self) -> ParseResult<Verb> {
        let verb = (self.current.kind == TokenKind::Keyword)
            .then(|| Verb::from_keyword(&self.current.text))
            .flatten()
            .ok_or_else(|| self.error("CREATE, DELETE, UPDATE or GET"))?;
        self.advance()?;
        Ok(verb)
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if !self.current.is_keyword(keyword) {
            return Err(self.error(keyword));
        }
        self.advance()?;
        Ok(())
    }

    /// Singular entity keyword for `kind` (`MODEL` / `REGSPACE`).
    pub(crate) fn expect_entity(&mut self, kind: EntityKind) -> ParseResult<()> {
        self.expect_keyword(kind.keyword())
    }

    /// Either spelling of the entity keyword for `kind`.
    pub(crate) fn expect_entity_or_all(&mut self, kind: EntityKind) -> ParseResult<Plurality> {
        let plurality = if self.current.is_keyword(kind.keyword()) {
            Plurality::Singular
        } else if self.current.is_keyword(kind.plural_keyword()) {
            Plurality::Plural
        } else {
            return Err(self.error(format!("{} or {}", kind.keyword(), kind.plural_keyword())));
        };
        self.advance()?;
        Ok(plurality)
    }

    /// `GLOBAL` or `LOCAL`, if present.
    pub(crate) fn optional_scope(&mut self) -> ParseResult<Option<Scope>> {
        if self.current.kind != TokenKind::Keyword {
            return Ok(None);
        }
        let Some(scope) = Scope::from_keyword(&self.current.text) else {
            return Ok(None);
        };
        self.advance()?;
        Ok(Some(scope))
    }

    pub(crate) fn expect_scope(&mut self) -> ParseResult<Scope> {
        self.optional_scope()?
            .ok_or_else(|| self.error("GLOBAL or LOCAL"))
    }

    /// A non-empty string literal.
    pub(crate) fn expect_name(&mut self, what: &str) -> ParseResult<String> {
        if self.current.kind != TokenKind::StringLiteral || self.current.text.is_empty() {
            return Err(self.error(format!("non-empty {} literal", what)));
        }
        Ok(self.advance()?.text)
    }

    pub(crate) fn expect_symbol(&mut self, symbol: char) -> ParseResult<()> {
        if !self.current.is_symbol(symbol) {
            return Err(self.error(format!("'{}'", symbol)));
        }
        self.advance()?;
        Ok(())
    }

    pub(crate) fn expect_paren(&mut self, paren: char) -> ParseResult<()> {
        if !self.current.is_paren(paren) {
            return Err(self.error(format!("'{}'", paren)));
        }
        self.advance()?;
        Ok(())
    }

    /// A JSON span whose key set matches `kind`.
    pub(crate) fn expect_args(&mut self, kind: EntityKind) -> ParseResult<Value> {
        if self.current.kind != TokenKind::Json {
            return Err(self.error(format!("{} arguments JSON", kind)));
        }
        let args = parse_args(kind, &self.current.text)?;
        self.advance()?;
        Ok(args)
    }

    /// `;` or end of input, without consuming it.
    pub(crate) fn at_terminator(&self) -> bool {
        self.current.is_symbol(';') || self.current.is_end()
    }

    /// Consume an optional `;` and require end of input.
    pub(crate) fn finish(&mut self) -> ParseResult<()> {
        if self.current.is_symbol(';') {
            self.advance()?;
        }
        if !self.current.is_end() {
            return Err(ParseError::TrailingInput {
                found: self.current.describe(),
                position: self.current.span.start,
            });
        }
        Ok(())
    }
}
