//! Recursive-descent parser for regspace statements.

use super::cursor::{Plurality, TokenCursor, Verb};
use super::{ParseResult, RegSpaceStatement};
use crate::lexer::TokenKind;
use regdb_core::EntityKind;
use serde_json::Value;

const KIND: EntityKind = EntityKind::RegSpace;

/// Parser for `CREATE/DELETE/UPDATE/GET REGSPACE ...` statements.
///
/// Regspaces carry no type tag: definitions are `('name', {args})`.
pub struct RegSpaceParser<'a> {
    cursor: TokenCursor<'a>,
}

impl<'a> RegSpaceParser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        Ok(Self {
            cursor: TokenCursor::new(input)?,
        })
    }

    pub fn parse(mut self) -> ParseResult<RegSpaceStatement> {
        let statement = match self.cursor.expect_verb()? {
            Verb::Create => {
                let scope = self.cursor.optional_scope()?.unwrap_or_default();
                self.cursor.expect_entity(KIND)?;
                let (name, args) = self.parse_definition()?;
                RegSpaceStatement::Create { scope, name, args }
            }
            Verb::Delete => {
                self.cursor.expect_entity(KIND)?;
                let name = self.cursor.expect_name("regspace name")?;
                RegSpaceStatement::Delete { name }
            }
            Verb::Update => self.parse_update()?,
            Verb::Get => {
                let plurality = self.cursor.expect_entity_or_all(KIND)?;
                if plurality == Plurality::Plural && self.cursor.at_terminator() {
                    RegSpaceStatement::GetAll
                } else {
                    let name = self.cursor.expect_name("regspace name")?;
                    RegSpaceStatement::Get { name }
                }
            }
        };
        self.cursor.finish()?;
        Ok(statement)
    }

    fn parse_update(&mut self) -> ParseResult<RegSpaceStatement> {
        self.cursor.expect_entity(KIND)?;
        let current = self.cursor.current();
        let scope_form = current.kind == TokenKind::StringLiteral;
        let args_form = current.is_paren('(');

        if scope_form {
            let name = self.cursor.expect_name("regspace name")?;
            self.cursor.expect_keyword("TO")?;
            let scope = self.cursor.expect_scope()?;
            Ok(RegSpaceStatement::UpdateScope { name, scope })
        } else if args_form {
            let (name, args) = self.parse_definition()?;
            Ok(RegSpaceStatement::Update { name, args })
        } else {
            Err(self.cursor.error("regspace name or '('"))
        }
    }

    fn parse_definition(&mut self) -> ParseResult<(String, Value)> {
        self.cursor.expect_paren('(')?;
        let name = self.cursor.expect_name("regspace name")?;
        self.cursor.expect_symbol(',')?;
        let args = self.cursor.expect_args(KIND)?;
        self.cursor.expect_paren(')')?;
        Ok((name, args))
    }
}
