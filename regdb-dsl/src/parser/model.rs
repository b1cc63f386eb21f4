//! Recursive-descent parser for model statements.

use super::cursor::{Plurality, TokenCursor, Verb};
use super::{ModelStatement, ParseResult};
use crate::lexer::TokenKind;
use regdb_core::EntityKind;

const KIND: EntityKind = EntityKind::Model;

/// Parser for `CREATE/DELETE/UPDATE/GET MODEL ...` statements.
pub struct ModelParser<'a> {
    cursor: TokenCursor<'a>,
}

impl<'a> ModelParser<'a> {
    pub fn new(input: &'a str) -> ParseResult<Self> {
        Ok(Self {
            cursor: TokenCursor::new(input)?,
        })
    }

    /// Parse the whole input as one model statement.
    pub fn parse(mut self) -> ParseResult<ModelStatement> {
        let statement = match self.cursor.expect_verb()? {
            Verb::Create => self.parse_create()?,
            Verb::Delete => self.parse_delete()?,
            Verb::Update => self.parse_update()?,
            Verb::Get => self.parse_get()?,
        };
        self.cursor.finish()?;
        Ok(statement)
    }

    /// `[scope] MODEL ( 'name', 'type', {args} )`
    fn parse_create(&mut self) -> ParseResult<ModelStatement> {
        let scope = self.cursor.optional_scope()?.unwrap_or_default();
        self.cursor.expect_entity(KIND)?;
        let (name, model_type, args) = self.parse_definition()?;
        Ok(ModelStatement::Create {
            scope,
            name,
            model_type,
            args,
        })
    }

    fn parse_delete(&mut self) -> ParseResult<ModelStatement> {
        self.cursor.expect_entity(KIND)?;
        let name = self.cursor.expect_name("model name")?;
        Ok(ModelStatement::Delete { name })
    }

    /// `MODEL 'name' TO scope` or `MODEL ( 'name', 'type', {args} )`
    fn parse_update(&mut self) -> ParseResult<ModelStatement> {
        self.cursor.expect_entity(KIND)?;
        let current = self.cursor.current();
        let scope_form = current.kind == TokenKind::StringLiteral;
        let args_form = current.is_paren('(');

        if scope_form {
            let name = self.cursor.expect_name("model name")?;
            self.cursor.expect_keyword("TO")?;
            let scope = self.cursor.expect_scope()?;
            Ok(ModelStatement::UpdateScope { name, scope })
        } else if args_form {
            let (name, model_type, args) = self.parse_definition()?;
            Ok(ModelStatement::Update {
                name,
                model_type,
                args,
            })
        } else {
            Err(self.cursor.error("model name or '('"))
        }
    }

    /// `MODEL 'name'` or `MODELS`
    fn parse_get(&mut self) -> ParseResult<ModelStatement> {
        let plurality = self.cursor.expect_entity_or_all(KIND)?;
        if plurality == Plurality::Plural && self.cursor.at_terminator() {
            return Ok(ModelStatement::GetAll);
        }
        let name = self.cursor.expect_name("model name")?;
        Ok(ModelStatement::Get { name })
    }

    fn parse_definition(&mut self) -> ParseResult<(String, String, serde_json::Value)> {
        self.cursor.expect_paren('(')?;
        let name = self.cursor.expect_name("model name")?;
        self.cursor.expect_symbol(',')?;
        let model_type = self.cursor.expect_name("model type")?;
        self.cursor.expect_symbol(',')?;
        let args = self.cursor.expect_args(KIND)?;
        self.cursor.expect_paren(')')?;
        Ok((name, model_type, args))
    }
}
