//! Routes a statement to the parser for its entity kind.

use super::{ModelParser, ParseError, ParseResult, RegSpaceParser, Statement};
use crate::lexer::{Lexer, TokenKind};
use regdb_core::{EntityKind, Scope};

const STATEMENT_KEYWORDS: [&str; 4] = ["CREATE", "DELETE", "UPDATE", "GET"];

/// Entry point for parsing DSL statements of either entity kind.
pub struct QueryParser;

impl QueryParser {
    /// Parse one statement. The leading keywords pick the entity parser,
    /// which then parses the whole input from the start.
    pub fn parse_query(input: &str) -> ParseResult<Statement> {
        match Self::route(input)? {
            EntityKind::Model => ModelParser::new(input)?.parse().map(Statement::Model),
            EntityKind::RegSpace => RegSpaceParser::new(input)?.parse().map(Statement::RegSpace),
        }
    }

    /// Entity kind named by the first non-scope keyword after the verb.
    pub fn route(input: &str) -> ParseResult<EntityKind> {
        let mut lexer = Lexer::new(input);

        let verb = lexer.next_token()?;
        let known_verb = verb.kind == TokenKind::Keyword
            && STATEMENT_KEYWORDS
                .iter()
                .any(|keyword| verb.text.eq_ignore_ascii_case(keyword));
        if !known_verb {
            return Err(ParseError::UnknownStatement {
                found: verb.describe(),
            });
        }

        loop {
            let token = lexer.next_token()?;
            if token.kind == TokenKind::Keyword {
                if let Some(kind) = EntityKind::from_keyword(&token.text) {
                    return Ok(kind);
                }
                if Scope::from_keyword(&token.text).is_some() {
                    continue;
                }
            }
            return Err(ParseError::UnknownStatement {
                found: format!("{} {}", verb.text.to_ascii_uppercase(), token.describe()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_by_entity_keyword() -> Result<(), ParseError> {
        assert_eq!(QueryParser::route("GET MODELS")?, EntityKind::Model);
        assert_eq!(QueryParser::route("delete regspace 'r1'")?, EntityKind::RegSpace);
        assert_eq!(QueryParser::route("CREATE GLOBAL REGSPACE")?, EntityKind::RegSpace);
        assert_eq!(QueryParser::route("CREATE local MODEL")?, EntityKind::Model);
        Ok(())
    }

    #[test]
    fn test_unknown_verb() {
        assert_eq!(
            QueryParser::route("DROP MODEL 'm1'"),
            Err(ParseError::UnknownStatement {
                found: "keyword 'DROP'".to_string()
            })
        );
        assert!(matches!(
            QueryParser::route(""),
            Err(ParseError::UnknownStatement { .. })
        ));
        assert!(matches!(
            QueryParser::route("'CREATE' MODEL"),
            Err(ParseError::UnknownStatement { .. })
        ));
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(
            QueryParser::route("CREATE TABLE t"),
            Err(ParseError::UnknownStatement {
                found: "CREATE keyword 'TABLE'".to_string()
            })
        );
        assert!(matches!(
            QueryParser::route("GET"),
            Err(ParseError::UnknownStatement { .. })
        ));
    }

    #[test]
    fn test_parse_query_dispatches() -> Result<(), ParseError> {
        assert!(matches!(
            QueryParser::parse_query("GET REGSPACES")?,
            Statement::RegSpace(_)
        ));
        assert!(matches!(
            QueryParser::parse_query("DELETE MODEL 'm1'")?,
            Statement::Model(_)
        ));
        Ok(())
    }
}
