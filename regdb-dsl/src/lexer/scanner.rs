//! Lexer implementation

use super::token::*;

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lazy lexer for the regdb DSL.
///
/// Holds only a cursor into the source; each call to `next_token` scans one
/// token. After `EndOfInput` every further call returns `EndOfInput` again.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            done: false,
        }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Scan every remaining token, ending with `EndOfInput`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let is_end = token.is_end();
            tokens.push(token);
            if is_end {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek_char() else {
            return Ok(Token::new(TokenKind::EndOfInput, "", Span::new(start, start)));
        };

        match c {
            '\'' => self.scan_string(),
            '{' => self.scan_json(),
            c if c.is_ascii_alphabetic() => {
                Ok(self.scan_while(TokenKind::Keyword, |c| c.is_ascii_alphabetic() || c == '_'))
            }
            c if c.is_ascii_digit() => Ok(self.scan_while(TokenKind::Number, |c| c.is_ascii_digit())),
            ';' | ',' => Ok(self.single(TokenKind::Symbol)),
            '(' | ')' => Ok(self.single(TokenKind::Parenthesis)),
            _ => Ok(self.single(TokenKind::Unknown)),
        }
    }

    /// Scan a `'...'` literal. `\'` and `\\` are unescaped; any other
    /// backslash pair is kept as written.
    fn scan_string(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedLiteral { start }),
                Some('\'') => break,
                Some('\\') => match self.advance() {
                    None => return Err(LexError::UnterminatedLiteral { start }),
                    Some(escaped @ ('\'' | '\\')) => value.push(escaped),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                },
                Some(c) => value.push(c),
            }
        }

        Ok(Token::new(
            TokenKind::StringLiteral,
            value,
            Span::new(start, self.pos),
        ))
    }

    /// Scan a brace-balanced span. Braces inside JSON strings don't count.
    fn scan_json(&mut self) -> Result<Token, LexError> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = self.advance() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Token::new(
                            TokenKind::Json,
                            &self.source[start..self.pos],
                            Span::new(start, self.pos),
                        ));
                    }
                }
                _ => {}
            }
        }

        Err(LexError::UnterminatedJson { start })
    }

    fn scan_while(&mut self, kind: TokenKind, accept: impl Fn(char) -> bool) -> Token {
        let start = self.pos;
        while self.peek_char().is_some_and(&accept) {
            self.advance();
        }
        Token::new(kind, &self.source[start..self.pos], Span::new(start, self.pos))
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        Token::new(kind, &self.source[start..self.pos], Span::new(start, self.pos))
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    /// Yields tokens up to and including `EndOfInput`, or up to the first
    /// error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_token();
        if !matches!(&result, Ok(token) if !token.is_end()) {
            self.done = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_statement_tokens() {
        let tokens = Lexer::new("CREATE global Model ('m1', 'MLP', {\"a\": 1});")
            .tokenize()
            .unwrap();
        let summary: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
        assert_eq!(
            summary,
            vec![
                (TokenKind::Keyword, "CREATE"),
                (TokenKind::Keyword, "global"),
                (TokenKind::Keyword, "Model"),
                (TokenKind::Parenthesis, "("),
                (TokenKind::StringLiteral, "m1"),
                (TokenKind::Symbol, ","),
                (TokenKind::StringLiteral, "MLP"),
                (TokenKind::Symbol, ","),
                (TokenKind::Json, "{\"a\": 1}"),
                (TokenKind::Parenthesis, ")"),
                (TokenKind::Symbol, ";"),
                (TokenKind::EndOfInput, ""),
            ]
        );
    }

    #[test]
    fn test_keyword_allows_underscore_after_first_letter() {
        let tokens = Lexer::new("use_bn _x").tokenize().unwrap();
        assert_eq!(tokens[0].text, "use_bn");
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].text, "_");
        assert_eq!(tokens[2].text, "x");
    }

    #[test]
    fn test_numbers_and_unknowns() {
        assert_eq!(
            kinds("42 @ 7"),
            vec![
                TokenKind::Number,
                TokenKind::Unknown,
                TokenKind::Number,
                TokenKind::EndOfInput
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let mut lexer = Lexer::new(r"'it\'s a \\ path\n'");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::StringLiteral);
        assert_eq!(token.text, r"it's a \ path\n");
    }

    #[test]
    fn test_unterminated_literal() {
        let mut lexer = Lexer::new("DELETE MODEL 'abc");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnterminatedLiteral { start: 13 })
        );

        let err = Lexer::new(r"'dangling\").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedLiteral { start: 0 });
    }

    #[test]
    fn test_json_nesting_and_string_braces() {
        let source = r#"{"a": {"b": "}{"}, "c": [1, {"d": "\"}"}]} tail"#;
        let mut lexer = Lexer::new(source);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, TokenKind::Json);
        assert_eq!(token.text, &source[..source.len() - " tail".len()]);
        assert_eq!(lexer.next_token().unwrap().text, "tail");
    }

    #[test]
    fn test_unterminated_json() {
        let err = Lexer::new("x {\"a\": {}").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedJson { start: 2 });
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_end_of_input_repeats() {
        let mut lexer = Lexer::new("   ");
        assert!(lexer.next_token().unwrap().is_end());
        assert!(lexer.next_token().unwrap().is_end());
        assert_eq!(lexer.position(), 3);
    }

    #[test]
    fn test_iterator_stops_after_end_or_error() {
        let tokens: Vec<_> = Lexer::new("GET MODELS").collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[2].as_ref().unwrap().is_end());

        let results: Vec<_> = Lexer::new("GET 'x").collect();
        assert_eq!(results.len(), 2);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_spans_cover_token_source() {
        let source = "UPDATE  regspace\t'r1' TO LOCAL";
        for token in Lexer::new(source).tokenize().unwrap() {
            assert!(token.span.start <= token.span.end);
            assert!(token.span.end <= source.len());
        }
    }

    #[test]
    fn test_token_helpers() {
        let tokens = Lexer::new("get ;").tokenize().unwrap();
        assert!(tokens[0].is_keyword("GET"));
        assert!(tokens[1].is_symbol(';'));
        assert_eq!(tokens[0].describe(), "keyword 'get'");
        assert_eq!(tokens[2].describe(), "end of input");
    }
}
