//! Fuzz test for the regdb DSL lexer
//!
//! Feeds arbitrary UTF-8 to the lexer looking for panics, non-terminating
//! scans and malformed spans.
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use regdb_dsl::{Lexer, TokenKind};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Unterminated literals and JSON spans are errors, never panics
    let Ok(tokens) = Lexer::new(input).tokenize() else {
        return;
    };

    assert_eq!(
        tokens.last().map(|t| t.kind),
        Some(TokenKind::EndOfInput),
        "token stream must end with EndOfInput"
    );

    let mut previous_end = 0;
    for token in &tokens {
        assert!(token.span.start <= token.span.end, "inverted span");
        assert!(token.span.start >= previous_end, "overlapping spans");
        assert!(token.span.end <= input.len(), "span past end of input");
        assert!(input.is_char_boundary(token.span.start));
        assert!(input.is_char_boundary(token.span.end));
        if token.kind == TokenKind::Json {
            assert_eq!(token.text, &input[token.span.start..token.span.end]);
        }
        previous_end = token.span.end;
    }
});
