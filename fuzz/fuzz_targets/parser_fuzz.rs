//! Fuzz test for the regdb DSL parser
//!
//! Parsing arbitrary UTF-8 must return Ok or Err without panicking. Every
//! statement that parses must survive a trip through its canonical text.
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use regdb_dsl::{parse, pretty_print};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    match parse(input) {
        Ok(statement) => {
            let canonical = pretty_print(&statement);
            let reparsed = parse(&canonical)
                .unwrap_or_else(|e| panic!("canonical text {canonical:?} failed to parse: {e}"));
            assert_eq!(reparsed, statement, "canonical text {canonical:?}");
        }
        Err(err) => {
            assert!(!err.to_string().is_empty(), "error message should not be empty");
        }
    }
});
