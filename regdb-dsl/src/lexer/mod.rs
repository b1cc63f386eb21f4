//! Lexer module for the regdb DSL

pub mod scanner;
pub mod token;

pub use scanner::*;
pub use token::*;
