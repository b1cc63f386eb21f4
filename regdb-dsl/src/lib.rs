//! regdb DSL - Statement Parser & Compiler
//!
//! Front end for managing models and regularization spaces in the local and
//! global catalogs. A statement is lexed lazily, parsed by the parser for its
//! entity kind, checked against the live catalogs and lowered to SQL.
//!
//! Architecture:
//! ```text
//! DSL text ("CREATE GLOBAL MODEL ('m1', 'MLP', {...});")
//!     ↓
//! Lexer (one token per call)
//!     ↓
//! QueryParser → ModelParser | RegSpaceParser
//!     ↓
//! Statement
//!     ↓
//! ModelCompiler | RegSpaceCompiler (existence / uniqueness checks)
//!     ↓
//! CompiledStatement (CatalogQuery + SQL text)
//!     ↓
//! CatalogConnection::execute
//! ```

pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod pretty_printer;
pub mod session;
pub mod telemetry;

// Re-export key types for convenience
pub use compiler::*;
pub use lexer::*;
pub use parser::*;
pub use pretty_printer::pretty_print;
pub use session::{Execution, Session};

use regdb_core::StorageError;
use thiserror::Error;

/// Any failure while executing a statement end to end.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DslError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type DslResult<T> = Result<T, DslError>;
