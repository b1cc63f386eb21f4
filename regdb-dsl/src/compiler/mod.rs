//! DSL Compiler - Lower statements to catalog queries and SQL text
//!
//! Each compiler checks cross-catalog preconditions against a live
//! connection before emitting its statement.
//!
//! # Pipeline
//!
//! ```text
//! DSL text → Lexer → Parser → Statement → Compiler → CompiledStatement → execute
//!                                            ↓
//!                                 existence / uniqueness checks
//! ```
//!
//! The checks and the later execution of the emitted statement are only
//! race-free when the caller runs both inside one transaction (see
//! `Session`).

mod model;
mod regspace;

pub use model::ModelCompiler;
pub use regspace::RegSpaceCompiler;

use crate::parser::Statement;
use regdb_core::{CatalogLayout, EntityKind, Scope, StorageError};
use regdb_storage::{CatalogConnection, CatalogQuery, QueryResult};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// COMPILE ERRORS
// ============================================================================

/// Errors that can occur while lowering a statement.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    /// Entity absent from both catalogs
    #[error("{kind} '{name}' does not exist")]
    NotFound { kind: EntityKind, name: String },

    /// Target catalog already holds the name
    #[error("{kind} '{name}' already exists in the {scope} catalog")]
    AlreadyExists {
        kind: EntityKind,
        name: String,
        scope: Scope,
    },

    #[error("catalog error: {0}")]
    Storage(#[from] StorageError),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// COMPILED OUTPUT
// ============================================================================

/// A lowered statement: the structured query and the SQL it renders to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    pub query: CatalogQuery,
    /// Result of a write already executed while compiling (the local half
    /// of a DELETE).
    pub immediate: Option<QueryResult>,
}

impl CompiledStatement {
    fn new(query: CatalogQuery, layout: &CatalogLayout) -> Self {
        Self {
            sql: query.render(layout),
            query,
            immediate: None,
        }
    }

    /// Rows written while compiling.
    pub fn immediate_rows_affected(&self) -> u64 {
        self.immediate.as_ref().map_or(0, |result| result.rows_affected)
    }
}

/// Lowering of one entity kind's statements.
pub trait ToSql {
    type Statement;

    fn to_sql(
        &self,
        statement: &Self::Statement,
        conn: &dyn CatalogConnection,
    ) -> CompileResult<CompiledStatement>;
}

/// Compile any statement with the compiler for its entity kind.
pub fn compile(
    statement: &Statement,
    layout: &CatalogLayout,
    conn: &dyn CatalogConnection,
) -> CompileResult<CompiledStatement> {
    match statement {
        Statement::Model(stmt) => ModelCompiler::new(layout.clone()).to_sql(stmt, conn),
        Statement::RegSpace(stmt) => RegSpaceCompiler::new(layout.clone()).to_sql(stmt, conn),
    }
}

// ============================================================================
// SHARED LOWERING
// ============================================================================

/// Lowering steps common to both entity kinds.
pub(crate) struct Lowering<'a> {
    layout: &'a CatalogLayout,
    conn: &'a dyn CatalogConnection,
    kind: EntityKind,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(
        layout: &'a CatalogLayout,
        conn: &'a dyn CatalogConnection,
        kind: EntityKind,
    ) -> Self {
        Self { layout, conn, kind }
    }

    fn emit(&self, query: CatalogQuery) -> CompiledStatement {
        let compiled = CompiledStatement::new(query, self.layout);
        tracing::debug!(kind = %self.kind, sql = %compiled.sql, "compiled statement");
        compiled
    }

    /// Insert into `scope` unless that catalog already holds `name`.
    pub(crate) fn create(
        &self,
        scope: Scope,
        name: &str,
        entity_type: Option<&str>,
        args: &Value,
    ) -> CompileResult<CompiledStatement> {
        if self.conn.contains(scope, self.kind, name)? {
            return Err(self.already_exists(name, scope));
        }
        Ok(self.emit(CatalogQuery::Insert {
            scope,
            kind: self.kind,
            name: name.to_string(),
            entity_type: entity_type.map(str::to_string),
            args: args.to_string(),
        }))
    }

    /// Delete from the local catalog now; return the global delete.
    pub(crate) fn delete(&self, name: &str) -> CompileResult<CompiledStatement> {
        let local = self.conn.execute(&CatalogQuery::Delete {
            scope: Scope::Local,
            kind: self.kind,
            name: name.to_string(),
        })?;
        tracing::debug!(
            kind = %self.kind,
            name,
            rows_affected = local.rows_affected,
            "deleted from local catalog"
        );
        let mut compiled = self.emit(CatalogQuery::Delete {
            scope: Scope::Global,
            kind: self.kind,
            name: name.to_string(),
        });
        compiled.immediate = Some(local);
        Ok(compiled)
    }

    /// Update in whichever catalog holds `name`.
    pub(crate) fn update(
        &self,
        name: &str,
        entity_type: Option<&str>,
        args: &Value,
    ) -> CompileResult<CompiledStatement> {
        let scope = self
            .conn
            .locate(self.kind, name)?
            .ok_or_else(|| self.not_found(name))?;
        Ok(self.emit(CatalogQuery::Update {
            scope,
            kind: self.kind,
            name: name.to_string(),
            entity_type: entity_type.map(str::to_string),
            args: args.to_string(),
        }))
    }

    /// Move `name` into `to` as one copy-then-delete transaction.
    pub(crate) fn update_scope(&self, name: &str, to: Scope) -> CompileResult<CompiledStatement> {
        if self.conn.contains(to, self.kind, name)? {
            return Err(self.already_exists(name, to));
        }
        if !self.conn.contains(to.other(), self.kind, name)? {
            return Err(self.not_found(name));
        }
        Ok(self.emit(CatalogQuery::Migrate {
            kind: self.kind,
            name: name.to_string(),
            to,
        }))
    }

    /// Read one entity, or every entity when `name` is `None`.
    pub(crate) fn select(&self, name: Option<&str>) -> CompiledStatement {
        self.emit(CatalogQuery::Select {
            kind: self.kind,
            name: name.map(str::to_string),
        })
    }

    fn not_found(&self, name: &str) -> CompileError {
        CompileError::NotFound {
            kind: self.kind,
            name: name.to_string(),
        }
    }

    fn already_exists(&self, name: &str, scope: Scope) -> CompileError {
        CompileError::AlreadyExists {
            kind: self.kind,
            name: name.to_string(),
            scope,
        }
    }
}
