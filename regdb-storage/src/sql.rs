//! Adapter from `CatalogConnection` to a host engine that executes SQL text.

use crate::{CatalogConnection, CatalogQuery, QueryResult};
use regdb_core::{CatalogLayout, StorageResult};
use std::sync::atomic::{AtomicBool, Ordering};

/// The host engine's query entry point.
pub trait SqlExecutor: Send + Sync {
    fn query(&self, sql: &str) -> StorageResult<QueryResult>;
}

/// Renders catalog queries with a layout and runs them on a `SqlExecutor`.
#[derive(Debug)]
pub struct SqlCatalog<E> {
    executor: E,
    layout: CatalogLayout,
    in_transaction: AtomicBool,
}

impl<E: SqlExecutor> SqlCatalog<E> {
    pub fn new(executor: E, layout: CatalogLayout) -> Self {
        Self {
            executor,
            layout,
            in_transaction: AtomicBool::new(false),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    fn run(&self, sql: &str) -> StorageResult<QueryResult> {
        tracing::trace!(sql, "executing catalog statement");
        self.executor.query(sql)
    }

    fn run_all(&self, statements: &[String]) -> StorageResult<QueryResult> {
        let mut first: Option<QueryResult> = None;
        for sql in statements {
            let result = self.run(sql)?;
            first.get_or_insert(result);
        }
        Ok(first.unwrap_or_default())
    }
}

impl<E: SqlExecutor> CatalogConnection for SqlCatalog<E> {
    fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    /// Multi-statement queries report the first statement's result (the
    /// number of rows copied, for a migration).
    fn execute(&self, query: &CatalogQuery) -> StorageResult<QueryResult> {
        let statements = query.statements(&self.layout);
        if statements.len() == 1 || self.in_transaction.load(Ordering::SeqCst) {
            return self.run_all(&statements);
        }

        self.run("BEGIN TRANSACTION;")?;
        match self.run_all(&statements) {
            Ok(result) => {
                self.run("COMMIT;")?;
                Ok(result)
            }
            Err(err) => {
                if let Err(rollback_err) = self.run("ROLLBACK;") {
                    tracing::warn!(error = %rollback_err, "rollback after failed statement also failed");
                }
                Err(err)
            }
        }
    }

    fn begin(&self) -> StorageResult<()> {
        self.run("BEGIN TRANSACTION;")?;
        self.in_transaction.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// A failed `COMMIT;` leaves the transaction open for `rollback`.
    fn commit(&self) -> StorageResult<()> {
        self.run("COMMIT;")?;
        self.in_transaction.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&self) -> StorageResult<()> {
        self.in_transaction.store(false, Ordering::SeqCst);
        self.run("ROLLBACK;").map(|_| ())
    }
}
