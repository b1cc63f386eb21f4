//! Statement execution against a catalog connection.

use crate::compiler::{compile, CompiledStatement};
use crate::parser::{parse, Statement};
use crate::DslResult;
use regdb_core::CatalogLayout;
use regdb_storage::{CatalogConnection, QueryResult};

/// Everything produced while executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub statement: Statement,
    pub compiled: CompiledStatement,
    pub result: QueryResult,
}

/// Runs DSL statements against one connection.
///
/// Statements are compiled with the connection's own layout, so the SQL
/// reported in an `Execution` is the SQL the connection runs. Each
/// statement's precondition checks, immediate side effects and emitted
/// query share one transaction, so check-then-act is race-free.
#[derive(Debug, Clone)]
pub struct Session<C> {
    conn: C,
}

impl<C: CatalogConnection> Session<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn layout(&self) -> &CatalogLayout {
        self.conn.layout()
    }

    /// Parse, compile and execute one statement.
    ///
    /// Parse errors are reported before a transaction is opened. Any later
    /// failure, a failed commit included, rolls the transaction back.
    pub fn execute(&self, input: &str) -> DslResult<Execution> {
        let statement = parse(input)?;
        self.conn.begin()?;

        let (compiled, result) = match self.run(&statement) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    statement = %statement.statement_type(),
                    error = %err,
                    "statement rolled back"
                );
                self.rollback();
                return Err(err);
            }
        };

        if let Err(err) = self.conn.commit() {
            tracing::warn!(
                statement = %statement.statement_type(),
                error = %err,
                "commit failed, rolling back"
            );
            self.rollback();
            return Err(err.into());
        }

        tracing::info!(
            statement = %statement.statement_type(),
            name = statement.name().unwrap_or("*"),
            rows = result.row_count(),
            rows_affected = result.rows_affected,
            "statement committed"
        );
        Ok(Execution {
            statement,
            compiled,
            result,
        })
    }

    /// Rows written while compiling count toward the statement's result.
    fn run(&self, statement: &Statement) -> DslResult<(CompiledStatement, QueryResult)> {
        let compiled = compile(statement, self.conn.layout(), &self.conn)?;
        let mut result = self.conn.execute(&compiled.query)?;
        result.rows_affected += compiled.immediate_rows_affected();
        Ok((compiled, result))
    }

    fn rollback(&self) {
        if let Err(err) = self.conn.rollback() {
            tracing::warn!(error = %err, "rollback failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;
    use crate::DslError;
    use regdb_core::{EntityKind, Scope};
    use regdb_storage::MockCatalog;

    const CREATE: &str =
        r#"CREATE MODEL ('m1', 'MLP', {"in_features":10,"out_features":2,"hidden_features":[4]});"#;

    fn session() -> Session<MockCatalog> {
        Session::new(MockCatalog::new())
    }

    #[test]
    fn test_execute_create_then_get() {
        let session = session();
        let created = session.execute(CREATE).unwrap();
        assert_eq!(created.result.rows_affected, 1);

        let fetched = session.execute("GET MODEL 'm1'").unwrap();
        assert_eq!(fetched.result.row_count(), 1);
        assert_eq!(fetched.result.str_value("scope", 0), Some("local"));
        assert!(!session.connection().in_transaction().unwrap());
    }

    #[test]
    fn test_compile_failure_rolls_back() {
        let session = session();
        session.execute(CREATE).unwrap();

        let err = session.execute(CREATE).unwrap_err();
        assert!(matches!(
            err,
            DslError::Compile(CompileError::AlreadyExists { scope: Scope::Local, .. })
        ));
        assert!(!session.connection().in_transaction().unwrap());
        assert_eq!(
            session.connection().count(Scope::Local, EntityKind::Model).unwrap(),
            1
        );
    }

    #[test]
    fn test_parse_failure_opens_no_transaction() {
        let session = session();
        assert!(matches!(
            session.execute("DROP MODEL 'm1'"),
            Err(DslError::Parse(_))
        ));
        assert!(session.connection().executed().unwrap().is_empty());
    }

    #[test]
    fn test_migration_moves_row() {
        let session = session();
        session.execute(CREATE).unwrap();
        let moved = session.execute("UPDATE MODEL 'm1' TO GLOBAL").unwrap();
        assert_eq!(moved.result.rows_affected, 1);
        assert_eq!(
            session.connection().locate(EntityKind::Model, "m1").unwrap(),
            Some(Scope::Global)
        );
    }

    /// Delegates to an in-memory catalog but refuses every commit.
    struct CommitFails(MockCatalog);

    impl CatalogConnection for CommitFails {
        fn layout(&self) -> &CatalogLayout {
            self.0.layout()
        }

        fn execute(&self, query: &regdb_storage::CatalogQuery) -> regdb_core::StorageResult<QueryResult> {
            self.0.execute(query)
        }

        fn begin(&self) -> regdb_core::StorageResult<()> {
            self.0.begin()
        }

        fn commit(&self) -> regdb_core::StorageResult<()> {
            Err(regdb_core::StorageError::TransactionFailed {
                reason: "disk full".to_string(),
            })
        }

        fn rollback(&self) -> regdb_core::StorageResult<()> {
            self.0.rollback()
        }
    }

    #[test]
    fn test_commit_failure_rolls_back() {
        let catalog = MockCatalog::new();
        let session = Session::new(CommitFails(catalog.clone()));

        let err = session.execute(CREATE).unwrap_err();
        assert!(matches!(
            err,
            DslError::Storage(regdb_core::StorageError::TransactionFailed { .. })
        ));
        assert!(!catalog.in_transaction().unwrap());
        assert_eq!(catalog.count(Scope::Local, EntityKind::Model).unwrap(), 0);
    }

    #[test]
    fn test_compiles_with_connection_layout() {
        let layout = CatalogLayout {
            global_catalog: "persist".to_string(),
            ..CatalogLayout::default()
        };
        let session = Session::new(MockCatalog::with_layout(layout.clone()));
        assert_eq!(session.layout(), &layout);

        let fetched = session.execute("GET MODELS").unwrap();
        assert!(fetched.compiled.sql.contains("FROM persist.regdb_config."));
    }

    #[test]
    fn test_local_delete_counts_toward_rows_affected() {
        let session = session();
        session.execute(CREATE).unwrap();

        let deleted = session.execute("DELETE MODEL 'm1'").unwrap();
        assert_eq!(deleted.compiled.immediate_rows_affected(), 1);
        assert_eq!(deleted.result.rows_affected, 1);
    }
}
