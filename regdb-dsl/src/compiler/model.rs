use super::{CompileResult, CompiledStatement, Lowering, ToSql};
use crate::parser::ModelStatement;
use regdb_core::{CatalogLayout, EntityKind};
use regdb_storage::CatalogConnection;

/// Lowers model statements against the model tables.
#[derive(Debug, Clone, Default)]
pub struct ModelCompiler {
    layout: CatalogLayout,
}

impl ModelCompiler {
    pub fn new(layout: CatalogLayout) -> Self {
        Self { layout }
    }
}

impl ToSql for ModelCompiler {
    type Statement = ModelStatement;

    fn to_sql(
        &self,
        statement: &ModelStatement,
        conn: &dyn CatalogConnection,
    ) -> CompileResult<CompiledStatement> {
        let lower = Lowering::new(&self.layout, conn, EntityKind::Model);
        match statement {
            ModelStatement::Create {
                scope,
                name,
                model_type,
                args,
            } => lower.create(*scope, name, Some(model_type.as_str()), args),
            ModelStatement::Delete { name } => lower.delete(name),
            ModelStatement::Update {
                name,
                model_type,
                args,
            } => lower.update(name, Some(model_type.as_str()), args),
            ModelStatement::UpdateScope { name, scope } => lower.update_scope(name, *scope),
            ModelStatement::Get { name } => Ok(lower.select(Some(name.as_str()))),
            ModelStatement::GetAll => Ok(lower.select(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileError;
    use regdb_core::Scope;
    use regdb_storage::{CatalogQuery, MockCatalog};
    use serde_json::json;

    fn args() -> serde_json::Value {
        json!({"in_features": 10, "out_features": 2, "hidden_features": [4]})
    }

    fn catalog_with(scope: Scope, name: &str) -> MockCatalog {
        let catalog = MockCatalog::new();
        catalog
            .insert_row(scope, EntityKind::Model, name, Some("MLP"), args())
            .unwrap();
        catalog
    }

    #[test]
    fn test_create_emits_insert() {
        let compiled = ModelCompiler::default()
            .to_sql(
                &ModelStatement::Create {
                    scope: Scope::Local,
                    name: "m1".to_string(),
                    model_type: "MLP".to_string(),
                    args: args(),
                },
                &MockCatalog::new(),
            )
            .unwrap();
        assert_eq!(
            compiled.sql,
            "INSERT INTO regdb_config.REGDB_MODEL_ARCH_TABLE (model_name, model_type, model_args) \
             VALUES ('m1', 'MLP', '{\"hidden_features\":[4],\"in_features\":10,\"out_features\":2}');"
        );
    }

    #[test]
    fn test_create_checks_only_target_catalog() {
        let catalog = catalog_with(Scope::Local, "m1");
        let stmt = |scope| ModelStatement::Create {
            scope,
            name: "m1".to_string(),
            model_type: "MLP".to_string(),
            args: args(),
        };
        let err = ModelCompiler::default()
            .to_sql(&stmt(Scope::Local), &catalog)
            .unwrap_err();
        assert!(matches!(err, CompileError::AlreadyExists { scope: Scope::Local, .. }));

        assert!(ModelCompiler::default()
            .to_sql(&stmt(Scope::Global), &catalog)
            .is_ok());
    }

    #[test]
    fn test_update_targets_owning_catalog() {
        let catalog = catalog_with(Scope::Global, "m1");
        let compiled = ModelCompiler::default()
            .to_sql(
                &ModelStatement::Update {
                    name: "m1".to_string(),
                    model_type: "CNN".to_string(),
                    args: args(),
                },
                &catalog,
            )
            .unwrap();
        assert!(matches!(
            compiled.query,
            CatalogQuery::Update { scope: Scope::Global, .. }
        ));
        assert!(compiled
            .sql
            .starts_with("UPDATE regdb_storage.regdb_config.REGDB_MODEL_ARCH_TABLE SET model_type = 'CNN'"));
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let err = ModelCompiler::default()
            .to_sql(
                &ModelStatement::Update {
                    name: "ghost".to_string(),
                    model_type: "MLP".to_string(),
                    args: args(),
                },
                &MockCatalog::new(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::NotFound {
                kind: EntityKind::Model,
                name: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_update_scope_emits_single_migration() {
        let catalog = catalog_with(Scope::Local, "m1");
        let compiled = ModelCompiler::default()
            .to_sql(
                &ModelStatement::UpdateScope {
                    name: "m1".to_string(),
                    scope: Scope::Global,
                },
                &catalog,
            )
            .unwrap();
        assert!(compiled.sql.starts_with("BEGIN TRANSACTION;"));
        assert!(compiled.sql.ends_with("COMMIT;"));
        // Compiling does not move anything.
        assert!(catalog.row(Scope::Local, EntityKind::Model, "m1").unwrap().is_some());
        assert_eq!(catalog.count(Scope::Global, EntityKind::Model).unwrap(), 0);
    }

    #[test]
    fn test_update_scope_to_current_catalog_fails() {
        let catalog = catalog_with(Scope::Local, "m1");
        let err = ModelCompiler::default()
            .to_sql(
                &ModelStatement::UpdateScope {
                    name: "m1".to_string(),
                    scope: Scope::Local,
                },
                &catalog,
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::AlreadyExists { scope: Scope::Local, .. }));
    }

    #[test]
    fn test_update_scope_missing_source() {
        let err = ModelCompiler::default()
            .to_sql(
                &ModelStatement::UpdateScope {
                    name: "m1".to_string(),
                    scope: Scope::Global,
                },
                &MockCatalog::new(),
            )
            .unwrap_err();
        assert!(matches!(err, CompileError::NotFound { .. }));
    }

    #[test]
    fn test_delete_runs_local_and_returns_global() {
        let catalog = catalog_with(Scope::Local, "m1");
        let compiled = ModelCompiler::default()
            .to_sql(
                &ModelStatement::Delete {
                    name: "m1".to_string(),
                },
                &catalog,
            )
            .unwrap();
        assert_eq!(catalog.count(Scope::Local, EntityKind::Model).unwrap(), 0);
        assert_eq!(compiled.immediate_rows_affected(), 1);
        assert_eq!(
            compiled.sql,
            "DELETE FROM regdb_storage.regdb_config.REGDB_MODEL_ARCH_TABLE WHERE model_name = 'm1';"
        );
    }

    #[test]
    fn test_get_has_name_filter() {
        let compiled = ModelCompiler::default()
            .to_sql(
                &ModelStatement::Get {
                    name: "m1".to_string(),
                },
                &MockCatalog::new(),
            )
            .unwrap();
        assert!(compiled.sql.contains("WHERE model_name = 'm1'"));
        assert!(compiled.sql.contains("UNION ALL"));
    }
}
