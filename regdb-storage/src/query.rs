//! Structured catalog queries and their SQL rendering.

use regdb_core::{CatalogLayout, EntityKind, Scope};
use serde::{Deserialize, Serialize};

/// One operation against the catalogs.
///
/// Connections either interpret these directly (the in-memory catalog) or
/// render them to SQL text for the host engine (`SqlCatalog`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogQuery {
    /// Key of `name` in one catalog (zero or one row).
    Lookup {
        scope: Scope,
        kind: EntityKind,
        name: String,
    },
    /// `(key, scope)` rows for `name` across both catalogs.
    Locate { kind: EntityKind, name: String },
    Insert {
        scope: Scope,
        kind: EntityKind,
        name: String,
        entity_type: Option<String>,
        /// Canonical JSON text.
        args: String,
    },
    Update {
        scope: Scope,
        kind: EntityKind,
        name: String,
        entity_type: Option<String>,
        args: String,
    },
    Delete {
        scope: Scope,
        kind: EntityKind,
        name: String,
    },
    /// Copy the row into `to`, then delete it from the other catalog, as one
    /// transaction.
    Migrate {
        kind: EntityKind,
        name: String,
        to: Scope,
    },
    /// All columns from both catalogs, tagged with a literal `scope`
    /// column. `None` lists every entity.
    Select {
        kind: EntityKind,
        name: Option<String>,
    },
}

impl CatalogQuery {
    pub fn kind(&self) -> EntityKind {
        match self {
            CatalogQuery::Lookup { kind, .. }
            | CatalogQuery::Locate { kind, .. }
            | CatalogQuery::Insert { kind, .. }
            | CatalogQuery::Update { kind, .. }
            | CatalogQuery::Delete { kind, .. }
            | CatalogQuery::Migrate { kind, .. }
            | CatalogQuery::Select { kind, .. } => *kind,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            CatalogQuery::Lookup { .. } | CatalogQuery::Locate { .. } | CatalogQuery::Select { .. }
        )
    }

    /// Bare SQL statements in execution order, without transaction control.
    pub fn statements(&self, layout: &CatalogLayout) -> Vec<String> {
        match self {
            CatalogQuery::Lookup { scope, kind, name } => {
                let key = kind.key_column();
                vec![format!(
                    "SELECT {key} FROM {} WHERE {key} = {};",
                    layout.qualified_table(*scope, *kind),
                    quote_literal(name)
                )]
            }
            CatalogQuery::Locate { kind, name } => {
                let key = kind.key_column();
                let name = quote_literal(name);
                vec![format!(
                    "SELECT {key}, 'global' AS scope FROM {} WHERE {key} = {name} \
                     UNION ALL \
                     SELECT {key}, 'local' AS scope FROM {} WHERE {key} = {name};",
                    layout.qualified_table(Scope::Global, *kind),
                    layout.qualified_table(Scope::Local, *kind),
                )]
            }
            CatalogQuery::Insert {
                scope,
                kind,
                name,
                entity_type,
                args,
            } => {
                let mut values = vec![quote_literal(name)];
                if kind.type_column().is_some() {
                    values.push(quote_literal(entity_type.as_deref().unwrap_or_default()));
                }
                values.push(quote_literal(args));
                vec![format!(
                    "INSERT INTO {} ({}) VALUES ({});",
                    layout.qualified_table(*scope, *kind),
                    kind.columns().join(", "),
                    values.join(", ")
                )]
            }
            CatalogQuery::Update {
                scope,
                kind,
                name,
                entity_type,
                args,
            } => {
                let mut assignments = Vec::new();
                if let (Some(column), Some(value)) = (kind.type_column(), entity_type) {
                    assignments.push(format!("{column} = {}", quote_literal(value)));
                }
                assignments.push(format!("{} = {}", kind.args_column(), quote_literal(args)));
                vec![format!(
                    "UPDATE {} SET {} WHERE {} = {};",
                    layout.qualified_table(*scope, *kind),
                    assignments.join(", "),
                    kind.key_column(),
                    quote_literal(name)
                )]
            }
            CatalogQuery::Delete { scope, kind, name } => vec![delete_sql(layout, *scope, *kind, name)],
            CatalogQuery::Migrate { kind, name, to } => {
                let columns = kind.columns().join(", ");
                let from = to.other();
                vec![
                    format!(
                        "INSERT INTO {} ({columns}) SELECT {columns} FROM {} WHERE {} = {};",
                        layout.qualified_table(*to, *kind),
                        layout.qualified_table(from, *kind),
                        kind.key_column(),
                        quote_literal(name)
                    ),
                    delete_sql(layout, from, *kind, name),
                ]
            }
            CatalogQuery::Select { kind, name } => {
                let filter = name
                    .as_ref()
                    .map(|n| format!(" WHERE {} = {}", kind.key_column(), quote_literal(n)))
                    .unwrap_or_default();
                vec![format!(
                    "SELECT 'global' AS scope, * FROM {}{filter} \
                     UNION ALL \
                     SELECT 'local' AS scope, * FROM {}{filter};",
                    layout.qualified_table(Scope::Global, *kind),
                    layout.qualified_table(Scope::Local, *kind),
                )]
            }
        }
    }

    /// SQL text for the whole query. Multi-statement queries are wrapped in
    /// a transaction so the text can be executed as one atomic script.
    pub fn render(&self, layout: &CatalogLayout) -> String {
        let statements = self.statements(layout);
        if statements.len() == 1 {
            statements.concat()
        } else {
            format!("BEGIN TRANSACTION; {} COMMIT;", statements.join(" "))
        }
    }
}

fn delete_sql(layout: &CatalogLayout, scope: Scope, kind: EntityKind, name: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} = {};",
        layout.qualified_table(scope, kind),
        kind.key_column(),
        quote_literal(name)
    )
}

/// Quote a value as a SQL string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> CatalogLayout {
        CatalogLayout::default()
    }

    #[test]
    fn test_quote_literal_doubles_quotes() {
        assert_eq!(quote_literal("m1"), "'m1'");
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
    }

    #[test]
    fn test_render_lookup() {
        let query = CatalogQuery::Lookup {
            scope: Scope::Global,
            kind: EntityKind::Model,
            name: "m1".to_string(),
        };
        assert_eq!(
            query.render(&layout()),
            "SELECT model_name FROM regdb_storage.regdb_config.REGDB_MODEL_ARCH_TABLE \
             WHERE model_name = 'm1';"
        );
        assert!(query.is_read_only());
    }

    #[test]
    fn test_render_insert_model_and_regspace() {
        let model = CatalogQuery::Insert {
            scope: Scope::Local,
            kind: EntityKind::Model,
            name: "m1".to_string(),
            entity_type: Some("MLP".to_string()),
            args: r#"{"in_features":1}"#.to_string(),
        };
        assert_eq!(
            model.render(&layout()),
            "INSERT INTO regdb_config.REGDB_MODEL_ARCH_TABLE (model_name, model_type, model_args) \
             VALUES ('m1', 'MLP', '{\"in_features\":1}');"
        );

        let regspace = CatalogQuery::Insert {
            scope: Scope::Global,
            kind: EntityKind::RegSpace,
            name: "r1".to_string(),
            entity_type: None,
            args: "{}".to_string(),
        };
        assert_eq!(
            regspace.render(&layout()),
            "INSERT INTO regdb_storage.regdb_config.REGDB_REG_SPACE_TABLE (reg_space, reg_args) \
             VALUES ('r1', '{}');"
        );
    }

    #[test]
    fn test_render_update_skips_type_for_regspace() {
        let query = CatalogQuery::Update {
            scope: Scope::Local,
            kind: EntityKind::RegSpace,
            name: "r1".to_string(),
            entity_type: Some("ignored".to_string()),
            args: "{}".to_string(),
        };
        assert_eq!(
            query.render(&layout()),
            "UPDATE regdb_config.REGDB_REG_SPACE_TABLE SET reg_args = '{}' WHERE reg_space = 'r1';"
        );
    }

    #[test]
    fn test_render_migrate_is_one_transaction() {
        let query = CatalogQuery::Migrate {
            kind: EntityKind::Model,
            name: "m1".to_string(),
            to: Scope::Global,
        };
        let statements = query.statements(&layout());
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with(
            "INSERT INTO regdb_storage.regdb_config.REGDB_MODEL_ARCH_TABLE"
        ));
        assert!(statements[0].contains("FROM regdb_config.REGDB_MODEL_ARCH_TABLE WHERE"));
        assert_eq!(
            statements[1],
            "DELETE FROM regdb_config.REGDB_MODEL_ARCH_TABLE WHERE model_name = 'm1';"
        );

        let script = query.render(&layout());
        assert!(script.starts_with("BEGIN TRANSACTION; INSERT INTO"));
        assert!(script.ends_with("COMMIT;"));
        assert!(!query.is_read_only());
    }

    #[test]
    fn test_render_select_all_has_no_filter() {
        let query = CatalogQuery::Select {
            kind: EntityKind::RegSpace,
            name: None,
        };
        let sql = query.render(&layout());
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("'global' AS scope"));
        assert!(sql.contains("'local' AS scope"));
        assert!(sql.contains("UNION ALL"));
    }

    #[test]
    fn test_render_escapes_names() {
        let query = CatalogQuery::Delete {
            scope: Scope::Local,
            kind: EntityKind::Model,
            name: "x'; DROP TABLE t; --".to_string(),
        };
        assert_eq!(
            query.render(&layout()),
            "DELETE FROM regdb_config.REGDB_MODEL_ARCH_TABLE \
             WHERE model_name = 'x''; DROP TABLE t; --';"
        );
    }
}
