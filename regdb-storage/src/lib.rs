//! regdb Storage - Catalog Connection Trait and In-Memory Catalog
//!
//! Defines the connection seam the DSL compiler talks to. The host engine
//! is reached through `SqlCatalog`, which renders each `CatalogQuery` to SQL
//! text; `MockCatalog` keeps both catalogs in memory for tests and tools.

pub mod query;
pub mod sql;

pub use query::{quote_literal, CatalogQuery};
pub use sql::{SqlCatalog, SqlExecutor};

use chrono::{DateTime, Utc};
use regdb_core::{CatalogLayout, EntityKind, Scope, StorageError, StorageResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

// ============================================================================
// QUERY RESULT
// ============================================================================

/// Rows and row count returned by a catalog operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Rows inserted, updated or deleted. Zero for reads.
    pub rows_affected: u64,
}

impl QueryResult {
    /// Result of a write touching `count` rows.
    pub fn affected(count: u64) -> Self {
        Self {
            rows_affected: count,
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn value(&self, column: &str, row: usize) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    pub fn str_value(&self, column: &str, row: usize) -> Option<&str> {
        self.value(column, row)?.as_str()
    }
}

// ============================================================================
// CATALOG CONNECTION
// ============================================================================

/// A connection able to read and write both catalogs.
///
/// Callers that need check-then-act to be race-free wrap the check and the
/// follow-up write between `begin` and `commit`.
pub trait CatalogConnection: Send + Sync {
    /// Identifiers this connection renders its queries with.
    fn layout(&self) -> &CatalogLayout;

    /// Run one catalog operation.
    fn execute(&self, query: &CatalogQuery) -> StorageResult<QueryResult>;

    fn begin(&self) -> StorageResult<()>;

    fn commit(&self) -> StorageResult<()>;

    fn rollback(&self) -> StorageResult<()>;

    /// Whether `name` exists in the given catalog.
    fn contains(&self, scope: Scope, kind: EntityKind, name: &str) -> StorageResult<bool> {
        let result = self.execute(&CatalogQuery::Lookup {
            scope,
            kind,
            name: name.to_string(),
        })?;
        Ok(!result.is_empty())
    }

    /// Which catalog currently holds `name`, if any.
    fn locate(&self, kind: EntityKind, name: &str) -> StorageResult<Option<Scope>> {
        let result = self.execute(&CatalogQuery::Locate {
            kind,
            name: name.to_string(),
        })?;
        if result.is_empty() {
            return Ok(None);
        }
        let label = result
            .str_value("scope", 0)
            .ok_or_else(|| StorageError::UnexpectedResult {
                reason: "locate result has no scope column".to_string(),
            })?;
        Scope::from_label(label)
            .map(Some)
            .ok_or_else(|| StorageError::UnexpectedResult {
                reason: format!("unknown scope label '{}'", label),
            })
    }
}

// ============================================================================
// MOCK CATALOG
// ============================================================================

/// One stored entity.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub name: String,
    pub entity_type: Option<String>,
    pub args: Value,
    pub updated_at: DateTime<Utc>,
}

type Table = BTreeMap<String, CatalogRow>;

#[derive(Debug, Clone, Default)]
struct CatalogState {
    tables: HashMap<(Scope, EntityKind), Table>,
}

impl CatalogState {
    fn table(&self, scope: Scope, kind: EntityKind) -> Option<&Table> {
        self.tables.get(&(scope, kind))
    }

    fn table_mut(&mut self, scope: Scope, kind: EntityKind) -> &mut Table {
        self.tables.entry((scope, kind)).or_default()
    }

    fn get(&self, scope: Scope, kind: EntityKind, name: &str) -> Option<&CatalogRow> {
        self.table(scope, kind)?.get(name)
    }
}

/// In-memory two-catalog store.
///
/// Clones share the same state. Transactions snapshot the whole store on
/// `begin` and restore it on `rollback`.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    layout: CatalogLayout,
    state: Arc<RwLock<CatalogState>>,
    snapshot: Arc<RwLock<Option<CatalogState>>>,
    executed: Arc<RwLock<Vec<CatalogQuery>>>,
}

impl MockCatalog {
    /// Create an empty catalog pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog pair reporting `layout` to its callers.
    pub fn with_layout(layout: CatalogLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Insert the default global rows every fresh installation starts with.
    pub fn seed_defaults(&self) -> StorageResult<()> {
        self.insert_row(
            Scope::Global,
            EntityKind::Model,
            "default",
            Some("MLP"),
            serde_json::json!({
                "in_features": 10,
                "out_features": 2,
                "hidden_features": [512, 512, 512, 512, 512, 512],
            }),
        )?;
        self.insert_row(
            Scope::Global,
            EntityKind::RegSpace,
            "default",
            None,
            serde_json::json!({
                "use_weight_decay": true,
                "use_dropout": true,
                "use_bn": true,
                "use_ln": true,
                "use_skip": true,
                "use_data_augment": true,
                "use_swa": true,
                "use_lookahead": true,
            }),
        )
    }

    /// Insert a row directly, bypassing the query log.
    pub fn insert_row(
        &self,
        scope: Scope,
        kind: EntityKind,
        name: &str,
        entity_type: Option<&str>,
        args: Value,
    ) -> StorageResult<()> {
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        insert(
            &mut state,
            scope,
            kind,
            CatalogRow {
                name: name.to_string(),
                entity_type: entity_type.map(str::to_string),
                args,
                updated_at: Utc::now(),
            },
        )
    }

    /// Fetch a row from one catalog.
    pub fn row(&self, scope: Scope, kind: EntityKind, name: &str) -> StorageResult<Option<CatalogRow>> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state.get(scope, kind, name).cloned())
    }

    /// Number of rows in one catalog table.
    pub fn count(&self, scope: Scope, kind: EntityKind) -> StorageResult<usize> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(state.table(scope, kind).map_or(0, Table::len))
    }

    /// Every query executed so far, oldest first.
    pub fn executed(&self) -> StorageResult<Vec<CatalogQuery>> {
        let executed = self.executed.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(executed.clone())
    }

    /// Empty the query log.
    pub fn clear_executed(&self) -> StorageResult<()> {
        self.executed
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .clear();
        Ok(())
    }

    pub fn in_transaction(&self) -> StorageResult<bool> {
        let snapshot = self.snapshot.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(snapshot.is_some())
    }
}

fn insert(state: &mut CatalogState, scope: Scope, kind: EntityKind, row: CatalogRow) -> StorageResult<()> {
    let table = state.table_mut(scope, kind);
    if table.contains_key(&row.name) {
        return Err(StorageError::InsertFailed {
            kind,
            name: row.name,
            scope,
            reason: "duplicate primary key".to_string(),
        });
    }
    table.insert(row.name.clone(), row);
    Ok(())
}

fn parse_args(args: &str) -> StorageResult<Value> {
    serde_json::from_str(args).map_err(|e| StorageError::QueryFailed {
        reason: format!("invalid JSON value: {}", e),
    })
}

fn select_columns(kind: EntityKind) -> Vec<String> {
    let mut columns = vec!["scope".to_string()];
    columns.extend(kind.columns().into_iter().map(str::to_string));
    columns.push("updated_at".to_string());
    columns
}

fn select_row(scope: Scope, kind: EntityKind, row: &CatalogRow) -> Vec<Value> {
    let mut values = vec![Value::from(scope.as_str()), Value::from(row.name.as_str())];
    if kind.type_column().is_some() {
        values.push(row.entity_type.clone().map_or(Value::Null, Value::from));
    }
    values.push(row.args.clone());
    values.push(Value::from(row.updated_at.to_rfc3339()));
    values
}

impl CatalogConnection for MockCatalog {
    fn layout(&self) -> &CatalogLayout {
        &self.layout
    }

    fn execute(&self, query: &CatalogQuery) -> StorageResult<QueryResult> {
        self.executed
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .push(query.clone());
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;

        match query {
            CatalogQuery::Lookup { scope, kind, name } => {
                let rows = state
                    .get(*scope, *kind, name)
                    .map(|row| vec![Value::from(row.name.as_str())])
                    .into_iter()
                    .collect();
                Ok(QueryResult {
                    columns: vec![kind.key_column().to_string()],
                    rows,
                    rows_affected: 0,
                })
            }
            CatalogQuery::Locate { kind, name } => {
                let rows = Scope::ALL
                    .iter()
                    .filter_map(|scope| state.get(*scope, *kind, name).map(|row| (scope, row)))
                    .map(|(scope, row)| vec![Value::from(row.name.as_str()), Value::from(scope.as_str())])
                    .collect();
                Ok(QueryResult {
                    columns: vec![kind.key_column().to_string(), "scope".to_string()],
                    rows,
                    rows_affected: 0,
                })
            }
            CatalogQuery::Insert {
                scope,
                kind,
                name,
                entity_type,
                args,
            } => {
                let row = CatalogRow {
                    name: name.clone(),
                    entity_type: entity_type.clone(),
                    args: parse_args(args)?,
                    updated_at: Utc::now(),
                };
                insert(&mut state, *scope, *kind, row)?;
                Ok(QueryResult::affected(1))
            }
            CatalogQuery::Update {
                scope,
                kind,
                name,
                entity_type,
                args,
            } => {
                let args = parse_args(args)?;
                let Some(row) = state.table_mut(*scope, *kind).get_mut(name) else {
                    return Ok(QueryResult::affected(0));
                };
                if kind.type_column().is_some() && entity_type.is_some() {
                    row.entity_type = entity_type.clone();
                }
                row.args = args;
                row.updated_at = Utc::now();
                Ok(QueryResult::affected(1))
            }
            CatalogQuery::Delete { scope, kind, name } => {
                let removed = state.table_mut(*scope, *kind).remove(name);
                Ok(QueryResult::affected(u64::from(removed.is_some())))
            }
            CatalogQuery::Migrate { kind, name, to } => {
                let from = to.other();
                let Some(row) = state.get(from, *kind, name).cloned() else {
                    return Ok(QueryResult::affected(0));
                };
                insert(&mut state, *to, *kind, row)?;
                state.table_mut(from, *kind).remove(name);
                Ok(QueryResult::affected(1))
            }
            CatalogQuery::Select { kind, name } => {
                let mut rows = Vec::new();
                for scope in Scope::ALL {
                    let Some(table) = state.table(scope, *kind) else {
                        continue;
                    };
                    rows.extend(
                        table
                            .values()
                            .filter(|row| name.as_ref().map_or(true, |n| &row.name == n))
                            .map(|row| select_row(scope, *kind, row)),
                    );
                }
                Ok(QueryResult {
                    columns: select_columns(*kind),
                    rows,
                    rows_affected: 0,
                })
            }
        }
    }

    fn begin(&self) -> StorageResult<()> {
        let state = self.state.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut snapshot = self.snapshot.write().map_err(|_| StorageError::LockPoisoned)?;
        if snapshot.is_some() {
            return Err(StorageError::TransactionFailed {
                reason: "a transaction is already open".to_string(),
            });
        }
        *snapshot = Some(state.clone());
        Ok(())
    }

    fn commit(&self) -> StorageResult<()> {
        let mut snapshot = self.snapshot.write().map_err(|_| StorageError::LockPoisoned)?;
        snapshot.take().map(|_| ()).ok_or_else(|| StorageError::TransactionFailed {
            reason: "no open transaction to commit".to_string(),
        })
    }

    fn rollback(&self) -> StorageResult<()> {
        let mut snapshot = self.snapshot.write().map_err(|_| StorageError::LockPoisoned)?;
        let saved = snapshot.take().ok_or_else(|| StorageError::TransactionFailed {
            reason: "no open transaction to roll back".to_string(),
        })?;
        let mut state = self.state.write().map_err(|_| StorageError::LockPoisoned)?;
        *state = saved;
        Ok(())
    }
}
