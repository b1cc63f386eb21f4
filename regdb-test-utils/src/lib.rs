//! regdb Test Utilities
//!
//! Shared test infrastructure for the regdb workspace:
//! - Proptest generators for names, scopes and argument documents
//! - Catalog fixtures seeded with the default rows
//! - Assertions over catalog contents

// Re-export the in-memory catalog from its source crate
pub use regdb_storage::{CatalogConnection, MockCatalog};

// Re-export core types for convenience
pub use regdb_core::{
    CatalogLayout, EntityKind, Scope, StorageError, StorageResult, MODEL_ARG_KEYS,
    REGSPACE_ARG_KEYS,
};

use serde_json::{json, Map, Value};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for regdb values.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_entity_kind() -> impl Strategy<Value = EntityKind> {
        prop_oneof![Just(EntityKind::Model), Just(EntityKind::RegSpace)]
    }

    pub fn arb_scope() -> impl Strategy<Value = Scope> {
        prop_oneof![Just(Scope::Local), Just(Scope::Global)]
    }

    /// Non-empty entity name, including quote and backslash characters.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_' \\\\-]{1,24}"
    }

    /// Model type tag such as `MLP` or `Cnn2`.
    pub fn arb_type_tag() -> impl Strategy<Value = String> {
        "[A-Z][A-Za-z0-9]{0,8}"
    }

    /// Any JSON value without floats. Strings may contain braces and quotes.
    pub fn arb_arg_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 {}\"'\\\\]{0,12}".prop_map(Value::from),
        ];
        leaf.prop_recursive(2, 12, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_]{1,8}", inner, 0..3)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    /// Argument document with exactly the required keys for `kind`.
    pub fn arb_args(kind: EntityKind) -> impl Strategy<Value = Value> {
        let keys = kind.required_arg_keys();
        prop::collection::vec(arb_arg_value(), keys.len()).prop_map(move |values| {
            let object: Map<String, Value> = keys
                .iter()
                .map(|key| key.to_string())
                .zip(values)
                .collect();
            Value::Object(object)
        })
    }

    /// Valid document plus one key outside the required set.
    pub fn arb_args_with_extra_key(kind: EntityKind) -> impl Strategy<Value = Value> {
        (arb_args(kind), "x_[a-z_]{1,12}", arb_arg_value()).prop_map(|(mut args, key, value)| {
            if let Value::Object(object) = &mut args {
                object.insert(key, value);
            }
            args
        })
    }

    /// Valid document with one required key removed.
    pub fn arb_args_missing_key(kind: EntityKind) -> impl Strategy<Value = Value> {
        let keys = kind.required_arg_keys();
        (arb_args(kind), 0..keys.len()).prop_map(move |(mut args, index)| {
            if let Value::Object(object) = &mut args {
                object.remove(keys[index]);
            }
            args
        })
    }

    /// Regspace flags with random booleans.
    pub fn arb_regspace_flags() -> impl Strategy<Value = Value> {
        prop::collection::vec(any::<bool>(), REGSPACE_ARG_KEYS.len())
            .prop_map(|flags| fixtures::regspace_flags_from(&flags))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built catalogs and argument documents.

    use super::*;

    /// Catalog pair holding only the default global model and regspace.
    pub fn seeded_catalog() -> MockCatalog {
        let catalog = MockCatalog::new();
        catalog
            .seed_defaults()
            .unwrap_or_else(|e| panic!("seeding the in-memory catalog failed: {e}"));
        catalog
    }

    /// Catalog pair holding the given rows with fixture arguments.
    pub fn catalog_with(rows: &[(Scope, EntityKind, &str)]) -> MockCatalog {
        let catalog = MockCatalog::new();
        for (scope, kind, name) in rows {
            let (entity_type, args) = match kind {
                EntityKind::Model => (Some("MLP"), model_args()),
                EntityKind::RegSpace => (None, regspace_flags(true)),
            };
            catalog
                .insert_row(*scope, *kind, name, entity_type, args)
                .unwrap_or_else(|e| panic!("fixture insert failed: {e}"));
        }
        catalog
    }

    pub fn model_args() -> Value {
        json!({"in_features": 10, "out_features": 2, "hidden_features": [4]})
    }

    /// Every regspace flag set to `value`.
    pub fn regspace_flags(value: bool) -> Value {
        regspace_flags_from(&[value; REGSPACE_ARG_KEYS.len()])
    }

    pub(crate) fn regspace_flags_from(flags: &[bool]) -> Value {
        let object: Map<String, Value> = REGSPACE_ARG_KEYS
            .iter()
            .zip(flags)
            .map(|(key, flag)| (key.to_string(), Value::Bool(*flag)))
            .collect();
        Value::Object(object)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over catalog contents.

    use super::*;

    /// Assert that `name` lives in `scope` and not in the other catalog.
    #[track_caller]
    pub fn assert_only_in(catalog: &MockCatalog, scope: Scope, kind: EntityKind, name: &str) {
        let found = catalog.locate(kind, name);
        assert_eq!(
            found,
            Ok(Some(scope)),
            "expected {kind} '{name}' in the {scope} catalog"
        );
        assert_eq!(
            catalog.contains(scope.other(), kind, name),
            Ok(false),
            "{kind} '{name}' is also in the {} catalog",
            scope.other()
        );
    }

    /// Assert that neither catalog holds `name`.
    #[track_caller]
    pub fn assert_absent(catalog: &MockCatalog, kind: EntityKind, name: &str) {
        assert_eq!(
            catalog.locate(kind, name),
            Ok(None),
            "expected {kind} '{name}' to be absent"
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_catalog_has_defaults() {
        let catalog = fixtures::seeded_catalog();
        assertions::assert_only_in(&catalog, Scope::Global, EntityKind::Model, "default");
        assertions::assert_only_in(&catalog, Scope::Global, EntityKind::RegSpace, "default");
        assertions::assert_absent(&catalog, EntityKind::Model, "missing");
    }

    #[test]
    fn test_catalog_with_rows() {
        let catalog = fixtures::catalog_with(&[
            (Scope::Local, EntityKind::Model, "m1"),
            (Scope::Global, EntityKind::RegSpace, "r1"),
        ]);
        assertions::assert_only_in(&catalog, Scope::Local, EntityKind::Model, "m1");
        assertions::assert_only_in(&catalog, Scope::Global, EntityKind::RegSpace, "r1");
    }

    #[test]
    fn test_regspace_flags_cover_every_key() {
        let flags = fixtures::regspace_flags(false);
        let object = flags.as_object().unwrap();
        assert_eq!(object.len(), REGSPACE_ARG_KEYS.len());
        assert!(object.values().all(|v| v == &Value::Bool(false)));
    }

    proptest! {
        #[test]
        fn prop_model_args_have_required_keys(
            args in generators::arb_args(EntityKind::Model),
        ) {
            let keys: Vec<&str> = args.as_object().unwrap().keys().map(String::as_str).collect();
            let mut expected: Vec<&str> = MODEL_ARG_KEYS.to_vec();
            expected.sort_unstable();
            prop_assert_eq!(keys, expected);
        }

        #[test]
        fn prop_missing_key_drops_exactly_one(
            args in generators::arb_args_missing_key(EntityKind::RegSpace),
        ) {
            prop_assert_eq!(args.as_object().unwrap().len(), REGSPACE_ARG_KEYS.len() - 1);
        }

        #[test]
        fn prop_names_are_non_empty(name in generators::arb_name()) {
            prop_assert!(!name.is_empty());
        }
    }
}
