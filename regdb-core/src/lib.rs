//! regdb Core - Catalog Types
//!
//! Pure data types shared by the storage adapters and the DSL front end:
//! entity kinds, catalog scopes, argument key sets, catalog layout, and
//! the storage/config error types. No SQL execution lives here.

pub mod config;
pub mod error;

pub use config::*;
pub use error::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ARGUMENT KEY SETS
// ============================================================================

/// Keys a model's argument document must contain, no more and no fewer.
pub const MODEL_ARG_KEYS: [&str; 3] = ["in_features", "out_features", "hidden_features"];

/// Boolean flags a regspace's argument document must contain.
pub const REGSPACE_ARG_KEYS: [&str; 8] = [
    "use_weight_decay",
    "use_dropout",
    "use_bn",
    "use_ln",
    "use_skip",
    "use_data_augment",
    "use_swa",
    "use_lookahead",
];

// ============================================================================
// ENTITY KINDS
// ============================================================================

/// The two kinds of named configuration records managed by the catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Model,
    RegSpace,
}

impl EntityKind {
    /// Singular DSL keyword (`MODEL`, `REGSPACE`).
    pub fn keyword(self) -> &'static str {
        match self {
            EntityKind::Model => "MODEL",
            EntityKind::RegSpace => "REGSPACE",
        }
    }

    /// Plural DSL keyword used by `GET ...` to list every entity.
    pub fn plural_keyword(self) -> &'static str {
        match self {
            EntityKind::Model => "MODELS",
            EntityKind::RegSpace => "REGSPACES",
        }
    }

    /// Resolve a keyword (either spelling, any case) to an entity kind.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "MODEL" | "MODELS" => Some(EntityKind::Model),
            "REGSPACE" | "REGSPACES" => Some(EntityKind::RegSpace),
            _ => None,
        }
    }

    /// Primary key column.
    pub fn key_column(self) -> &'static str {
        match self {
            EntityKind::Model => "model_name",
            EntityKind::RegSpace => "reg_space",
        }
    }

    /// Type tag column. Only models carry one.
    pub fn type_column(self) -> Option<&'static str> {
        match self {
            EntityKind::Model => Some("model_type"),
            EntityKind::RegSpace => None,
        }
    }

    /// JSON arguments column.
    pub fn args_column(self) -> &'static str {
        match self {
            EntityKind::Model => "model_args",
            EntityKind::RegSpace => "reg_args",
        }
    }

    /// Data columns in table order (key, optional type, args).
    pub fn columns(self) -> Vec<&'static str> {
        let mut columns = vec![self.key_column()];
        columns.extend(self.type_column());
        columns.push(self.args_column());
        columns
    }

    /// The exact key set an argument document must have.
    pub fn required_arg_keys(self) -> &'static [&'static str] {
        match self {
            EntityKind::Model => &MODEL_ARG_KEYS,
            EntityKind::RegSpace => &REGSPACE_ARG_KEYS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Model => write!(f, "Model"),
            EntityKind::RegSpace => write!(f, "RegSpace"),
        }
    }
}

// ============================================================================
// CATALOG SCOPES
// ============================================================================

/// Which catalog holds an entity.
///
/// `Local` is the transient catalog of the current database (empty
/// qualifier); `Global` is the persistent catalog attached under the
/// configured global prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scope {
    #[default]
    Local,
    Global,
}

impl Scope {
    /// Both scopes, in the order result sets list them.
    pub const ALL: [Scope; 2] = [Scope::Global, Scope::Local];

    /// Lowercase label used in the literal `scope` result column.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Global => "global",
        }
    }

    /// DSL keyword (`LOCAL`, `GLOBAL`).
    pub fn keyword(self) -> &'static str {
        match self {
            Scope::Local => "LOCAL",
            Scope::Global => "GLOBAL",
        }
    }

    /// Resolve `GLOBAL` / `LOCAL` in any case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "LOCAL" => Some(Scope::Local),
            "GLOBAL" => Some(Scope::Global),
            _ => None,
        }
    }

    /// Parse the lowercase label found in a `scope` result column.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "local" => Some(Scope::Local),
            "global" => Some(Scope::Global),
            _ => None,
        }
    }

    /// The opposite catalog.
    pub fn other(self) -> Self {
        match self {
            Scope::Local => Scope::Global,
            Scope::Global => Scope::Local,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_keywords_are_case_insensitive() {
        assert_eq!(EntityKind::from_keyword("model"), Some(EntityKind::Model));
        assert_eq!(EntityKind::from_keyword("Models"), Some(EntityKind::Model));
        assert_eq!(EntityKind::from_keyword("regSpaces"), Some(EntityKind::RegSpace));
        assert_eq!(EntityKind::from_keyword("table"), None);
    }

    #[test]
    fn test_entity_columns() {
        assert_eq!(
            EntityKind::Model.columns(),
            vec!["model_name", "model_type", "model_args"]
        );
        assert_eq!(EntityKind::RegSpace.columns(), vec!["reg_space", "reg_args"]);
    }

    #[test]
    fn test_required_keys_have_no_duplicates() {
        for kind in [EntityKind::Model, EntityKind::RegSpace] {
            let keys = kind.required_arg_keys();
            let unique: std::collections::BTreeSet<_> = keys.iter().collect();
            assert_eq!(unique.len(), keys.len());
        }
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(Scope::from_keyword("global"), Some(Scope::Global));
        assert_eq!(Scope::from_keyword("LOCAL"), Some(Scope::Local));
        assert_eq!(Scope::from_keyword("remote"), None);
        assert_eq!(Scope::from_label(Scope::Global.as_str()), Some(Scope::Global));
        assert_eq!(Scope::Global.other(), Scope::Local);
        assert_eq!(Scope::default(), Scope::Local);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn recase(word: &str, mask: &[bool]) -> String {
            word.chars()
                .zip(mask.iter().cycle())
                .map(|(c, upper)| if *upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect()
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_keywords_resolve_in_any_case(
                mask in prop::collection::vec(any::<bool>(), 1..12),
            ) {
                for kind in [EntityKind::Model, EntityKind::RegSpace] {
                    prop_assert_eq!(EntityKind::from_keyword(&recase(kind.keyword(), &mask)), Some(kind));
                    prop_assert_eq!(EntityKind::from_keyword(&recase(kind.plural_keyword(), &mask)), Some(kind));
                }
                for scope in Scope::ALL {
                    prop_assert_eq!(Scope::from_keyword(&recase(scope.keyword(), &mask)), Some(scope));
                }
            }
        }
    }
}
