//! Catalog layout and configuration loading.
//!
//! The layout names the identifiers every emitted statement is qualified
//! with. It is passed explicitly to whoever renders SQL; nothing here is
//! process-global.

use crate::{ConfigError, EntityKind, Scope};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML config file.
pub const CONFIG_ENV_VAR: &str = "REGDB_CONFIG";

// ============================================================================
// CATALOG LAYOUT
// ============================================================================

/// Identifiers of the two catalogs and their entity tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogLayout {
    /// Name the persistent catalog is attached under.
    pub global_catalog: String,
    /// Schema holding the entity tables in both catalogs.
    pub schema: String,
    pub model_table: String,
    pub regspace_table: String,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            global_catalog: "regdb_storage".to_string(),
            schema: "regdb_config".to_string(),
            model_table: "REGDB_MODEL_ARCH_TABLE".to_string(),
            regspace_table: "REGDB_REG_SPACE_TABLE".to_string(),
        }
    }
}

impl CatalogLayout {
    /// Identifier prefix selecting a catalog: empty for local,
    /// `<global_catalog>.` for global.
    pub fn qualifier(&self, scope: Scope) -> String {
        match scope {
            Scope::Local => String::new(),
            Scope::Global => format!("{}.", self.global_catalog),
        }
    }

    /// Unqualified table name for an entity kind.
    pub fn table(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Model => &self.model_table,
            EntityKind::RegSpace => &self.regspace_table,
        }
    }

    /// Fully qualified table name, e.g. `regdb_storage.regdb_config.REGDB_MODEL_ARCH_TABLE`.
    pub fn qualified_table(&self, scope: Scope, kind: EntityKind) -> String {
        format!("{}{}.{}", self.qualifier(scope), self.schema, self.table(kind))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        check_identifier("layout.global_catalog", &self.global_catalog)?;
        check_identifier("layout.schema", &self.schema)?;
        check_identifier("layout.model_table", &self.model_table)?;
        check_identifier("layout.regspace_table", &self.regspace_table)?;
        if self.model_table.eq_ignore_ascii_case(&self.regspace_table) {
            return Err(ConfigError::InvalidValue {
                field: "layout.regspace_table",
                reason: "must differ from layout.model_table".to_string(),
            });
        }
        Ok(())
    }
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must not be empty".to_string(),
        });
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' must start with a letter or underscore", value),
        });
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("'{}' may only contain ASCII letters, digits and '_'", value),
        });
    }
    Ok(())
}

// ============================================================================
// REGDB CONFIG
// ============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegdbConfig {
    #[serde(default)]
    pub layout: CatalogLayout,
}

impl RegdbConfig {
    /// Load from `--config <path>` or `REGDB_CONFIG`, falling back to the
    /// default layout when neither is set.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path_from_args().or_else(config_path_from_env) {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: RegdbConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()
    }
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(value) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(value));
        }
    }
    None
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}
