//! Statement model for the regdb DSL

use regdb_core::{EntityKind, Scope};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// STATEMENTS
// ============================================================================

/// A parsed DSL statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Model(ModelStatement),
    RegSpace(RegSpaceStatement),
}

/// Statements over model architectures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelStatement {
    Create {
        scope: Scope,
        name: String,
        model_type: String,
        args: Value,
    },
    Delete {
        name: String,
    },
    /// Replace type and arguments in whichever catalog holds the model.
    Update {
        name: String,
        model_type: String,
        args: Value,
    },
    /// Move the model to `scope`.
    UpdateScope {
        name: String,
        scope: Scope,
    },
    Get {
        name: String,
    },
    GetAll,
}

/// Statements over regularization spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegSpaceStatement {
    Create {
        scope: Scope,
        name: String,
        args: Value,
    },
    Delete {
        name: String,
    },
    Update {
        name: String,
        args: Value,
    },
    UpdateScope {
        name: String,
        scope: Scope,
    },
    Get {
        name: String,
    },
    GetAll,
}

/// Discriminator over the twelve statement cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementType {
    CreateModel,
    DeleteModel,
    UpdateModel,
    UpdateModelScope,
    GetModel,
    GetModels,
    CreateRegSpace,
    DeleteRegSpace,
    UpdateRegSpace,
    UpdateRegSpaceScope,
    GetRegSpace,
    GetRegSpaces,
}

impl StatementType {
    pub fn kind(self) -> EntityKind {
        match self {
            StatementType::CreateModel
            | StatementType::DeleteModel
            | StatementType::UpdateModel
            | StatementType::UpdateModelScope
            | StatementType::GetModel
            | StatementType::GetModels => EntityKind::Model,
            StatementType::CreateRegSpace
            | StatementType::DeleteRegSpace
            | StatementType::UpdateRegSpace
            | StatementType::UpdateRegSpaceScope
            | StatementType::GetRegSpace
            | StatementType::GetRegSpaces => EntityKind::RegSpace,
        }
    }

    /// Whether executing the statement leaves the catalogs unchanged.
    pub fn is_read_only(self) -> bool {
        matches!(
            self,
            StatementType::GetModel
                | StatementType::GetModels
                | StatementType::GetRegSpace
                | StatementType::GetRegSpaces
        )
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatementType::CreateModel => "CREATE MODEL",
            StatementType::DeleteModel => "DELETE MODEL",
            StatementType::UpdateModel => "UPDATE MODEL",
            StatementType::UpdateModelScope => "UPDATE MODEL TO",
            StatementType::GetModel => "GET MODEL",
            StatementType::GetModels => "GET MODELS",
            StatementType::CreateRegSpace => "CREATE REGSPACE",
            StatementType::DeleteRegSpace => "DELETE REGSPACE",
            StatementType::UpdateRegSpace => "UPDATE REGSPACE",
            StatementType::UpdateRegSpaceScope => "UPDATE REGSPACE TO",
            StatementType::GetRegSpace => "GET REGSPACE",
            StatementType::GetRegSpaces => "GET REGSPACES",
        };
        f.write_str(label)
    }
}

impl ModelStatement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            ModelStatement::Create { .. } => StatementType::CreateModel,
            ModelStatement::Delete { .. } => StatementType::DeleteModel,
            ModelStatement::Update { .. } => StatementType::UpdateModel,
            ModelStatement::UpdateScope { .. } => StatementType::UpdateModelScope,
            ModelStatement::Get { .. } => StatementType::GetModel,
            ModelStatement::GetAll => StatementType::GetModels,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ModelStatement::Create { name, .. }
            | ModelStatement::Delete { name }
            | ModelStatement::Update { name, .. }
            | ModelStatement::UpdateScope { name, .. }
            | ModelStatement::Get { name } => Some(name),
            ModelStatement::GetAll => None,
        }
    }
}

impl RegSpaceStatement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            RegSpaceStatement::Create { .. } => StatementType::CreateRegSpace,
            RegSpaceStatement::Delete { .. } => StatementType::DeleteRegSpace,
            RegSpaceStatement::Update { .. } => StatementType::UpdateRegSpace,
            RegSpaceStatement::UpdateScope { .. } => StatementType::UpdateRegSpaceScope,
            RegSpaceStatement::Get { .. } => StatementType::GetRegSpace,
            RegSpaceStatement::GetAll => StatementType::GetRegSpaces,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RegSpaceStatement::Create { name, .. }
            | RegSpaceStatement::Delete { name }
            | RegSpaceStatement::Update { name, .. }
            | RegSpaceStatement::UpdateScope { name, .. }
            | RegSpaceStatement::Get { name } => Some(name),
            RegSpaceStatement::GetAll => None,
        }
    }
}

impl Statement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            Statement::Model(stmt) => stmt.statement_type(),
            Statement::RegSpace(stmt) => stmt.statement_type(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Statement::Model(_) => EntityKind::Model,
            Statement::RegSpace(_) => EntityKind::RegSpace,
        }
    }

    /// Entity name the statement targets; `None` for GetAll.
    pub fn name(&self) -> Option<&str> {
        match self {
            Statement::Model(stmt) => stmt.name(),
            Statement::RegSpace(stmt) => stmt.name(),
        }
    }
}

impl From<ModelStatement> for Statement {
    fn from(stmt: ModelStatement) -> Self {
        Statement::Model(stmt)
    }
}

impl From<RegSpaceStatement> for Statement {
    fn from(stmt: RegSpaceStatement) -> Self {
        Statement::RegSpace(stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_type_matches_kind() {
        let model: Statement = ModelStatement::Delete {
            name: "m1".to_string(),
        }
        .into();
        assert_eq!(model.statement_type(), StatementType::DeleteModel);
        assert_eq!(model.kind(), EntityKind::Model);
        assert_eq!(model.statement_type().kind(), model.kind());
        assert_eq!(model.name(), Some("m1"));

        let regspace: Statement = RegSpaceStatement::GetAll.into();
        assert_eq!(regspace.statement_type(), StatementType::GetRegSpaces);
        assert_eq!(regspace.kind(), EntityKind::RegSpace);
        assert_eq!(regspace.name(), None);
        assert!(regspace.statement_type().is_read_only());
    }

    #[test]
    fn test_statement_type_display() {
        assert_eq!(StatementType::UpdateModelScope.to_string(), "UPDATE MODEL TO");
        assert_eq!(StatementType::CreateRegSpace.to_string(), "CREATE REGSPACE");
    }
}
