//! Pretty printer for regdb DSL statements
//!
//! Produces the canonical text of a statement: upper-case keywords, local
//! scope left implicit, compact JSON and a trailing `;`. Parsing the output
//! yields the same statement.

use crate::parser::{ModelStatement, RegSpaceStatement, Statement};
use regdb_core::{EntityKind, Scope};
use serde_json::Value;
use std::fmt::{self, Write};

/// Render a statement as canonical DSL text.
pub fn pretty_print(statement: &Statement) -> String {
    statement.to_string()
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Model(stmt) => fmt::Display::fmt(stmt, f),
            Statement::RegSpace(stmt) => fmt::Display::fmt(stmt, f),
        }
    }
}

impl fmt::Display for ModelStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = EntityKind::Model;
        match self {
            ModelStatement::Create {
                scope,
                name,
                model_type,
                args,
            } => {
                write_create_head(f, *scope, kind)?;
                write_definition(f, name, Some(model_type.as_str()), args)
            }
            ModelStatement::Delete { name } => write_delete(f, kind, name),
            ModelStatement::Update {
                name,
                model_type,
                args,
            } => {
                write!(f, "UPDATE {} ", kind.keyword())?;
                write_definition(f, name, Some(model_type.as_str()), args)
            }
            ModelStatement::UpdateScope { name, scope } => write_update_scope(f, kind, name, *scope),
            ModelStatement::Get { name } => write_get(f, kind, name),
            ModelStatement::GetAll => write!(f, "GET {};", kind.plural_keyword()),
        }
    }
}

impl fmt::Display for RegSpaceStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = EntityKind::RegSpace;
        match self {
            RegSpaceStatement::Create { scope, name, args } => {
                write_create_head(f, *scope, kind)?;
                write_definition(f, name, None, args)
            }
            RegSpaceStatement::Delete { name } => write_delete(f, kind, name),
            RegSpaceStatement::Update { name, args } => {
                write!(f, "UPDATE {} ", kind.keyword())?;
                write_definition(f, name, None, args)
            }
            RegSpaceStatement::UpdateScope { name, scope } => {
                write_update_scope(f, kind, name, *scope)
            }
            RegSpaceStatement::Get { name } => write_get(f, kind, name),
            RegSpaceStatement::GetAll => write!(f, "GET {};", kind.plural_keyword()),
        }
    }
}

fn write_create_head(f: &mut fmt::Formatter<'_>, scope: Scope, kind: EntityKind) -> fmt::Result {
    match scope {
        Scope::Local => write!(f, "CREATE {} ", kind.keyword()),
        Scope::Global => write!(f, "CREATE {} {} ", scope.keyword(), kind.keyword()),
    }
}

fn write_definition(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    entity_type: Option<&str>,
    args: &Value,
) -> fmt::Result {
    f.write_char('(')?;
    write_literal(f, name)?;
    if let Some(entity_type) = entity_type {
        f.write_str(", ")?;
        write_literal(f, entity_type)?;
    }
    write!(f, ", {});", args)
}

fn write_delete(f: &mut fmt::Formatter<'_>, kind: EntityKind, name: &str) -> fmt::Result {
    write!(f, "DELETE {} ", kind.keyword())?;
    write_literal(f, name)?;
    f.write_char(';')
}

fn write_update_scope(
    f: &mut fmt::Formatter<'_>,
    kind: EntityKind,
    name: &str,
    scope: Scope,
) -> fmt::Result {
    write!(f, "UPDATE {} ", kind.keyword())?;
    write_literal(f, name)?;
    write!(f, " TO {};", scope.keyword())
}

fn write_get(f: &mut fmt::Formatter<'_>, kind: EntityKind, name: &str) -> fmt::Result {
    write!(f, "GET {} ", kind.keyword())?;
    write_literal(f, name)?;
    f.write_char(';')
}

/// Quote `value` as a DSL string literal.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in value.chars() {
        if matches!(c, '\'' | '\\') {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char('\'')
}
