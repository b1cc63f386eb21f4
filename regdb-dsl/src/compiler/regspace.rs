use super::{CompileResult, CompiledStatement, Lowering, ToSql};
use crate::parser::RegSpaceStatement;
use regdb_core::{CatalogLayout, EntityKind};
use regdb_storage::CatalogConnection;

/// Lowers regspace statements against the regspace tables.
#[derive(Debug, Clone, Default)]
pub struct RegSpaceCompiler {
    layout: CatalogLayout,
}

impl RegSpaceCompiler {
    pub fn new(layout: CatalogLayout) -> Self {
        Self { layout }
    }
}

impl ToSql for RegSpaceCompiler {
    type Statement = RegSpaceStatement;

    fn to_sql(
        &self,
        statement: &RegSpaceStatement,
        conn: &dyn CatalogConnection,
    ) -> CompileResult<CompiledStatement> {
        let lower = Lowering::new(&self.layout, conn, EntityKind::RegSpace);
        match statement {
            RegSpaceStatement::Create { scope, name, args } => lower.create(*scope, name, None, args),
            RegSpaceStatement::Delete { name } => lower.delete(name),
            RegSpaceStatement::Update { name, args } => lower.update(name, None, args),
            RegSpaceStatement::UpdateScope { name, scope } => lower.update_scope(name, *scope),
            RegSpaceStatement::Get { name } => Ok(lower.select(Some(name.as_str()))),
            RegSpaceStatement::GetAll => Ok(lower.select(None)),
        }
    }
}
