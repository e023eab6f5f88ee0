//! Top-level statements.

use super::{
    AlterTableStatement, AlterViewStatement, CreateTableStatement, CreateViewStatement,
    DropTableStatement, DropViewStatement, RenameTableStatement, SelectStatement,
};

/// Any statement the parser accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    CreateTable(CreateTableStatement),
    CreateView(CreateViewStatement),
    AlterTable(AlterTableStatement),
    AlterView(AlterViewStatement),
    DropTable(DropTableStatement),
    DropView(DropViewStatement),
    RenameTable(RenameTableStatement),
}

impl Statement {
    /// Statement keyword(s), for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Select(_) => "SELECT",
            Self::CreateTable(_) => "CREATE TABLE",
            Self::CreateView(_) => "CREATE VIEW",
            Self::AlterTable(_) => "ALTER TABLE",
            Self::AlterView(_) => "ALTER VIEW",
            Self::DropTable(_) => "DROP TABLE",
            Self::DropView(_) => "DROP VIEW",
            Self::RenameTable(_) => "RENAME TABLE",
        }
    }
}
