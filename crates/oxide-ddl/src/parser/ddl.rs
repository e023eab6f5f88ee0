//! DDL statement parsing: CREATE, ALTER, DROP and RENAME for tables, views
//! and indexes.

use super::error::ParseError;
use super::pratt::OPERAND_ONLY_BP;
use super::Parser;
use crate::ast::{
    AlterTableSpec, AlterTableStatement, AlterViewStatement, CheckDefinition, ColumnDefinition,
    ColumnPosition, ConstraintDefinition, ConstraintKind, CreateTableStatement,
    CreateViewStatement, DataType, DropTableStatement, DropViewStatement, Expr, ForeignKeyDefinition,
    GeneratedColumn, GeneratedStorage, IndexColumn, IndexDefinition, IndexKind, IntegerKind,
    LobSize, OrderDirection, PartitionBound, PartitionDefinition, PartitionMethod, PartitionSpec,
    PartitionValues, ReferentialAction, RenameTableStatement, Statement, TableOptions,
    ViewAlgorithm, ViewCheckOption, ViewDefinition, ViewSecurity,
};
use crate::lexer::{Keyword, TokenKind};

/// One element of a CREATE TABLE body.
enum TableElement {
    Column(ColumnDefinition),
    Index(IndexDefinition),
    Constraint(ConstraintDefinition),
}

/// Clauses that may precede `VIEW` in CREATE/ALTER VIEW.
#[derive(Default)]
struct ViewPrefix {
    algorithm: Option<ViewAlgorithm>,
    security: Option<ViewSecurity>,
}

impl Parser<'_> {
    // ---------------------------------------------------------------------
    // CREATE
    // ---------------------------------------------------------------------

    pub(super) fn parse_create(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Create)?;

        if self.check_keyword(Keyword::Temporary) {
            return Err(ParseError::unsupported(
                "temporary tables",
                self.current_span(),
            ));
        }
        if self.check_keyword(Keyword::Table) {
            return Ok(Statement::CreateTable(self.parse_create_table()?));
        }
        if matches!(
            self.current.kind,
            TokenKind::Keyword(
                Keyword::Index | Keyword::Unique | Keyword::Fulltext | Keyword::Spatial
            )
        ) {
            return self.parse_create_index();
        }

        let or_replace = if self.eat_keyword(Keyword::Or) {
            self.expect_keyword(Keyword::Replace)?;
            true
        } else {
            false
        };
        let prefix = self.parse_view_prefix()?;
        let view = self.parse_view_definition(prefix)?;
        Ok(Statement::CreateView(CreateViewStatement { or_replace, view }))
    }

    fn parse_create_table(&mut self) -> Result<CreateTableStatement, ParseError> {
        self.expect_keyword(Keyword::Table)?;
        let if_not_exists = if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };

        let mut table = CreateTableStatement::new(self.parse_object_name()?);
        table.if_not_exists = if_not_exists;

        if self.check_keyword(Keyword::Like) || self.check_keyword(Keyword::As) {
            return Err(ParseError::unsupported(
                "CREATE TABLE ... LIKE / AS",
                self.current_span(),
            ));
        }

        self.expect(&TokenKind::LeftParen)?;
        loop {
            match self.parse_table_element()? {
                TableElement::Column(column) => table.columns.push(column),
                TableElement::Index(index) => table.indexes.push(index),
                TableElement::Constraint(constraint) => table.constraints.push(constraint),
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        table.options = self.parse_table_options(true)?;
        if self.check_keyword(Keyword::Partition) {
            table.partition = Some(self.parse_partition_by()?);
        }
        Ok(table)
    }

    /// `CREATE [UNIQUE|FULLTEXT|SPATIAL] INDEX name ON t (...)`, expressed as
    /// an ALTER TABLE.
    fn parse_create_index(&mut self) -> Result<Statement, ParseError> {
        let kind = match self.current.kind {
            TokenKind::Keyword(Keyword::Unique) => IndexKind::Unique,
            TokenKind::Keyword(Keyword::Fulltext) => IndexKind::Fulltext,
            TokenKind::Keyword(Keyword::Spatial) => IndexKind::Spatial,
            _ => IndexKind::Plain,
        };
        if kind != IndexKind::Plain {
            self.advance();
        }
        self.expect_keyword(Keyword::Index)?;
        let name = self.expect_identifier()?;
        self.expect_keyword(Keyword::On)?;
        let table = self.parse_object_name()?;
        let index = self.parse_index_tail(Some(name), kind)?;
        Ok(Statement::AlterTable(AlterTableStatement {
            table,
            specs: vec![AlterTableSpec::AddIndex(index)],
        }))
    }

    // ---------------------------------------------------------------------
    // Table body
    // ---------------------------------------------------------------------

    fn parse_table_element(&mut self) -> Result<TableElement, ParseError> {
        let constraint_name = if self.eat_keyword(Keyword::Constraint) {
            if self.check_identifier() {
                Some(self.expect_identifier()?)
            } else {
                None
            }
        } else {
            None
        };

        match self.current.kind {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                // MySQL ignores any name given to the primary key
                if self.check_identifier() {
                    self.advance();
                }
                Ok(TableElement::Index(
                    self.parse_index_tail(None, IndexKind::Primary)?,
                ))
            }
            TokenKind::Keyword(Keyword::Unique) => {
                self.advance();
                if !self.eat_keyword(Keyword::Key) {
                    self.eat_keyword(Keyword::Index);
                }
                let name = self.parse_optional_index_name()?.or(constraint_name);
                Ok(TableElement::Index(
                    self.parse_index_tail(name, IndexKind::Unique)?,
                ))
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let index_name = self.parse_optional_index_name()?;
                let foreign_key = self.parse_foreign_key_tail()?;
                Ok(TableElement::Constraint(ConstraintDefinition {
                    name: constraint_name.or(index_name),
                    kind: ConstraintKind::ForeignKey(foreign_key),
                }))
            }
            TokenKind::Keyword(Keyword::Check) => {
                let check = self.parse_check_tail()?;
                Ok(TableElement::Constraint(ConstraintDefinition {
                    name: constraint_name,
                    kind: ConstraintKind::Check(check),
                }))
            }
            _ if constraint_name.is_some() => {
                Err(self.unexpected("PRIMARY KEY, UNIQUE, FOREIGN KEY or CHECK"))
            }
            TokenKind::Keyword(Keyword::Index | Keyword::Key) => {
                self.advance();
                let name = self.parse_optional_index_name()?;
                Ok(TableElement::Index(
                    self.parse_index_tail(name, IndexKind::Plain)?,
                ))
            }
            TokenKind::Keyword(kw @ (Keyword::Fulltext | Keyword::Spatial)) => {
                self.advance();
                if !self.eat_keyword(Keyword::Key) {
                    self.eat_keyword(Keyword::Index);
                }
                let kind = if kw == Keyword::Fulltext {
                    IndexKind::Fulltext
                } else {
                    IndexKind::Spatial
                };
                let name = self.parse_optional_index_name()?;
                Ok(TableElement::Index(self.parse_index_tail(name, kind)?))
            }
            _ => Ok(TableElement::Column(self.parse_column_definition()?)),
        }
    }

    fn parse_optional_index_name(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_identifier() && !self.check_using() {
            Ok(Some(self.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    const fn check_using(&self) -> bool {
        matches!(self.current.kind, TokenKind::Keyword(Keyword::Using))
    }

    /// `[USING type] (key_part, ...) [index_option ...]`
    fn parse_index_tail(
        &mut self,
        name: Option<String>,
        kind: IndexKind,
    ) -> Result<IndexDefinition, ParseError> {
        self.skip_index_type()?;
        self.expect(&TokenKind::LeftParen)?;
        let mut columns = vec![];
        loop {
            columns.push(self.parse_index_column()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;

        let mut index = IndexDefinition::new(name, kind, columns);
        loop {
            if self.skip_index_type()? {
                continue;
            }
            match self.current.kind {
                TokenKind::Keyword(Keyword::Comment) => {
                    self.advance();
                    index.comment = Some(self.expect_string()?);
                }
                TokenKind::Keyword(Keyword::Visible) => {
                    self.advance();
                    index.invisible = false;
                }
                TokenKind::Keyword(Keyword::Invisible) => {
                    self.advance();
                    index.invisible = true;
                }
                TokenKind::Keyword(Keyword::KeyBlockSize) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    self.expect_unsigned()?;
                }
                _ => break,
            }
        }
        Ok(index)
    }

    /// Skips `USING BTREE|HASH`; the storage engine picks the index type.
    fn skip_index_type(&mut self) -> Result<bool, ParseError> {
        if !self.eat_keyword(Keyword::Using) {
            return Ok(false);
        }
        match self.current_word().as_deref() {
            Some("BTREE" | "HASH") => {
                self.advance();
                Ok(true)
            }
            _ => Err(self.unexpected("BTREE or HASH")),
        }
    }

    fn parse_index_column(&mut self) -> Result<IndexColumn, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            return Err(ParseError::unsupported(
                "functional key parts",
                self.current_span(),
            ));
        }
        let mut column = IndexColumn::new(self.expect_identifier()?);
        if self.eat(&TokenKind::LeftParen) {
            column.length = Some(self.expect_u32()?);
            self.expect(&TokenKind::RightParen)?;
        }
        if self.eat_keyword(Keyword::Asc) {
            column.direction = Some(OrderDirection::Asc);
        } else if self.eat_keyword(Keyword::Desc) {
            column.direction = Some(OrderDirection::Desc);
        }
        Ok(column)
    }

    /// `(cols) REFERENCES parent (cols) [ON DELETE ...] [ON UPDATE ...]`
    fn parse_foreign_key_tail(&mut self) -> Result<ForeignKeyDefinition, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let columns = self.parse_identifier_list()?;
        self.expect(&TokenKind::RightParen)?;
        self.expect_keyword(Keyword::References)?;
        let referenced_table = self.parse_object_name()?;
        self.expect(&TokenKind::LeftParen)?;
        let referenced_columns = self.parse_identifier_list()?;
        self.expect(&TokenKind::RightParen)?;

        let mut foreign_key = ForeignKeyDefinition {
            columns,
            referenced_table,
            referenced_columns,
            on_delete: None,
            on_update: None,
        };
        while self.eat_keyword(Keyword::On) {
            if self.eat_keyword(Keyword::Delete) {
                foreign_key.on_delete = Some(self.parse_referential_action()?);
            } else if self.eat_keyword(Keyword::Update) {
                foreign_key.on_update = Some(self.parse_referential_action()?);
            } else {
                return Err(self.unexpected("DELETE or UPDATE"));
            }
        }
        Ok(foreign_key)
    }

    fn parse_referential_action(&mut self) -> Result<ReferentialAction, ParseError> {
        if self.eat_keyword(Keyword::Restrict) {
            Ok(ReferentialAction::Restrict)
        } else if self.eat_keyword(Keyword::Cascade) {
            Ok(ReferentialAction::Cascade)
        } else if self.eat_keyword(Keyword::Set) {
            if self.eat_keyword(Keyword::Null) {
                Ok(ReferentialAction::SetNull)
            } else {
                self.expect_keyword(Keyword::Default)?;
                Ok(ReferentialAction::SetDefault)
            }
        } else if self.eat_keyword(Keyword::No) {
            self.expect_keyword(Keyword::Action)?;
            Ok(ReferentialAction::NoAction)
        } else {
            Err(self.unexpected("RESTRICT, CASCADE, SET NULL, SET DEFAULT or NO ACTION"))
        }
    }

    /// `CHECK (expr) [[NOT] ENFORCED]`
    fn parse_check_tail(&mut self) -> Result<CheckDefinition, ParseError> {
        self.expect_keyword(Keyword::Check)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect(&TokenKind::RightParen)?;
        let enforced = if self.eat_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::Enforced)?;
            false
        } else {
            self.eat_keyword(Keyword::Enforced);
            true
        };
        Ok(CheckDefinition { expr, enforced })
    }

    // ---------------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------------

    fn parse_column_definition(&mut self) -> Result<ColumnDefinition, ParseError> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;
        let mut column = ColumnDefinition::new(name, data_type);

        loop {
            match self.current.kind {
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.expect_keyword(Keyword::Null)?;
                    column.nullable = Some(false);
                }
                TokenKind::Keyword(Keyword::Null) => {
                    self.advance();
                    column.nullable = Some(true);
                }
                TokenKind::Keyword(Keyword::Default) => {
                    self.advance();
                    column.default = Some(self.parse_expression(OPERAND_ONLY_BP)?);
                }
                TokenKind::Keyword(Keyword::On) => {
                    self.advance();
                    self.expect_keyword(Keyword::Update)?;
                    column.on_update = Some(self.parse_expression(OPERAND_ONLY_BP)?);
                }
                TokenKind::Keyword(Keyword::AutoIncrement) => {
                    self.advance();
                    column.auto_increment = true;
                }
                TokenKind::Keyword(Keyword::Primary) => {
                    self.advance();
                    self.expect_keyword(Keyword::Key)?;
                    column.primary_key = true;
                }
                TokenKind::Keyword(Keyword::Key) => {
                    self.advance();
                    column.primary_key = true;
                }
                TokenKind::Keyword(Keyword::Unique) => {
                    self.advance();
                    self.eat_keyword(Keyword::Key);
                    column.unique = true;
                }
                TokenKind::Keyword(Keyword::Comment) => {
                    self.advance();
                    column.comment = Some(self.expect_string()?);
                }
                TokenKind::Keyword(Keyword::Character | Keyword::Charset) => {
                    column.charset = Some(self.parse_charset_clause()?);
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    column.collation = Some(self.parse_charset_name()?);
                }
                TokenKind::Keyword(Keyword::Generated | Keyword::As) => {
                    if self.eat_keyword(Keyword::Generated) {
                        self.expect_keyword(Keyword::Always)?;
                    }
                    self.expect_keyword(Keyword::As)?;
                    self.expect(&TokenKind::LeftParen)?;
                    let expr = self.parse_expression(0)?;
                    self.expect(&TokenKind::RightParen)?;
                    let storage = if self.eat_keyword(Keyword::Stored) {
                        GeneratedStorage::Stored
                    } else {
                        self.eat_keyword(Keyword::Virtual);
                        GeneratedStorage::Virtual
                    };
                    column.generated = Some(GeneratedColumn { expr, storage });
                }
                TokenKind::Keyword(Keyword::Visible) => {
                    self.advance();
                    column.invisible = false;
                }
                TokenKind::Keyword(Keyword::Invisible) => {
                    self.advance();
                    column.invisible = true;
                }
                TokenKind::Keyword(Keyword::Check) => {
                    let check = self.parse_check_tail()?;
                    if !check.enforced {
                        return Err(ParseError::unsupported(
                            "NOT ENFORCED on a column check",
                            self.current_span(),
                        ));
                    }
                    column.check = Some(check.expr);
                }
                TokenKind::Keyword(Keyword::Constraint) => {
                    return Err(ParseError::unsupported(
                        "named column constraints; declare the constraint at table level",
                        self.current_span(),
                    ));
                }
                TokenKind::Keyword(Keyword::References) => {
                    return Err(ParseError::unsupported(
                        "inline REFERENCES; declare a FOREIGN KEY instead",
                        self.current_span(),
                    ));
                }
                _ => break,
            }
        }
        Ok(column)
    }

    fn parse_column_position(&mut self) -> Result<Option<ColumnPosition>, ParseError> {
        if self.eat_keyword(Keyword::First) {
            Ok(Some(ColumnPosition::First))
        } else if self.eat_keyword(Keyword::After) {
            Ok(Some(ColumnPosition::After(self.expect_identifier()?)))
        } else {
            Ok(None)
        }
    }

    /// Parses a column data type, folding spelling synonyms.
    pub(super) fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let span = self.current_span();
        let Some(word) = self.current_word() else {
            return Err(self.unexpected("data type"));
        };
        self.advance();

        let data_type = match word.as_str() {
            "TINYINT" | "INT1" => self.parse_integer_type(IntegerKind::Tiny)?,
            "SMALLINT" | "INT2" => self.parse_integer_type(IntegerKind::Small)?,
            "MEDIUMINT" | "INT3" | "MIDDLEINT" => self.parse_integer_type(IntegerKind::Medium)?,
            "INT" | "INTEGER" | "INT4" => self.parse_integer_type(IntegerKind::Int)?,
            "BIGINT" | "INT8" => self.parse_integer_type(IntegerKind::Big)?,
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            "BIT" => DataType::Bit(self.parse_optional_length()?),
            "DECIMAL" | "DEC" | "NUMERIC" | "FIXED" => {
                let (precision, scale) = self.parse_optional_precision()?;
                DataType::Decimal {
                    precision,
                    scale,
                    unsigned: false,
                    zerofill: false,
                }
            }
            "FLOAT" => {
                let (precision, scale) = self.parse_optional_precision()?;
                DataType::Float {
                    precision,
                    scale,
                    unsigned: false,
                }
            }
            "DOUBLE" | "REAL" => {
                if self.current_word().as_deref() == Some("PRECISION") {
                    self.advance();
                }
                let (precision, scale) = self.parse_optional_precision()?;
                DataType::Double {
                    precision,
                    scale,
                    unsigned: false,
                }
            }
            "CHAR" | "CHARACTER" | "NCHAR" => {
                if self.current_word().as_deref() == Some("VARYING") {
                    self.advance();
                    DataType::Varchar(self.parse_optional_length()?)
                } else {
                    DataType::Char(self.parse_optional_length()?)
                }
            }
            "VARCHAR" | "NVARCHAR" => DataType::Varchar(self.parse_optional_length()?),
            "BINARY" => DataType::Binary(self.parse_optional_length()?),
            "VARBINARY" => DataType::Varbinary(self.parse_optional_length()?),
            "TINYTEXT" => DataType::Text(LobSize::Tiny),
            "TEXT" => {
                self.parse_optional_length()?;
                DataType::Text(LobSize::Regular)
            }
            "MEDIUMTEXT" => DataType::Text(LobSize::Medium),
            "LONGTEXT" => DataType::Text(LobSize::Long),
            "TINYBLOB" => DataType::Blob(LobSize::Tiny),
            "BLOB" => {
                self.parse_optional_length()?;
                DataType::Blob(LobSize::Regular)
            }
            "MEDIUMBLOB" => DataType::Blob(LobSize::Medium),
            "LONGBLOB" => DataType::Blob(LobSize::Long),
            "ENUM" => DataType::Enum(self.parse_string_list()?),
            "SET" => DataType::Set(self.parse_string_list()?),
            "DATE" => DataType::Date,
            "TIME" => DataType::Time(self.parse_optional_length()?),
            "DATETIME" => DataType::Datetime(self.parse_optional_length()?),
            "TIMESTAMP" => DataType::Timestamp(self.parse_optional_length()?),
            "YEAR" => {
                self.parse_optional_length()?;
                DataType::Year
            }
            "JSON" => DataType::Json,
            "GEOMETRY" | "POINT" | "LINESTRING" | "POLYGON" | "MULTIPOINT"
            | "MULTILINESTRING" | "MULTIPOLYGON" | "GEOMETRYCOLLECTION" => {
                DataType::Spatial(word.to_ascii_lowercase())
            }
            "SIGNED" | "UNSIGNED" => {
                if matches!(self.current_word().as_deref(), Some("INT" | "INTEGER")) {
                    self.advance();
                }
                DataType::Custom(word.to_ascii_lowercase())
            }
            _ if Keyword::from_str(&word).is_some_and(|kw| kw.is_reserved()) => {
                return Err(ParseError::new(
                    format!("expected data type, found keyword {word}"),
                    span,
                ));
            }
            _ => {
                let custom = word.to_ascii_lowercase();
                match self.parse_optional_length()? {
                    Some(length) => DataType::Custom(format!("{custom}({length})")),
                    None => DataType::Custom(custom),
                }
            }
        };

        Ok(self.parse_numeric_attributes(data_type))
    }

    fn parse_integer_type(&mut self, kind: IntegerKind) -> Result<DataType, ParseError> {
        Ok(DataType::Integer {
            kind,
            display_width: self.parse_optional_length()?,
            unsigned: false,
            zerofill: false,
        })
    }

    /// Trailing `UNSIGNED`, `SIGNED` and `ZEROFILL` on numeric types.
    fn parse_numeric_attributes(&mut self, mut data_type: DataType) -> DataType {
        loop {
            let (is_unsigned, is_zerofill) = match self.current.kind {
                TokenKind::Keyword(Keyword::Unsigned) => (true, false),
                TokenKind::Keyword(Keyword::Zerofill) => (false, true),
                TokenKind::Keyword(Keyword::Signed) => (false, false),
                _ => return data_type,
            };
            match &mut data_type {
                DataType::Integer {
                    unsigned, zerofill, ..
                }
                | DataType::Decimal {
                    unsigned, zerofill, ..
                } => {
                    *unsigned |= is_unsigned;
                    *zerofill |= is_zerofill;
                }
                DataType::Float { unsigned, .. } | DataType::Double { unsigned, .. } => {
                    // ZEROFILL on floating point types only implies UNSIGNED
                    *unsigned |= is_unsigned || is_zerofill;
                }
                _ => return data_type,
            }
            self.advance();
        }
    }

    fn parse_optional_length(&mut self) -> Result<Option<u32>, ParseError> {
        if !self.eat(&TokenKind::LeftParen) {
            return Ok(None);
        }
        let length = self.expect_u32()?;
        self.expect(&TokenKind::RightParen)?;
        Ok(Some(length))
    }

    fn parse_optional_precision(&mut self) -> Result<(Option<u32>, Option<u32>), ParseError> {
        if !self.eat(&TokenKind::LeftParen) {
            return Ok((None, None));
        }
        let precision = self.expect_u32()?;
        let scale = if self.eat(&TokenKind::Comma) {
            Some(self.expect_u32()?)
        } else {
            None
        };
        self.expect(&TokenKind::RightParen)?;
        Ok((Some(precision), scale))
    }

    fn parse_string_list(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut values = vec![];
        loop {
            values.push(self.expect_string()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(values)
    }

    /// `CHARACTER SET name` or `CHARSET name`, with an optional `=`.
    fn parse_charset_clause(&mut self) -> Result<String, ParseError> {
        if self.eat_keyword(Keyword::Character) {
            self.expect_keyword(Keyword::Set)?;
        } else {
            self.expect_keyword(Keyword::Charset)?;
        }
        self.eat(&TokenKind::Eq);
        self.parse_charset_name()
    }

    fn parse_charset_name(&mut self) -> Result<String, ParseError> {
        self.eat(&TokenKind::Eq);
        if self.eat_keyword(Keyword::Binary) {
            return Ok(String::from("binary"));
        }
        self.expect_identifier_or_string()
    }

    // ---------------------------------------------------------------------
    // Table options and partitioning
    // ---------------------------------------------------------------------

    /// Parses table options until something that is not an option.
    /// `allow_commas` permits the comma separators CREATE TABLE accepts.
    fn parse_table_options(&mut self, allow_commas: bool) -> Result<TableOptions, ParseError> {
        let mut options = TableOptions::default();
        loop {
            if allow_commas && self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            let has_default = self.eat_keyword(Keyword::Default);
            let unknown_option = matches!(self.current.kind, TokenKind::Identifier(_))
                && self.peek_kind() == &TokenKind::Eq;
            match self.current.kind {
                TokenKind::Keyword(Keyword::Character | Keyword::Charset) => {
                    options.charset = Some(self.parse_charset_clause()?);
                }
                TokenKind::Keyword(Keyword::Collate) => {
                    self.advance();
                    options.collation = Some(self.parse_charset_name()?);
                }
                _ if has_default => return Err(self.unexpected("CHARACTER SET or COLLATE")),
                TokenKind::Keyword(Keyword::Engine) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    options.engine = Some(self.expect_identifier_or_string()?);
                }
                TokenKind::Keyword(Keyword::AutoIncrement) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    options.auto_increment = Some(self.expect_unsigned()?);
                }
                TokenKind::Keyword(Keyword::RowFormat) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    let Some(word) = self.current_word() else {
                        return Err(self.unexpected("row format"));
                    };
                    self.advance();
                    options.row_format = Some(word);
                }
                TokenKind::Keyword(Keyword::KeyBlockSize) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    options.key_block_size = Some(self.expect_unsigned()?);
                }
                TokenKind::Keyword(Keyword::Comment) => {
                    self.advance();
                    self.eat(&TokenKind::Eq);
                    options.comment = Some(self.expect_string()?);
                }
                TokenKind::Identifier(_) if unknown_option => {
                    return Err(ParseError::unsupported(
                        format!("table option {}", self.current_text()),
                        self.current_span(),
                    ));
                }
                _ => return Ok(options),
            }
        }
    }

    fn parse_partition_by(&mut self) -> Result<PartitionSpec, ParseError> {
        self.expect_keyword(Keyword::Partition)?;
        self.expect_keyword(Keyword::By)?;

        let linear = self.eat_keyword(Keyword::Linear);
        let (method, expr, columns) = if self.eat_keyword(Keyword::Hash) {
            let expr = self.parse_parenthesized_expression()?;
            (PartitionMethod::Hash { linear }, Some(expr), vec![])
        } else if self.eat_keyword(Keyword::Key) {
            if self.eat_keyword(Keyword::Algorithm) {
                self.expect(&TokenKind::Eq)?;
                self.expect_unsigned()?;
            }
            let columns = self.parse_parenthesized_identifiers(true)?;
            (PartitionMethod::Key { linear }, None, columns)
        } else if linear {
            return Err(self.unexpected("HASH or KEY"));
        } else if self.eat_keyword(Keyword::Range) {
            if self.eat_keyword(Keyword::Columns) {
                let columns = self.parse_parenthesized_identifiers(false)?;
                (PartitionMethod::RangeColumns, None, columns)
            } else {
                let expr = self.parse_parenthesized_expression()?;
                (PartitionMethod::Range, Some(expr), vec![])
            }
        } else if self.eat_keyword(Keyword::List) {
            if self.eat_keyword(Keyword::Columns) {
                let columns = self.parse_parenthesized_identifiers(false)?;
                (PartitionMethod::ListColumns, None, columns)
            } else {
                let expr = self.parse_parenthesized_expression()?;
                (PartitionMethod::List, Some(expr), vec![])
            }
        } else {
            return Err(self.unexpected("RANGE, LIST, HASH or KEY"));
        };

        let count = if self.eat_keyword(Keyword::Partitions) {
            Some(self.expect_u32()?)
        } else {
            None
        };

        if self.current_word().as_deref() == Some("SUBPARTITION") {
            return Err(ParseError::unsupported(
                "subpartitioning",
                self.current_span(),
            ));
        }

        let definitions = if self.check(&TokenKind::LeftParen) {
            self.parse_partition_definitions()?
        } else {
            vec![]
        };

        Ok(PartitionSpec {
            method,
            expr,
            columns,
            count,
            definitions,
        })
    }

    fn parse_parenthesized_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect(&TokenKind::RightParen)?;
        Ok(expr)
    }

    fn parse_parenthesized_identifiers(
        &mut self,
        allow_empty: bool,
    ) -> Result<Vec<String>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let idents = if allow_empty && self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_identifier_list()?
        };
        self.expect(&TokenKind::RightParen)?;
        Ok(idents)
    }

    /// `(PARTITION p0 VALUES ..., ...)`
    fn parse_partition_definitions(&mut self) -> Result<Vec<PartitionDefinition>, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut definitions = vec![];
        loop {
            definitions.push(self.parse_partition_definition()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(definitions)
    }

    fn parse_partition_definition(&mut self) -> Result<PartitionDefinition, ParseError> {
        self.expect_keyword(Keyword::Partition)?;
        let name = self.expect_identifier()?;

        let values = if self.eat_keyword(Keyword::Values) {
            if self.eat_keyword(Keyword::Less) {
                self.expect_keyword(Keyword::Than)?;
                let bounds = if self.eat_keyword(Keyword::Maxvalue) {
                    vec![PartitionBound::MaxValue]
                } else {
                    self.expect(&TokenKind::LeftParen)?;
                    let mut bounds = vec![];
                    loop {
                        if self.eat_keyword(Keyword::Maxvalue) {
                            bounds.push(PartitionBound::MaxValue);
                        } else {
                            bounds.push(PartitionBound::Value(self.parse_expression(0)?));
                        }
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(&TokenKind::RightParen)?;
                    bounds
                };
                Some(PartitionValues::LessThan(bounds))
            } else {
                self.expect_keyword(Keyword::In)?;
                self.expect(&TokenKind::LeftParen)?;
                let list = self.parse_expression_list()?;
                self.expect(&TokenKind::RightParen)?;
                Some(PartitionValues::In(list))
            }
        } else {
            None
        };

        // Per-partition storage options are not modelled.
        loop {
            if self.eat_keyword(Keyword::Engine) {
                self.eat(&TokenKind::Eq);
                self.expect_identifier_or_string()?;
            } else if self.eat_keyword(Keyword::Comment) {
                self.eat(&TokenKind::Eq);
                self.expect_string()?;
            } else {
                break;
            }
        }

        Ok(PartitionDefinition { name, values })
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// `[ALGORITHM = ...] [DEFINER = ...] [SQL SECURITY ...]`
    fn parse_view_prefix(&mut self) -> Result<ViewPrefix, ParseError> {
        let mut prefix = ViewPrefix::default();
        if self.eat_keyword(Keyword::Algorithm) {
            self.expect(&TokenKind::Eq)?;
            prefix.algorithm = Some(if self.eat_keyword(Keyword::Undefined) {
                ViewAlgorithm::Undefined
            } else if self.eat_keyword(Keyword::Merge) {
                ViewAlgorithm::Merge
            } else {
                self.expect_keyword(Keyword::Temptable)?;
                ViewAlgorithm::Temptable
            });
        }
        if self.eat_keyword(Keyword::Definer) {
            self.expect(&TokenKind::Eq)?;
            self.skip_user()?;
        }
        if self.eat_keyword(Keyword::Sql) {
            self.expect_keyword(Keyword::Security)?;
            prefix.security = Some(if self.eat_keyword(Keyword::Definer) {
                ViewSecurity::Definer
            } else {
                self.expect_keyword(Keyword::Invoker)?;
                ViewSecurity::Invoker
            });
        }
        Ok(prefix)
    }

    /// Skips a user specification; definers are not part of the schema.
    fn skip_user(&mut self) -> Result<(), ParseError> {
        match self.current.kind {
            TokenKind::String(_) | TokenKind::Identifier(_) => self.advance(),
            _ => return Err(self.unexpected("user name")),
        }
        if self.eat(&TokenKind::At) {
            match self.current.kind {
                TokenKind::String(_) | TokenKind::Identifier(_) => self.advance(),
                _ => return Err(self.unexpected("host name")),
            }
        } else if self.eat(&TokenKind::LeftParen) {
            // CURRENT_USER()
            self.expect(&TokenKind::RightParen)?;
        }
        Ok(())
    }

    /// `VIEW name [(columns)] AS select [WITH [CASCADED | LOCAL] CHECK OPTION]`
    fn parse_view_definition(&mut self, prefix: ViewPrefix) -> Result<ViewDefinition, ParseError> {
        self.expect_keyword(Keyword::View)?;
        let name = self.parse_object_name()?;
        let columns = if self.check(&TokenKind::LeftParen) {
            self.parse_parenthesized_identifiers(false)?
        } else {
            vec![]
        };
        self.expect_keyword(Keyword::As)?;
        let query = self.parse_select_statement()?;

        let check_option = if self.eat_keyword(Keyword::With) {
            let option = if self.eat_keyword(Keyword::Local) {
                ViewCheckOption::Local
            } else {
                self.eat_keyword(Keyword::Cascaded);
                ViewCheckOption::Cascaded
            };
            self.expect_keyword(Keyword::Check)?;
            self.expect_keyword(Keyword::Option)?;
            Some(option)
        } else {
            None
        };

        Ok(ViewDefinition {
            name,
            algorithm: prefix.algorithm,
            security: prefix.security,
            columns,
            query,
            check_option,
        })
    }

    // ---------------------------------------------------------------------
    // ALTER
    // ---------------------------------------------------------------------

    pub(super) fn parse_alter(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Alter)?;
        if !self.eat_keyword(Keyword::Table) {
            let prefix = self.parse_view_prefix()?;
            let view = self.parse_view_definition(prefix)?;
            return Ok(Statement::AlterView(AlterViewStatement { view }));
        }

        let table = self.parse_object_name()?;

        // ALTER TABLE a RENAME [TO | AS] b
        if self.check_keyword(Keyword::Rename)
            && !matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Column))
        {
            self.advance();
            if !self.eat_keyword(Keyword::To) {
                self.eat_keyword(Keyword::As);
            }
            let new_name = self.parse_object_name()?;
            return Ok(Statement::RenameTable(RenameTableStatement {
                renames: vec![(table, new_name)],
            }));
        }

        let mut specs = vec![];
        loop {
            specs.push(self.parse_alter_spec()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::AlterTable(AlterTableStatement { table, specs }))
    }

    fn parse_alter_spec(&mut self) -> Result<AlterTableSpec, ParseError> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Add) => {
                self.advance();
                if self.eat_keyword(Keyword::Partition) {
                    return Ok(AlterTableSpec::AddPartition(
                        self.parse_partition_definitions()?,
                    ));
                }
                if self.eat_keyword(Keyword::Column) || self.check_identifier() {
                    let column = self.parse_column_definition()?;
                    let position = self.parse_column_position()?;
                    return Ok(AlterTableSpec::AddColumn { column, position });
                }
                match self.parse_table_element()? {
                    TableElement::Index(index) => Ok(AlterTableSpec::AddIndex(index)),
                    TableElement::Constraint(constraint) => {
                        Ok(AlterTableSpec::AddConstraint(constraint))
                    }
                    TableElement::Column(column) => {
                        let position = self.parse_column_position()?;
                        Ok(AlterTableSpec::AddColumn { column, position })
                    }
                }
            }
            TokenKind::Keyword(Keyword::Modify) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                let column = self.parse_column_definition()?;
                let position = self.parse_column_position()?;
                Ok(AlterTableSpec::ModifyColumn { column, position })
            }
            TokenKind::Keyword(Keyword::Change) => {
                self.advance();
                self.eat_keyword(Keyword::Column);
                let old_name = self.expect_identifier()?;
                let column = self.parse_column_definition()?;
                let position = self.parse_column_position()?;
                Ok(AlterTableSpec::ChangeColumn {
                    old_name,
                    column,
                    position,
                })
            }
            TokenKind::Keyword(Keyword::Rename) => {
                self.advance();
                self.expect_keyword(Keyword::Column)?;
                let old_name = self.expect_identifier()?;
                self.expect_keyword(Keyword::To)?;
                let new_name = self.expect_identifier()?;
                Ok(AlterTableSpec::RenameColumn { old_name, new_name })
            }
            TokenKind::Keyword(Keyword::Drop) => {
                self.advance();
                self.parse_alter_drop()
            }
            TokenKind::Keyword(Keyword::Remove) => {
                self.advance();
                self.expect_keyword(Keyword::Partitioning)?;
                Ok(AlterTableSpec::RemovePartitioning)
            }
            TokenKind::Keyword(Keyword::Partition) => {
                Ok(AlterTableSpec::PartitionBy(self.parse_partition_by()?))
            }
            _ => {
                let span = self.current_span();
                let options = self.parse_table_options(false)?;
                if options.is_empty() {
                    return Err(ParseError::unexpected(
                        "ALTER TABLE specification",
                        self.current.kind.clone(),
                        span,
                    ));
                }
                Ok(AlterTableSpec::TableOptions(options))
            }
        }
    }

    fn parse_alter_drop(&mut self) -> Result<AlterTableSpec, ParseError> {
        match self.current.kind {
            TokenKind::Keyword(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                Ok(AlterTableSpec::DropPrimaryKey)
            }
            TokenKind::Keyword(Keyword::Index | Keyword::Key) => {
                self.advance();
                let name = self.expect_identifier()?;
                Ok(AlterTableSpec::DropIndex { name })
            }
            TokenKind::Keyword(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let name = self.expect_identifier()?;
                Ok(AlterTableSpec::DropForeignKey { name })
            }
            TokenKind::Keyword(Keyword::Check) => {
                self.advance();
                let name = self.expect_identifier()?;
                Ok(AlterTableSpec::DropCheck { name })
            }
            TokenKind::Keyword(Keyword::Partition) => {
                self.advance();
                Ok(AlterTableSpec::DropPartition(self.parse_identifier_list()?))
            }
            TokenKind::Keyword(Keyword::Constraint) => Err(ParseError::unsupported(
                "DROP CONSTRAINT; use DROP FOREIGN KEY or DROP CHECK",
                self.current_span(),
            )),
            _ => {
                self.eat_keyword(Keyword::Column);
                let name = self.expect_identifier()?;
                Ok(AlterTableSpec::DropColumn { name })
            }
        }
    }

    // ---------------------------------------------------------------------
    // DROP and RENAME
    // ---------------------------------------------------------------------

    pub(super) fn parse_drop(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Drop)?;

        if self.eat_keyword(Keyword::Index) {
            let spec = if self.eat_keyword(Keyword::Primary) {
                AlterTableSpec::DropPrimaryKey
            } else {
                AlterTableSpec::DropIndex {
                    name: self.expect_identifier()?,
                }
            };
            self.expect_keyword(Keyword::On)?;
            let table = self.parse_object_name()?;
            return Ok(Statement::AlterTable(AlterTableStatement {
                table,
                specs: vec![spec],
            }));
        }

        let is_view = if self.eat_keyword(Keyword::View) {
            true
        } else {
            if self.check_keyword(Keyword::Temporary) {
                return Err(ParseError::unsupported(
                    "temporary tables",
                    self.current_span(),
                ));
            }
            self.expect_keyword(Keyword::Table)?;
            false
        };

        let if_exists = if self.eat_keyword(Keyword::If) {
            self.expect_keyword(Keyword::Exists)?;
            true
        } else {
            false
        };
        let mut names = vec![];
        loop {
            names.push(self.parse_object_name()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        if !self.eat_keyword(Keyword::Restrict) {
            self.eat_keyword(Keyword::Cascade);
        }

        Ok(if is_view {
            Statement::DropView(DropViewStatement { names, if_exists })
        } else {
            Statement::DropTable(DropTableStatement { names, if_exists })
        })
    }

    pub(super) fn parse_rename(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Rename)?;
        self.expect_keyword(Keyword::Table)?;
        let mut renames = vec![];
        loop {
            let from = self.parse_object_name()?;
            self.expect_keyword(Keyword::To)?;
            let to = self.parse_object_name()?;
            renames.push((from, to));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::RenameTable(RenameTableStatement { renames }))
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    /// A table or view name. Names are scoped to a single schema, so
    /// qualified names are rejected.
    fn parse_object_name(&mut self) -> Result<String, ParseError> {
        let name = self.expect_identifier()?;
        if self.check(&TokenKind::Dot) {
            return Err(ParseError::unsupported(
                "schema-qualified names",
                self.current_span(),
            ));
        }
        Ok(name)
    }

    /// Upper-cased text of the current bare word (identifier or keyword).
    fn current_word(&self) -> Option<String> {
        match &self.current.kind {
            TokenKind::Identifier(_) | TokenKind::Keyword(_)
                if !self.current_text().starts_with('`') =>
            {
                Some(self.current_text().to_ascii_uppercase())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Statement {
        match Parser::new(sql).parse_statement() {
            Ok(statement) => statement,
            Err(err) => panic!("failed to parse {sql:?}: {err}"),
        }
    }

    fn create_table(sql: &str) -> CreateTableStatement {
        match parse(sql) {
            Statement::CreateTable(table) => table,
            other => panic!("expected CREATE TABLE, got {other:?}"),
        }
    }

    fn alter_specs(sql: &str) -> Vec<AlterTableSpec> {
        match parse(sql) {
            Statement::AlterTable(alter) => alter.specs,
            other => panic!("expected ALTER TABLE, got {other:?}"),
        }
    }

    #[test]
    fn test_create_table_columns_and_keys() {
        let table = create_table(
            "CREATE TABLE IF NOT EXISTS `Users` (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
                name VARCHAR(64) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin DEFAULT 'x' COMMENT 'who',
                created TIMESTAMP(3) DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3),
                PRIMARY KEY (id),
                UNIQUE KEY name_uk (name(10) DESC),
                KEY (created) USING BTREE COMMENT 'c'
            ) ENGINE=InnoDB AUTO_INCREMENT=42 DEFAULT CHARSET=utf8mb4",
        );
        assert_eq!(table.name, "Users");
        assert!(table.if_not_exists);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(
            table.columns[0].data_type,
            DataType::Integer {
                kind: IntegerKind::Big,
                display_width: None,
                unsigned: true,
                zerofill: false,
            }
        );
        assert!(table.columns[0].auto_increment);
        assert_eq!(table.columns[1].charset.as_deref(), Some("utf8mb4"));
        assert_eq!(table.columns[1].collation.as_deref(), Some("utf8mb4_bin"));
        assert!(table.columns[2].on_update.is_some());

        assert_eq!(table.indexes.len(), 3);
        assert_eq!(table.indexes[0].kind, IndexKind::Primary);
        assert_eq!(table.indexes[1].name.as_deref(), Some("name_uk"));
        assert_eq!(table.indexes[1].columns[0].length, Some(10));
        assert_eq!(
            table.indexes[1].columns[0].direction,
            Some(OrderDirection::Desc)
        );
        assert_eq!(table.indexes[2].name, None);
        assert_eq!(table.indexes[2].comment.as_deref(), Some("c"));

        assert_eq!(table.options.engine.as_deref(), Some("InnoDB"));
        assert_eq!(table.options.auto_increment, Some(42));
        assert_eq!(table.options.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn test_display_width_is_kept_by_parser() {
        let table = create_table("CREATE TABLE t (a int(11) zerofill, b DOUBLE PRECISION(8,2))");
        assert_eq!(
            table.columns[0].data_type,
            DataType::Integer {
                kind: IntegerKind::Int,
                display_width: Some(11),
                unsigned: false,
                zerofill: true,
            }
        );
        assert_eq!(
            table.columns[1].data_type,
            DataType::Double {
                precision: Some(8),
                scale: Some(2),
                unsigned: false,
            }
        );
    }

    #[test]
    fn test_constraints() {
        let table = create_table(
            "CREATE TABLE child (
                id int,
                parent_id int,
                CONSTRAINT fk_parent FOREIGN KEY (parent_id) REFERENCES parent (id)
                    ON DELETE CASCADE ON UPDATE SET NULL,
                CONSTRAINT positive CHECK (id > 0) NOT ENFORCED,
                CHECK (parent_id <> id)
            )",
        );
        assert_eq!(table.constraints.len(), 3);
        let fk = table.constraints[0]
            .as_foreign_key()
            .expect("foreign key");
        assert_eq!(table.constraints[0].name.as_deref(), Some("fk_parent"));
        assert_eq!(fk.referenced_table, "parent");
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, Some(ReferentialAction::SetNull));
        let check = table.constraints[1].as_check().expect("check");
        assert!(!check.enforced);
        assert_eq!(table.constraints[2].name, None);
    }

    #[test]
    fn test_generated_and_inline_attributes() {
        let table = create_table(
            "CREATE TABLE t (
                a int PRIMARY KEY,
                b int UNIQUE,
                c int AS (a + b) STORED,
                d int GENERATED ALWAYS AS (a * 2) INVISIBLE,
                e int CHECK (e > 0)
            )",
        );
        assert!(table.columns[0].primary_key);
        assert!(table.columns[1].unique);
        let generated = table.columns[2].generated.as_ref().expect("generated");
        assert_eq!(generated.storage, GeneratedStorage::Stored);
        assert_eq!(
            table.columns[3].generated.as_ref().map(|g| g.storage),
            Some(GeneratedStorage::Virtual)
        );
        assert!(table.columns[3].invisible);
        assert!(table.columns[4].check.is_some());
    }

    #[test]
    fn test_enum_and_default_expression() {
        let table = create_table(
            "CREATE TABLE t (s ENUM('a', 'b') NOT NULL DEFAULT 'a', n int DEFAULT -1, j json DEFAULT (json_array()))",
        );
        assert_eq!(
            table.columns[0].data_type,
            DataType::Enum(vec!["a".into(), "b".into()])
        );
        assert_eq!(table.columns[0].nullable, Some(false));
        assert!(matches!(
            table.columns[1].default,
            Some(Expr::Unary { .. })
        ));
        assert!(matches!(
            table.columns[2].default,
            Some(Expr::Paren(_))
        ));
    }

    #[test]
    fn test_partitioning() {
        let table = create_table(
            "CREATE TABLE t (id int, created date)
             PARTITION BY RANGE (year(created)) (
                PARTITION p0 VALUES LESS THAN (2020),
                PARTITION p1 VALUES LESS THAN MAXVALUE ENGINE = InnoDB
             )",
        );
        let partition = table.partition.expect("partitioned");
        assert_eq!(partition.method, PartitionMethod::Range);
        assert_eq!(partition.definitions.len(), 2);
        assert_eq!(
            partition.definitions[1].values,
            Some(PartitionValues::LessThan(vec![PartitionBound::MaxValue]))
        );

        let table = create_table("CREATE TABLE t (id int) PARTITION BY LINEAR KEY () PARTITIONS 4");
        let partition = table.partition.expect("partitioned");
        assert_eq!(partition.method, PartitionMethod::Key { linear: true });
        assert_eq!(partition.count, Some(4));
    }

    #[test]
    fn test_alter_table_specs() {
        let specs = alter_specs(
            "ALTER TABLE t ADD COLUMN c int NOT NULL AFTER b, ADD d int FIRST, DROP COLUMN e,
             DROP KEY k, DROP PRIMARY KEY, ADD KEY k2 (c), MODIFY c bigint,
             CHANGE d dd int, RENAME COLUMN x TO y, DROP FOREIGN KEY fk, DROP CHECK ck,
             ENGINE = MyISAM COMMENT 'hi', ADD CONSTRAINT fk2 FOREIGN KEY (c) REFERENCES p (id)",
        );
        assert_eq!(specs.len(), 13);
        assert!(matches!(
            &specs[0],
            AlterTableSpec::AddColumn { position: Some(ColumnPosition::After(after)), .. } if after == "b"
        ));
        assert!(matches!(
            specs[1],
            AlterTableSpec::AddColumn {
                position: Some(ColumnPosition::First),
                ..
            }
        ));
        assert!(matches!(&specs[2], AlterTableSpec::DropColumn { name } if name == "e"));
        assert!(matches!(specs[4], AlterTableSpec::DropPrimaryKey));
        assert!(matches!(specs[5], AlterTableSpec::AddIndex(_)));
        assert!(matches!(&specs[7], AlterTableSpec::ChangeColumn { old_name, .. } if old_name == "d"));
        assert!(matches!(&specs[11], AlterTableSpec::TableOptions(o) if o.comment.as_deref() == Some("hi")));
        assert!(matches!(specs[12], AlterTableSpec::AddConstraint(_)));
    }

    #[test]
    fn test_index_statements_map_to_alter_table() {
        let specs = alter_specs("CREATE UNIQUE INDEX u ON t (a, b)");
        assert!(matches!(
            &specs[0],
            AlterTableSpec::AddIndex(index) if index.kind == IndexKind::Unique && index.columns.len() == 2
        ));
        let specs = alter_specs("DROP INDEX u ON t");
        assert!(matches!(&specs[0], AlterTableSpec::DropIndex { name } if name == "u"));
    }

    #[test]
    fn test_views() {
        let Statement::CreateView(create) = parse(
            "CREATE OR REPLACE ALGORITHM=MERGE DEFINER=`root`@`localhost` SQL SECURITY INVOKER
             VIEW v (a, b) AS SELECT id, name FROM t WITH LOCAL CHECK OPTION",
        ) else {
            panic!("expected CREATE VIEW");
        };
        assert!(create.or_replace);
        assert_eq!(create.view.algorithm, Some(ViewAlgorithm::Merge));
        assert_eq!(create.view.security, Some(ViewSecurity::Invoker));
        assert_eq!(create.view.columns, vec!["a", "b"]);
        assert_eq!(create.view.check_option, Some(ViewCheckOption::Local));

        assert!(matches!(
            parse("ALTER VIEW v AS SELECT 1"),
            Statement::AlterView(_)
        ));
    }

    #[test]
    fn test_drop_and_rename() {
        assert!(matches!(
            parse("DROP TABLE IF EXISTS a, b"),
            Statement::DropTable(DropTableStatement { ref names, if_exists: true }) if names.len() == 2
        ));
        assert!(matches!(parse("DROP VIEW v"), Statement::DropView(_)));
        assert!(matches!(
            parse("RENAME TABLE a TO b, c TO d"),
            Statement::RenameTable(RenameTableStatement { ref renames }) if renames.len() == 2
        ));
        assert!(matches!(
            parse("ALTER TABLE a RENAME TO b"),
            Statement::RenameTable(_)
        ));
    }

    #[test]
    fn test_rejected_syntax() {
        for sql in [
            "CREATE TABLE t (a int REFERENCES p (id))",
            "CREATE TABLE t (a int) STATS_PERSISTENT = 1",
            "CREATE TEMPORARY TABLE t (a int)",
            "CREATE TABLE db.t (a int)",
            "CREATE TABLE t (a int, KEY ((a + 1)))",
        ] {
            assert!(Parser::new(sql).parse_statement().is_err(), "{sql}");
        }
    }
}
