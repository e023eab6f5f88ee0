//! CREATE TABLE parsing: data types, column attributes, keys, constraints,
//! table options and partitioning.

mod common;

use common::{parse_create_table, parse_err};
use oxide_ddl::ast::{
    DataType, IndexKind, IntegerKind, LobSize, PartitionMethod, PartitionValues,
    ReferentialAction,
};

// =============================================================================
// Data types
// =============================================================================

#[test]
fn test_data_type_family() {
    let table = parse_create_table(
        "CREATE TABLE t (
            a tinyint(1), b decimal(10,2) unsigned zerofill, c float(7,4), d char,
            e varbinary(16), f mediumtext, g enum('x','y'), h set('a'), i datetime(6),
            j year(4), k json, l point, m bit(8), n numeric, o bool, p integer unsigned
        )",
    );
    let types: Vec<&DataType> = table.columns.iter().map(|c| &c.data_type).collect();
    assert_eq!(
        types,
        vec![
            &DataType::Integer {
                kind: IntegerKind::Tiny,
                display_width: Some(1),
                unsigned: false,
                zerofill: false
            },
            &DataType::Decimal {
                precision: Some(10),
                scale: Some(2),
                unsigned: true,
                zerofill: true
            },
            &DataType::Float {
                precision: Some(7),
                scale: Some(4),
                unsigned: false
            },
            &DataType::Char(None),
            &DataType::Varbinary(Some(16)),
            &DataType::Text(LobSize::Medium),
            &DataType::Enum(vec!["x".into(), "y".into()]),
            &DataType::Set(vec!["a".into()]),
            &DataType::Datetime(Some(6)),
            &DataType::Year,
            &DataType::Json,
            &DataType::Spatial("point".into()),
            &DataType::Bit(Some(8)),
            &DataType::Decimal {
                precision: None,
                scale: None,
                unsigned: false,
                zerofill: false
            },
            &DataType::Boolean,
            &DataType::Integer {
                kind: IntegerKind::Int,
                display_width: None,
                unsigned: true,
                zerofill: false
            },
        ]
    );
}

#[test]
fn test_type_names_are_case_insensitive() {
    let table = parse_create_table("CREATE TABLE t (a VARCHAR(10), b VarChar(10))");
    assert_eq!(table.columns[0].data_type, table.columns[1].data_type);
}

// =============================================================================
// Columns
// =============================================================================

#[test]
fn test_nullability_is_tri_state() {
    let table = parse_create_table("CREATE TABLE t (a int, b int NULL, c int NOT NULL)");
    let nullable: Vec<Option<bool>> = table.columns.iter().map(|c| c.nullable).collect();
    assert_eq!(nullable, vec![None, Some(true), Some(false)]);
}

#[test]
fn test_identifier_case_is_preserved() {
    let table = parse_create_table("CREATE TABLE Orders (OrderId int, `Line Item` int)");
    assert_eq!(table.name, "Orders");
    assert_eq!(table.columns[0].name, "OrderId");
    assert_eq!(table.columns[1].name, "Line Item");
}

#[test]
fn test_unreserved_keywords_as_column_names() {
    let table = parse_create_table("CREATE TABLE t (comment text, engine int, first int)");
    let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["comment", "engine", "first"]);
}

// =============================================================================
// Keys and constraints
// =============================================================================

#[test]
fn test_key_kinds() {
    let table = parse_create_table(
        "CREATE TABLE t (
            a int, b text, g geometry NOT NULL,
            PRIMARY KEY (a),
            UNIQUE INDEX (a),
            CONSTRAINT named_uk UNIQUE (a),
            FULLTEXT KEY ft (b),
            SPATIAL INDEX sp (g),
            INDEX ix (a) INVISIBLE
        )",
    );
    let kinds: Vec<IndexKind> = table.indexes.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IndexKind::Primary,
            IndexKind::Unique,
            IndexKind::Unique,
            IndexKind::Fulltext,
            IndexKind::Spatial,
            IndexKind::Plain,
        ]
    );
    assert_eq!(table.indexes[1].name, None);
    assert_eq!(table.indexes[2].name.as_deref(), Some("named_uk"));
    assert!(table.indexes[5].invisible);
}

#[test]
fn test_foreign_key_actions() {
    let table = parse_create_table(
        "CREATE TABLE c (
            p int,
            FOREIGN KEY (p) REFERENCES parent (id) ON UPDATE NO ACTION ON DELETE RESTRICT
        )",
    );
    let fk = table.constraints[0].as_foreign_key().expect("foreign key");
    assert_eq!(table.constraints[0].name, None);
    assert_eq!(fk.columns, vec!["p"]);
    assert_eq!(fk.referenced_columns, vec!["id"]);
    assert_eq!(fk.on_update, Some(ReferentialAction::NoAction));
    assert_eq!(fk.on_delete, Some(ReferentialAction::Restrict));
}

// =============================================================================
// Options and partitioning
// =============================================================================

#[test]
fn test_table_options_with_commas() {
    let table = parse_create_table(
        "CREATE TABLE t (a int) ENGINE InnoDB, CHARACTER SET = latin1, COLLATE latin1_bin,
         ROW_FORMAT=compressed KEY_BLOCK_SIZE=8 COMMENT='audit'",
    );
    let options = &table.options;
    assert_eq!(options.engine.as_deref(), Some("InnoDB"));
    assert_eq!(options.charset.as_deref(), Some("latin1"));
    assert_eq!(options.collation.as_deref(), Some("latin1_bin"));
    assert_eq!(options.row_format.as_deref(), Some("COMPRESSED"));
    assert_eq!(options.key_block_size, Some(8));
    assert_eq!(options.comment.as_deref(), Some("audit"));
}

#[test]
fn test_list_columns_partitioning() {
    let table = parse_create_table(
        "CREATE TABLE t (region varchar(8)) PARTITION BY LIST COLUMNS (region) (
            PARTITION east VALUES IN ('ny', 'nj'),
            PARTITION west VALUES IN ('ca')
        )",
    );
    let spec = table.partition.expect("partition spec");
    assert_eq!(spec.method, PartitionMethod::ListColumns);
    assert_eq!(spec.columns, vec!["region"]);
    assert!(matches!(
        &spec.definitions[0].values,
        Some(PartitionValues::In(values)) if values.len() == 2
    ));
}

#[test]
fn test_hash_partitioning_by_count() {
    let table =
        parse_create_table("CREATE TABLE t (id int) PARTITION BY HASH (id) PARTITIONS 8");
    let spec = table.partition.expect("partition spec");
    assert_eq!(spec.method, PartitionMethod::Hash { linear: false });
    assert_eq!(spec.count, Some(8));
    assert!(spec.definitions.is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_errors_carry_positions() {
    let err = parse_err("CREATE TABLE t (a int,)");
    assert_eq!(err.expected.as_deref(), Some("identifier"));
    assert_eq!(err.span.start, 22);
}

#[test]
fn test_rejected_table_syntax() {
    parse_err("CREATE TABLE t (a int) AUTOEXTEND_SIZE = 4");
    parse_err("CREATE TABLE t (a int) PARTITION BY RANGE (a) SUBPARTITION BY HASH (a)");
    parse_err("CREATE TABLE t (a unknown_type(1, 2))");
    parse_err("CREATE TABLE t LIKE u");
    parse_err("CREATE TABLE t (a int CONSTRAINT c CHECK (a > 0))");
}
