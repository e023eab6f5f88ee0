#![allow(dead_code)]

use oxide_ddl::ast::{AlterTableSpec, CreateTableStatement, ViewDefinition};
use oxide_ddl::{ParseError, Parser, Statement};

pub fn parse(sql: &str) -> Statement {
    Parser::new(sql)
        .parse_statement()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_statement()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_create_table(sql: &str) -> CreateTableStatement {
    match parse(sql) {
        Statement::CreateTable(t) => t,
        other => panic!("Expected CREATE TABLE, got {other:?}"),
    }
}

pub fn parse_alter_specs(sql: &str) -> Vec<AlterTableSpec> {
    match parse(sql) {
        Statement::AlterTable(a) => a.specs,
        other => panic!("Expected ALTER TABLE, got {other:?}"),
    }
}

pub fn parse_view(sql: &str) -> ViewDefinition {
    match parse(sql) {
        Statement::CreateView(v) => v.view,
        Statement::AlterView(v) => v.view,
        other => panic!("Expected CREATE or ALTER VIEW, got {other:?}"),
    }
}

/// Verifies that `to_string()` produces a fixed point:
/// parse(sql).to_string() can be re-parsed and yields the same
/// string again.
pub fn round_trip(sql: &str) -> String {
    let ast1 = parse(sql);
    let rendered1 = ast1.to_string();
    let ast2 = parse(&rendered1);
    let rendered2 = ast2.to_string();
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
    assert_eq!(ast1, ast2, "Re-parsed tree differs for: {sql}");
    rendered1
}
