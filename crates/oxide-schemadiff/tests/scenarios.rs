//! End-to-end scenarios: load, diff, order and apply.

mod common;

use common::{assert_round_trip, invalid, labels, position, schema};
use oxide_schemadiff::{Change, Schema, SemanticError};

#[test]
fn test_column_type_change_and_new_prefix_key() {
    let from = schema("create table t (id int, name varchar(64), primary key (id))");
    let to = schema(
        "create table t (id bigint, name varchar(64), key name_idx(name(16)), primary key (id))",
    );
    let diff = from.diff(&to).unwrap();
    assert_eq!(diff.len(), 1);
    let [Change::AlterTable(alter)] = diff.ordered_changes() else {
        panic!("expected one ALTER TABLE, got {:?}", diff.ordered_changes());
    };
    assert_eq!(alter.table, "t");
    assert_eq!(
        alter.to_string(),
        "ALTER TABLE t MODIFY COLUMN id bigint, ADD KEY name_idx (name(16))"
    );
    assert_round_trip(&from, &to);
}

#[test]
fn test_view_chain_created_in_dependency_order() {
    let to = schema(
        "create view v1 as select * from v2; \
         create view v2 as select * from t; \
         create table t (id int primary key)",
    );
    let changes = Schema::default().diff(&to).unwrap().into_ordered_changes();
    let labels = labels(&changes);
    assert!(position(&labels, "CREATE TABLE t") < position(&labels, "CREATE VIEW v2"));
    assert!(position(&labels, "CREATE VIEW v2") < position(&labels, "CREATE VIEW v1"));
    assert_round_trip(&Schema::default(), &to);
}

#[test]
fn test_view_chain_over_existing_table() {
    let from = schema("create table t (id int primary key)");
    let to = schema(
        "create table t (id int primary key); \
         create view v1 as select * from v2; \
         create view v2 as select * from t",
    );
    let diff = from.diff(&to).unwrap();
    assert_eq!(
        diff.to_sql(),
        vec![
            "CREATE VIEW v2 AS SELECT * FROM t",
            "CREATE VIEW v1 AS SELECT * FROM v2",
        ]
    );
}

#[test]
fn test_invalid_table_reports_every_error() {
    let errors =
        invalid("create table invalid (id bigint, title varchar(64), title tinytext, primary key (val))");
    assert!(errors.iter().any(|e| matches!(
        e,
        SemanticError::DuplicateColumn { table, column } if table == "invalid" && column == "title"
    )));
    assert!(errors.iter().any(|e| matches!(
        e,
        SemanticError::UnknownKeyColumn { table, column, .. } if table == "invalid" && column == "val"
    )));
    assert!(errors.iter().all(|e| e.entity() == "invalid"));
}

#[test]
fn test_invalid_error_display_lists_errors() {
    let err = Schema::from_sql("create table t (a int, a int)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Schema is invalid:\n  - Duplicate column 'a' in table 't'"
    );
    assert_eq!(err.semantic_errors().len(), 1);
}

#[test]
fn test_canonical_sql_round_trips() {
    let source = "CREATE TABLE Orders (\
                    ID INT AUTO_INCREMENT PRIMARY KEY, \
                    Customer VARCHAR(32) NOT NULL, \
                    Total DECIMAL(10, 2) DEFAULT '0.00', \
                    KEY customer_idx (Customer)\
                  ) ENGINE=InnoDB; \
                  CREATE VIEW Big AS SELECT ID, Total FROM Orders WHERE Total > 100";
    let first = schema(source);
    let second = schema(&first.to_sql());
    assert_eq!(first.to_sql(), second.to_sql());
    assert!(first.diff(&second).unwrap().is_empty());
}

#[test]
fn test_foreign_key_graph_round_trip() {
    let from = schema(
        "create table users (id int primary key, email varchar(128) not null, unique key email (email)); \
         create table posts (id int primary key, user_id int, title varchar(64), \
             foreign key (user_id) references users (id)); \
         create view recent as select id, title from posts",
    );
    let to = schema(
        "create table users (id bigint primary key, email varchar(255) not null, unique key email (email)); \
         create table tags (id bigint primary key, label varchar(32)); \
         create table posts (id int primary key, user_id bigint, tag_id bigint, title varchar(64), \
             foreign key (user_id) references users (id), \
             foreign key (tag_id) references tags (id)); \
         create view recent as select p.id, p.title, t.label from posts p join tags t on t.id = p.tag_id",
    );
    let changes = assert_round_trip(&from, &to);
    let labels = labels(&changes);
    assert!(position(&labels, "CREATE TABLE tags") < position(&labels, "ALTER TABLE posts"));
    assert!(position(&labels, "ALTER TABLE posts") < position(&labels, "ALTER VIEW recent"));
}

#[test]
fn test_dropping_everything_round_trips() {
    let from = schema(
        "create table p (id int primary key); \
         create table c (id int primary key, pid int, foreign key (pid) references p (id)); \
         create view v as select c.id from c join p on p.id = c.pid",
    );
    let changes = assert_round_trip(&from, &Schema::default());
    assert_eq!(
        labels(&changes),
        vec!["DROP VIEW v", "DROP TABLE c", "DROP TABLE p"]
    );
}
