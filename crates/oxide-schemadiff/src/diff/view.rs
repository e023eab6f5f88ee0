//! Diff of two versions of one view.

use oxide_ddl::ast::AlterViewStatement;

use crate::entity::View;

/// `ALTER VIEW` carrying the whole target definition, or `None` when the
/// views are equal.
#[must_use]
pub fn diff_views(from: &View, to: &View) -> Option<AlterViewStatement> {
    (from.to_sql() != to.to_sql()).then(|| AlterViewStatement {
        view: to.definition().clone(),
    })
}

#[cfg(test)]
mod tests {
    use oxide_ddl::{parse_statement, Statement};

    use super::*;

    fn view(sql: &str) -> View {
        match parse_statement(sql) {
            Ok(Statement::CreateView(create)) => View::new(&create.view),
            other => panic!("expected CREATE VIEW, got {other:?}"),
        }
    }

    #[test]
    fn test_equal_views() {
        let from = view("create view v as select a from t");
        let to = view("CREATE OR REPLACE ALGORITHM = UNDEFINED VIEW V AS SELECT A FROM T");
        assert_eq!(diff_views(&from, &to), None);
    }

    #[test]
    fn test_changed_view_is_redefined() {
        let from = view("create view v as select a from t");
        let to = view("create sql security invoker view v as select a, b from t");
        let alter = diff_views(&from, &to).map(|alter| alter.to_string());
        assert_eq!(
            alter.as_deref(),
            Some("ALTER SQL SECURITY INVOKER VIEW v AS SELECT a, b FROM t")
        );
    }
}
