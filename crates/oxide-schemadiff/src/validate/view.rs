//! View rules: references, cycles and column resolution.

use std::collections::{BTreeMap, BTreeSet};

use oxide_ddl::ast::{ColumnRef, Expr, SelectStatement, TableRef};

use crate::error::SemanticError;
use crate::graph::{DependencyGraph, Direction};
use crate::schema::Schema;

/// Columns a relation exposes: all referenceable ones, and the ones `*`
/// expands to (invisible columns are skipped).
#[derive(Debug, Clone, Default)]
struct Columns {
    all: Vec<String>,
    visible: Vec<String>,
}

/// A relation in a FROM clause, under the name queries refer to it by.
#[derive(Debug)]
struct Relation {
    label: String,
    columns: Columns,
}

/// Name resolution scope of one query block. Subqueries in expressions
/// see their enclosing scopes; derived tables do not.
struct Scope<'a> {
    relations: Vec<Relation>,
    /// Columns coalesced by `JOIN ... USING` and `NATURAL JOIN`.
    using: BTreeSet<String>,
    parent: Option<&'a Scope<'a>>,
}

impl Scope<'_> {
    fn relation(&self, label: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.label == label)
    }
}

pub(super) fn validate_views(schema: &Schema) -> Vec<SemanticError> {
    let mut errors = Vec::new();
    for view in schema.views() {
        for reference in view.references() {
            if schema.entity(reference).is_none() {
                errors.push(SemanticError::UnknownViewReference {
                    view: view.name().to_string(),
                    reference: reference.clone(),
                });
            }
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    let mut graph: DependencyGraph<&str> = DependencyGraph::new();
    for view in schema.views() {
        graph.add_node(view.name());
        if view.references().iter().any(|r| r == view.name()) {
            errors.push(SemanticError::CircularViewReference {
                views: vec![view.name().to_string(), view.name().to_string()],
            });
        }
    }
    for view in schema.views() {
        for reference in view.references() {
            if schema.view(reference).is_some() {
                graph.add_dependency(view.name(), reference.as_str());
            }
        }
    }
    if errors.is_empty() {
        if let Some(cycle) = graph.find_cycle() {
            errors.push(SemanticError::CircularViewReference {
                views: cycle.into_iter().map(String::from).collect(),
            });
        }
    }
    if !errors.is_empty() {
        return errors;
    }

    let mut catalog: BTreeMap<String, Columns> = schema
        .tables()
        .map(|table| {
            let columns = Columns {
                all: table.columns().iter().map(|c| c.name.clone()).collect(),
                visible: table
                    .columns()
                    .iter()
                    .filter(|c| !c.invisible)
                    .map(|c| c.name.clone())
                    .collect(),
            };
            (table.name().to_string(), columns)
        })
        .collect();

    let order = graph.topological_order(Direction::Create).unwrap_or_default();
    for name in order {
        let Some(view) = schema.view(name) else {
            continue;
        };
        let mut resolver = Resolver {
            view: view.name(),
            catalog: &catalog,
            errors: Vec::new(),
        };
        let output = resolver.query_columns(view.query(), None);
        let mut view_errors = resolver.errors;

        let names = if view.column_names().is_empty() {
            output
        } else {
            if view.column_names().len() != output.len() {
                view_errors.push(SemanticError::ViewColumnCountMismatch {
                    view: view.name().to_string(),
                    expected: view.column_names().len(),
                    found: output.len(),
                });
            }
            view.column_names().to_vec()
        };
        let mut seen = BTreeSet::new();
        for column in &names {
            if !seen.insert(column.as_str()) {
                view_errors.push(SemanticError::DuplicateViewColumn {
                    view: view.name().to_string(),
                    column: column.clone(),
                });
            }
        }

        errors.extend(view_errors);
        catalog.insert(
            view.name().to_string(),
            Columns {
                all: names.clone(),
                visible: names,
            },
        );
    }
    errors
}

/// Resolves the column references of one view.
struct Resolver<'a> {
    view: &'a str,
    catalog: &'a BTreeMap<String, Columns>,
    errors: Vec<SemanticError>,
}

impl Resolver<'_> {
    fn report(&mut self, error: SemanticError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    fn invalid(&mut self, column: String) {
        self.report(SemanticError::InvalidColumnReference {
            view: self.view.to_string(),
            column,
        });
    }

    /// Validates `query` and returns the names of its output columns.
    fn query_columns(&mut self, query: &SelectStatement, parent: Option<&Scope<'_>>) -> Vec<String> {
        let mut scope = Scope {
            relations: Vec::new(),
            using: BTreeSet::new(),
            parent,
        };
        for table in &query.from {
            for leaf in table.leaves() {
                match leaf {
                    TableRef::Table { name, alias, .. } => scope.relations.push(Relation {
                        label: alias.clone().unwrap_or_else(|| name.clone()),
                        columns: self.catalog.get(name).cloned().unwrap_or_default(),
                    }),
                    TableRef::Subquery { query, alias } => {
                        let columns = self.query_columns(query, None);
                        scope.relations.push(Relation {
                            label: alias.clone(),
                            columns: Columns {
                                all: columns.clone(),
                                visible: columns,
                            },
                        });
                    }
                    TableRef::Join { .. } => {}
                }
            }
            coalesced_columns(table, &scope.relations, &mut scope.using);
        }

        let aliases: Vec<String> = query
            .columns
            .iter()
            .filter_map(|c| c.alias.clone())
            .collect();

        for column in &query.columns {
            if !matches!(column.expr, Expr::Wildcard { .. }) {
                self.expression(&column.expr, &scope, &[]);
            }
        }
        for table in &query.from {
            for join in table.joins() {
                if let Some(on) = &join.on {
                    self.expression(on, &scope, &[]);
                }
                for column in &join.using {
                    let providers = scope
                        .relations
                        .iter()
                        .filter(|r| r.columns.all.contains(column))
                        .count();
                    if providers < 2 {
                        self.invalid(column.clone());
                    }
                }
            }
        }
        if let Some(where_clause) = &query.where_clause {
            self.expression(where_clause, &scope, &[]);
        }
        for expr in query
            .group_by
            .iter()
            .chain(query.having.iter())
            .chain(query.order_by.iter().map(|o| &o.expr))
        {
            self.expression(expr, &scope, &aliases);
        }

        let mut output = Vec::new();
        for column in &query.columns {
            if let Some(alias) = &column.alias {
                output.push(alias.clone());
                continue;
            }
            match &column.expr {
                Expr::Wildcard { table: None } => {
                    if scope.relations.is_empty() {
                        self.invalid(String::from("*"));
                    }
                    let mut coalesced = BTreeSet::new();
                    for relation in &scope.relations {
                        for name in &relation.columns.visible {
                            if scope.using.contains(name) && !coalesced.insert(name.clone()) {
                                continue;
                            }
                            output.push(name.clone());
                        }
                    }
                }
                Expr::Wildcard { table: Some(label) } => match scope.relation(label) {
                    Some(relation) => output.extend(relation.columns.visible.iter().cloned()),
                    None => self.invalid(format!("{label}.*")),
                },
                Expr::Column { name, .. } => output.push(name.clone()),
                expr => output.push(expr.to_string()),
            }
        }

        for branch in &query.unions {
            self.query_columns(&branch.select, parent);
        }
        output
    }

    fn expression(&mut self, expr: &Expr, scope: &Scope<'_>, aliases: &[String]) {
        for reference in expr.column_refs() {
            self.column(reference, scope, aliases);
        }
        for query in expr.subqueries() {
            self.query_columns(query, Some(scope));
        }
    }

    fn column(&mut self, reference: ColumnRef<'_>, scope: &Scope<'_>, aliases: &[String]) {
        let name = reference.name;
        if let Some(label) = reference.table {
            let mut current = Some(scope);
            while let Some(s) = current {
                if let Some(relation) = s.relation(label) {
                    if !relation.columns.all.iter().any(|c| c == name) {
                        self.invalid(format!("{label}.{name}"));
                    }
                    return;
                }
                current = s.parent;
            }
            self.invalid(format!("{label}.{name}"));
            return;
        }

        if aliases.iter().any(|a| a == name) {
            return;
        }
        let mut current = Some(scope);
        while let Some(s) = current {
            let candidates: Vec<String> = s
                .relations
                .iter()
                .filter(|r| r.columns.all.iter().any(|c| c == name))
                .map(|r| r.label.clone())
                .collect();
            if candidates.len() > 1 && !s.using.contains(name) {
                self.report(SemanticError::AmbiguousColumnReference {
                    view: self.view.to_string(),
                    column: name.to_string(),
                    candidates,
                });
                return;
            }
            if !candidates.is_empty() {
                return;
            }
            current = s.parent;
        }
        self.invalid(name.to_string());
    }
}

/// Collects the columns the joins in `table` merge: the `USING` lists,
/// and for natural joins every visible column both sides share.
fn coalesced_columns(table: &TableRef, relations: &[Relation], out: &mut BTreeSet<String>) {
    let TableRef::Join { left, join } = table else {
        return;
    };
    coalesced_columns(left, relations, out);
    coalesced_columns(&join.table, relations, out);
    out.extend(join.using.iter().cloned());
    if join.join_type.is_natural() {
        let left_columns = visible_columns(left, relations);
        let right_columns = visible_columns(&join.table, relations);
        out.extend(left_columns.intersection(&right_columns).cloned());
    }
}

fn visible_columns(table: &TableRef, relations: &[Relation]) -> BTreeSet<String> {
    table
        .leaves()
        .into_iter()
        .filter_map(|leaf| match leaf {
            TableRef::Table { name, alias, .. } => Some(alias.as_ref().unwrap_or(name)),
            TableRef::Subquery { alias, .. } => Some(alias),
            TableRef::Join { .. } => None,
        })
        .filter_map(|label| relations.iter().find(|r| &r.label == label))
        .flat_map(|r| r.columns.visible.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(sql: &str) -> Vec<SemanticError> {
        match Schema::from_sql(sql) {
            Ok(_) => Vec::new(),
            Err(err) => err.semantic_errors().to_vec(),
        }
    }

    const TABLES: &str = "create table a (id int, x int, shared int); \
                          create table b (id int, y int, shared int);";

    #[test]
    fn test_unknown_reference() {
        let errors = errors("create view v as select * from missing");
        assert_eq!(
            errors,
            vec![SemanticError::UnknownViewReference {
                view: "v".into(),
                reference: "missing".into()
            }]
        );
    }

    #[test]
    fn test_circular_views() {
        let errors = errors(
            "create view v1 as select * from v2; create view v2 as select * from v1",
        );
        assert_eq!(
            errors,
            vec![SemanticError::CircularViewReference {
                views: vec!["v1".into(), "v2".into(), "v1".into()]
            }]
        );
        let errors = errors_for_self_reference();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entity(), "v");
    }

    fn errors_for_self_reference() -> Vec<SemanticError> {
        errors("create view v as select 1 as one from v")
    }

    #[test]
    fn test_ambiguous_column() {
        let errors = errors(&format!(
            "{TABLES} create view v as select shared from a join b on a.id = b.id"
        ));
        assert_eq!(
            errors,
            vec![SemanticError::AmbiguousColumnReference {
                view: "v".into(),
                column: "shared".into(),
                candidates: vec!["a".into(), "b".into()],
            }]
        );
    }

    #[test]
    fn test_using_coalesces_columns() {
        let errors = errors(&format!(
            "{TABLES} create view v as select id, x, y from a join b using (id)"
        ));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_natural_join_coalesces_shared_columns() {
        let errors = errors(&format!(
            "{TABLES} create view v as select id, shared, x, y from a natural join b"
        ));
        assert!(errors.is_empty(), "{errors:?}");

        let schema = Schema::from_sql(&format!(
            "{TABLES} create view v as select * from a natural left join b"
        ))
        .unwrap();
        assert_eq!(
            schema.view("v").unwrap().to_sql().to_string(),
            "CREATE VIEW v AS SELECT * FROM a NATURAL LEFT JOIN b"
        );
    }

    #[test]
    fn test_natural_join_only_merges_its_own_sides() {
        let errors = errors(&format!(
            "{TABLES} create table c (z int, shared int); \
             create view v as select shared, z from a natural join c; \
             create view w as select id from a natural join c cross join b"
        ));
        assert_eq!(
            errors,
            vec![SemanticError::AmbiguousColumnReference {
                view: "w".into(),
                column: "id".into(),
                candidates: vec!["a".into(), "b".into()],
            }]
        );
    }

    #[test]
    fn test_unresolved_and_qualified_columns() {
        let errors = errors(&format!(
            "{TABLES} create view v as select a.nope, zzz from a as t"
        ));
        assert_eq!(
            errors,
            vec![
                SemanticError::InvalidColumnReference {
                    view: "v".into(),
                    column: "a.nope".into()
                },
                SemanticError::InvalidColumnReference {
                    view: "v".into(),
                    column: "zzz".into()
                },
            ]
        );
    }

    #[test]
    fn test_correlated_subquery_and_aliases() {
        let errors = errors(&format!(
            "{TABLES} create view v as select x as total from a \
             where exists (select 1 from b where b.id = a.id) order by total"
        ));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_view_columns_come_from_referenced_views() {
        let errors = errors(&format!(
            "{TABLES} create view v1 as select x as renamed from v2; \
             create view v2 as select x from a"
        ));
        assert!(errors.is_empty(), "{errors:?}");
        let errors = errors_in_chain();
        assert_eq!(
            errors,
            vec![SemanticError::InvalidColumnReference {
                view: "v1".into(),
                column: "id".into()
            }]
        );
    }

    fn errors_in_chain() -> Vec<SemanticError> {
        errors(&format!(
            "{TABLES} create view v1 as select id from v2; create view v2 as select x from a"
        ))
    }

    #[test]
    fn test_duplicate_and_counted_columns() {
        let errors = errors(&format!(
            "{TABLES} create view v as select * from a join b on a.x = b.y; \
             create view w (p, q) as select id from a"
        ));
        assert_eq!(
            errors,
            vec![
                SemanticError::DuplicateViewColumn {
                    view: "v".into(),
                    column: "id".into()
                },
                SemanticError::DuplicateViewColumn {
                    view: "v".into(),
                    column: "shared".into()
                },
                SemanticError::ViewColumnCountMismatch {
                    view: "w".into(),
                    expected: 2,
                    found: 1
                },
            ]
        );
    }

    #[test]
    fn test_derived_table() {
        let errors = errors(&format!(
            "{TABLES} create view v as select d.total from (select x as total from a) as d"
        ));
        assert!(errors.is_empty(), "{errors:?}");
    }
}
