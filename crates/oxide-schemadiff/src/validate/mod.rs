//! Semantic validation of a whole schema.
//!
//! Validation runs in stages: entity names, table-local rules, foreign
//! keys, foreign key cycles, schema-wide names, then views. Every error of
//! the first failing stage is reported; later stages assume the earlier
//! ones passed.

mod table;
mod view;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SemanticError;
use crate::graph::DependencyGraph;
use crate::hints::KeyNameScope;
use crate::schema::Schema;

pub use table::validate_table;

type Stage = fn(&Schema) -> Vec<SemanticError>;

/// Validates `schema`; an empty result means it is valid.
#[must_use]
pub fn validate(schema: &Schema) -> Vec<SemanticError> {
    let stages: [(&str, Stage); 6] = [
        ("entity names", duplicate_entity_names),
        ("tables", table::validate_tables),
        ("foreign keys", table::validate_foreign_keys),
        ("foreign key cycles", foreign_key_cycles),
        ("schema names", schema_scope_names),
        ("views", view::validate_views),
    ];
    for (stage, check) in stages {
        let errors = check(schema);
        if !errors.is_empty() {
            debug!(stage, errors = errors.len(), "schema validation failed");
            return errors;
        }
    }
    Vec::new()
}

fn duplicate_entity_names(schema: &Schema) -> Vec<SemanticError> {
    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    let mut errors = Vec::new();
    for entity in schema.entities() {
        let count = seen.entry(entity.name()).or_default();
        *count += 1;
        if *count == 2 {
            errors.push(SemanticError::DuplicateEntityName {
                name: entity.name().to_string(),
            });
        }
    }
    errors
}

fn foreign_key_cycles(schema: &Schema) -> Vec<SemanticError> {
    let mut graph: DependencyGraph<&str> = DependencyGraph::new();
    for table in schema.tables() {
        graph.add_node(table.name());
    }
    for table in schema.tables() {
        for parent in table.references() {
            graph.add_dependency(table.name(), parent);
        }
    }
    graph
        .find_cycle()
        .map(|cycle| SemanticError::CircularForeignKey {
            tables: cycle.into_iter().map(String::from).collect(),
        })
        .into_iter()
        .collect()
}

/// Constraint names are unique across the schema; key names too when the
/// hints ask for it.
fn schema_scope_names(schema: &Schema) -> Vec<SemanticError> {
    let mut errors = Vec::new();

    let mut constraints: BTreeMap<&str, &str> = BTreeMap::new();
    for table in schema.tables() {
        for constraint in table.constraints() {
            let Some(name) = constraint.name.as_deref() else {
                continue;
            };
            if let Some(first_table) = constraints.insert(name, table.name()) {
                errors.push(SemanticError::DuplicateConstraintName {
                    name: name.to_string(),
                    first_table: first_table.to_string(),
                    second_table: table.name().to_string(),
                });
            }
        }
    }

    if schema.hints().key_name_scope == KeyNameScope::Schema {
        let mut keys: BTreeMap<&str, &str> = BTreeMap::new();
        for table in schema.tables() {
            for key in table.keys().iter().filter(|k| !k.is_primary()) {
                let Some(name) = key.name.as_deref() else {
                    continue;
                };
                match keys.get(name) {
                    Some(owner) if *owner != table.name() => {
                        errors.push(SemanticError::DuplicateKeyName {
                            table: table.name().to_string(),
                            key: name.to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        keys.insert(name, table.name());
                    }
                }
            }
        }
    }
    errors
}
