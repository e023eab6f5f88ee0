//! Diff of two whole schemas, ordered for application.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use oxide_ddl::ast::{AlterTableSpec, ConstraintDefinition};
use tracing::debug;

use super::table::diff_tables_with;
use super::view::diff_views;
use crate::change::Change;
use crate::entity::{Entity, Table};
use crate::error::{CycleError, DiffError};
use crate::graph::{DependencyGraph, Direction};
use crate::hints::{DiffHints, TableRenameStrategy};
use crate::schema::Schema;

/// The changes that turn one schema into another.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDiff {
    changes: BTreeMap<String, Vec<Change>>,
    ordered: Vec<Change>,
}

impl SchemaDiff {
    /// True when no entity differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Changes grouped by the name the entity has before they apply.
    #[must_use]
    pub const fn changes(&self) -> &BTreeMap<String, Vec<Change>> {
        &self.changes
    }

    /// Changes to one entity, in application order.
    #[must_use]
    pub fn entity_changes(&self, name: &str) -> &[Change] {
        self.changes.get(name).map_or(&[], Vec::as_slice)
    }

    /// Every change, in an order in which they can be applied.
    #[must_use]
    pub fn ordered_changes(&self) -> &[Change] {
        &self.ordered
    }

    #[must_use]
    pub fn into_ordered_changes(self) -> Vec<Change> {
        self.ordered
    }

    /// Canonical SQL of every change, in application order.
    #[must_use]
    pub fn to_sql(&self) -> Vec<String> {
        self.ordered.iter().map(Change::to_sql).collect()
    }
}

/// Computes the changes that turn `from` into `to`.
///
/// Entities are matched by name. A name that changes kind is dropped and
/// created again; with [`TableRenameStrategy::Heuristic`] a dropped and a
/// created table that only differ by name become a rename.
///
/// # Errors
///
/// [`DiffError::ConflictingRename`] when the rename heuristic is
/// ambiguous, [`DiffError::Cycle`] when the changes cannot be ordered.
pub fn diff_schemas(from: &Schema, to: &Schema, hints: &DiffHints) -> Result<SchemaDiff, DiffError> {
    let mut removed: Vec<&Entity> = Vec::new();
    let mut added: Vec<&Entity> = Vec::new();
    let mut matched: Vec<(&Entity, &Entity)> = Vec::new();
    for entity in from.entities() {
        match to.entity(entity.name()) {
            Some(target) if target.kind() == entity.kind() => matched.push((entity, target)),
            Some(target) => {
                removed.push(entity);
                added.push(target);
            }
            None => removed.push(entity),
        }
    }
    added.extend(
        to.entities()
            .iter()
            .filter(|entity| from.entity(entity.name()).is_none()),
    );

    let renames = match hints.table_rename_strategy {
        TableRenameStrategy::Heuristic => detect_table_renames(&removed, &added)?,
        TableRenameStrategy::AssumeDifferent => BTreeMap::new(),
    };
    let renamed_to: BTreeSet<&str> = renames.values().map(String::as_str).collect();

    let mut changes: Vec<Change> = renames
        .iter()
        .map(|(old, new)| Change::rename_table(old, new))
        .collect();
    for entity in removed.iter().filter(|e| !renames.contains_key(e.name())) {
        changes.push(match entity {
            Entity::Table(table) => Change::drop_table(table.name()),
            Entity::View(view) => Change::drop_view(view.name()),
        });
    }
    for entity in added.iter().filter(|e| !renamed_to.contains(e.name())) {
        changes.push(match entity {
            Entity::Table(table) => Change::CreateTable(table.statement().clone()),
            Entity::View(view) => Change::CreateView(view.statement()),
        });
    }
    for (source, target) in matched {
        match (source, target) {
            (Entity::Table(source), Entity::Table(target)) => {
                let source = follow_renamed_parents(source, &renames);
                let pinned = referenced_by_other_tables(from, source.name());
                changes.extend(
                    diff_tables_with(&source, target, hints, &pinned)
                        .into_iter()
                        .map(Change::AlterTable),
                );
            }
            (Entity::View(source), Entity::View(target)) => {
                changes.extend(diff_views(source, target).map(Change::AlterView));
            }
            _ => {}
        }
    }

    // stable: alters of one table keep their relative order
    changes.sort_by(|a, b| (a.rank(), a.entity_name()).cmp(&(b.rank(), b.entity_name())));
    let ordered = order_changes(&changes, from, to)?;

    let mut grouped: BTreeMap<String, Vec<Change>> = BTreeMap::new();
    for change in &ordered {
        grouped
            .entry(change.entity_name().to_string())
            .or_default()
            .push(change.clone());
    }
    debug!(
        changes = ordered.len(),
        entities = grouped.len(),
        renames = renames.len(),
        "schema diff"
    );
    Ok(SchemaDiff {
        changes: grouped,
        ordered,
    })
}

// ================================================================
// Matching
// ================================================================

/// Old name to new name for every dropped table whose definition, renamed,
/// is exactly one created table.
fn detect_table_renames(
    removed: &[&Entity],
    added: &[&Entity],
) -> Result<BTreeMap<String, String>, DiffError> {
    let dropped: Vec<&Table> = removed
        .iter()
        .filter_map(|e| e.as_table().map(Arc::as_ref))
        .collect();
    let created: Vec<&Table> = added
        .iter()
        .filter_map(|e| e.as_table().map(Arc::as_ref))
        .collect();

    let mut targets: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut sources: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for old in &dropped {
        for new in &created {
            if old.renamed(new.name()).to_sql() == new.to_sql() {
                targets.entry(old.name()).or_default().push(new.name());
                sources.entry(new.name()).or_default().push(old.name());
            }
        }
    }
    if let Some((entity, candidates)) = targets
        .iter()
        .chain(sources.iter())
        .find(|(_, candidates)| candidates.len() > 1)
    {
        return Err(DiffError::ConflictingRename {
            entity: (*entity).to_string(),
            candidates: candidates.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(targets
        .into_iter()
        .filter_map(|(old, new)| new.first().map(|new| (old.to_string(), (*new).to_string())))
        .collect())
}

/// `table` with foreign keys pointing at renamed parents under their new
/// names, since `RENAME TABLE` carries the references along.
fn follow_renamed_parents(table: &Table, renames: &BTreeMap<String, String>) -> Table {
    renames
        .iter()
        .filter(|(old, _)| table.references_table(old))
        .fold(table.clone(), |table, (old, new)| {
            table.with_parent_renamed(old, new)
        })
}

/// Columns of `table` that foreign keys of other tables reference.
fn referenced_by_other_tables(schema: &Schema, table: &str) -> BTreeSet<String> {
    let mut columns = BTreeSet::new();
    for other in schema.tables().filter(|t| t.name() != table) {
        for (_, fk) in other.foreign_keys() {
            if fk.referenced_table == table {
                columns.extend(fk.referenced_columns.iter().cloned());
            }
        }
    }
    columns
}

// ================================================================
// Ordering
// ================================================================

/// The name a change brings into existence.
fn creates(change: &Change) -> Option<&str> {
    match change {
        Change::CreateTable(create) => Some(&create.name),
        Change::CreateView(create) => Some(&create.view.name),
        Change::RenameTable { to, .. } => Some(to),
        _ => None,
    }
}

/// The name a change takes out of existence.
fn removes(change: &Change) -> Option<&str> {
    match change {
        Change::DropTable { name, .. } | Change::DropView { name, .. } => Some(name),
        Change::RenameTable { from, .. } => Some(from),
        _ => None,
    }
}

/// Entities that must exist when the change applies.
fn uses(change: &Change) -> Vec<String> {
    let parents = |constraints: Vec<&ConstraintDefinition>, own: &str| -> Vec<String> {
        constraints
            .into_iter()
            .filter_map(ConstraintDefinition::as_foreign_key)
            .map(|fk| fk.referenced_table.clone())
            .filter(|parent| parent != own)
            .collect()
    };
    match change {
        Change::CreateTable(create) => parents(create.constraints.iter().collect(), &create.name),
        Change::AlterTable(alter) => {
            let added = alter
                .specs
                .iter()
                .filter_map(|spec| match spec {
                    AlterTableSpec::AddConstraint(constraint) => Some(constraint),
                    _ => None,
                })
                .collect();
            parents(added, &alter.table)
        }
        Change::CreateView(create) => create.view.query.referenced_tables(),
        Change::AlterView(alter) => alter.view.query.referenced_tables(),
        Change::DropTable { .. } | Change::RenameTable { .. } | Change::DropView { .. } => {
            Vec::new()
        }
    }
}

/// Entities the current version of the changed entity references and the
/// changed version no longer does.
fn released(change: &Change, from: &Schema, to: &Schema) -> Vec<String> {
    let table_refs = |schema: &Schema, name: &str| -> Vec<String> {
        schema
            .table(name)
            .map(|t| t.references().into_iter().map(String::from).collect())
            .unwrap_or_default()
    };
    let view_refs = |schema: &Schema, name: &str| -> Vec<String> {
        schema
            .view(name)
            .map(|v| v.references().to_vec())
            .unwrap_or_default()
    };
    match change {
        Change::DropTable { name, .. } => table_refs(from, name),
        Change::DropView { name, .. } => view_refs(from, name),
        Change::AlterTable(alter) => {
            let kept = table_refs(to, &alter.table);
            let mut refs = table_refs(from, &alter.table);
            refs.retain(|r| !kept.contains(r));
            refs
        }
        Change::AlterView(alter) => {
            let kept = view_refs(to, &alter.view.name);
            let mut refs = view_refs(from, &alter.view.name);
            refs.retain(|r| !kept.contains(r));
            refs
        }
        Change::CreateTable(_) | Change::RenameTable { .. } | Change::CreateView(_) => Vec::new(),
    }
}

/// Columns an `ALTER TABLE` drops, renames or redefines.
fn reworked_columns(change: &Change) -> Vec<&str> {
    let Change::AlterTable(alter) = change else {
        return Vec::new();
    };
    alter
        .specs
        .iter()
        .filter_map(|spec| match spec {
            AlterTableSpec::DropColumn { name } => Some(name.as_str()),
            AlterTableSpec::ChangeColumn { old_name, .. }
            | AlterTableSpec::RenameColumn { old_name, .. } => Some(old_name.as_str()),
            AlterTableSpec::ModifyColumn { column, .. } => Some(column.name.as_str()),
            _ => None,
        })
        .collect()
}

fn indices(map: &BTreeMap<&str, Vec<usize>>, name: &str) -> Vec<usize> {
    map.get(name).cloned().unwrap_or_default()
}

/// Orders `changes` (sorted by rank and name) so that each one applies to
/// a schema that has what it needs.
///
/// Hard constraints: an entity is created before it is used, references to
/// an entity are removed before it is dropped, a name is freed before it
/// is taken again, a child releases a foreign key before the parent
/// reworks the referenced column, and alters of one table stay in order.
/// Soft constraint, kept only when it closes no cycle: an entity is altered
/// before the changes that use it.
fn order_changes(changes: &[Change], from: &Schema, to: &Schema) -> Result<Vec<Change>, DiffError> {
    let mut graph: DependencyGraph<usize> = DependencyGraph::new();
    for i in 0..changes.len() {
        graph.add_node(i);
    }

    let mut creators: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut removers: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut alters: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, change) in changes.iter().enumerate() {
        if let Some(name) = creates(change) {
            creators.entry(name).or_default().push(i);
        }
        if let Some(name) = removes(change) {
            removers.entry(name).or_default().push(i);
        }
        if matches!(change, Change::AlterTable(_) | Change::AlterView(_)) {
            alters.entry(change.entity_name()).or_default().push(i);
        }
    }
    for (i, change) in changes.iter().enumerate() {
        for used in uses(change) {
            for j in indices(&creators, &used) {
                graph.add_dependency(i, j);
            }
        }
        if let Some(name) = creates(change) {
            for j in indices(&removers, name) {
                graph.add_dependency(i, j);
            }
        }
        if let Change::DropTable { name, .. } | Change::DropView { name, .. } = change {
            for (j, other) in changes.iter().enumerate() {
                if j != i && released(other, from, to).iter().any(|r| r == name) {
                    graph.add_dependency(i, j);
                }
            }
        }
        let reworked = reworked_columns(change);
        if !reworked.is_empty() {
            let parent = change.entity_name();
            for child in from.tables().filter(|t| t.name() != parent) {
                let affected = child.foreign_keys().any(|(_, fk)| {
                    fk.referenced_table == parent
                        && fk.referenced_columns.iter().any(|c| reworked.contains(&c.as_str()))
                });
                if affected {
                    for (j, other) in changes.iter().enumerate() {
                        let releases_child = matches!(
                            other,
                            Change::AlterTable(_) | Change::DropTable { .. }
                        ) && other.entity_name() == child.name();
                        if releases_child {
                            graph.add_dependency(i, j);
                        }
                    }
                }
            }
        }
        if i > 0 {
            let previous = &changes[i - 1];
            if matches!((previous, change), (Change::AlterTable(_), Change::AlterTable(_)))
                && previous.entity_name() == change.entity_name()
            {
                graph.add_dependency(i, i - 1);
            }
        }
    }

    for (i, change) in changes.iter().enumerate() {
        for used in uses(change) {
            for j in indices(&alters, &used) {
                if j != i && !graph.depends_on(&j, &i) {
                    graph.add_dependency(i, j);
                }
            }
        }
    }

    let order = graph.topological_order(Direction::Create).map_err(|_| {
        let path = graph
            .find_cycle()
            .unwrap_or_default()
            .into_iter()
            .map(|i| changes[i].label())
            .collect();
        DiffError::Cycle(CycleError { path })
    })?;
    Ok(order.into_iter().map(|i| changes[i].clone()).collect())
}
