//! Applying changes to a schema in memory.
//!
//! Changes apply strictly in order against a working copy of the entity
//! list; entities nothing touches stay shared with the input schema. Each
//! change checks its own preconditions before it mutates anything, the
//! touched table is re-normalized after every `ALTER TABLE` specification,
//! and the whole result is validated once at the end of the batch, so
//! transient states inside a batch (a key dropped and re-added) are fine.

use std::sync::Arc;

use oxide_ddl::ast::{
    AlterTableSpec, AlterTableStatement, AlterViewStatement, ColumnDefinition, ColumnPosition,
    ConstraintDefinition, ConstraintKind, CreateTableStatement, CreateViewStatement, Expr,
    IndexDefinition, PartitionDefinition, PartitionSpec, TableOptions,
};
use tracing::{debug, trace};

use crate::change::Change;
use crate::entity::{Entity, EntityKind, Table, View};
use crate::error::ApplyError;
use crate::hints::DiffHints;
use crate::normalize::{
    fold_identifier, normalize_key, normalize_table, normalize_table_options, PRIMARY_KEY_NAME,
};
use crate::schema::Schema;

/// Applies `changes` to `schema` in order and returns the new schema.
///
/// The input schema is never modified; on error it is simply still the
/// current one.
///
/// # Errors
///
/// The first change whose preconditions fail aborts the batch with the
/// matching [`ApplyError`]. A batch that applies cleanly but leaves an
/// invalid schema fails with [`ApplyError::Validation`].
pub fn apply(schema: &Schema, changes: &[Change]) -> Result<Schema, ApplyError> {
    let mut applier = Applier {
        entities: schema.entities().to_vec(),
        hints: schema.hints(),
    };
    for change in changes {
        debug!(change = %change.label(), "applying change");
        applier.apply(change)?;
    }

    let result = Schema::from_entities(applier.entities, schema.hints().clone());
    let errors = result.validate();
    if !errors.is_empty() {
        debug!(errors = errors.len(), "applied schema is invalid");
        return Err(ApplyError::Validation(errors));
    }
    Ok(result)
}

struct Applier<'h> {
    entities: Vec<Entity>,
    hints: &'h DiffHints,
}

impl Applier<'_> {
    fn apply(&mut self, change: &Change) -> Result<(), ApplyError> {
        match change {
            Change::CreateTable(create) => self.create_table(create),
            Change::AlterTable(alter) => self.alter_table(alter),
            Change::DropTable { name, if_exists } => self.drop_table(name, *if_exists),
            Change::RenameTable { from, to } => self.rename_table(from, to),
            Change::CreateView(create) => self.create_view(create),
            Change::AlterView(alter) => self.alter_view(alter),
            Change::DropView { name, if_exists } => self.drop_view(name, *if_exists),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entities.iter().position(|e| e.name() == name)
    }

    fn table(&self, name: &str) -> Option<&Table> {
        self.entities
            .iter()
            .filter_map(Entity::as_table)
            .find(|t| t.name() == name)
            .map(Arc::as_ref)
    }

    /// Index of the entity `name`, which must exist and be of `kind`.
    fn existing(&self, name: &str, kind: EntityKind) -> Result<usize, ApplyError> {
        let index = self
            .position(name)
            .ok_or_else(|| ApplyError::AlterNonexistentEntity {
                name: name.to_string(),
            })?;
        if self.entities[index].kind() != kind {
            return Err(ApplyError::WrongEntityKind {
                name: name.to_string(),
                expected: kind,
            });
        }
        Ok(index)
    }

    fn existing_table(&self, name: &str) -> Result<(usize, Arc<Table>), ApplyError> {
        let index = self.existing(name, EntityKind::Table)?;
        self.entities[index]
            .as_table()
            .map(|table| (index, Arc::clone(table)))
            .ok_or_else(|| ApplyError::WrongEntityKind {
                name: name.to_string(),
                expected: EntityKind::Table,
            })
    }

    fn require_references(&self, view: &View) -> Result<(), ApplyError> {
        match view
            .references()
            .iter()
            .find(|r| *r != view.name() && self.position(r).is_none())
        {
            Some(missing) => Err(ApplyError::MissingReference {
                entity: view.name().to_string(),
                reference: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------
    // Whole entities
    // ------------------------------------------------------------

    fn create_table(&mut self, create: &CreateTableStatement) -> Result<(), ApplyError> {
        let table = Table::new(create, self.hints);
        if self.position(table.name()).is_some() {
            if create.if_not_exists {
                return Ok(());
            }
            return Err(ApplyError::EntityExists {
                name: table.name().to_string(),
            });
        }
        if let Some(parent) = table
            .references()
            .into_iter()
            .find(|parent| self.table(parent).is_none())
        {
            return Err(ApplyError::MissingReference {
                entity: table.name().to_string(),
                reference: parent.to_string(),
            });
        }
        self.entities.push(Entity::from(table));
        Ok(())
    }

    fn create_view(&mut self, create: &CreateViewStatement) -> Result<(), ApplyError> {
        let view = View::new(&create.view);
        self.require_references(&view)?;
        match self.position(view.name()) {
            None => self.entities.push(Entity::from(view)),
            Some(index) if create.or_replace => {
                if self.entities[index].kind() != EntityKind::View {
                    return Err(ApplyError::WrongEntityKind {
                        name: view.name().to_string(),
                        expected: EntityKind::View,
                    });
                }
                self.entities[index] = Entity::from(view);
            }
            Some(_) => {
                return Err(ApplyError::EntityExists {
                    name: view.name().to_string(),
                })
            }
        }
        Ok(())
    }

    fn alter_view(&mut self, alter: &AlterViewStatement) -> Result<(), ApplyError> {
        let view = View::new(&alter.view);
        let index = self.existing(view.name(), EntityKind::View)?;
        self.require_references(&view)?;
        self.entities[index] = Entity::from(view);
        Ok(())
    }

    fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<(), ApplyError> {
        let name = fold_identifier(name);
        if if_exists && self.position(&name).is_none() {
            return Ok(());
        }
        let index = self.existing(&name, EntityKind::Table)?;
        let mut dependents: Vec<String> = self
            .entities
            .iter()
            .filter_map(Entity::as_table)
            .filter(|t| t.name() != name && t.references_table(&name))
            .map(|t| t.name().to_string())
            .collect();
        if !dependents.is_empty() {
            dependents.sort();
            return Err(ApplyError::EntityHasDependents { name, dependents });
        }
        self.entities.remove(index);
        Ok(())
    }

    fn drop_view(&mut self, name: &str, if_exists: bool) -> Result<(), ApplyError> {
        let name = fold_identifier(name);
        if if_exists && self.position(&name).is_none() {
            return Ok(());
        }
        let index = self.existing(&name, EntityKind::View)?;
        self.entities.remove(index);
        Ok(())
    }

    /// Renames a table; foreign keys of other tables follow it.
    fn rename_table(&mut self, from: &str, to: &str) -> Result<(), ApplyError> {
        let (from, to) = (fold_identifier(from), fold_identifier(to));
        let (index, table) = self.existing_table(&from)?;
        if from != to && self.position(&to).is_some() {
            return Err(ApplyError::EntityExists { name: to });
        }
        self.entities[index] = Entity::from(table.renamed(&to));
        for entity in &mut self.entities {
            let repointed = match entity {
                Entity::Table(table) if table.name() != to && table.references_table(&from) => {
                    table.with_parent_renamed(&from, &to)
                }
                _ => continue,
            };
            *entity = Entity::from(repointed);
        }
        Ok(())
    }

    // ------------------------------------------------------------
    // ALTER TABLE
    // ------------------------------------------------------------

    fn alter_table(&mut self, alter: &AlterTableStatement) -> Result<(), ApplyError> {
        let name = fold_identifier(&alter.table);
        let (index, table) = self.existing_table(&name)?;
        let mut statement = table.statement().clone();
        for spec in &alter.specs {
            trace!(table = %name, spec = %spec, "applying specification");
            self.apply_spec(&mut statement, spec)?;
            statement = normalize_table(&statement, self.hints);
        }
        self.entities[index] = Entity::from(Table::from_normalized(statement));
        Ok(())
    }

    fn apply_spec(
        &mut self,
        table: &mut CreateTableStatement,
        spec: &AlterTableSpec,
    ) -> Result<(), ApplyError> {
        match spec {
            AlterTableSpec::AddColumn { column, position } => {
                add_column(table, column, position.as_ref())
            }
            AlterTableSpec::ModifyColumn { column, position } => {
                let name = fold_identifier(&column.name);
                replace_column(table, &name, column, position.as_ref())
            }
            AlterTableSpec::ChangeColumn {
                old_name,
                column,
                position,
            } => {
                let old_name = fold_identifier(old_name);
                let new_name = fold_identifier(&column.name);
                replace_column(table, &old_name, column, position.as_ref())?;
                self.cascade_column_rename(table, &old_name, &new_name);
                Ok(())
            }
            AlterTableSpec::RenameColumn { old_name, new_name } => {
                let (old_name, new_name) = (fold_identifier(old_name), fold_identifier(new_name));
                let index = column_index(table, &old_name)?;
                if old_name != new_name && column_index(table, &new_name).is_ok() {
                    return Err(ApplyError::AddDuplicateColumn {
                        table: table.name.clone(),
                        column: new_name,
                    });
                }
                table.columns[index].name.clone_from(&new_name);
                self.cascade_column_rename(table, &old_name, &new_name);
                Ok(())
            }
            AlterTableSpec::DropColumn { name } => self.drop_column(table, &fold_identifier(name)),
            AlterTableSpec::AddIndex(key) => add_key(table, key),
            AlterTableSpec::DropIndex { name } if name.eq_ignore_ascii_case(PRIMARY_KEY_NAME) => {
                drop_primary_key(table)
            }
            AlterTableSpec::DropIndex { name } => drop_key(table, &fold_identifier(name)),
            AlterTableSpec::DropPrimaryKey => drop_primary_key(table),
            AlterTableSpec::AddConstraint(constraint) => self.add_constraint(table, constraint),
            AlterTableSpec::DropForeignKey { name } => {
                drop_constraint(table, &fold_identifier(name), true)
            }
            AlterTableSpec::DropCheck { name } => {
                drop_constraint(table, &fold_identifier(name), false)
            }
            AlterTableSpec::TableOptions(options) => {
                set_table_options(table, options);
                Ok(())
            }
            AlterTableSpec::PartitionBy(spec) => {
                table.partition = Some(spec.clone());
                Ok(())
            }
            AlterTableSpec::RemovePartitioning => {
                if table.partition.take().is_none() {
                    return Err(partition_error(&table.name, "table is not partitioned"));
                }
                Ok(())
            }
            AlterTableSpec::AddPartition(definitions) => add_partitions(table, definitions),
            AlterTableSpec::DropPartition(names) => drop_partitions(table, names),
        }
    }

    /// Follows a column rename into keys and foreign keys, here and in
    /// every table whose foreign keys reference the column.
    fn cascade_column_rename(&mut self, table: &mut CreateTableStatement, old: &str, new: &str) {
        if old == new {
            return;
        }
        let rename = |column: &mut String| {
            if column.as_str() == old {
                *column = new.to_string();
            }
        };
        for key in &mut table.indexes {
            for part in &mut key.columns {
                rename(&mut part.name);
            }
        }
        for constraint in &mut table.constraints {
            if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                fk.columns.iter_mut().for_each(rename);
                if fk.referenced_table == table.name {
                    fk.referenced_columns.iter_mut().for_each(rename);
                }
            }
        }

        let parent = table.name.as_str();
        for entity in &mut self.entities {
            let Entity::Table(child) = entity else {
                continue;
            };
            let references = child.name() != parent
                && child.foreign_keys().any(|(_, fk)| {
                    fk.referenced_table == parent && fk.referenced_columns.iter().any(|c| c == old)
                });
            if !references {
                continue;
            }
            let mut statement = child.statement().clone();
            for constraint in &mut statement.constraints {
                if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                    if fk.referenced_table == parent {
                        fk.referenced_columns.iter_mut().for_each(rename);
                    }
                }
            }
            *entity = Entity::from(Table::from_normalized(statement));
        }
    }

    /// Drops a column, removing it from every key; keys left empty go too,
    /// and so do checks on that column alone. Foreign key columns, here or
    /// referenced from elsewhere, are never dropped.
    fn drop_column(&self, table: &mut CreateTableStatement, name: &str) -> Result<(), ApplyError> {
        let index = column_index(table, name)?;
        let blocked = |constraint: &str, referencing_table: &str| {
            ApplyError::DropColumnReferencedByForeignKey {
                table: table.name.clone(),
                column: name.to_string(),
                constraint: constraint.to_string(),
                referencing_table: referencing_table.to_string(),
            }
        };
        for constraint in &table.constraints {
            if let Some(fk) = constraint.as_foreign_key() {
                let local = fk.columns.iter().any(|c| c == name);
                let self_referenced = fk.referenced_table == table.name
                    && fk.referenced_columns.iter().any(|c| c == name);
                if local || self_referenced {
                    return Err(blocked(
                        constraint.name.as_deref().unwrap_or_default(),
                        &table.name,
                    ));
                }
            }
        }
        for child in self
            .entities
            .iter()
            .filter_map(Entity::as_table)
            .filter(|t| t.name() != table.name)
        {
            for (constraint, fk) in child.foreign_keys() {
                let referenced = fk.referenced_table == table.name
                    && fk.referenced_columns.iter().any(|c| c == name);
                if referenced {
                    return Err(blocked(constraint, child.name()));
                }
            }
        }

        table.columns.remove(index);
        for key in &mut table.indexes {
            key.columns.retain(|part| part.name != name);
        }
        table.indexes.retain(|key| !key.columns.is_empty());
        table.constraints.retain(|constraint| {
            constraint.as_check().map_or(true, |check| {
                let refs = check.expr.column_refs();
                refs.is_empty() || refs.iter().any(|c| c.name != name)
            })
        });
        Ok(())
    }

    fn add_constraint(
        &self,
        table: &mut CreateTableStatement,
        constraint: &ConstraintDefinition,
    ) -> Result<(), ApplyError> {
        if let Some(fk) = constraint.as_foreign_key() {
            let parent = fold_identifier(&fk.referenced_table);
            if parent != table.name && self.table(&parent).is_none() {
                return Err(ApplyError::MissingReference {
                    entity: table.name.clone(),
                    reference: parent,
                });
            }
        }
        if let Some(name) = constraint.name.as_deref().map(fold_identifier) {
            if table
                .constraints
                .iter()
                .any(|c| c.name.as_deref() == Some(name.as_str()))
            {
                return Err(ApplyError::DuplicateConstraint {
                    table: table.name.clone(),
                    constraint: name,
                });
            }
        }
        table.constraints.push(constraint.clone());
        Ok(())
    }
}

// ================================================================
// Columns
// ================================================================

fn column_index(table: &CreateTableStatement, name: &str) -> Result<usize, ApplyError> {
    table
        .columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| ApplyError::UnknownColumn {
            table: table.name.clone(),
            column: name.to_string(),
        })
}

/// Where a column goes, with `default` used when no position is given.
fn insertion_index(
    table: &CreateTableStatement,
    position: Option<&ColumnPosition>,
    default: usize,
) -> Result<usize, ApplyError> {
    match position {
        None => Ok(default),
        Some(ColumnPosition::First) => Ok(0),
        Some(ColumnPosition::After(anchor)) => {
            column_index(table, &fold_identifier(anchor)).map(|i| i + 1)
        }
    }
}

fn add_column(
    table: &mut CreateTableStatement,
    column: &ColumnDefinition,
    position: Option<&ColumnPosition>,
) -> Result<(), ApplyError> {
    let mut column = column.clone();
    column.name = fold_identifier(&column.name);
    if column_index(table, &column.name).is_ok() {
        return Err(ApplyError::AddDuplicateColumn {
            table: table.name.clone(),
            column: column.name,
        });
    }
    let index = insertion_index(table, position, table.columns.len())?;
    table.columns.insert(index, column);
    Ok(())
}

/// Replaces column `old` with `column`, in place unless a position says
/// otherwise.
fn replace_column(
    table: &mut CreateTableStatement,
    old: &str,
    column: &ColumnDefinition,
    position: Option<&ColumnPosition>,
) -> Result<(), ApplyError> {
    let index = column_index(table, old)?;
    let mut column = column.clone();
    column.name = fold_identifier(&column.name);
    if column.name != old && column_index(table, &column.name).is_ok() {
        return Err(ApplyError::AddDuplicateColumn {
            table: table.name.clone(),
            column: column.name,
        });
    }
    let previous = table.columns.remove(index);
    match insertion_index(table, position, index) {
        Ok(target) => {
            table.columns.insert(target, column);
            Ok(())
        }
        Err(error) => {
            table.columns.insert(index, previous);
            Err(error)
        }
    }
}

// ================================================================
// Keys
// ================================================================

fn add_key(table: &mut CreateTableStatement, key: &IndexDefinition) -> Result<(), ApplyError> {
    let key = normalize_key(key);
    let duplicate = if key.is_primary() {
        table.indexes.iter().any(IndexDefinition::is_primary)
    } else {
        key.name.is_some() && table.indexes.iter().any(|k| k.name == key.name)
    };
    if duplicate {
        return Err(ApplyError::DuplicateKey {
            table: table.name.clone(),
            key: key.name.clone().unwrap_or_default(),
        });
    }
    if key.is_primary() {
        // implicitly nullable columns become NOT NULL
        for column in &mut table.columns {
            if key.covers(&column.name) && column.nullable == Some(true) {
                column.nullable = None;
                if column.default.as_ref().is_some_and(Expr::is_null_literal) {
                    column.default = None;
                }
            }
        }
    }
    table.indexes.push(key);
    Ok(())
}

fn drop_key(table: &mut CreateTableStatement, name: &str) -> Result<(), ApplyError> {
    let index = table
        .indexes
        .iter()
        .position(|k| !k.is_primary() && k.name.as_deref() == Some(name))
        .ok_or_else(|| ApplyError::DropNonexistentKey {
            table: table.name.clone(),
            key: name.to_string(),
        })?;
    table.indexes.remove(index);
    Ok(())
}

/// Drops the primary key; its columns stay `NOT NULL`.
fn drop_primary_key(table: &mut CreateTableStatement) -> Result<(), ApplyError> {
    let index = table
        .indexes
        .iter()
        .position(IndexDefinition::is_primary)
        .ok_or_else(|| ApplyError::DropNonexistentKey {
            table: table.name.clone(),
            key: PRIMARY_KEY_NAME.to_string(),
        })?;
    let key = table.indexes.remove(index);
    for column in &mut table.columns {
        if key.covers(&column.name) && column.nullable.is_none() {
            column.nullable = Some(false);
        }
    }
    Ok(())
}

// ================================================================
// Constraints and options
// ================================================================

fn drop_constraint(
    table: &mut CreateTableStatement,
    name: &str,
    foreign_key: bool,
) -> Result<(), ApplyError> {
    let index = table
        .constraints
        .iter()
        .position(|c| {
            c.name.as_deref() == Some(name)
                && matches!(c.kind, ConstraintKind::ForeignKey(_)) == foreign_key
        })
        .ok_or_else(|| ApplyError::NonexistentConstraint {
            table: table.name.clone(),
            constraint: name.to_string(),
        })?;
    table.constraints.remove(index);
    Ok(())
}

/// Overlays `changes` on the table options. Textual columns that inherit
/// the table charset keep the one they have when it changes.
fn set_table_options(table: &mut CreateTableStatement, changes: &TableOptions) {
    let current = normalize_table_options(&table.options);
    let mut options = table.options.clone();
    options.merge(changes);
    if changes.charset.is_some() && changes.collation.is_none() {
        options.collation = None;
    }
    if changes.collation.is_some() && changes.charset.is_none() {
        options.charset = None;
    }
    let updated = normalize_table_options(&options);
    if (&updated.charset, &updated.collation) != (&current.charset, &current.collation) {
        for column in &mut table.columns {
            if column.data_type.is_textual() && column.charset.is_none() {
                column.charset.clone_from(&current.charset);
                column.collation.clone_from(&current.collation);
            }
        }
    }
    table.options = options;
}

// ================================================================
// Partitions
// ================================================================

fn partition_error(table: &str, reason: &str) -> ApplyError {
    ApplyError::InvalidPartitionOperation {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}

/// The partitioning of `table`, which must list its partitions by range
/// or by value.
fn listed_partitions(table: &mut CreateTableStatement) -> Result<&mut PartitionSpec, ApplyError> {
    match table.partition.as_mut() {
        None => Err(partition_error(&table.name, "table is not partitioned")),
        Some(spec) if !spec.method.is_range() && !spec.method.is_list() => Err(partition_error(
            &table.name,
            "only RANGE and LIST partitions can be added or dropped",
        )),
        Some(spec) => Ok(spec),
    }
}

fn add_partitions(
    table: &mut CreateTableStatement,
    definitions: &[PartitionDefinition],
) -> Result<(), ApplyError> {
    let name = table.name.clone();
    let spec = listed_partitions(table)?;
    for definition in definitions {
        let partition = fold_identifier(&definition.name);
        if spec.definitions.iter().any(|p| p.name == partition) {
            return Err(ApplyError::DuplicatePartition {
                table: name,
                partition,
            });
        }
        spec.definitions.push(PartitionDefinition {
            name: partition,
            values: definition.values.clone(),
        });
    }
    Ok(())
}

fn drop_partitions(table: &mut CreateTableStatement, names: &[String]) -> Result<(), ApplyError> {
    let name = table.name.clone();
    let spec = listed_partitions(table)?;
    let names: Vec<String> = names.iter().map(|n| fold_identifier(n)).collect();
    if let Some(missing) = names
        .iter()
        .find(|n| !spec.definitions.iter().any(|p| &p.name == *n))
    {
        return Err(ApplyError::NonexistentPartition {
            table: name,
            partition: missing.clone(),
        });
    }
    if spec.definitions.iter().all(|p| names.contains(&p.name)) {
        return Err(ApplyError::InvalidPartitionOperation {
            table: name,
            reason: String::from("cannot drop all partitions"),
        });
    }
    spec.definitions.retain(|p| !names.contains(&p.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::change::changes_from_sql;
    use crate::error::SemanticError;

    use super::*;

    fn schema(sql: &str) -> Schema {
        Schema::from_sql(sql).unwrap()
    }

    fn apply_sql(schema: &Schema, sql: &str) -> Result<Schema, ApplyError> {
        apply(schema, &changes_from_sql(sql).unwrap())
    }

    fn table_sql(schema: &Schema, name: &str) -> String {
        schema.table(name).unwrap().to_sql().to_string()
    }

    #[test]
    fn test_dropping_column_shrinks_and_removes_keys() {
        let base = schema("create table t (a int, b int, c int, key ab (a, b), key c (c))");
        let applied = apply_sql(&base, "alter table t drop column b, drop column c").unwrap();
        let t = applied.table("t").unwrap();
        let keys: Vec<_> = t
            .keys()
            .iter()
            .map(|k| (k.name.as_deref(), k.columns.len()))
            .collect();
        assert_eq!(keys, vec![(Some("ab"), 1)]);
        assert_eq!(t.columns().len(), 1);
    }

    #[test]
    fn test_dropping_foreign_key_column_is_rejected() {
        let base = schema(
            "create table p (id int primary key); \
             create table c (id int, pid int, foreign key (pid) references p (id))",
        );
        assert_eq!(
            apply_sql(&base, "alter table c drop column pid"),
            Err(ApplyError::DropColumnReferencedByForeignKey {
                table: "c".into(),
                column: "pid".into(),
                constraint: "c_ibfk_1".into(),
                referencing_table: "c".into(),
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table p drop column id"),
            Err(ApplyError::DropColumnReferencedByForeignKey {
                table: "p".into(),
                column: "id".into(),
                constraint: "c_ibfk_1".into(),
                referencing_table: "c".into(),
            })
        );
        assert_eq!(base.table("c").unwrap().columns().len(), 2);
    }

    #[test]
    fn test_column_positions() {
        let base = schema("create table t (a int, b int)");
        let applied = apply_sql(
            &base,
            "alter table t add column c int first, add column d int after a, modify column b int first",
        )
        .unwrap();
        let names: Vec<_> = applied
            .table("t")
            .unwrap()
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "c", "a", "d"]);
        assert_eq!(
            apply_sql(&base, "alter table t add column c int after z"),
            Err(ApplyError::UnknownColumn {
                table: "t".into(),
                column: "z".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t add column A int"),
            Err(ApplyError::AddDuplicateColumn {
                table: "t".into(),
                column: "a".into()
            })
        );
    }

    #[test]
    fn test_column_rename_cascades() {
        let base = schema(
            "create table p (id int primary key, code int, key (code)); \
             create table c (pcode int, key (pcode), foreign key (pcode) references p (code))",
        );
        let applied = apply_sql(
            &base,
            "alter table p rename column code to tag; alter table c change column pcode ptag int",
        )
        .unwrap();
        assert_eq!(
            table_sql(&applied, "c"),
            "CREATE TABLE c (\n    ptag int DEFAULT NULL,\n    KEY pcode (ptag),\n    \
             CONSTRAINT c_ibfk_1 FOREIGN KEY (ptag) REFERENCES p (tag)\n)"
        );
        assert!(applied.table("p").unwrap().key("code").is_some());
        assert!(applied.table("p").unwrap().column("tag").is_some());
    }

    #[test]
    fn test_primary_key_changes_keep_columns_not_null() {
        let base = schema("create table t (id int, name varchar(8))");
        let applied = apply_sql(&base, "alter table t add primary key (id)").unwrap();
        assert_eq!(
            table_sql(&applied, "t"),
            "CREATE TABLE t (\n    id int,\n    name varchar(8) DEFAULT NULL,\n    PRIMARY KEY (id)\n)"
        );
        let dropped = apply_sql(&applied, "alter table t drop primary key").unwrap();
        assert_eq!(
            table_sql(&dropped, "t"),
            "CREATE TABLE t (\n    id int NOT NULL,\n    name varchar(8) DEFAULT NULL\n)"
        );
        assert_eq!(
            apply_sql(&base, "alter table t drop primary key"),
            Err(ApplyError::DropNonexistentKey {
                table: "t".into(),
                key: "PRIMARY".into()
            })
        );
    }

    #[test]
    fn test_key_and_constraint_preconditions() {
        let base = schema("create table t (a int, key ka (a), constraint positive check (a > 0))");
        assert_eq!(
            apply_sql(&base, "alter table t add key ka (a)"),
            Err(ApplyError::DuplicateKey {
                table: "t".into(),
                key: "ka".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t drop key kb"),
            Err(ApplyError::DropNonexistentKey {
                table: "t".into(),
                key: "kb".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t drop foreign key positive"),
            Err(ApplyError::NonexistentConstraint {
                table: "t".into(),
                constraint: "positive".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t add constraint positive check (a > 1)"),
            Err(ApplyError::DuplicateConstraint {
                table: "t".into(),
                constraint: "positive".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t add foreign key (a) references nowhere (id)"),
            Err(ApplyError::MissingReference {
                entity: "t".into(),
                reference: "nowhere".into()
            })
        );
        let applied = apply_sql(
            &base,
            "alter table t drop check positive, drop column a, add column b int",
        );
        assert!(applied.is_ok());
    }

    #[test]
    fn test_dropping_column_drops_its_checks() {
        let base = schema("create table t (a int, b int, check (a > 0), check (a < b))");
        let applied = apply_sql(&base, "alter table t drop column a");
        // the two-column check now reads a missing column
        let Err(ApplyError::Validation(errors)) = applied else {
            panic!("expected a validation error, got {applied:?}");
        };
        assert!(errors
            .iter()
            .all(|e| matches!(e, SemanticError::InvalidCheckReference { .. })));
        assert!(!errors.is_empty());
        let base = schema("create table t (a int, b int, check (a > 0))");
        let applied = apply_sql(&base, "alter table t drop column a").unwrap();
        assert_eq!(applied.table("t").unwrap().checks().count(), 0);
    }

    #[test]
    fn test_entity_preconditions() {
        let base = schema(
            "create table p (id int primary key); \
             create table c (pid int, foreign key (pid) references p (id)); \
             create view v as select id from p",
        );
        assert_eq!(
            apply_sql(&base, "create table P (id int)"),
            Err(ApplyError::EntityExists { name: "p".into() })
        );
        assert!(apply_sql(&base, "create table if not exists p (x int)").is_ok());
        assert_eq!(
            apply_sql(&base, "drop table p"),
            Err(ApplyError::EntityHasDependents {
                name: "p".into(),
                dependents: vec!["c".into()]
            })
        );
        assert_eq!(
            apply_sql(&base, "drop table v"),
            Err(ApplyError::WrongEntityKind {
                name: "v".into(),
                expected: EntityKind::Table
            })
        );
        assert_eq!(
            apply_sql(&base, "drop view missing"),
            Err(ApplyError::AlterNonexistentEntity {
                name: "missing".into()
            })
        );
        assert!(apply_sql(&base, "drop view if exists missing").is_ok());
        assert_eq!(
            apply_sql(&base, "create view w as select * from nowhere"),
            Err(ApplyError::MissingReference {
                entity: "w".into(),
                reference: "nowhere".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "create or replace view p as select 1"),
            Err(ApplyError::WrongEntityKind {
                name: "p".into(),
                expected: EntityKind::View
            })
        );
    }

    #[test]
    fn test_rename_table_repoints_foreign_keys() {
        let base = schema(
            "create table p (id int primary key); \
             create table c (pid int, foreign key (pid) references p (id))",
        );
        let applied = apply_sql(&base, "rename table p to parent").unwrap();
        assert!(applied.table("p").is_none());
        let c = applied.table("c").unwrap();
        assert_eq!(c.references(), vec!["parent"]);
        assert_eq!(
            apply_sql(&base, "rename table p to c"),
            Err(ApplyError::EntityExists { name: "c".into() })
        );
    }

    #[test]
    fn test_table_charset_change_keeps_column_charsets() {
        let base = schema(
            "create table t (a varchar(8), b varchar(8) charset latin1, n int) default charset=utf8mb4",
        );
        let applied = apply_sql(&base, "alter table t default charset=latin1").unwrap();
        assert_eq!(
            table_sql(&applied, "t"),
            "CREATE TABLE t (\n    a varchar(8) CHARACTER SET utf8mb4 DEFAULT NULL,\n    \
             b varchar(8) DEFAULT NULL,\n    n int DEFAULT NULL\n) DEFAULT CHARSET=latin1"
        );
    }

    #[test]
    fn test_partition_operations() {
        let base = schema(
            "create table t (id int) partition by range (id) \
             (partition p0 values less than (10), partition p1 values less than (20))",
        );
        let applied = apply_sql(
            &base,
            "alter table t add partition (partition p2 values less than (30)); \
             alter table t drop partition p0",
        )
        .unwrap();
        let names: Vec<_> = applied
            .table("t")
            .unwrap()
            .partition()
            .unwrap()
            .definitions
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "p2"]);
        assert_eq!(
            apply_sql(&base, "alter table t drop partition p0, p1"),
            Err(ApplyError::InvalidPartitionOperation {
                table: "t".into(),
                reason: "cannot drop all partitions".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t drop partition p9"),
            Err(ApplyError::NonexistentPartition {
                table: "t".into(),
                partition: "p9".into()
            })
        );
        assert_eq!(
            apply_sql(&base, "alter table t add partition (partition p1 values less than (40))"),
            Err(ApplyError::DuplicatePartition {
                table: "t".into(),
                partition: "p1".into()
            })
        );
        let hashed = schema("create table h (id int) partition by hash (id) partitions 4");
        assert!(matches!(
            apply_sql(&hashed, "alter table h drop partition p0"),
            Err(ApplyError::InvalidPartitionOperation { .. })
        ));
        let plain = schema("create table q (id int)");
        assert!(matches!(
            apply_sql(&plain, "alter table q remove partitioning"),
            Err(ApplyError::InvalidPartitionOperation { .. })
        ));
    }

    #[test]
    fn test_failed_batch_leaves_schema_untouched() {
        let base = schema("create table t (a int)");
        let before = base.clone();
        let result = apply_sql(&base, "alter table t add column b int; alter table t drop column z");
        assert_eq!(
            result,
            Err(ApplyError::UnknownColumn {
                table: "t".into(),
                column: "z".into()
            })
        );
        assert_eq!(base, before);
    }
}
