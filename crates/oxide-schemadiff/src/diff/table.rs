//! Structural diff of two versions of one table.

use std::collections::{BTreeMap, BTreeSet};

use oxide_ddl::ast::{
    AlterTableSpec, AlterTableStatement, ColumnDefinition, ColumnPosition, ConstraintDefinition,
    ConstraintKind, Expr, IndexDefinition, PartitionDefinition, PartitionSpec, TableOptions,
};
use tracing::trace;

use crate::entity::Table;
use crate::hints::{
    AutoIncrementStrategy, CharsetCollateStrategy, ColumnRenameStrategy, CommentStrategy,
    ConstraintNamesStrategy, DiffHints, RangeRotationStrategy,
};

/// `ALTER TABLE` statements that turn `from` into `to`; empty when the
/// tables are equal.
///
/// Everything lands in one statement, except that a range rotation under
/// [`RangeRotationStrategy::DistinctStatements`] adds one statement per
/// dropped or added partition after it.
#[must_use]
pub fn diff_tables(from: &Table, to: &Table, hints: &DiffHints) -> Vec<AlterTableStatement> {
    diff_tables_with(from, to, hints, &BTreeSet::new())
}

/// Like [`diff_tables`], without the canonical-text shortcut.
#[must_use]
pub fn diff_tables_structural(
    from: &Table,
    to: &Table,
    hints: &DiffHints,
) -> Vec<AlterTableStatement> {
    TableDiff::new(from, to, hints, &BTreeSet::new()).statements()
}

/// `pinned` names columns of `from` that other tables' foreign keys
/// reference; they are never treated as renamed.
pub(crate) fn diff_tables_with(
    from: &Table,
    to: &Table,
    hints: &DiffHints,
    pinned: &BTreeSet<String>,
) -> Vec<AlterTableStatement> {
    if from.to_sql() == to.to_sql() {
        return Vec::new();
    }
    TableDiff::new(from, to, hints, pinned).statements()
}

// ================================================================
// Column helpers
// ================================================================

fn in_primary_key(table: &Table, column: &str) -> bool {
    table.primary_key().is_some_and(|key| key.covers(column))
}

/// Nullability in effect: primary key columns are `NOT NULL` without
/// saying so, generated columns are nullable unless declared otherwise.
fn is_nullable(table: &Table, column: &ColumnDefinition) -> bool {
    column
        .nullable
        .unwrap_or_else(|| !in_primary_key(table, &column.name))
}

/// Charset and collation in effect for a column.
fn effective_charset(
    column: &ColumnDefinition,
    options: &TableOptions,
) -> (Option<String>, Option<String>) {
    if !column.data_type.is_textual() {
        (None, None)
    } else if column.charset.is_some() {
        (column.charset.clone(), column.collation.clone())
    } else {
        (options.charset.clone(), options.collation.clone())
    }
}

fn collect_names(expr: &Expr, names: &mut BTreeSet<String>) {
    for column in expr.column_refs() {
        names.insert(column.name.to_string());
    }
}

/// Columns that other parts of the table refer to by name.
fn referenced_columns(table: &Table) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for (_, fk) in table.foreign_keys() {
        names.extend(fk.columns.iter().cloned());
        if fk.referenced_table == table.name() {
            names.extend(fk.referenced_columns.iter().cloned());
        }
    }
    for check in table.checks().filter_map(ConstraintDefinition::as_check) {
        collect_names(&check.expr, &mut names);
    }
    for column in table.columns() {
        if let Some(generated) = &column.generated {
            collect_names(&generated.expr, &mut names);
        }
    }
    if let Some(partition) = table.partition() {
        names.extend(partition.columns.iter().cloned());
        if let Some(expr) = &partition.expr {
            collect_names(expr, &mut names);
        }
    }
    names
}

/// Names on one longest common subsequence of `a` and `b`.
fn longest_common_subsequence<'a>(a: &[&'a str], b: &[&'a str]) -> BTreeSet<&'a str> {
    let (n, m) = (a.len(), b.len());
    let mut lengths = vec![vec![0_usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if a[i] == b[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }
    let mut common = BTreeSet::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            common.insert(a[i]);
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    common
}

fn position_after(previous: Option<&str>) -> ColumnPosition {
    previous.map_or(ColumnPosition::First, |name| {
        ColumnPosition::After(name.to_string())
    })
}

// ================================================================
// Partition helpers
// ================================================================

/// Partitioning with its partition list removed.
fn partition_scheme(spec: &PartitionSpec) -> PartitionSpec {
    PartitionSpec {
        definitions: Vec::new(),
        ..spec.clone()
    }
}

/// Detects a range rotation: leading partitions dropped and/or trailing
/// ones appended, with at least one partition kept. Returns the dropped
/// names and the added definitions.
fn range_rotation(
    from: &PartitionSpec,
    to: &PartitionSpec,
) -> Option<(Vec<String>, Vec<PartitionDefinition>)> {
    if !from.method.is_range() || partition_scheme(from) != partition_scheme(to) {
        return None;
    }
    let (old, new) = (&from.definitions, &to.definitions);
    (0..old.len()).find_map(|dropped| {
        let kept = &old[dropped..];
        new.starts_with(kept).then(|| {
            (
                old[..dropped].iter().map(|p| p.name.clone()).collect(),
                new[kept.len()..].to_vec(),
            )
        })
    })
}

// ================================================================
// Table diff
// ================================================================

struct TableDiff<'a> {
    from: &'a Table,
    to: &'a Table,
    hints: &'a DiffHints,
    pinned: &'a BTreeSet<String>,
    /// Whether the options change the table charset or collation, in which
    /// case columns are compared by the charset in effect.
    charset_changes: bool,
    /// Column renames, old name to new name.
    renames: BTreeMap<String, String>,
}

impl<'a> TableDiff<'a> {
    fn new(
        from: &'a Table,
        to: &'a Table,
        hints: &'a DiffHints,
        pinned: &'a BTreeSet<String>,
    ) -> Self {
        let mut diff = Self {
            from,
            to,
            hints,
            pinned,
            charset_changes: false,
            renames: BTreeMap::new(),
        };
        diff.charset_changes = diff.charset_change().is_some();
        diff.renames = diff.detect_renames();
        diff
    }

    fn statements(&self) -> Vec<AlterTableStatement> {
        let table = self.from.name().to_string();
        let (key_drops, key_adds) = self.diff_keys();
        let (constraint_drops, constraint_adds) = self.diff_constraints();
        let (partition_specs, rotation) = self.diff_partitioning();

        let mut specs = constraint_drops;
        specs.extend(key_drops);
        specs.extend(self.diff_columns());
        specs.extend(key_adds);
        specs.extend(constraint_adds);
        specs.extend(self.diff_options());
        specs.extend(partition_specs);

        trace!(table = %table, specs = specs.len(), extra = rotation.len(), "table diff");
        let mut statements = Vec::new();
        if !specs.is_empty() {
            statements.push(AlterTableStatement {
                table: table.clone(),
                specs,
            });
        }
        statements.extend(rotation.into_iter().map(|spec| AlterTableStatement {
            table: table.clone(),
            specs: vec![spec],
        }));
        statements
    }

    fn renamed<'n>(&'n self, name: &'n str) -> &'n str {
        self.renames.get(name).map_or(name, String::as_str)
    }

    /// What a column diff compares: effective nullability, comments unless
    /// ignored, and the charset in effect when the table charset changes.
    fn shape(&self, table: &Table, column: &ColumnDefinition) -> ColumnDefinition {
        let mut shape = column.clone();
        shape.nullable = Some(is_nullable(table, column));
        if self.hints.comment_strategy == CommentStrategy::Ignore {
            shape.comment = None;
        }
        if self.charset_changes {
            (shape.charset, shape.collation) = effective_charset(column, table.options());
        }
        shape
    }

    fn same_column(&self, from: &ColumnDefinition, to: &ColumnDefinition) -> bool {
        let mut from = self.shape(self.from, from);
        from.name.clone_from(&to.name);
        from == self.shape(self.to, to)
    }

    /// The target column as it must be written so that it keeps its
    /// charset once the table charset changes.
    fn emitted(&self, column: &ColumnDefinition) -> ColumnDefinition {
        let mut column = column.clone();
        if self.charset_changes && column.data_type.is_textual() && column.charset.is_none() {
            let options = self.to.options();
            column.charset.clone_from(&options.charset);
            column.collation.clone_from(&options.collation);
        }
        column
    }

    // ------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------

    /// A dropped and an added column with the same definition and the same
    /// predecessor are a rename. Columns anything refers to by name stay
    /// put.
    fn detect_renames(&self) -> BTreeMap<String, String> {
        let mut renames = BTreeMap::new();
        if self.hints.column_rename_strategy != ColumnRenameStrategy::Heuristic {
            return renames;
        }
        let mut pinned = referenced_columns(self.from);
        pinned.extend(referenced_columns(self.to));
        pinned.extend(self.pinned.iter().cloned());

        let from_columns = self.from.columns();
        let to_columns = self.to.columns();
        let mut taken: BTreeSet<&str> = BTreeSet::new();
        for (i, column) in from_columns.iter().enumerate() {
            if self.to.column(&column.name).is_some() || pinned.contains(&column.name) {
                continue;
            }
            let predecessor = i.checked_sub(1).map(|p| {
                let name = from_columns[p].name.as_str();
                renames.get(name).map_or(name, String::as_str)
            });
            let candidate = to_columns.iter().enumerate().find(|(j, added)| {
                !taken.contains(added.name.as_str())
                    && self.from.column(&added.name).is_none()
                    && !pinned.contains(&added.name)
                    && j.checked_sub(1).map(|p| to_columns[p].name.as_str()) == predecessor
                    && self.same_column(column, added)
            });
            if let Some((_, added)) = candidate {
                taken.insert(added.name.as_str());
                renames.insert(column.name.clone(), added.name.clone());
            }
        }
        renames
    }

    fn diff_columns(&self) -> Vec<AlterTableSpec> {
        let mut specs = Vec::new();
        let to_columns = self.to.columns();

        // survivors under their new names, in current order
        let mut current: Vec<&str> = Vec::new();
        let mut sources: BTreeMap<&str, &ColumnDefinition> = BTreeMap::new();
        for column in self.from.columns() {
            let name = self.renamed(&column.name);
            if self.to.column(name).is_some() {
                current.push(name);
                sources.insert(name, column);
            } else {
                specs.push(AlterTableSpec::DropColumn {
                    name: column.name.clone(),
                });
            }
        }
        specs.extend(self.renames.iter().map(|(old, new)| AlterTableSpec::RenameColumn {
            old_name: old.clone(),
            new_name: new.clone(),
        }));

        let survivors: Vec<&str> = to_columns
            .iter()
            .map(|c| c.name.as_str())
            .filter(|name| sources.contains_key(name))
            .collect();
        let stable = longest_common_subsequence(&current, &survivors);

        // walk the target order, placing each moved or added column right
        // after its predecessor
        for (i, column) in to_columns.iter().enumerate() {
            let name = column.name.as_str();
            let previous = i.checked_sub(1).map(|p| to_columns[p].name.as_str());
            let moved = sources.contains_key(name) && !stable.contains(name);
            if moved {
                current.retain(|c| *c != name);
            }
            let insert_at = previous
                .and_then(|p| current.iter().position(|c| *c == p))
                .map_or(0, |p| p + 1);
            match sources.get(name) {
                Some(_) if moved => {
                    current.insert(insert_at, name);
                    specs.push(AlterTableSpec::ModifyColumn {
                        column: self.emitted(column),
                        position: Some(position_after(previous)),
                    });
                }
                Some(source) => {
                    if !self.same_column(source, column) {
                        specs.push(AlterTableSpec::ModifyColumn {
                            column: self.emitted(column),
                            position: None,
                        });
                    }
                }
                None => {
                    let appended = insert_at == current.len();
                    current.insert(insert_at, name);
                    specs.push(AlterTableSpec::AddColumn {
                        column: self.emitted(column),
                        position: (!appended).then(|| position_after(previous)),
                    });
                }
            }
        }
        specs
    }

    // ------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------

    /// Current keys with renamed columns under their new names.
    fn from_keys(&self) -> Vec<IndexDefinition> {
        self.from
            .keys()
            .iter()
            .map(|key| {
                let mut key = key.clone();
                for part in &mut key.columns {
                    part.name = self.renamed(&part.name).to_string();
                }
                key
            })
            .collect()
    }

    fn diff_keys(&self) -> (Vec<AlterTableSpec>, Vec<AlterTableSpec>) {
        let to_keys = self.to.keys();
        let key_name = |key: &IndexDefinition| key.name.clone().unwrap_or_default();

        let (mut kept, mut dropped): (Vec<_>, Vec<_>) = self
            .from_keys()
            .into_iter()
            .partition(|key| to_keys.iter().any(|k| k == key));
        if self.hints.strict_index_ordering {
            let prefix = kept
                .iter()
                .zip(to_keys)
                .take_while(|(a, b)| a == b)
                .count();
            dropped.extend(kept.drain(prefix..));
        }

        let drops = dropped
            .iter()
            .map(|key| {
                if key.is_primary() {
                    AlterTableSpec::DropPrimaryKey
                } else {
                    AlterTableSpec::DropIndex {
                        name: key_name(key),
                    }
                }
            })
            .collect();
        let adds = to_keys
            .iter()
            .filter(|key| !kept.contains(key))
            .map(|key| AlterTableSpec::AddIndex(key.clone()))
            .collect();
        (drops, adds)
    }

    // ------------------------------------------------------------
    // Constraints
    // ------------------------------------------------------------

    fn from_constraints(&self) -> Vec<ConstraintDefinition> {
        self.from
            .constraints()
            .iter()
            .map(|constraint| {
                let mut constraint = constraint.clone();
                if let ConstraintKind::ForeignKey(fk) = &mut constraint.kind {
                    for column in &mut fk.columns {
                        *column = self.renamed(column).to_string();
                    }
                    if fk.referenced_table == self.from.name() {
                        for column in &mut fk.referenced_columns {
                            *column = self.renamed(column).to_string();
                        }
                    }
                }
                constraint
            })
            .collect()
    }

    fn diff_constraints(&self) -> (Vec<AlterTableSpec>, Vec<AlterTableSpec>) {
        let from = self.from_constraints();
        let to = self.to.constraints();

        let (kept_from, kept_to): (Vec<usize>, Vec<usize>) = match self
            .hints
            .constraint_names_strategy
        {
            ConstraintNamesStrategy::Strict => from
                .iter()
                .enumerate()
                .filter_map(|(i, c)| to.iter().position(|t| t == c).map(|j| (i, j)))
                .unzip(),
            ConstraintNamesStrategy::IgnoreAll => {
                let mut matched_to: Vec<usize> = Vec::new();
                let mut matched_from: Vec<usize> = Vec::new();
                for (i, constraint) in from.iter().enumerate() {
                    let found = to.iter().enumerate().position(|(j, t)| {
                        !matched_to.contains(&j) && t.kind == constraint.kind
                    });
                    if let Some(j) = found {
                        matched_from.push(i);
                        matched_to.push(j);
                    }
                }
                (matched_from, matched_to)
            }
        };

        let drops = from
            .iter()
            .enumerate()
            .filter(|(i, _)| !kept_from.contains(i))
            .map(|(_, constraint)| {
                let name = constraint.name.clone().unwrap_or_default();
                match constraint.kind {
                    ConstraintKind::ForeignKey(_) => AlterTableSpec::DropForeignKey { name },
                    ConstraintKind::Check(_) => AlterTableSpec::DropCheck { name },
                }
            })
            .collect();
        let adds = to
            .iter()
            .enumerate()
            .filter(|(j, _)| !kept_to.contains(j))
            .map(|(_, constraint)| {
                let mut constraint = constraint.clone();
                if self.hints.constraint_names_strategy == ConstraintNamesStrategy::IgnoreAll {
                    constraint.name = None;
                }
                AlterTableSpec::AddConstraint(constraint)
            })
            .collect();
        (drops, adds)
    }

    // ------------------------------------------------------------
    // Table options
    // ------------------------------------------------------------

    /// The target charset and collation, when they must be applied.
    fn charset_change(&self) -> Option<(Option<String>, Option<String>)> {
        let (from, to) = (self.from.options(), self.to.options());
        let ignored = match self.hints.table_charset_collate_strategy {
            CharsetCollateStrategy::Strict => to.charset.is_none(),
            CharsetCollateStrategy::IgnoreEmpty => to.charset.is_none() || from.charset.is_none(),
            CharsetCollateStrategy::IgnoreAlways => true,
        };
        let changed = (&from.charset, &from.collation) != (&to.charset, &to.collation);
        (!ignored && changed).then(|| (to.charset.clone(), to.collation.clone()))
    }

    fn diff_options(&self) -> Option<AlterTableSpec> {
        let (from, to) = (self.from.options(), self.to.options());
        let mut changes = TableOptions::default();

        if to.engine.is_some() && to.engine != from.engine {
            changes.engine.clone_from(&to.engine);
        }
        if to.row_format != from.row_format {
            changes.row_format = Some(
                to.row_format
                    .clone()
                    .unwrap_or_else(|| String::from("DEFAULT")),
            );
        }
        if to.key_block_size != from.key_block_size {
            changes.key_block_size = Some(to.key_block_size.unwrap_or(0));
        }
        if self.hints.comment_strategy == CommentStrategy::Strict && to.comment != from.comment {
            changes.comment = Some(to.comment.clone().unwrap_or_default());
        }
        if let Some(target) = to.auto_increment {
            let apply = match self.hints.auto_increment_strategy {
                AutoIncrementStrategy::Ignore => false,
                AutoIncrementStrategy::Apply => from.auto_increment != Some(target),
                AutoIncrementStrategy::ApplyHigher => {
                    from.auto_increment.map_or(true, |current| target > current)
                }
            };
            if apply {
                changes.auto_increment = Some(target);
            }
        }
        if let Some((charset, collation)) = self.charset_change() {
            changes.charset = charset;
            changes.collation = collation;
        }

        (!changes.is_empty()).then_some(AlterTableSpec::TableOptions(changes))
    }

    // ------------------------------------------------------------
    // Partitioning
    // ------------------------------------------------------------

    /// Specs for the main statement, and specs that each get a statement
    /// of their own.
    fn diff_partitioning(&self) -> (Vec<AlterTableSpec>, Vec<AlterTableSpec>) {
        match (self.from.partition(), self.to.partition()) {
            (None, None) => (Vec::new(), Vec::new()),
            (Some(_), None) => (vec![AlterTableSpec::RemovePartitioning], Vec::new()),
            (None, Some(to)) => (vec![AlterTableSpec::PartitionBy(to.clone())], Vec::new()),
            (Some(from), Some(to)) if from == to => (Vec::new(), Vec::new()),
            (Some(from), Some(to)) => match (
                range_rotation(from, to),
                self.hints.range_rotation_strategy,
            ) {
                (Some(_), RangeRotationStrategy::Ignore) => (Vec::new(), Vec::new()),
                (Some((dropped, added)), RangeRotationStrategy::DistinctStatements) => {
                    let separate = dropped
                        .into_iter()
                        .map(|name| AlterTableSpec::DropPartition(vec![name]))
                        .chain(
                            added
                                .into_iter()
                                .map(|definition| AlterTableSpec::AddPartition(vec![definition])),
                        )
                        .collect();
                    (Vec::new(), separate)
                }
                _ => (vec![AlterTableSpec::PartitionBy(to.clone())], Vec::new()),
            },
        }
    }
}
