//! Canonicalization of parsed definitions.
//!
//! Normalization rewrites a definition into the single form the rest of the
//! engine compares: identifiers are lower-cased, type synonyms collapse,
//! inline key and check attributes become table elements, engine-assigned
//! names are filled in and nullability is made explicit. Every function
//! here is idempotent and never mutates its input.

use std::collections::BTreeSet;

use oxide_ddl::ast::{
    CheckDefinition, ColumnDefinition, ConstraintDefinition, ConstraintKind,
    CreateTableStatement, DataType, Expr, IndexColumn, IndexDefinition, IndexKind, IntegerKind,
    Literal, OrderDirection, PartitionBound, PartitionSpec, PartitionValues, ReferentialAction,
    SelectStatement, TableOptions, TableRef, UnaryOp, ViewAlgorithm, ViewDefinition, ViewSecurity,
};

use crate::hints::DiffHints;

/// Name of the primary key, which MySQL never lets the user choose.
pub const PRIMARY_KEY_NAME: &str = "PRIMARY";

/// Case-folds an identifier.
#[must_use]
pub fn fold_identifier(name: &str) -> String {
    name.to_lowercase()
}

// ===========================================================================
// Tables
// ===========================================================================

/// Returns the canonical form of a `CREATE TABLE` definition.
#[must_use]
pub fn normalize_table(table: &CreateTableStatement, hints: &DiffHints) -> CreateTableStatement {
    let name = fold_identifier(&table.name);
    let options = normalize_table_options(&table.options);

    let mut primary_keys: Vec<IndexDefinition> = Vec::new();
    let mut unique_keys: Vec<IndexDefinition> = Vec::new();
    let mut inline_checks: Vec<ConstraintDefinition> = Vec::new();
    let mut columns: Vec<ColumnDefinition> = Vec::with_capacity(table.columns.len());

    for column in &table.columns {
        let mut column = column.clone();
        column.name = fold_identifier(&column.name);
        let key_part = || vec![IndexColumn::new(column.name.clone())];
        if column.primary_key {
            primary_keys.push(IndexDefinition::new(
                Some(String::from(PRIMARY_KEY_NAME)),
                IndexKind::Primary,
                key_part(),
            ));
        }
        if column.unique {
            unique_keys.push(IndexDefinition::new(None, IndexKind::Unique, key_part()));
        }
        column.primary_key = false;
        column.unique = false;
        if let Some(expr) = column.check.take() {
            inline_checks.push(ConstraintDefinition {
                name: None,
                kind: ConstraintKind::Check(CheckDefinition {
                    expr,
                    enforced: true,
                }),
            });
        }
        normalize_column(&mut column, &options, hints);
        columns.push(column);
    }

    let (explicit_primary, explicit_other): (Vec<_>, Vec<_>) =
        table.indexes.iter().map(normalize_key).partition(IndexDefinition::is_primary);
    let mut indexes = primary_keys;
    indexes.extend(explicit_primary);
    indexes.extend(unique_keys);
    indexes.extend(explicit_other);
    assign_key_names(&mut indexes);

    let primary_columns: BTreeSet<String> = indexes
        .iter()
        .filter(|key| key.is_primary())
        .flat_map(|key| key.columns.iter().map(|c| c.name.clone()))
        .collect();
    for column in &mut columns {
        normalize_nullability(column, primary_columns.contains(&column.name));
    }

    let mut constraints: Vec<ConstraintDefinition> =
        table.constraints.iter().map(normalize_constraint).collect();
    constraints.extend(inline_checks.iter().map(normalize_constraint));
    assign_constraint_names(&name, &mut constraints);

    CreateTableStatement {
        name,
        if_not_exists: false,
        columns,
        indexes,
        constraints,
        options,
        partition: table.partition.as_ref().map(normalize_partition),
    }
}

fn normalize_column(column: &mut ColumnDefinition, table: &TableOptions, hints: &DiffHints) {
    column.data_type = normalize_data_type(&column.data_type, hints);
    column.default = column.default.as_ref().map(|expr| match normalize_expr(expr) {
        Expr::Literal(Literal::Boolean(value)) => Expr::integer(i64::from(value)),
        expr => expr,
    });
    column.on_update = column.on_update.as_ref().map(normalize_expr);
    if let Some(generated) = &mut column.generated {
        generated.expr = normalize_expr(&generated.expr);
    }
    if column.comment.as_deref() == Some("") {
        column.comment = None;
    }

    if !column.data_type.is_textual() {
        column.charset = None;
        column.collation = None;
        return;
    }
    let (charset, collation) =
        normalize_charset_pair(column.charset.as_deref(), column.collation.as_deref());
    let inherits = charset.is_none()
        || (charset == table.charset
            && effective_collation(charset.as_deref(), collation.as_deref())
                == effective_collation(table.charset.as_deref(), table.collation.as_deref()));
    if inherits {
        column.charset = None;
        column.collation = None;
    } else {
        column.charset = charset;
        column.collation = collation;
    }
}

/// Primary key columns are implicitly `NOT NULL`, so a redundant `NOT NULL`
/// is dropped; an explicit `NULL` is kept for validation to reject. Other
/// plain columns become explicitly nullable with `DEFAULT NULL`.
fn normalize_nullability(column: &mut ColumnDefinition, in_primary_key: bool) {
    if in_primary_key {
        if column.nullable == Some(false) {
            column.nullable = None;
        }
        return;
    }
    if column.generated.is_some() {
        return;
    }
    if column.auto_increment {
        if column.nullable.is_none() {
            column.nullable = Some(false);
        }
        return;
    }
    let nullable = *column.nullable.get_or_insert(true);
    if nullable && column.default.is_none() {
        column.default = Some(Expr::null());
    }
}

/// Canonical form of a key definition; unnamed keys stay unnamed.
pub(crate) fn normalize_key(key: &IndexDefinition) -> IndexDefinition {
    let mut key = key.clone();
    key.name = if key.is_primary() {
        Some(String::from(PRIMARY_KEY_NAME))
    } else {
        key.name.as_deref().map(fold_identifier)
    };
    for part in &mut key.columns {
        part.name = fold_identifier(&part.name);
        if part.direction == Some(OrderDirection::Asc) {
            part.direction = None;
        }
    }
    if key.comment.as_deref() == Some("") {
        key.comment = None;
    }
    key
}

/// Unnamed keys take the name of their first column, suffixed `_2`, `_3`,
/// ... when that name is taken.
fn assign_key_names(keys: &mut [IndexDefinition]) {
    let mut taken: BTreeSet<String> = keys
        .iter()
        .filter(|key| !key.is_primary())
        .filter_map(|key| key.name.clone())
        .collect();
    for key in keys.iter_mut().filter(|key| key.name.is_none()) {
        let base = key
            .columns
            .first()
            .map_or_else(|| String::from("key"), |part| part.name.clone());
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        key.name = Some(candidate);
    }
}

fn normalize_action(action: Option<ReferentialAction>) -> Option<ReferentialAction> {
    action.filter(|a| !matches!(a, ReferentialAction::Restrict | ReferentialAction::NoAction))
}

fn normalize_constraint(constraint: &ConstraintDefinition) -> ConstraintDefinition {
    let kind = match &constraint.kind {
        ConstraintKind::ForeignKey(fk) => {
            let mut fk = fk.clone();
            fk.columns = fk.columns.iter().map(|c| fold_identifier(c)).collect();
            fk.referenced_table = fold_identifier(&fk.referenced_table);
            fk.referenced_columns = fk
                .referenced_columns
                .iter()
                .map(|c| fold_identifier(c))
                .collect();
            fk.on_delete = normalize_action(fk.on_delete);
            fk.on_update = normalize_action(fk.on_update);
            ConstraintKind::ForeignKey(fk)
        }
        ConstraintKind::Check(check) => ConstraintKind::Check(CheckDefinition {
            expr: normalize_expr(&check.expr),
            enforced: check.enforced,
        }),
    };
    ConstraintDefinition {
        name: constraint.name.as_deref().map(fold_identifier),
        kind,
    }
}

/// Unnamed foreign keys become `<table>_ibfk_<n>`, unnamed checks
/// `<table>_chk_<n>`.
fn assign_constraint_names(table: &str, constraints: &mut [ConstraintDefinition]) {
    let mut taken: BTreeSet<String> = constraints.iter().filter_map(|c| c.name.clone()).collect();
    let mut next_fk = 1;
    let mut next_check = 1;
    for constraint in constraints.iter_mut().filter(|c| c.name.is_none()) {
        let (infix, counter) = match constraint.kind {
            ConstraintKind::ForeignKey(_) => ("ibfk", &mut next_fk),
            ConstraintKind::Check(_) => ("chk", &mut next_check),
        };
        let mut candidate = format!("{table}_{infix}_{counter}");
        while taken.contains(&candidate) {
            *counter += 1;
            candidate = format!("{table}_{infix}_{counter}");
        }
        *counter += 1;
        taken.insert(candidate.clone());
        constraint.name = Some(candidate);
    }
}

fn normalize_partition(spec: &PartitionSpec) -> PartitionSpec {
    let mut spec = spec.clone();
    spec.expr = spec.expr.as_ref().map(normalize_expr);
    spec.columns = spec.columns.iter().map(|c| fold_identifier(c)).collect();
    for definition in &mut spec.definitions {
        definition.name = fold_identifier(&definition.name);
        match &mut definition.values {
            Some(PartitionValues::LessThan(bounds)) => {
                for bound in bounds {
                    if let PartitionBound::Value(expr) = bound {
                        *expr = normalize_expr(expr);
                    }
                }
            }
            Some(PartitionValues::In(values)) => {
                for value in values {
                    *value = normalize_expr(value);
                }
            }
            None => {}
        }
    }
    if !spec.definitions.is_empty() {
        spec.count = None;
    }
    spec
}

// ===========================================================================
// Table options, charsets and collations
// ===========================================================================

/// Canonical spelling of the storage engines MySQL ships with; anything else
/// is kept as written.
fn canonical_engine(engine: &str) -> String {
    match engine.to_ascii_lowercase().as_str() {
        "innodb" => String::from("InnoDB"),
        "myisam" => String::from("MyISAM"),
        "memory" | "heap" => String::from("MEMORY"),
        "csv" => String::from("CSV"),
        "archive" => String::from("ARCHIVE"),
        "blackhole" => String::from("BLACKHOLE"),
        "merge" | "mrg_myisam" => String::from("MRG_MyISAM"),
        _ => engine.to_string(),
    }
}

fn canonical_charset(charset: &str) -> String {
    let charset = charset.to_ascii_lowercase();
    if charset == "utf8" {
        String::from("utf8mb3")
    } else {
        charset
    }
}

fn canonical_collation(collation: &str) -> String {
    let collation = collation.to_ascii_lowercase();
    match collation.strip_prefix("utf8_") {
        Some(rest) => format!("utf8mb3_{rest}"),
        None => collation,
    }
}

/// The charset a collation belongs to.
fn charset_of_collation(collation: &str) -> String {
    collation
        .split('_')
        .next()
        .unwrap_or(collation)
        .to_string()
}

/// Default collation of the charsets in common use.
#[must_use]
pub fn default_collation(charset: &str) -> Option<&'static str> {
    Some(match charset {
        "utf8mb4" => "utf8mb4_0900_ai_ci",
        "utf8mb3" => "utf8mb3_general_ci",
        "latin1" => "latin1_swedish_ci",
        "ascii" => "ascii_general_ci",
        "binary" => "binary",
        "ucs2" => "ucs2_general_ci",
        "utf16" => "utf16_general_ci",
        "utf32" => "utf32_general_ci",
        "cp1251" => "cp1251_general_ci",
        "gbk" => "gbk_chinese_ci",
        "sjis" => "sjis_japanese_ci",
        _ => return None,
    })
}

/// Canonical `(charset, collation)`: the charset is derived from the
/// collation when missing, and a collation equal to its charset's default
/// is dropped.
fn normalize_charset_pair(
    charset: Option<&str>,
    collation: Option<&str>,
) -> (Option<String>, Option<String>) {
    let collation = collation.map(canonical_collation);
    let charset = charset
        .map(canonical_charset)
        .or_else(|| collation.as_deref().map(charset_of_collation));
    let collation =
        collation.filter(|c| charset.as_deref().and_then(default_collation) != Some(c.as_str()));
    (charset, collation)
}

/// The collation actually in effect for a normalized pair.
fn effective_collation(charset: Option<&str>, collation: Option<&str>) -> Option<String> {
    collation
        .map(String::from)
        .or_else(|| charset.and_then(default_collation).map(String::from))
}

/// Canonical table options.
#[must_use]
pub fn normalize_table_options(options: &TableOptions) -> TableOptions {
    let (charset, collation) =
        normalize_charset_pair(options.charset.as_deref(), options.collation.as_deref());
    TableOptions {
        engine: options.engine.as_deref().map(canonical_engine),
        auto_increment: options.auto_increment,
        charset,
        collation,
        row_format: options
            .row_format
            .as_deref()
            .map(str::to_ascii_uppercase)
            .filter(|format| format != "DEFAULT"),
        key_block_size: options.key_block_size.filter(|size| *size != 0),
        comment: options.comment.clone().filter(|c| !c.is_empty()),
    }
}

// ===========================================================================
// Types
// ===========================================================================

/// Canonical form of a column type.
#[must_use]
pub fn normalize_data_type(data_type: &DataType, hints: &DiffHints) -> DataType {
    match data_type {
        DataType::Integer {
            kind,
            display_width,
            unsigned,
            zerofill,
        } => {
            let boolean_width = *kind == IntegerKind::Tiny
                && *display_width == Some(1)
                && hints.preserve_boolean_display_width;
            DataType::Integer {
                kind: *kind,
                display_width: boolean_width.then_some(1),
                unsigned: *unsigned || *zerofill,
                zerofill: *zerofill,
            }
        }
        DataType::Boolean => DataType::Integer {
            kind: IntegerKind::Tiny,
            display_width: hints.preserve_boolean_display_width.then_some(1),
            unsigned: false,
            zerofill: false,
        },
        DataType::Decimal {
            precision,
            scale,
            unsigned,
            zerofill,
        } => DataType::Decimal {
            precision: Some(precision.unwrap_or(10)),
            scale: Some(scale.unwrap_or(0)),
            unsigned: *unsigned || *zerofill,
            zerofill: *zerofill,
        },
        DataType::Float {
            precision: Some(precision),
            scale: None,
            unsigned,
        } => {
            if *precision > 24 {
                DataType::Double {
                    precision: None,
                    scale: None,
                    unsigned: *unsigned,
                }
            } else {
                DataType::Float {
                    precision: None,
                    scale: None,
                    unsigned: *unsigned,
                }
            }
        }
        DataType::Bit(None) => DataType::Bit(Some(1)),
        DataType::Char(None) => DataType::Char(Some(1)),
        DataType::Binary(None) => DataType::Binary(Some(1)),
        DataType::Time(Some(0)) => DataType::Time(None),
        DataType::Datetime(Some(0)) => DataType::Datetime(None),
        DataType::Timestamp(Some(0)) => DataType::Timestamp(None),
        other => other.clone(),
    }
}

// ===========================================================================
// Expressions and queries
// ===========================================================================

/// Canonical form of an expression: parentheses are dropped (the printer
/// re-inserts the ones precedence needs), identifiers and function names
/// are lower-cased, time function synonyms collapse to
/// `current_timestamp` and negated numeric literals fold.
#[must_use]
pub fn normalize_expr(expr: &Expr) -> Expr {
    let mut expr = expr.clone();
    normalize_expr_in_place(&mut expr);
    expr
}

fn normalize_expr_in_place(expr: &mut Expr) {
    expr.walk_mut(&mut |node| {
        while let Expr::Paren(inner) = node {
            let inner = std::mem::replace(inner.as_mut(), Expr::null());
            *node = inner;
        }
        match node {
            Expr::Column { table, name } => {
                *name = fold_identifier(name);
                if let Some(table) = table {
                    *table = fold_identifier(table);
                }
            }
            Expr::Wildcard { table: Some(table) } => *table = fold_identifier(table),
            Expr::Function(call) => {
                call.name = match fold_identifier(&call.name).as_str() {
                    "now" | "localtime" | "localtimestamp" => String::from("current_timestamp"),
                    name => name.to_string(),
                };
            }
            _ => {}
        }
    });
    expr.walk_mut(&mut |node| {
        if let Expr::Unary {
            op: UnaryOp::Neg,
            operand,
        } = node
        {
            let folded = match operand.as_ref() {
                Expr::Literal(Literal::Integer(value)) if *value >= 0 => {
                    Some(Literal::Integer(-*value))
                }
                Expr::Literal(Literal::Float(value)) if *value > 0.0 => {
                    Some(Literal::Float(-*value))
                }
                _ => None,
            };
            if let Some(literal) = folded {
                *node = Expr::Literal(literal);
            }
        }
    });
    expr.for_each_subquery_mut(&mut normalize_select);
}

fn normalize_table_ref(table: &mut TableRef) {
    match table {
        TableRef::Table {
            schema,
            name,
            alias,
        } => {
            *name = fold_identifier(name);
            if let Some(schema) = schema {
                *schema = fold_identifier(schema);
            }
            if let Some(alias) = alias {
                *alias = fold_identifier(alias);
            }
        }
        TableRef::Subquery { query, alias } => {
            normalize_select(query);
            *alias = fold_identifier(alias);
        }
        TableRef::Join { left, join } => {
            normalize_table_ref(left);
            normalize_table_ref(&mut join.table);
            if let Some(on) = &mut join.on {
                normalize_expr_in_place(on);
            }
            for column in &mut join.using {
                *column = fold_identifier(column);
            }
        }
    }
}

/// Normalizes every clause of a query in place, including nested queries.
pub fn normalize_select(select: &mut SelectStatement) {
    for column in &mut select.columns {
        normalize_expr_in_place(&mut column.expr);
        if let Some(alias) = &mut column.alias {
            *alias = fold_identifier(alias);
        }
    }
    for table in &mut select.from {
        normalize_table_ref(table);
    }
    let clauses = select
        .where_clause
        .iter_mut()
        .chain(select.group_by.iter_mut())
        .chain(select.having.iter_mut())
        .chain(select.limit.iter_mut())
        .chain(select.offset.iter_mut());
    for expr in clauses {
        normalize_expr_in_place(expr);
    }
    for order in &mut select.order_by {
        normalize_expr_in_place(&mut order.expr);
        if order.direction == Some(OrderDirection::Asc) {
            order.direction = None;
        }
    }
    for branch in &mut select.unions {
        normalize_select(&mut branch.select);
    }
}

// ===========================================================================
// Views
// ===========================================================================

/// Returns the canonical form of a view definition. The default algorithm
/// and security clauses are dropped.
#[must_use]
pub fn normalize_view(view: &ViewDefinition) -> ViewDefinition {
    let mut query = view.query.clone();
    normalize_select(&mut query);
    ViewDefinition {
        name: fold_identifier(&view.name),
        algorithm: view
            .algorithm
            .filter(|a| !matches!(a, ViewAlgorithm::Undefined)),
        security: view.security.filter(|s| !matches!(s, ViewSecurity::Definer)),
        columns: view.columns.iter().map(|c| fold_identifier(c)).collect(),
        query,
        check_option: view.check_option,
    }
}
