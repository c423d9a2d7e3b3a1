//! Filter and ordering translation to SQLite SQL.
//!
//! # Invariants
//! - Values are always bound as parameters, never spliced into SQL text.
//! - Column expressions only come from `SqlColumn` implementations.
//! - Translation agrees with `Filter::matches`, including NULL handling
//!   and the no-conversion rule between integers and text.

use crate::model::member::MemberField;
use crate::query::{Filter, SortSpec, Value};
use rusqlite::types::Value as SqlValue;
use std::ops::Bound;

/// Maps a field enum to its SQL column expression.
pub(crate) trait SqlColumn: Copy + PartialEq {
    fn column(self) -> &'static str;
}

impl SqlColumn for MemberField {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "m.id",
            Self::Username => "m.username",
            Self::Age => "m.age",
            Self::TeamId => "m.team_id",
            Self::TeamName => "t.name",
        }
    }
}

/// Renders `filter` as a boolean SQL expression, appending bind values.
///
/// Every comparison is guarded by `typeof(column)` so SQLite's column
/// affinity never turns `'10'` into `10` (or the reverse).
pub(crate) fn where_clause<F: SqlColumn>(filter: &Filter<F>, binds: &mut Vec<SqlValue>) -> String {
    match filter {
        Filter::All => "1 = 1".to_string(),
        Filter::Eq(field, value) => {
            let column = field.column();
            binds.push(bind_value(value));
            format!("({} AND {column} = ?)", type_guard(column, value))
        }
        Filter::Range {
            field,
            lower,
            upper,
        } => {
            let column = field.column();
            let mut guards: Vec<String> = Vec::new();
            let mut comparisons: Vec<String> = Vec::new();
            for (bound, inclusive, exclusive) in [(lower, ">=", ">"), (upper, "<=", "<")] {
                let (value, op) = match bound {
                    Bound::Included(value) => (value, inclusive),
                    Bound::Excluded(value) => (value, exclusive),
                    Bound::Unbounded => continue,
                };
                let guard = type_guard(column, value);
                if !guards.contains(&guard) {
                    guards.push(guard);
                }
                binds.push(bind_value(value));
                comparisons.push(format!("{column} {op} ?"));
            }
            if guards.is_empty() {
                return format!("({column} IS NOT NULL)");
            }
            guards.extend(comparisons);
            format!("({})", guards.join(" AND "))
        }
        Filter::And(parts) if parts.is_empty() => "1 = 1".to_string(),
        Filter::And(parts) => {
            let rendered: Vec<String> = parts
                .iter()
                .map(|part| where_clause(part, binds))
                .collect();
            format!("({})", rendered.join(" AND "))
        }
    }
}

fn type_guard(column: &str, value: &Value) -> String {
    let storage_class = match value {
        Value::Int(_) => "integer",
        Value::Text(_) => "text",
    };
    format!("typeof({column}) = '{storage_class}'")
}

/// Renders ` ORDER BY ...`, or an empty string for an unsorted spec.
pub(crate) fn order_clause<F: SqlColumn>(sort: &SortSpec<F>) -> String {
    if sort.is_empty() {
        return String::new();
    }
    let terms: Vec<String> = sort
        .orders()
        .iter()
        .map(|order| format!("{} {}", order.field.column(), order.direction.as_sql()))
        .collect();
    format!(" ORDER BY {}", terms.join(", "))
}

pub(crate) fn bind_value(value: &Value) -> SqlValue {
    match value {
        Value::Int(value) => SqlValue::Integer(*value),
        Value::Text(value) => SqlValue::Text(value.clone()),
    }
}

/// Clamps an unsigned window bound into SQLite's integer range.
pub(crate) fn window_bound(value: u64) -> SqlValue {
    SqlValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}
