//! Ordering specifications.
//!
//! # Invariants
//! - Orders apply left to right; later pairs only break ties of earlier ones.
//! - NULL sorts before any value in ascending order, matching SQLite.

use crate::query::value::FieldSource;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder<F> {
    pub field: F,
    pub direction: Direction,
}

/// Ordered sequence of sort pairs. Empty means store-defined order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec<F> {
    orders: Vec<SortOrder<F>>,
}

impl<F> Default for SortSpec<F> {
    fn default() -> Self {
        Self { orders: Vec::new() }
    }
}

impl<F: Copy + PartialEq> SortSpec<F> {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn asc(field: F) -> Self {
        Self::unsorted().then_asc(field)
    }

    pub fn desc(field: F) -> Self {
        Self::unsorted().then_desc(field)
    }

    pub fn then_asc(self, field: F) -> Self {
        self.then(field, Direction::Asc)
    }

    pub fn then_desc(self, field: F) -> Self {
        self.then(field, Direction::Desc)
    }

    pub fn then(mut self, field: F, direction: Direction) -> Self {
        self.orders.push(SortOrder { field, direction });
        self
    }

    pub fn orders(&self) -> &[SortOrder<F>] {
        &self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn contains(&self, field: F) -> bool {
        self.orders.iter().any(|order| order.field == field)
    }

    /// Appends `key ASC` unless `key` already takes part in the ordering.
    ///
    /// With a unique `key` this makes the ordering total, so adjacent
    /// offset windows never share or skip records.
    pub fn with_tiebreak(self, key: F) -> Self {
        if self.contains(key) {
            self
        } else {
            self.then_asc(key)
        }
    }

    /// Compares two records under this ordering.
    pub fn compare<R: FieldSource<F>>(&self, left: &R, right: &R) -> Ordering {
        for order in &self.orders {
            // Option orders None first, which is SQLite's NULL placement.
            let ordering = left
                .field_value(order.field)
                .cmp(&right.field_value(order.field));
            let ordering = match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, SortSpec};
    use crate::query::value::{FieldSource, Value};
    use std::cmp::Ordering;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Id,
        Name,
    }

    struct Row(i64, Option<&'static str>);

    impl FieldSource<Field> for Row {
        fn field_value(&self, field: Field) -> Option<Value> {
            match field {
                Field::Id => Some(Value::Int(self.0)),
                Field::Name => self.1.map(Value::from),
            }
        }
    }

    #[test]
    fn tiebreak_is_appended_once() {
        let sort = SortSpec::desc(Field::Name).with_tiebreak(Field::Id);
        assert_eq!(sort.orders().len(), 2);
        assert_eq!(sort.orders()[1].direction, Direction::Asc);

        let already_keyed = SortSpec::desc(Field::Id).with_tiebreak(Field::Id);
        assert_eq!(already_keyed.orders().len(), 1);
        assert_eq!(already_keyed.orders()[0].direction, Direction::Desc);
    }

    #[test]
    fn compare_falls_through_to_later_orders() {
        let sort = SortSpec::desc(Field::Name).then_asc(Field::Id);

        assert_eq!(
            sort.compare(&Row(1, Some("AAA")), &Row(2, Some("AAA"))),
            Ordering::Less
        );
        assert_eq!(
            sort.compare(&Row(1, Some("AAA")), &Row(2, Some("BBB"))),
            Ordering::Greater
        );
    }

    #[test]
    fn null_sorts_first_ascending() {
        let sort = SortSpec::asc(Field::Name);
        assert_eq!(
            sort.compare(&Row(1, None), &Row(2, Some("A"))),
            Ordering::Less
        );
        assert_eq!(
            SortSpec::<Field>::unsorted().compare(&Row(1, None), &Row(2, None)),
            Ordering::Equal
        );
    }
}
