//! Composable record predicates.
//!
//! # Responsibility
//! - Model equality, range and conjunction predicates as tagged variants.
//! - Provide the in-memory reference semantics (`Filter::matches`) that
//!   SQL-backed stores must agree with.
//!
//! # Invariants
//! - `Filter::All` and an empty `Filter::And` match every record.
//! - NULL field values never match `Eq` or `Range`.
//! - An integer never equals, or falls within a range bounded by, text
//!   (and the other way round); no implicit conversion happens.

use crate::query::value::{FieldSource, Value};
use std::ops::Bound;

/// Predicate over the fields `F` of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<F> {
    /// Matches every record.
    All,
    /// Field equals value.
    Eq(F, Value),
    /// Field lies within `lower..upper`; unbounded on both ends means
    /// "field is not NULL".
    Range {
        field: F,
        lower: Bound<Value>,
        upper: Bound<Value>,
    },
    /// Every nested filter matches.
    And(Vec<Filter<F>>),
}

impl<F> Default for Filter<F> {
    fn default() -> Self {
        Self::All
    }
}

impl<F: Copy> Filter<F> {
    pub fn eq(field: F, value: impl Into<Value>) -> Self {
        Self::Eq(field, value.into())
    }

    pub fn gt(field: F, value: impl Into<Value>) -> Self {
        Self::Range {
            field,
            lower: Bound::Excluded(value.into()),
            upper: Bound::Unbounded,
        }
    }

    pub fn ge(field: F, value: impl Into<Value>) -> Self {
        Self::Range {
            field,
            lower: Bound::Included(value.into()),
            upper: Bound::Unbounded,
        }
    }

    pub fn lt(field: F, value: impl Into<Value>) -> Self {
        Self::Range {
            field,
            lower: Bound::Unbounded,
            upper: Bound::Excluded(value.into()),
        }
    }

    pub fn le(field: F, value: impl Into<Value>) -> Self {
        Self::Range {
            field,
            lower: Bound::Unbounded,
            upper: Bound::Included(value.into()),
        }
    }

    /// Inclusive on both ends.
    pub fn between(field: F, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::Range {
            field,
            lower: Bound::Included(low.into()),
            upper: Bound::Included(high.into()),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s and
    /// dropping `All` operands.
    pub fn and(self, other: Filter<F>) -> Self {
        match (self, other) {
            (Self::All, rhs) => rhs,
            (lhs, Self::All) => lhs,
            (Self::And(mut lhs), Self::And(rhs)) => {
                lhs.extend(rhs);
                Self::And(lhs)
            }
            (Self::And(mut lhs), rhs) => {
                lhs.push(rhs);
                Self::And(lhs)
            }
            (lhs, Self::And(rhs)) => {
                let mut all = Vec::with_capacity(rhs.len() + 1);
                all.push(lhs);
                all.extend(rhs);
                Self::And(all)
            }
            (lhs, rhs) => Self::And(vec![lhs, rhs]),
        }
    }

    /// Returns whether this filter accepts every record.
    pub fn is_all(&self) -> bool {
        match self {
            Self::All => true,
            Self::And(parts) => parts.iter().all(Filter::is_all),
            _ => false,
        }
    }

    /// Evaluates this filter against one record.
    pub fn matches<R: FieldSource<F>>(&self, record: &R) -> bool {
        match self {
            Self::All => true,
            Self::Eq(field, expected) => record
                .field_value(*field)
                .is_some_and(|actual| &actual == expected),
            Self::Range {
                field,
                lower,
                upper,
            } => record
                .field_value(*field)
                .is_some_and(|actual| above_lower(&actual, lower) && below_upper(&actual, upper)),
            Self::And(parts) => parts.iter().all(|part| part.matches(record)),
        }
    }
}

fn above_lower(value: &Value, bound: &Bound<Value>) -> bool {
    match bound {
        Bound::Included(low) => value.same_kind(low) && value >= low,
        Bound::Excluded(low) => value.same_kind(low) && value > low,
        Bound::Unbounded => true,
    }
}

fn below_upper(value: &Value, bound: &Bound<Value>) -> bool {
    match bound {
        Bound::Included(high) => value.same_kind(high) && value <= high,
        Bound::Excluded(high) => value.same_kind(high) && value < high,
        Bound::Unbounded => true,
    }
}

#[cfg(test)]
mod tests {
    use super::Filter;
    use crate::query::value::{FieldSource, Value};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Name,
        Age,
    }

    struct Row {
        name: Option<&'static str>,
        age: i64,
    }

    impl FieldSource<Field> for Row {
        fn field_value(&self, field: Field) -> Option<Value> {
            match field {
                Field::Name => self.name.map(Value::from),
                Field::Age => Some(Value::Int(self.age)),
            }
        }
    }

    #[test]
    fn equality_and_range_combine_as_conjunction() {
        let filter = Filter::eq(Field::Name, "AAA").and(Filter::gt(Field::Age, 15));

        assert!(filter.matches(&Row {
            name: Some("AAA"),
            age: 20
        }));
        assert!(!filter.matches(&Row {
            name: Some("AAA"),
            age: 15
        }));
        assert!(!filter.matches(&Row {
            name: Some("BBB"),
            age: 20
        }));
    }

    #[test]
    fn null_field_never_matches_predicates() {
        let row = Row { name: None, age: 1 };

        assert!(!Filter::eq(Field::Name, "AAA").matches(&row));
        assert!(!Filter::ge(Field::Name, "").matches(&row));
        assert!(Filter::<Field>::All.matches(&row));
    }

    #[test]
    fn mixed_integer_and_text_never_match() {
        let row = Row {
            name: Some("5"),
            age: 10,
        };

        assert!(!Filter::eq(Field::Age, "10").matches(&row));
        assert!(!Filter::eq(Field::Name, 5).matches(&row));
        assert!(!Filter::ge(Field::Name, 0).matches(&row));
        assert!(!Filter::lt(Field::Age, "zzz").matches(&row));
        assert!(Filter::between(Field::Age, 10, 10).matches(&row));
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        let filter = Filter::between(Field::Age, 10, 20);

        assert!(filter.matches(&Row { name: None, age: 10 }));
        assert!(filter.matches(&Row { name: None, age: 20 }));
        assert!(!filter.matches(&Row { name: None, age: 21 }));
    }

    #[test]
    fn and_flattens_and_drops_all() {
        let filter = Filter::All
            .and(Filter::eq(Field::Age, 1))
            .and(Filter::eq(Field::Age, 2).and(Filter::eq(Field::Age, 3)));

        match filter {
            Filter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected conjunction, got {other:?}"),
        }
        assert!(Filter::<Field>::And(Vec::new()).is_all());
    }
}
