//! In-memory record store.
//!
//! Evaluates filters and orderings with the reference semantics in
//! `Filter::matches` and `SortSpec::compare`. SQL-backed stores are tested
//! for agreement against it.

use crate::query::filter::Filter;
use crate::query::paged::RecordStore;
use crate::query::sort::SortSpec;
use crate::query::value::FieldSource;
use std::convert::Infallible;

/// `RecordStore` over an owned vector of records.
#[derive(Debug, Clone)]
pub struct VecStore<R, F> {
    primary_key: F,
    records: Vec<R>,
}

impl<R, F> VecStore<R, F> {
    pub fn new(primary_key: F, records: Vec<R>) -> Self {
        Self {
            primary_key,
            records,
        }
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }
}

impl<R, F> RecordStore for VecStore<R, F>
where
    R: FieldSource<F> + Clone,
    F: Copy + PartialEq,
{
    type Record = R;
    type Field = F;
    type Error = Infallible;

    fn primary_key(&self) -> F {
        self.primary_key
    }

    fn query(
        &self,
        filter: &Filter<F>,
        sort: &SortSpec<F>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<R>, Infallible> {
        let mut matching: Vec<&R> = self
            .records
            .iter()
            .filter(|record| filter.matches(*record))
            .collect();
        // Stable sort keeps insertion order for full ties.
        matching.sort_by(|left, right| sort.compare(*left, *right));

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(skip).take(take).cloned().collect())
    }

    fn count(&self, filter: &Filter<F>) -> Result<u64, Infallible> {
        let matching = self
            .records
            .iter()
            .filter(|record| filter.matches(*record))
            .count();
        Ok(u64::try_from(matching).unwrap_or(u64::MAX))
    }
}
