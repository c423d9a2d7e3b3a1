//! Paged fetch over an external record store.
//!
//! # Responsibility
//! - Validate the requested window before touching the store.
//! - Fetch the page slice and the filtered total count, then assemble `Page`.
//!
//! # Invariants
//! - Slice and count use the same filter; the count ignores the window.
//! - Every fetch orders by the store primary key as the final tiebreak.
//! - Store failures surface unchanged; nothing is retried or suppressed.

use crate::query::filter::Filter;
use crate::query::page::{InvalidPageArgument, Page, PageRequest};
use crate::query::sort::SortSpec;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type PageResult<T, E> = Result<T, PageError<E>>;

/// Failure of a paged fetch.
#[derive(Debug)]
pub enum PageError<E> {
    /// Offset/limit rejected before any store access.
    InvalidArgument(InvalidPageArgument),
    /// Store-side failure, passed through as reported.
    StoreUnavailable(E),
}

impl<E: Display> Display for PageError<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid page request: {err}"),
            Self::StoreUnavailable(err) => write!(f, "record store unavailable: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for PageError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
        }
    }
}

impl<E> From<InvalidPageArgument> for PageError<E> {
    fn from(value: InvalidPageArgument) -> Self {
        Self::InvalidArgument(value)
    }
}

/// Filtered, sorted and counted record access.
pub trait RecordStore {
    type Record;
    type Field: Copy + PartialEq;
    type Error: Error + 'static;

    /// Unique key used as the final ordering tiebreak.
    fn primary_key(&self) -> Self::Field;

    /// Records matching `filter`, ordered by `sort`, windowed by
    /// `offset`/`limit`.
    fn query(
        &self,
        filter: &Filter<Self::Field>,
        sort: &SortSpec<Self::Field>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self::Record>, Self::Error>;

    /// Number of records matching `filter`.
    fn count(&self, filter: &Filter<Self::Field>) -> Result<u64, Self::Error>;

    /// Runs `read` against one logical snapshot of the store.
    ///
    /// The default gives no isolation: reads inside `read` may observe
    /// writes committed between them.
    fn snapshot<T>(
        &self,
        read: impl FnOnce(&Self) -> Result<T, Self::Error>,
    ) -> Result<T, Self::Error> {
        read(self)
    }
}

impl<S: RecordStore> RecordStore for &S {
    type Record = S::Record;
    type Field = S::Field;
    type Error = S::Error;

    fn primary_key(&self) -> Self::Field {
        (**self).primary_key()
    }

    fn query(
        &self,
        filter: &Filter<Self::Field>,
        sort: &SortSpec<Self::Field>,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self::Record>, Self::Error> {
        (**self).query(filter, sort, offset, limit)
    }

    fn count(&self, filter: &Filter<Self::Field>) -> Result<u64, Self::Error> {
        (**self).count(filter)
    }

    fn snapshot<T>(
        &self,
        read: impl FnOnce(&Self) -> Result<T, Self::Error>,
    ) -> Result<T, Self::Error> {
        (**self).snapshot(|_| read(self))
    }
}

/// Stateless paged reader bound to one store.
#[derive(Debug, Clone)]
pub struct PagedQuery<S> {
    store: S,
}

impl<S: RecordStore> PagedQuery<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetches the `offset`/`limit` window of records matching `filter`.
    ///
    /// # Errors
    /// - `InvalidArgument` when `offset < 0` or `limit <= 0`.
    /// - `StoreUnavailable` when either the slice or the count fails.
    pub fn fetch(
        &self,
        filter: &Filter<S::Field>,
        sort: &SortSpec<S::Field>,
        offset: i64,
        limit: i64,
    ) -> PageResult<Page<S::Record>, S::Error> {
        let request = PageRequest::new(offset, limit)?;
        self.fetch_request(filter, sort, request)
    }

    /// Same as [`PagedQuery::fetch`] for an already validated window.
    pub fn fetch_request(
        &self,
        filter: &Filter<S::Field>,
        sort: &SortSpec<S::Field>,
        request: PageRequest,
    ) -> PageResult<Page<S::Record>, S::Error> {
        let started_at = Instant::now();
        let sort = sort.clone().with_tiebreak(self.store.primary_key());

        let outcome = self.store.snapshot(|store| {
            let slice = store.query(filter, &sort, request.offset(), request.limit())?;
            let total = store.count(filter)?;
            Ok((slice, total))
        });

        match outcome {
            Ok((mut slice, total)) => {
                let limit = usize::try_from(request.limit()).unwrap_or(usize::MAX);
                if slice.len() > limit {
                    warn!(
                        "event=page_fetch module=query status=truncated returned={} limit={}",
                        slice.len(),
                        limit
                    );
                    slice.truncate(limit);
                }
                debug!(
                    "event=page_fetch module=query status=ok offset={} limit={} returned={} total={} duration_ms={}",
                    request.offset(),
                    request.limit(),
                    slice.len(),
                    total,
                    started_at.elapsed().as_millis()
                );
                Ok(Page::new(slice, request, total))
            }
            Err(err) => {
                warn!(
                    "event=page_fetch module=query status=error offset={} limit={} duration_ms={} error={}",
                    request.offset(),
                    request.limit(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(PageError::StoreUnavailable(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageError, PagedQuery, RecordStore};
    use crate::query::filter::Filter;
    use crate::query::memory::VecStore;
    use crate::query::page::InvalidPageArgument;
    use crate::query::sort::SortSpec;
    use crate::query::value::{FieldSource, Value};
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::error::Error;
    use std::fmt::{Display, Formatter};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Id,
        Username,
        Age,
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: i64,
        username: String,
        age: i64,
    }

    impl FieldSource<Field> for Row {
        fn field_value(&self, field: Field) -> Option<Value> {
            Some(match field {
                Field::Id => Value::Int(self.id),
                Field::Username => Value::Text(self.username.clone()),
                Field::Age => Value::Int(self.age),
            })
        }
    }

    fn twenty_matching_rows() -> VecStore<Row, Field> {
        let mut rows = Vec::new();
        for i in 0..10 {
            rows.push(Row {
                id: i * 2 + 1,
                username: format!("AAA{i}"),
                age: 10,
            });
            rows.push(Row {
                id: i * 2 + 2,
                username: format!("AAA{i}"),
                age: 10,
            });
        }
        rows.push(Row {
            id: 100,
            username: "ZZZ".to_string(),
            age: 99,
        });
        VecStore::new(Field::Id, rows)
    }

    #[derive(Debug)]
    struct Unreachable;

    impl Display for Unreachable {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            write!(f, "store unreachable")
        }
    }

    impl Error for Unreachable {}

    /// Always fails the count; fails the slice too when `fail_slice` is set.
    struct FailingStore {
        fail_slice: bool,
        calls: Cell<u32>,
    }

    impl FailingStore {
        fn new(fail_slice: bool) -> Self {
            Self {
                fail_slice,
                calls: Cell::new(0),
            }
        }
    }

    impl RecordStore for FailingStore {
        type Record = Row;
        type Field = Field;
        type Error = Unreachable;

        fn primary_key(&self) -> Field {
            Field::Id
        }

        fn query(
            &self,
            _filter: &Filter<Field>,
            _sort: &SortSpec<Field>,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<Row>, Unreachable> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_slice {
                return Err(Unreachable);
            }
            Ok(Vec::new())
        }

        fn count(&self, _filter: &Filter<Field>) -> Result<u64, Unreachable> {
            self.calls.set(self.calls.get() + 1);
            Err(Unreachable)
        }
    }

    #[test]
    fn first_page_of_twenty_sorted_by_username_desc() {
        let paged = PagedQuery::new(twenty_matching_rows());
        let filter = Filter::eq(Field::Age, 10);
        let sort = SortSpec::desc(Field::Username);

        let page = paged.fetch(&filter, &sort, 0, 5).unwrap();

        assert_eq!(page.len(), 5);
        assert_eq!(page.total_elements(), 20);
        assert_eq!(page.number(), 0);
        assert!(page.is_first());
        assert!(!page.is_last());
        let ids: Vec<i64> = page.content().iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![19, 20, 17, 18, 15]);
    }

    #[test]
    fn offset_past_end_is_empty_and_last() {
        let paged = PagedQuery::new(twenty_matching_rows());
        let page = paged
            .fetch(&Filter::eq(Field::Age, 10), &SortSpec::unsorted(), 20, 5)
            .unwrap();

        assert!(page.is_empty());
        assert!(page.is_last());
        assert_eq!(page.total_elements(), 20);
    }

    #[test]
    fn no_matches_is_first_and_last() {
        let paged = PagedQuery::new(twenty_matching_rows());
        let page = paged
            .fetch(&Filter::eq(Field::Age, 7), &SortSpec::unsorted(), 0, 5)
            .unwrap();

        assert!(page.is_empty());
        assert!(page.is_first() && page.is_last());
    }

    #[test]
    fn invalid_window_fails_before_store_access() {
        let store = FailingStore::new(false);
        let paged = PagedQuery::new(&store);

        let err = paged
            .fetch(&Filter::All, &SortSpec::unsorted(), 0, 0)
            .unwrap_err();
        assert!(matches!(
            err,
            PageError::InvalidArgument(InvalidPageArgument::NonPositiveLimit(0))
        ));
        let err = paged
            .fetch(&Filter::All, &SortSpec::unsorted(), -3, 5)
            .unwrap_err();
        assert!(matches!(err, PageError::InvalidArgument(_)));
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn failed_count_fails_whole_fetch() {
        let store = FailingStore::new(false);
        let paged = PagedQuery::new(&store);

        let err = paged
            .fetch(&Filter::All, &SortSpec::unsorted(), 0, 5)
            .unwrap_err();
        assert!(matches!(err, PageError::StoreUnavailable(Unreachable)));
        assert!(err.to_string().contains("store unreachable"));
        assert_eq!(store.calls.get(), 2);
    }

    #[test]
    fn failed_slice_skips_count_and_fails_fetch() {
        let store = FailingStore::new(true);
        let paged = PagedQuery::new(&store);

        let err = paged
            .fetch(&Filter::eq(Field::Age, 10), &SortSpec::desc(Field::Username), 5, 5)
            .unwrap_err();
        assert!(matches!(err, PageError::StoreUnavailable(Unreachable)));
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn total_is_independent_of_window() {
        let paged = PagedQuery::new(twenty_matching_rows());
        let filter = Filter::eq(Field::Age, 10);
        let sort = SortSpec::asc(Field::Username);

        for (offset, limit) in [(0, 1), (3, 7), (19, 50), (40, 3)] {
            let page = paged.fetch(&filter, &sort, offset, limit).unwrap();
            assert_eq!(page.total_elements(), 20);
            assert!(page.len() <= usize::try_from(limit).unwrap());
            assert_eq!(page.is_first(), offset == 0);
        }
    }

    #[test]
    fn consecutive_windows_partition_matches_under_tied_sort() {
        let paged = PagedQuery::new(twenty_matching_rows());
        let filter = Filter::eq(Field::Age, 10);
        // Every username appears twice, so ties are resolved by the key.
        let sort = SortSpec::desc(Field::Username);

        let mut seen = HashSet::new();
        let mut collected = 0;
        let mut offset = 0;
        loop {
            let page = paged.fetch(&filter, &sort, offset, 3).unwrap();
            for row in page.content() {
                assert!(seen.insert(row.id), "duplicate row {}", row.id);
            }
            collected += page.len();
            if page.is_last() {
                break;
            }
            offset += 3;
        }

        assert_eq!(collected, 20);
    }
}
