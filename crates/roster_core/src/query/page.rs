//! Page request and page result values.
//!
//! # Invariants
//! - A `PageRequest` always has `limit > 0`, including deserialized ones.
//! - `Page::number == offset / limit`.
//! - `Page::is_last` holds once the window reaches `total_elements`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejected offset/limit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPageArgument {
    NegativeOffset(i64),
    NonPositiveLimit(i64),
    NegativePageNumber(i64),
    OffsetOverflow { page_number: i64, size: i64 },
}

impl Display for InvalidPageArgument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeOffset(value) => write!(f, "offset must be >= 0, got {value}"),
            Self::NonPositiveLimit(value) => write!(f, "limit must be > 0, got {value}"),
            Self::NegativePageNumber(value) => {
                write!(f, "page number must be >= 0, got {value}")
            }
            Self::OffsetOverflow { page_number, size } => write!(
                f,
                "page {page_number} with size {size} overflows the offset range"
            ),
        }
    }
}

impl Error for InvalidPageArgument {}

/// Validated `(offset, limit)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    offset: u64,
    limit: u64,
}

/// Wire shape of `PageRequest` before validation.
#[derive(Deserialize)]
struct RawPageRequest {
    offset: u64,
    limit: u64,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = InvalidPageArgument;

    fn try_from(raw: RawPageRequest) -> Result<Self, Self::Error> {
        if raw.limit == 0 {
            return Err(InvalidPageArgument::NonPositiveLimit(0));
        }
        Ok(Self {
            offset: raw.offset,
            limit: raw.limit,
        })
    }
}

impl PageRequest {
    /// Builds a window from raw caller input.
    ///
    /// # Errors
    /// - `NegativeOffset` when `offset < 0`.
    /// - `NonPositiveLimit` when `limit <= 0`.
    pub fn new(offset: i64, limit: i64) -> Result<Self, InvalidPageArgument> {
        if limit <= 0 {
            return Err(InvalidPageArgument::NonPositiveLimit(limit));
        }
        let offset =
            u64::try_from(offset).map_err(|_| InvalidPageArgument::NegativeOffset(offset))?;
        Ok(Self {
            offset,
            limit: limit.unsigned_abs(),
        })
    }

    /// Builds the window of zero-based page `page_number` with `size` rows.
    pub fn of(page_number: i64, size: i64) -> Result<Self, InvalidPageArgument> {
        if size <= 0 {
            return Err(InvalidPageArgument::NonPositiveLimit(size));
        }
        if page_number < 0 {
            return Err(InvalidPageArgument::NegativePageNumber(page_number));
        }
        let offset = page_number
            .checked_mul(size)
            .ok_or(InvalidPageArgument::OffsetOverflow { page_number, size })?;
        Self::new(offset, size)
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Zero-based page index; only meaningful when `offset` is a multiple
    /// of `limit`.
    pub fn page_number(&self) -> u64 {
        self.offset / self.limit
    }

    /// The adjacent window after this one.
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

/// Bounded slice of a filtered result set plus the set's total size.
///
/// Deserializing re-validates the window and recomputes `number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPage<T>")]
pub struct Page<T> {
    content: Vec<T>,
    offset: u64,
    limit: u64,
    total_elements: u64,
    number: u64,
}

#[derive(Deserialize)]
struct RawPage<T> {
    content: Vec<T>,
    offset: u64,
    limit: u64,
    total_elements: u64,
}

impl<T> TryFrom<RawPage<T>> for Page<T> {
    type Error = InvalidPageArgument;

    fn try_from(raw: RawPage<T>) -> Result<Self, Self::Error> {
        let request = PageRequest::try_from(RawPageRequest {
            offset: raw.offset,
            limit: raw.limit,
        })?;
        Ok(Self::new(raw.content, request, raw.total_elements))
    }
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            offset: request.offset,
            limit: request.limit,
            total_elements,
            number: request.page_number(),
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            offset: self.offset,
            limit: self.limit,
        }
    }

    pub fn is_first(&self) -> bool {
        self.offset == 0
    }

    pub fn is_last(&self) -> bool {
        let returned = u64::try_from(self.content.len()).unwrap_or(u64::MAX);
        self.offset.saturating_add(returned) >= self.total_elements
    }

    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    pub fn has_previous(&self) -> bool {
        !self.is_first()
    }

    /// `ceil(total_elements / limit)`; zero for an empty result set.
    pub fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(self.limit)
    }

    /// Converts every item while keeping the window and total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            offset: self.offset,
            limit: self.limit,
            total_elements: self.total_elements,
            number: self.number,
        }
    }
}
