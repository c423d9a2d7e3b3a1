//! Store-agnostic query primitives and the paged-fetch contract.
//!
//! # Responsibility
//! - Express filters and orderings as explicit values instead of naming
//!   conventions.
//! - Coordinate page slice and total count against one `RecordStore`.
//!
//! # Invariants
//! - A page's `total_elements` is computed with the same filter as its slice.
//! - Every paged read is ordered deterministically (primary key tiebreak).

pub mod filter;
pub mod memory;
pub mod page;
pub mod paged;
pub mod sort;
pub mod value;

pub use filter::Filter;
pub use memory::VecStore;
pub use page::{InvalidPageArgument, Page, PageRequest};
pub use paged::{PageError, PageResult, PagedQuery, RecordStore};
pub use sort::{Direction, SortOrder, SortSpec};
pub use value::{FieldSource, Value};
