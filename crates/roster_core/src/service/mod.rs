//! Roster use-case services.
//!
//! # Responsibility
//! - Combine repository calls into use-case level operations.
//! - Apply paging policy before handing windows to `PagedQuery`.

pub mod member_service;
