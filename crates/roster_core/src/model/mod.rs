//! Roster domain model: teams, members and their eager read views.
//!
//! # Responsibility
//! - Define the records persisted by the roster store.
//! - Define explicit DTOs for joined reads, so no association is ever
//!   loaded lazily behind the caller's back.
//!
//! # Invariants
//! - Ids are assigned by the store and never reused.
//! - Records are plain values; every mutation is an explicit store call.

pub mod member;
pub mod team;
pub mod validation;
