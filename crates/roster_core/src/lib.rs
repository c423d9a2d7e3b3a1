//! Core of the roster store: members, teams and paged reads over SQLite.
//! Business invariants live here; binaries only wire them up.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, PagingConfig, StoreConfig};
pub use logging::{init_logging, logging_status, LogLevel};
pub use model::member::{Member, MemberField, MemberId, MemberProbe, MemberView, NewMember};
pub use model::team::{Team, TeamId};
pub use model::validation::ValidationError;
pub use query::{
    Direction, FieldSource, Filter, InvalidPageArgument, Page, PageError, PageRequest,
    PageResult, PagedQuery, RecordStore, SortOrder, SortSpec, Value, VecStore,
};
pub use repo::member_repo::{MemberRepository, MemberStore, SqliteMemberRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{RepoError, RepoResult};
pub use service::member_service::{MemberService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
