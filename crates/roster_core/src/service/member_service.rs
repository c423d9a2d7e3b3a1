//! Member use-case service.
//!
//! # Responsibility
//! - Register members against existing teams.
//! - Serve paged member lists and paged member views.
//!
//! # Invariants
//! - Paged reads resolve team names in the same joined statement as the
//!   page slice; no per-member or per-page team lookup follows.
//! - Limits are resolved through `PagingConfig` before validation, so
//!   explicit zero or negative limits are still rejected.

use crate::config::PagingConfig;
use crate::model::member::{Member, MemberField, MemberProbe, MemberView, NewMember};
use crate::model::team::{Team, TeamId};
use crate::query::{Filter, Page, PageError, PagedQuery, SortSpec};
use crate::repo::member_repo::MemberStore;
use crate::repo::team_repo::TeamRepository;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Paged read rejected its window or the store failed.
    Page(PageError<RepoError>),
    Repo(RepoError),
    /// Member references a team that does not exist.
    TeamNotFound(TeamId),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::TeamNotFound(id) => write!(f, "team not found: {id}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Page(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TeamNotFound(_) => None,
        }
    }
}

impl From<PageError<RepoError>> for ServiceError {
    fn from(value: PageError<RepoError>) -> Self {
        Self::Page(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Member service facade over member and team repositories.
pub struct MemberService<M: MemberStore, T: TeamRepository> {
    members: M,
    teams: T,
    paging: PagingConfig,
}

impl<M: MemberStore, T: TeamRepository> MemberService<M, T> {
    pub fn new(members: M, teams: T) -> Self {
        Self::with_paging(members, teams, PagingConfig::default())
    }

    pub fn with_paging(members: M, teams: T, paging: PagingConfig) -> Self {
        Self {
            members,
            teams,
            paging,
        }
    }

    pub fn members(&self) -> &M {
        &self.members
    }

    pub fn teams(&self) -> &T {
        &self.teams
    }

    pub fn create_team(&self, name: &str) -> ServiceResult<Team> {
        Ok(self.teams.create(name)?)
    }

    /// Persists a new member after checking its team exists.
    pub fn register(&self, member: NewMember) -> ServiceResult<Member> {
        if let Some(team_id) = member.team_id {
            if self.teams.find_by_id(team_id)?.is_none() {
                return Err(ServiceError::TeamNotFound(team_id));
            }
        }
        Ok(self.members.save(&member)?)
    }

    /// One page of members matching `filter`, with team names.
    ///
    /// `limit = None` uses the configured default; larger limits clamp to
    /// the configured maximum.
    pub fn page_views(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
        offset: i64,
        limit: Option<i64>,
    ) -> ServiceResult<Page<MemberView>> {
        let limit = self.paging.resolve_limit(limit);
        let paged = PagedQuery::new(&self.members);
        Ok(paged.fetch(filter, sort, offset, limit)?)
    }

    /// Same window as [`MemberService::page_views`], without team names.
    pub fn page_members(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
        offset: i64,
        limit: Option<i64>,
    ) -> ServiceResult<Page<Member>> {
        Ok(self
            .page_views(filter, sort, offset, limit)?
            .map(MemberView::into_member))
    }

    pub fn find_by_example(&self, probe: &MemberProbe) -> ServiceResult<Vec<Member>> {
        Ok(self.members.find_by_example(probe)?)
    }

    /// Adds one year to every member aged `min_age` or older.
    pub fn bulk_age_plus(&self, min_age: i32) -> ServiceResult<usize> {
        Ok(self.members.bulk_age_plus(min_age)?)
    }
}
