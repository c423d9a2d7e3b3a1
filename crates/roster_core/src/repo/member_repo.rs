//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide member CRUD, filtered reads, join reads and bulk updates.
//! - Serve as the `RecordStore` behind paged member reads. Its records are
//!   `MemberView`s, so every `MemberField` (team name included) is answered
//!   by the record the store returns.
//!
//! # Invariants
//! - Every read orders by `m.id ASC` after the caller's ordering.
//! - Joined reads fetch the team name in the same statement.
//! - Paged slice and count run inside one read transaction when the
//!   connection is not already inside a transaction.

use crate::model::member::{Member, MemberField, MemberId, MemberProbe, MemberView, NewMember};
use crate::model::team::TeamId;
use crate::query::{Filter, RecordStore, SortSpec};
use crate::repo::sql::{order_clause, where_clause, window_bound};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};

const MEMBER_COLUMNS_SQL: &str =
    "m.id AS id, m.username AS username, m.age AS age, m.team_id AS team_id";
const MEMBER_VIEW_COLUMNS_SQL: &str =
    "m.id AS id, m.username AS username, m.age AS age, m.team_id AS team_id, t.name AS team_name";
const MEMBER_FROM_SQL: &str = "FROM members m LEFT JOIN teams t ON t.id = m.team_id";

/// Repository interface for member persistence.
pub trait MemberRepository {
    /// Inserts a member and returns it with its assigned id.
    fn save(&self, member: &NewMember) -> RepoResult<Member>;
    /// Replaces username, age and team of an existing member.
    fn update(&self, member: &Member) -> RepoResult<()>;
    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn delete(&self, id: MemberId) -> RepoResult<()>;
    fn count_all(&self) -> RepoResult<u64>;
    /// All members matching `filter`, ordered by `sort` then id.
    fn find_all(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
    ) -> RepoResult<Vec<Member>>;
    /// Usernames of every member in id order.
    fn find_usernames(&self) -> RepoResult<Vec<String>>;
    /// Members joined with their team names; team-less members included.
    fn find_views(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
    ) -> RepoResult<Vec<MemberView>>;
    /// Adds one year to every member aged `min_age` or older.
    ///
    /// Members already at `i32::MAX` are left unchanged. Returns the number
    /// of updated rows.
    fn bulk_age_plus(&self, min_age: i32) -> RepoResult<usize>;
    fn assign_team(&self, id: MemberId, team_id: Option<TeamId>) -> RepoResult<()>;

    /// Members equal to `probe` on every field the probe sets.
    fn find_by_example(&self, probe: &MemberProbe) -> RepoResult<Vec<Member>> {
        self.find_all(&probe.to_filter(), &SortSpec::asc(MemberField::Id))
    }
}

/// Member repository usable for paged reads.
pub trait MemberStore:
    MemberRepository + RecordStore<Record = MemberView, Field = MemberField, Error = RepoError>
{
}

impl<T> MemberStore for T where
    T: MemberRepository + RecordStore<Record = MemberView, Field = MemberField, Error = RepoError>
{
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Wraps a connection returned by `open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn select<T>(
        &self,
        columns: &str,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
        window: Option<(u64, u64)>,
        parse: fn(&Row<'_>) -> RepoResult<T>,
    ) -> RepoResult<Vec<T>> {
        let mut binds: Vec<SqlValue> = Vec::new();
        let mut sql = format!(
            "SELECT {columns} {MEMBER_FROM_SQL} WHERE {}",
            where_clause(filter, &mut binds)
        );
        sql.push_str(&order_clause(&sort.clone().with_tiebreak(MemberField::Id)));

        if let Some((offset, limit)) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(window_bound(limit));
            binds.push(window_bound(offset));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn save(&self, member: &NewMember) -> RepoResult<Member> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO members (username, age, team_id) VALUES (?1, ?2, ?3);",
            params![
                member.username.as_str(),
                member.age,
                member.team_id.map(|id| id.0),
            ],
        )?;

        Ok(member
            .clone()
            .into_member(MemberId(self.conn.last_insert_rowid())))
    }

    fn update(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                username = ?1,
                age = ?2,
                team_id = ?3
             WHERE id = ?4;",
            params![
                member.username.as_str(),
                member.age,
                member.team_id.map(|id| id.0),
                member.id.0,
            ],
        )?;

        if changed == 0 {
            return Err(member_not_found(member.id));
        }
        Ok(())
    }

    fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let found = self.select(
            MEMBER_COLUMNS_SQL,
            &Filter::eq(MemberField::Id, id.0),
            &SortSpec::unsorted(),
            None,
            parse_member_row,
        )?;
        Ok(found.into_iter().next())
    }

    fn delete(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", [id.0])?;
        if changed == 0 {
            return Err(member_not_found(id));
        }
        Ok(())
    }

    fn count_all(&self) -> RepoResult<u64> {
        self.count(&Filter::All)
    }

    fn find_all(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
    ) -> RepoResult<Vec<Member>> {
        self.select(MEMBER_COLUMNS_SQL, filter, sort, None, parse_member_row)
    }

    fn find_usernames(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username FROM members ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut usernames = Vec::new();
        while let Some(row) = rows.next()? {
            usernames.push(row.get(0)?);
        }
        Ok(usernames)
    }

    fn find_views(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
    ) -> RepoResult<Vec<MemberView>> {
        self.select(MEMBER_VIEW_COLUMNS_SQL, filter, sort, None, parse_member_view_row)
    }

    fn bulk_age_plus(&self, min_age: i32) -> RepoResult<usize> {
        let updated = self.conn.execute(
            "UPDATE members SET age = age + 1 WHERE age >= ?1 AND age < ?2;",
            [min_age, i32::MAX],
        )?;
        info!("event=member_bulk_age_plus module=repo status=ok min_age={min_age} updated={updated}");
        Ok(updated)
    }

    fn assign_team(&self, id: MemberId, team_id: Option<TeamId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET team_id = ?1 WHERE id = ?2;",
            params![team_id.map(|team| team.0), id.0],
        )?;
        if changed == 0 {
            return Err(member_not_found(id));
        }
        Ok(())
    }
}

impl RecordStore for SqliteMemberRepository<'_> {
    type Record = MemberView;
    type Field = MemberField;
    type Error = RepoError;

    fn primary_key(&self) -> MemberField {
        MemberField::Id
    }

    fn query(
        &self,
        filter: &Filter<MemberField>,
        sort: &SortSpec<MemberField>,
        offset: u64,
        limit: u64,
    ) -> RepoResult<Vec<MemberView>> {
        self.select(
            MEMBER_VIEW_COLUMNS_SQL,
            filter,
            sort,
            Some((offset, limit)),
            parse_member_view_row,
        )
    }

    fn count(&self, filter: &Filter<MemberField>) -> RepoResult<u64> {
        let mut binds: Vec<SqlValue> = Vec::new();
        let sql = format!(
            "SELECT COUNT(*) {MEMBER_FROM_SQL} WHERE {};",
            where_clause(filter, &mut binds)
        );
        let total: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative member count `{total}`")))
    }

    fn snapshot<T>(
        &self,
        read: impl FnOnce(&Self) -> Result<T, Self::Error>,
    ) -> Result<T, Self::Error> {
        // Already inside a caller's transaction: that one bounds the snapshot.
        if !self.conn.is_autocommit() {
            return read(self);
        }
        let tx = self.conn.unchecked_transaction()?;
        let value = read(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn member_not_found(id: MemberId) -> RepoError {
    RepoError::NotFound {
        entity: "member",
        id: id.0,
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let member = Member {
        id: MemberId(row.get("id")?),
        username: row.get("username")?,
        age: row.get("age")?,
        team_id: row.get::<_, Option<i64>>("team_id")?.map(TeamId),
    };
    member.validate().map_err(|err| {
        RepoError::InvalidData(format!("member {} violates model: {err}", member.id))
    })?;
    Ok(member)
}

fn parse_member_view_row(row: &Row<'_>) -> RepoResult<MemberView> {
    let team_name: Option<String> = row.get("team_name")?;
    Ok(MemberView::from_member(parse_member_row(row)?, team_name))
}
