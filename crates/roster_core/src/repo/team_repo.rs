//! Team repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Team names are validated before insert.
//! - Deleting a team detaches its members (`team_id` becomes NULL).

use crate::model::team::{validate_team_name, Team, TeamId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::BTreeSet;

/// Repository interface for team persistence.
pub trait TeamRepository {
    fn create(&self, name: &str) -> RepoResult<Team>;
    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>>;
    /// Lowest-id team with exactly this name.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Team>>;
    /// Teams for all distinct `ids` in one statement, in id order.
    /// Unknown ids are skipped.
    fn find_by_ids(&self, ids: &[TeamId]) -> RepoResult<Vec<Team>>;
    fn list(&self) -> RepoResult<Vec<Team>>;
    fn delete(&self, id: TeamId) -> RepoResult<()>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_teams(&self, sql: &str, binds: Vec<SqlValue>) -> RepoResult<Vec<Team>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut teams = Vec::new();
        while let Some(row) = rows.next()? {
            teams.push(parse_team_row(row)?);
        }
        Ok(teams)
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn create(&self, name: &str) -> RepoResult<Team> {
        validate_team_name(name)?;
        self.conn
            .execute("INSERT INTO teams (name) VALUES (?1);", [name])?;
        Ok(Team {
            id: TeamId(self.conn.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    fn find_by_id(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let teams = self.query_teams(
            "SELECT id, name FROM teams WHERE id = ?;",
            vec![SqlValue::Integer(id.0)],
        )?;
        Ok(teams.into_iter().next())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Team>> {
        let teams = self.query_teams(
            "SELECT id, name FROM teams WHERE name = ? ORDER BY id ASC LIMIT 1;",
            vec![SqlValue::Text(name.to_string())],
        )?;
        Ok(teams.into_iter().next())
    }

    fn find_by_ids(&self, ids: &[TeamId]) -> RepoResult<Vec<Team>> {
        let unique: BTreeSet<i64> = ids.iter().map(|id| id.0).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; unique.len()].join(", ");
        let sql = format!("SELECT id, name FROM teams WHERE id IN ({placeholders}) ORDER BY id ASC;");
        self.query_teams(&sql, unique.into_iter().map(SqlValue::Integer).collect())
    }

    fn list(&self) -> RepoResult<Vec<Team>> {
        self.query_teams("SELECT id, name FROM teams ORDER BY id ASC;", Vec::new())
    }

    fn delete(&self, id: TeamId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM teams WHERE id = ?1;", [id.0])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "team",
                id: id.0,
            });
        }
        Ok(())
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    let team = Team {
        id: TeamId(row.get("id")?),
        name: row.get("name")?,
    };
    team.validate()
        .map_err(|err| RepoError::InvalidData(format!("team {} violates model: {err}", team.id)))?;
    Ok(team)
}
