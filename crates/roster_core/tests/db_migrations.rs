use roster_core::config::StoreConfig;
use roster_core::db::migrations::latest_version;
use roster_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use rusqlite::Connection;

#[test]
fn in_memory_open_creates_roster_schema() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert!(table_exists(&conn, "teams"));
    assert!(table_exists(&conn, "members"));
    assert!(index_exists(&conn, "idx_members_username"));
}

#[test]
fn schema_v1_carries_member_and_team_indexes() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(latest_version(), 1);
    for index in [
        "idx_members_username",
        "idx_members_age",
        "idx_members_team_id",
        "idx_teams_name",
    ] {
        assert!(index_exists(&conn, index), "missing index {index}");
    }
}

#[test]
fn reopening_file_database_keeps_version_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.db");

    let conn = open_db(&path).unwrap();
    conn.execute("INSERT INTO teams (name) VALUES ('TeamA');", [])
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let teams: i64 = conn
        .query_row("SELECT COUNT(*) FROM teams;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(teams, 1);
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_selects_file_or_memory_and_enables_foreign_keys() {
    let dir = tempfile::tempdir().unwrap();
    let file_config = StoreConfig {
        path: Some(dir.path().join("configured.db")),
        busy_timeout_ms: 250,
    };

    let file_conn = open_db_with_config(&file_config).unwrap();
    assert!(dir.path().join("configured.db").exists());
    assert_eq!(foreign_keys(&file_conn), 1);

    let memory_conn = open_db_with_config(&StoreConfig::default()).unwrap();
    assert_eq!(user_version(&memory_conn), latest_version());
    assert_eq!(foreign_keys(&memory_conn), 1);
}

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn foreign_keys(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    schema_object_exists(conn, "table", name)
}

fn index_exists(conn: &Connection, name: &str) -> bool {
    schema_object_exists(conn, "index", name)
}

fn schema_object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2);",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
