use rusqlite::Connection;
use secret_note_core::db::migrations::{latest_version, schema_version};
use secret_note_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "secret_notes");
}

#[test]
fn reopening_file_database_keeps_notes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("secret-notes.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO secret_notes (note) VALUES ('sealed');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM secret_notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn created_at_defaults_to_current_epoch_millis() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO secret_notes (note) VALUES ('sealed');", [])
        .unwrap();
    let created_at: i64 = conn
        .query_row("SELECT created_at FROM secret_notes;", [], |row| row.get(0))
        .unwrap();
    // 2020-01-01T00:00:00Z in milliseconds.
    assert!(created_at > 1_577_836_800_000);
    assert_eq!(created_at % 1000, 0);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
