//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist `{id, note, created_at}` records in the `secret_notes` table.
//! - Report affected-row counts for update/delete so callers can detect
//!   missing ids.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by SQLite, never by callers.
//! - Each contract method runs exactly one SQL statement.
//! - `find_all` returns rows ordered by `id ASC`.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

const NOTE_SELECT_SQL: &str = "SELECT id, note, created_at FROM secret_notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository failure for note persistence and queries.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("invalid persisted note data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for encrypted notes.
///
/// Implementations must be safe to call concurrently through `&self` when
/// they are shared across threads.
pub trait NoteRepository {
    /// Inserts one record holding `ciphertext` and returns it as stored.
    fn insert(&self, ciphertext: &str) -> RepoResult<Note>;
    /// Returns every stored record.
    fn find_all(&self) -> RepoResult<Vec<Note>>;
    /// Returns one record by id, or `None` when absent.
    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Replaces the ciphertext of one record; returns affected rows.
    fn update_by_id(&self, id: NoteId, ciphertext: &str) -> RepoResult<usize>;
    /// Deletes one record; returns affected rows.
    fn delete_by_id(&self, id: NoteId) -> RepoResult<usize>;
}

impl<R: NoteRepository + ?Sized> NoteRepository for &R {
    fn insert(&self, ciphertext: &str) -> RepoResult<Note> {
        (**self).insert(ciphertext)
    }

    fn find_all(&self) -> RepoResult<Vec<Note>> {
        (**self).find_all()
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        (**self).find_by_id(id)
    }

    fn update_by_id(&self, id: NoteId, ciphertext: &str) -> RepoResult<usize> {
        (**self).update_by_id(id, ciphertext)
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<usize> {
        (**self).delete_by_id(id)
    }
}

/// SQLite-backed note repository.
///
/// Owns its connection behind a mutex so one repository value can be shared
/// by concurrent callers.
pub struct SqliteNoteRepository {
    conn: Mutex<Connection>,
}

impl SqliteNoteRepository {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_note_table_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Returns the underlying connection, e.g. to inspect raw rows.
    pub fn into_inner(self) -> Connection {
        self.conn.into_inner()
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn insert(&self, ciphertext: &str) -> RepoResult<Note> {
        let conn = self.conn.lock();
        let note = conn.query_row(
            "INSERT INTO secret_notes (note) VALUES (?1)
             RETURNING id, note, created_at;",
            params![ciphertext],
            parse_note_row,
        )?;
        Ok(note)
    }

    fn find_all(&self) -> RepoResult<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let conn = self.conn.lock();
        let note = conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                params![id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn update_by_id(&self, id: NoteId, ciphertext: &str) -> RepoResult<usize> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE secret_notes SET note = ?2 WHERE id = ?1;",
            params![id, ciphertext],
        )?;
        Ok(changed)
    }

    fn delete_by_id(&self, id: NoteId) -> RepoResult<usize> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM secret_notes WHERE id = ?1;", params![id])?;
        Ok(changed)
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        note: row.get("note")?,
        created_at: row.get("created_at")?,
    })
}

fn ensure_note_table_ready(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'secret_notes'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::InvalidData(
            "missing required table `secret_notes`; run migrations first".to_string(),
        ));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(secret_notes);")?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    for required in ["id", "note", "created_at"] {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::InvalidData(format!(
                "missing required column `secret_notes.{required}`"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, RepoError, SqliteNoteRepository};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;

    fn repo() -> SqliteNoteRepository {
        SqliteNoteRepository::try_new(open_db_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn insert_assigns_increasing_ids_and_timestamp() {
        let repo = repo();
        let first = repo.insert("c1").unwrap();
        let second = repo.insert("c2").unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.note, "c1");
        assert!(first.created_at > 0);
    }

    #[test]
    fn update_and_delete_report_affected_rows() {
        let repo = repo();
        let note = repo.insert("c1").unwrap();
        assert_eq!(repo.update_by_id(note.id, "c2").unwrap(), 1);
        assert_eq!(repo.update_by_id(404, "c2").unwrap(), 0);
        assert_eq!(repo.delete_by_id(note.id).unwrap(), 1);
        assert_eq!(repo.delete_by_id(note.id).unwrap(), 0);
        assert!(repo.find_by_id(note.id).unwrap().is_none());
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let repo = repo();
        let first = repo.insert("c1").unwrap();
        repo.delete_by_id(first.id).unwrap();
        let second = repo.insert("c2").unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteRepository::try_new(conn)
            .err()
            .expect("unmigrated connection must be rejected");
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
