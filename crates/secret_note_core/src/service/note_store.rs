//! Encrypted note use-case service.
//!
//! # Responsibility
//! - Encrypt note content before persistence and decrypt it on demand.
//! - Provide create/list/get/update/remove over a `NoteRepository`.
//! - Classify every failure as validation, not-found, or storage.
//!
//! # Invariants
//! - Content is validated before any repository call.
//! - Each logical write issues at most one repository write.
//! - `NotFound` is never reclassified as a storage failure.
//! - Note content is never written to logs.

use crate::crypto::cipher::NoteCipher;
use crate::model::note::{Note, NoteId, NoteSummary};
use crate::repo::note_repo::NoteRepository;
use log::{error, info, warn};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use thiserror::Error;

/// Lifecycle operation named in storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl StoreOperation {
    /// Stable lowercase name used in messages and log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for StoreOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only error kinds that leave [`NoteStore`].
#[derive(Debug, Error)]
pub enum NoteStoreError {
    /// Caller-supplied content is empty.
    #[error("content required")]
    Validation,
    /// No note with this id exists.
    #[error("note {0} not found")]
    NotFound(NoteId),
    /// Unexpected repository or cipher failure.
    #[error("{operation} failed")]
    Storage {
        operation: StoreOperation,
        #[source]
        source: Box<dyn StdError + Send + Sync + 'static>,
    },
}

impl NoteStoreError {
    fn storage(
        operation: StoreOperation,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self::Storage {
            operation,
            source: source.into(),
        }
    }

    /// Short machine-readable code for transport layers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound(_) => "not_found",
            Self::Storage { .. } => "storage",
        }
    }
}

pub type NoteStoreResult<T> = Result<T, NoteStoreError>;

/// Note store over an injected repository and a fixed cipher.
pub struct NoteStore<R: NoteRepository> {
    repo: R,
    cipher: NoteCipher,
}

impl<R: NoteRepository> NoteStore<R> {
    /// Creates a store using the provided repository and cipher.
    pub fn new(repo: R, cipher: NoteCipher) -> Self {
        Self { repo, cipher }
    }

    /// Returns the repository handle.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Consumes the store and returns its repository.
    pub fn into_repository(self) -> R {
        self.repo
    }

    /// Encrypts and persists a new note.
    ///
    /// Returns the stored record in ciphertext form.
    pub fn create(&self, content: &str) -> NoteStoreResult<Note> {
        let started_at = Instant::now();
        require_content(StoreOperation::Create, content)?;

        let result = self
            .cipher
            .encrypt(content)
            .map_err(|err| NoteStoreError::storage(StoreOperation::Create, err))
            .and_then(|ciphertext| {
                self.repo
                    .insert(&ciphertext)
                    .map_err(|err| NoteStoreError::storage(StoreOperation::Create, err))
            });
        log_outcome(StoreOperation::Create, None, started_at, &result);
        result
    }

    /// Lists id and creation time of every note, ordered by id.
    pub fn list_all(&self) -> NoteStoreResult<Vec<NoteSummary>> {
        let started_at = Instant::now();
        let result = self
            .repo
            .find_all()
            .map(|notes| notes.iter().map(Note::summary).collect::<Vec<_>>())
            .map_err(|err| NoteStoreError::storage(StoreOperation::List, err));

        match &result {
            Ok(items) => info!(
                "event=note_list module=note_store status=ok count={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure(StoreOperation::List, None, started_at, err),
        }
        result
    }

    /// Gets one note, decrypting its content when `decrypt` is true.
    ///
    /// Decryption only affects the returned value; the stored ciphertext is
    /// left untouched.
    pub fn get_one(&self, id: NoteId, decrypt: bool) -> NoteStoreResult<Note> {
        let started_at = Instant::now();
        let result = self.read(id, decrypt);
        log_outcome(StoreOperation::Get, Some(id), started_at, &result);
        result
    }

    /// Gets one note with its plaintext content.
    pub fn get_decrypted(&self, id: NoteId) -> NoteStoreResult<Note> {
        self.get_one(id, true)
    }

    /// Gets one note with its stored ciphertext.
    pub fn get_encrypted(&self, id: NoteId) -> NoteStoreResult<Note> {
        self.get_one(id, false)
    }

    /// Replaces the full content of one note.
    ///
    /// Returns the record as re-read from storage, so the ciphertext is the
    /// one actually persisted.
    pub fn update(&self, id: NoteId, new_content: &str) -> NoteStoreResult<Note> {
        let started_at = Instant::now();
        require_content(StoreOperation::Update, new_content)?;

        let result = self.write_then_read(id, new_content);
        log_outcome(StoreOperation::Update, Some(id), started_at, &result);
        result
    }

    /// Deletes one note.
    pub fn remove(&self, id: NoteId) -> NoteStoreResult<()> {
        let started_at = Instant::now();
        let result = match self.repo.delete_by_id(id) {
            Ok(0) => Err(NoteStoreError::NotFound(id)),
            Ok(_) => Ok(()),
            Err(err) => Err(NoteStoreError::storage(StoreOperation::Delete, err)),
        };
        log_outcome(StoreOperation::Delete, Some(id), started_at, &result);
        result
    }

    fn read(&self, id: NoteId, decrypt: bool) -> NoteStoreResult<Note> {
        let mut note = self
            .repo
            .find_by_id(id)
            .map_err(|err| NoteStoreError::storage(StoreOperation::Get, err))?
            .ok_or(NoteStoreError::NotFound(id))?;

        if decrypt {
            note.note = self
                .cipher
                .decrypt(&note.note)
                .map_err(|err| NoteStoreError::storage(StoreOperation::Get, err))?;
        }
        Ok(note)
    }

    fn write_then_read(&self, id: NoteId, new_content: &str) -> NoteStoreResult<Note> {
        let ciphertext = self
            .cipher
            .encrypt(new_content)
            .map_err(|err| NoteStoreError::storage(StoreOperation::Update, err))?;

        match self.repo.update_by_id(id, &ciphertext) {
            Ok(0) => return Err(NoteStoreError::NotFound(id)),
            Ok(_) => {}
            Err(err) => return Err(NoteStoreError::storage(StoreOperation::Update, err)),
        }

        match self.read(id, false) {
            Ok(note) => Ok(note),
            Err(NoteStoreError::Storage { source, .. }) => Err(NoteStoreError::Storage {
                operation: StoreOperation::Update,
                source,
            }),
            Err(other) => Err(other),
        }
    }
}

fn require_content(operation: StoreOperation, content: &str) -> NoteStoreResult<()> {
    if content.is_empty() {
        warn!(
            "event=note_{} module=note_store status=rejected error_code=validation",
            operation
        );
        return Err(NoteStoreError::Validation);
    }
    Ok(())
}

fn log_outcome<T>(
    operation: StoreOperation,
    id: Option<NoteId>,
    started_at: Instant,
    result: &NoteStoreResult<T>,
) where
    T: NoteIdentity,
{
    match result {
        Ok(value) => info!(
            "event=note_{} module=note_store status=ok id={} duration_ms={}",
            operation,
            value.note_id().or(id).map_or_else(|| "-".to_string(), |v| v.to_string()),
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(operation, id, started_at, err),
    }
}

fn log_failure(
    operation: StoreOperation,
    id: Option<NoteId>,
    started_at: Instant,
    err: &NoteStoreError,
) {
    let id = id.map_or_else(|| "-".to_string(), |v| v.to_string());
    match err {
        NoteStoreError::Storage { source, .. } => error!(
            "event=note_{} module=note_store status=error id={} duration_ms={} error_code={} cause={}",
            operation,
            id,
            started_at.elapsed().as_millis(),
            err.code(),
            source
        ),
        _ => warn!(
            "event=note_{} module=note_store status=error id={} duration_ms={} error_code={}",
            operation,
            id,
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}

/// Id carried by a successful operation result, when it has one.
trait NoteIdentity {
    fn note_id(&self) -> Option<NoteId>;
}

impl NoteIdentity for Note {
    fn note_id(&self) -> Option<NoteId> {
        Some(self.id)
    }
}

impl NoteIdentity for () {
    fn note_id(&self) -> Option<NoteId> {
        None
    }
}
