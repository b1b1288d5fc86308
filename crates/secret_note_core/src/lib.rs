//! Core domain logic for the secret note store.
//! Notes are encrypted before they reach storage and decrypted on demand.

pub mod config;
pub mod crypto;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use crypto::cipher::{CipherError, EncryptionKey, NoteCipher};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteId, NoteSummary};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_store::{NoteStore, NoteStoreError, NoteStoreResult, StoreOperation};

/// Opens the configured SQLite database and builds a store over it.
pub fn open_store(config: &StoreConfig) -> Result<NoteStore<SqliteNoteRepository>, OpenError> {
    let cipher = NoteCipher::new(config.encryption_key()?);
    let conn = db::open_db(&config.database_path)?;
    let repo = SqliteNoteRepository::try_new(conn)?;
    Ok(NoteStore::new(repo, cipher))
}

/// Failure while assembling a store from configuration.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open database: {0}")]
    Db(#[from] db::DbError),
    #[error("database is not usable: {0}")]
    Repo(#[from] RepoError),
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
