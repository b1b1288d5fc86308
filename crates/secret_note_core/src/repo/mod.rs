//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note persistence contract consumed by the store.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories persist opaque ciphertext and never see plaintext.
//! - Updates and deletes report affected-row counts instead of not-found
//!   errors; the service layer classifies zero counts.

pub mod note_repo;
