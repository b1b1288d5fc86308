//! Secret note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its listing projection.
//!
//! # Invariants
//! - `id` is repository-assigned and never reused for another note.
//! - `note` holds ciphertext whenever the record comes from storage.
//! - `created_at` is assigned by storage and never changes.

use serde::{Deserialize, Serialize};

/// Stable identifier of a stored note.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// One stored note.
///
/// `note` carries ciphertext as persisted, except for records returned by a
/// decrypting read, where it carries the recovered plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Repository-assigned positive id.
    pub id: NoteId,
    /// Ciphertext at rest, plaintext after a decrypting read.
    pub note: String,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
}

impl Note {
    /// Returns the listing projection of this note.
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            created_at: self.created_at,
        }
    }
}

/// Listing projection that carries identity and creation time only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: NoteId,
    pub created_at: i64,
}
