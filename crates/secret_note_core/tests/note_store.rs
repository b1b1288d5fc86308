use rusqlite::params;
use secret_note_core::db::open_db_in_memory;
use secret_note_core::{
    EncryptionKey, NoteCipher, NoteRepository, NoteStore, NoteStoreError, SqliteNoteRepository,
    StoreOperation,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn cipher(passphrase: &str) -> NoteCipher {
    NoteCipher::new(EncryptionKey::from_passphrase(passphrase).unwrap())
}

fn store() -> NoteStore<SqliteNoteRepository> {
    let repo = SqliteNoteRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    NoteStore::new(repo, cipher("secret_key"))
}

fn stored_column(store: &NoteStore<SqliteNoteRepository>, id: i64) -> String {
    store.repository().find_by_id(id).unwrap().unwrap().note
}

#[test]
fn create_then_read_both_forms() {
    let store = store();

    let created = store.create("hello").unwrap();
    assert_eq!(created.id, 1);
    assert_ne!(created.note, "hello");
    assert!(created.created_at > 0);

    let decrypted = store.get_one(1, true).unwrap();
    assert_eq!(decrypted.note, "hello");
    assert_eq!(decrypted.created_at, created.created_at);

    let encrypted = store.get_one(1, false).unwrap();
    assert_eq!(encrypted.note, created.note);
}

#[test]
fn decrypting_read_leaves_stored_ciphertext_untouched() {
    let store = store();
    let created = store.create("keep me sealed").unwrap();

    store.get_decrypted(created.id).unwrap();
    assert_eq!(stored_column(&store, created.id), created.note);
}

#[test]
fn repeated_encrypted_reads_are_identical() {
    let store = store();
    let created = store.create("stable").unwrap();

    let first = store.get_encrypted(created.id).unwrap();
    let second = store.get_encrypted(created.id).unwrap();
    assert_eq!(first, second);
}

#[test]
fn update_on_missing_id_is_not_found() {
    let store = store();
    let err = store.update(99, "x").unwrap_err();
    assert!(matches!(err, NoteStoreError::NotFound(99)));
}

#[test]
fn removed_note_is_not_found() {
    let store = store();
    let created = store.create("a").unwrap();
    assert_eq!(created.id, 1);

    store.remove(1).unwrap();
    let err = store.get_one(1, true).unwrap_err();
    assert!(matches!(err, NoteStoreError::NotFound(1)));

    let again = store.remove(1).unwrap_err();
    assert!(matches!(again, NoteStoreError::NotFound(1)));
}

#[test]
fn update_returns_the_ciphertext_actually_stored() {
    let store = store();
    let created = store.create("first draft").unwrap();

    let updated = store.update(created.id, "second draft").unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_ne!(updated.note, created.note);
    assert_ne!(updated.note, "second draft");
    assert_eq!(updated.note, stored_column(&store, created.id));
    assert_eq!(store.get_decrypted(created.id).unwrap().note, "second draft");
}

#[test]
fn empty_content_is_rejected() {
    let store = store();
    let created = store.create("x").unwrap();

    assert!(matches!(store.create(""), Err(NoteStoreError::Validation)));
    assert!(matches!(
        store.update(created.id, ""),
        Err(NoteStoreError::Validation)
    ));
    assert_eq!(store.get_decrypted(created.id).unwrap().note, "x");
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn whitespace_content_is_accepted() {
    let store = store();
    let created = store.create("   ").unwrap();
    assert_eq!(store.get_decrypted(created.id).unwrap().note, "   ");
}

#[test]
fn list_exposes_only_id_and_created_at_in_id_order() {
    let store = store();
    let first = store.create("one").unwrap();
    let second = store.create("two").unwrap();
    store.create("three").unwrap();
    store.remove(second.id).unwrap();

    let listed = store.list_all().unwrap();
    let ids: Vec<i64> = listed.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(listed[0].created_at, first.created_at);

    let json = serde_json::to_value(&listed).unwrap();
    for item in json.as_array().unwrap() {
        let keys: BTreeSet<&str> = item
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, BTreeSet::from(["createdAt", "id"]));
    }
}

#[test]
fn ciphertext_at_rest_never_equals_plaintext() {
    let store = store();
    let plaintext = "meet at the usual place";
    let created = store.create(plaintext).unwrap();

    let raw = store.repository().find_by_id(created.id).unwrap().unwrap();
    assert_ne!(raw.note, plaintext);
    assert!(!raw.note.contains("usual"));
    assert_eq!(cipher("secret_key").decrypt(&raw.note).unwrap(), plaintext);
}

#[test]
fn decrypt_under_other_key_is_a_get_storage_failure() {
    let repo = SqliteNoteRepository::try_new(open_db_in_memory().unwrap()).unwrap();
    let writer = NoteStore::new(&repo, cipher("secret_key"));
    let created = writer.create("hello").unwrap();

    let reader = NoteStore::new(&repo, cipher("another_key"));
    let err = reader.get_one(created.id, true).unwrap_err();
    assert!(matches!(
        err,
        NoteStoreError::Storage {
            operation: StoreOperation::Get,
            ..
        }
    ));
    assert_eq!(reader.get_one(created.id, false).unwrap().note, created.note);
}

#[test]
fn corrupted_column_is_a_get_storage_failure() {
    let store = store();
    let created = store.create("hello").unwrap();
    let conn = store.into_repository().into_inner();
    conn.execute(
        "UPDATE secret_notes SET note = 'plain text' WHERE id = ?1;",
        params![created.id],
    )
    .unwrap();

    let store = NoteStore::new(SqliteNoteRepository::try_new(conn).unwrap(), cipher("secret_key"));
    let err = store.get_decrypted(created.id).unwrap_err();
    assert_eq!(err.to_string(), "get failed");
}

#[test]
fn concurrent_creates_get_distinct_ids() {
    let store = Arc::new(store());
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                (0..5)
                    .map(|idx| store.create(&format!("worker {worker} note {idx}")).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "id {id} assigned twice");
        }
    }
    assert_eq!(ids.len(), 40);
    for id in ids {
        assert!(store.get_decrypted(id).unwrap().note.starts_with("worker "));
    }
}
