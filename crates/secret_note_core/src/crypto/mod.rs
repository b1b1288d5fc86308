//! Note encryption transform.
//!
//! # Responsibility
//! - Turn note plaintext into self-contained ciphertext text and back.
//! - Hold the single static key as an injected value.
//!
//! # Invariants
//! - Both directions use the same key; there is no per-note derivation.
//! - Ciphertext never needs auxiliary state to be decrypted.

pub mod cipher;
