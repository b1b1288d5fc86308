//! AES-256-GCM note cipher.
//!
//! # Responsibility
//! - Derive the static AES-256 key from the configured passphrase.
//! - Encrypt note text into base64 `nonce || ciphertext || tag`.
//! - Reject ciphertext produced by another key or damaged at rest.
//!
//! # Invariants
//! - Every `encrypt` call draws a fresh random nonce.
//! - Key bytes are zeroized on drop and never printed.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// Size of the GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

const KEY_DERIVATION_SALT: &[u8] = b"secret-note/static-key/v1";
const KEY_DERIVATION_INFO: &[u8] = b"secret-note-aes256gcm";

/// Errors raised by the note cipher.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption key must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },
    #[error("key derivation failed")]
    KeyDerivation,
    #[error("encryption failed")]
    Encryption,
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("ciphertext is truncated: {len} bytes")]
    Truncated { len: usize },
    #[error("ciphertext failed authentication")]
    Authentication,
    #[error("decrypted note is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type CipherResult<T> = Result<T, CipherError>;

/// Static AES-256 key shared by every note.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey {
    bytes: [u8; KEY_SIZE],
}

impl EncryptionKey {
    /// Derives the key from a passphrase using HKDF-SHA256.
    ///
    /// The salt is a fixed application constant, so the same passphrase
    /// always yields the same key across processes.
    ///
    /// HKDF does no key stretching. The passphrase must already be a
    /// high-entropy secret (for example 32 random bytes, base64 encoded),
    /// not a memorable password.
    pub fn from_passphrase(passphrase: &str) -> CipherResult<Self> {
        let hk = Hkdf::<Sha256>::new(Some(KEY_DERIVATION_SALT), passphrase.as_bytes());
        let mut okm = [0u8; KEY_SIZE];
        hk.expand(KEY_DERIVATION_INFO, &mut okm)
            .map_err(|_| CipherError::KeyDerivation)?;
        let key = Self::from_bytes(&okm);
        okm.zeroize();
        key
    }

    /// Creates a key from exactly 32 raw bytes.
    pub(crate) fn from_bytes(bytes: &[u8]) -> CipherResult<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CipherError::InvalidKeySize {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);
        Ok(Self { bytes: key_bytes })
    }

    fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Symmetric transform applied to note text before persistence.
#[derive(Clone)]
pub struct NoteCipher {
    cipher: Aes256Gcm,
}

impl NoteCipher {
    /// Creates a cipher bound to `key`.
    pub fn new(key: EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(GenericArray::from_slice(key.as_bytes()));
        Self { cipher }
    }

    /// Encrypts `plaintext` into base64 text with the nonce embedded.
    pub fn encrypt(&self, plaintext: &str) -> CipherResult<String> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + sealed.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend(sealed);
        Ok(STANDARD.encode(framed))
    }

    /// Decrypts text produced by [`encrypt`](Self::encrypt) under the same key.
    ///
    /// # Errors
    /// - `Encoding` when the text is not base64.
    /// - `Truncated` when the payload cannot hold a nonce and a tag.
    /// - `Authentication` for a different key or tampered payload.
    /// - `Utf8` when the recovered bytes are not text.
    pub fn decrypt(&self, ciphertext: &str) -> CipherResult<String> {
        let framed = STANDARD.decode(ciphertext.trim())?;
        if framed.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CipherError::Truncated { len: framed.len() });
        }

        let (nonce_bytes, sealed) = framed.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| CipherError::Authentication)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

impl std::fmt::Debug for NoteCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteCipher").finish_non_exhaustive()
    }
}
