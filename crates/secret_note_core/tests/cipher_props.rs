use proptest::prelude::*;
use secret_note_core::{EncryptionKey, NoteCipher};

fn cipher(passphrase: &str) -> NoteCipher {
    NoteCipher::new(EncryptionKey::from_passphrase(passphrase).unwrap())
}

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(text in ".{1,256}") {
        let cipher = cipher("secret_key");
        let sealed = cipher.encrypt(&text).unwrap();
        prop_assert_eq!(cipher.decrypt(&sealed).unwrap(), text);
    }

    #[test]
    fn ciphertext_differs_from_plaintext(text in "[a-zA-Z0-9 ]{1,128}") {
        let sealed = cipher("secret_key").encrypt(&text).unwrap();
        prop_assert_ne!(sealed, text);
    }

    #[test]
    fn any_passphrase_round_trips(passphrase in ".{0,64}", text in ".{1,64}") {
        let cipher = cipher(&passphrase);
        let sealed = cipher.encrypt(&text).unwrap();
        prop_assert_eq!(cipher.decrypt(&sealed).unwrap(), text);
    }
}
