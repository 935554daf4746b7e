use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    AeadCore, Aes256Gcm, Nonce,
};

use crate::provider::LlmError;

/// Encryption service for provider API keys stored in the database
#[derive(Clone)]
pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    /// Create from a 64-character hex key
    pub fn new(key: &str) -> Result<Self, LlmError> {
        let key_bytes = hex::decode(key).or(Err(LlmError::EncryptionError))?;
        let cipher =
            Aes256Gcm::new_from_slice(&key_bytes).map_err(|_| LlmError::EncryptionError)?;
        Ok(Self { cipher })
    }

    /// Encrypt the string, returning the ciphertext and the generated nonce
    pub fn encrypt_string(&self, plaintext: &str) -> Result<(Vec<u8>, Vec<u8>), LlmError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| LlmError::EncryptionError)?;

        Ok((ciphertext, nonce.to_vec()))
    }

    pub fn decrypt_string(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<String, LlmError> {
        if nonce.len() != 12 {
            return Err(LlmError::DecryptionError);
        }
        let nonce = Nonce::from_slice(nonce);
        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| LlmError::DecryptionError)?;

        String::from_utf8(plaintext).map_err(|_| LlmError::DecryptionError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn decrypts_what_it_encrypts() {
        let encryptor = Encryptor::new(KEY).unwrap();
        let (ciphertext, nonce) = encryptor.encrypt_string("sk-test-123").unwrap();

        assert_ne!(ciphertext, b"sk-test-123");
        assert_eq!(
            encryptor.decrypt_string(&ciphertext, &nonce).unwrap(),
            "sk-test-123"
        );
    }

    #[test]
    fn rejects_short_keys() {
        assert!(matches!(
            Encryptor::new("abcd"),
            Err(LlmError::EncryptionError)
        ));
    }

    #[test]
    fn fails_with_another_key() {
        let (ciphertext, nonce) = Encryptor::new(KEY)
            .unwrap()
            .encrypt_string("secret")
            .unwrap();
        let other = Encryptor::new(&"ff".repeat(32)).unwrap();

        assert!(matches!(
            other.decrypt_string(&ciphertext, &nonce),
            Err(LlmError::DecryptionError)
        ));
    }
}
