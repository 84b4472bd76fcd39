use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};

use crate::error::ApiError;

const NONCE_LEN: usize = 12;

/// Symmetric cipher for provider access tokens at rest. Wire format is
/// base64(nonce || ciphertext), one random nonce per encryption.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: ChaCha20Poly1305,
}

impl TokenCipher {
    /// Key is 32 bytes, base64-encoded (the `TOKEN_ENCRYPTION_KEY` env var).
    pub fn from_base64_key(encoded: &str) -> Result<Self, ApiError> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| ApiError::Crypto(format!("Key is not valid base64: {}", e)))?;
        if bytes.len() != 32 {
            return Err(ApiError::Crypto(format!(
                "Key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&bytes)),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, ApiError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| ApiError::Crypto("Token encryption failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(out))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String, ApiError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| ApiError::Crypto(format!("Stored token is not valid base64: {}", e)))?;
        if bytes.len() <= NONCE_LEN {
            return Err(ApiError::Crypto("Stored token is truncated".to_string()));
        }

        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| ApiError::Crypto("Token decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|_| ApiError::Crypto("Decrypted token is not UTF-8".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> TokenCipher {
        TokenCipher::from_base64_key(&BASE64.encode([7u8; 32])).unwrap()
    }

    #[test]
    fn round_trip_recovers_the_token() {
        let c = cipher();
        let encrypted = c.encrypt("shpat_abc123").unwrap();
        assert_ne!(encrypted, "shpat_abc123");
        assert_eq!(c.decrypt(&encrypted).unwrap(), "shpat_abc123");
    }

    #[test]
    fn each_encryption_uses_a_fresh_nonce() {
        let c = cipher();
        assert_ne!(c.encrypt("tok").unwrap(), c.encrypt("tok").unwrap());
    }

    #[test]
    fn tampered_ciphertext_is_rejected() {
        let c = cipher();
        let mut bytes = BASE64.decode(c.encrypt("sk_live_xyz").unwrap()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(c.decrypt(&BASE64.encode(bytes)).is_err());
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(TokenCipher::from_base64_key(&BASE64.encode([1u8; 16])).is_err());
    }
}
