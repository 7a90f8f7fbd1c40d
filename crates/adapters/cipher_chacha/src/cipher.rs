//! XChaCha20-Poly1305 implementation of [`TokenCipher`].

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use myhouse_app::ports::TokenCipher;
use myhouse_domain::error::CipherError;

use crate::error::CipherAdapterError;

const NONCE_LEN: usize = 24;
const KEY_SALT: &[u8] = b"myhouse-token-key";

/// 256-bit key, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
struct SecretKey([u8; 32]);

/// Randomised token cipher. Every call to `encrypt` draws a fresh 192-bit
/// nonce, so equal tokens never produce equal ciphertexts.
#[derive(Clone)]
pub struct ChaChaTokenCipher {
    key: SecretKey,
}

impl ChaChaTokenCipher {
    /// Derive the key as `SHA-256(salt || passphrase)`.
    #[must_use]
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(KEY_SALT);
        hasher.update(passphrase.as_bytes());
        Self {
            key: SecretKey(hasher.finalize().into()),
        }
    }

    fn aead(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.key.0).into())
    }

    fn open(&self, ciphertext: &str) -> Result<String, CipherAdapterError> {
        let (nonce_hex, body_hex) = ciphertext
            .split_once(':')
            .ok_or(CipherAdapterError::MissingSeparator)?;
        let nonce = hex::decode(nonce_hex)?;
        if nonce.len() != NONCE_LEN {
            return Err(CipherAdapterError::NonceLength {
                expected: NONCE_LEN,
                actual: nonce.len(),
            });
        }
        let body = hex::decode(body_hex)?;
        let plaintext = self
            .aead()
            .decrypt(XNonce::from_slice(&nonce), body.as_slice())
            .map_err(|_| CipherAdapterError::Aead)?;
        Ok(String::from_utf8(plaintext)?)
    }
}

impl std::fmt::Debug for ChaChaTokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaChaTokenCipher").finish_non_exhaustive()
    }
}

impl TokenCipher for ChaChaTokenCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        let body = self
            .aead()
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CipherAdapterError::Aead)?;
        Ok(format!("{}:{}", hex::encode(nonce), hex::encode(body)))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        Ok(self.open(ciphertext)?)
    }
}
