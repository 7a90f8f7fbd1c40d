//! Token cipher port: symmetric encryption of stored client tokens.

use std::sync::Arc;

use myhouse_domain::error::CipherError;

/// Symmetric cipher applied to client tokens before they reach storage.
///
/// `encrypt` must be randomised: two calls with the same plaintext produce
/// different ciphertexts that both decrypt to it. `decrypt` fails
/// deterministically on malformed or tampered input.
pub trait TokenCipher {
    /// # Errors
    ///
    /// Returns [`CipherError`] when the cipher cannot produce a ciphertext.
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    /// # Errors
    ///
    /// Returns [`CipherError`] when `ciphertext` is malformed or was not
    /// produced under the same key.
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError>;
}

impl<T: TokenCipher> TokenCipher for Arc<T> {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        (**self).decrypt(ciphertext)
    }
}
