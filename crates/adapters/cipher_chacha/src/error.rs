//! Cipher-specific error type.

use myhouse_domain::error::CipherError;

#[derive(Debug, thiserror::Error)]
pub enum CipherAdapterError {
    /// The stored value is not `nonce:ciphertext`.
    #[error("ciphertext is missing the nonce separator")]
    MissingSeparator,

    #[error("ciphertext is not valid hex")]
    Hex(#[from] hex::FromHexError),

    #[error("nonce must be {expected} bytes, got {actual}")]
    NonceLength { expected: usize, actual: usize },

    /// Authentication failed: wrong key or tampered data.
    #[error("authenticated decryption failed")]
    Aead,

    #[error("decrypted token is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<CipherAdapterError> for CipherError {
    fn from(err: CipherAdapterError) -> Self {
        CipherError::new(err)
    }
}
