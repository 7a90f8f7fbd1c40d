//! # myhouse-adapter-cipher-chacha
//!
//! Token cipher using XChaCha20-Poly1305.
//!
//! ## Responsibilities
//! - Implement the `TokenCipher` port from `myhouse-app::ports`
//! - Derive the 256-bit key from a configured passphrase
//! - Encode ciphertexts as `hex(nonce):hex(ciphertext)`
//!
//! ## Dependency rule
//! Depends on `myhouse-app` (for the port trait) and `myhouse-domain` (for
//! the error type). The `app` and `domain` crates must never reference this
//! adapter.

pub mod cipher;
pub mod error;

pub use cipher::ChaChaTokenCipher;
pub use error::CipherAdapterError;
