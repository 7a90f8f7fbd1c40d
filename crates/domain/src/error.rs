//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MyHouseError`] via `#[from]` (no `String` variants).

/// Top-level error returned by application services and ports.
#[derive(Debug, thiserror::Error)]
pub enum MyHouseError {
    /// A domain invariant was violated by caller input.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A looked-up record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A stored client token could not be decrypted.
    #[error("token corruption")]
    TokenCorruption(#[source] CipherError),

    /// The storage collaborator failed. No history entry was recorded and
    /// no event was published for the operation that returned this.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Caller input that breaks a domain invariant.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("client id must not be empty")]
    EmptyClientId,

    #[error("client token must not be empty")]
    EmptyClientToken,

    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// A record that was expected to exist but does not.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Reasons a credential is rejected by the auth gate.
///
/// [`Missing`](Self::Missing) and [`Malformed`](Self::Malformed) carry their
/// exact reason to the caller. [`Invalid`](Self::Invalid) merges unknown
/// identity, wrong secret, and undecryptable stored secret into one
/// message so that callers cannot enumerate identities.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization header missing")]
    Missing,

    #[error("{0}")]
    Malformed(#[from] MalformedCredential),

    #[error("Invalid credentials")]
    Invalid,
}

/// Ways an `identity:secret` credential string can be malformed.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum MalformedCredential {
    #[error("Invalid authorization format. Expected 'id:token'")]
    MissingSeparator,

    #[error("Invalid credentials format")]
    EmptyIdentity,

    #[error("Invalid credentials format")]
    EmptySecret,

    #[error("Invalid credentials format")]
    ExtraSeparator,
}

/// Failure reported by the token cipher collaborator.
#[derive(Debug, thiserror::Error)]
#[error("cipher operation failed")]
pub struct CipherError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl CipherError {
    /// Wrap an adapter-specific failure.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}
