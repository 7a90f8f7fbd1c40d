//! Auth gate: verifies `identity:secret` credentials before any command
//! reaches the state store.

use myhouse_domain::credential::{ClientId, parse_credential};
use myhouse_domain::error::AuthError;

use crate::ports::{CredentialRepository, TokenCipher};

pub struct AuthGate<C, K> {
    credentials: C,
    cipher: K,
}

impl<C, K> AuthGate<C, K>
where
    C: CredentialRepository + Send + Sync,
    K: TokenCipher + Send + Sync,
{
    pub fn new(credentials: C, cipher: K) -> Self {
        Self {
            credentials,
            cipher,
        }
    }

    /// Verify a presented credential and return the caller's identity.
    ///
    /// Unknown identity, wrong secret and an undecryptable stored secret all
    /// yield [`AuthError::Invalid`]; only the log tells them apart.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Missing`] when no credential is given,
    /// [`AuthError::Malformed`] when it does not split into two non-empty
    /// halves, and [`AuthError::Invalid`] otherwise.
    pub async fn verify(&self, credential: Option<&str>) -> Result<ClientId, AuthError> {
        let raw = credential.ok_or(AuthError::Missing)?;
        let (client_id, secret) = parse_credential(raw)?;

        let stored = match self.credentials.find_credential(&client_id).await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::warn!(%client_id, reason = "unknown client", "unauthorized attempt");
                return Err(AuthError::Invalid);
            }
            Err(err) => {
                tracing::error!(error = %err, %client_id, "credential lookup failed");
                return Err(AuthError::Invalid);
            }
        };

        let expected = self.cipher.decrypt(&stored.encrypted_token).map_err(|err| {
            tracing::error!(error = %err, %client_id, "stored token cannot be decrypted");
            AuthError::Invalid
        })?;

        if expected != secret {
            tracing::warn!(%client_id, reason = "token mismatch", "unauthorized attempt");
            return Err(AuthError::Invalid);
        }

        tracing::debug!(%client_id, "client authenticated");
        Ok(client_id)
    }
}
