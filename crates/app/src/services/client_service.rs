//! Client service: registration and lookup of client credentials.

use myhouse_domain::credential::{ClientCredential, ClientId};
use myhouse_domain::error::{MyHouseError, ValidationError};

use crate::ports::{CredentialRepository, TokenCipher};

pub struct ClientService<C, K> {
    credentials: C,
    cipher: K,
}

impl<C, K> ClientService<C, K>
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

    /// Register a client, or replace the token of an existing one. The token
    /// is encrypted before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Validation`] if `id` or `token` is empty, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, token))]
    pub async fn register(&self, id: &str, token: &str) -> Result<ClientId, MyHouseError> {
        let client_id = ClientId::new(id)?;
        if token.is_empty() {
            return Err(ValidationError::EmptyClientToken.into());
        }
        let encrypted_token = self
            .cipher
            .encrypt(token)
            .map_err(|err| MyHouseError::Storage(Box::new(err)))?;
        let stored = self
            .credentials
            .upsert_credential(ClientCredential {
                client_id,
                encrypted_token,
            })
            .await?;
        tracing::info!(client_id = %stored.client_id, "client registered");
        Ok(stored.client_id)
    }

    /// Decrypted token of a client, or `None` if the client is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`MyHouseError::Validation`] for an empty id,
    /// [`MyHouseError::TokenCorruption`] if the stored token cannot be
    /// decrypted, or a storage error from the repository.
    pub async fn reveal(&self, id: &str) -> Result<Option<String>, MyHouseError> {
        let client_id = ClientId::new(id)?;
        let Some(stored) = self.credentials.find_credential(&client_id).await? else {
            return Ok(None);
        };
        self.cipher
            .decrypt(&stored.encrypted_token)
            .map(Some)
            .map_err(|err| {
                tracing::error!(error = %err, %client_id, "stored token cannot be decrypted");
                MyHouseError::TokenCorruption(err)
            })
    }
}
