//! Credential repository port: lookup and upsert of client credentials.

use std::future::Future;
use std::sync::Arc;

use myhouse_domain::credential::{ClientCredential, ClientId};
use myhouse_domain::error::MyHouseError;

/// Storage collaborator for [`ClientCredential`]s, unique on client id.
pub trait CredentialRepository {
    fn find_credential(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Option<ClientCredential>, MyHouseError>> + Send;

    /// Insert the credential, or replace the encrypted token of an existing one.
    fn upsert_credential(
        &self,
        credential: ClientCredential,
    ) -> impl Future<Output = Result<ClientCredential, MyHouseError>> + Send;
}

impl<T: CredentialRepository + Send + Sync> CredentialRepository for Arc<T> {
    fn find_credential(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<Option<ClientCredential>, MyHouseError>> + Send {
        (**self).find_credential(client_id)
    }

    fn upsert_credential(
        &self,
        credential: ClientCredential,
    ) -> impl Future<Output = Result<ClientCredential, MyHouseError>> + Send {
        (**self).upsert_credential(credential)
    }
}
