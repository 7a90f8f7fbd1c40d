//! `SQLite` implementation of [`CredentialRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use myhouse_app::ports::CredentialRepository;
use myhouse_domain::credential::{ClientCredential, ClientId};
use myhouse_domain::error::MyHouseError;

use crate::error::StorageError;

struct Wrapper(ClientCredential);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let client_id: String = row.try_get("client_id")?;
        let client_id =
            ClientId::new(client_id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Ok(Self(ClientCredential {
            client_id,
            encrypted_token: row.try_get("client_token")?,
        }))
    }
}

const SELECT_BY_ID: &str = "SELECT client_id, client_token FROM clients WHERE client_id = ?";

const UPSERT: &str = r"
    INSERT INTO clients (client_id, client_token) VALUES (?, ?)
    ON CONFLICT(client_id) DO UPDATE SET client_token = excluded.client_token
";

/// `SQLite`-backed client credential repository.
#[derive(Clone)]
pub struct SqliteCredentialRepository {
    pool: SqlitePool,
}

impl SqliteCredentialRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl CredentialRepository for SqliteCredentialRepository {
    async fn find_credential(
        &self,
        client_id: &ClientId,
    ) -> Result<Option<ClientCredential>, MyHouseError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(client_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn upsert_credential(
        &self,
        credential: ClientCredential,
    ) -> Result<ClientCredential, MyHouseError> {
        sqlx::query(UPSERT)
            .bind(credential.client_id.as_str())
            .bind(&credential.encrypted_token)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(credential)
    }
}
