//! Request authentication through the auth gate.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::credential::ClientId;

use crate::error::AuthRejection;
use crate::state::AppState;

/// Identity of a caller whose `Authorization: identity:secret` header passed
/// the auth gate.
#[derive(Debug, Clone)]
pub struct Authenticated(pub ClientId);

/// Raw credential from the `Authorization` header.
///
/// An empty header counts as no header. A header that is not valid UTF-8 is
/// presented as an empty credential, which the gate reports as malformed.
pub(crate) fn header_credential(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_str().unwrap_or_default())
}

impl<R, C, K> FromRequestParts<AppState<R, C, K>> for Authenticated
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R, C, K>,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth_gate
            .verify(header_credential(&parts.headers))
            .await
            .map(Self)
            .map_err(AuthRejection)
    }
}
