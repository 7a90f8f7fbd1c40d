//! Client credentials.
//!
//! A caller presents `identity:secret`. Storage only ever holds the secret
//! in encrypted form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MalformedCredential, ValidationError};

/// Unique client identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Build a client id, rejecting empty input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyClientId`] when `value` is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyClientId);
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored record: client identity plus its encrypted secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredential {
    pub client_id: ClientId,
    pub encrypted_token: String,
}

/// Split a presented credential into identity and secret.
///
/// Exactly one `:` must separate two non-empty halves.
///
/// # Errors
///
/// Returns the [`MalformedCredential`] reason describing what is wrong.
pub fn parse_credential(raw: &str) -> Result<(ClientId, &str), MalformedCredential> {
    let (identity, secret) = raw
        .split_once(':')
        .ok_or(MalformedCredential::MissingSeparator)?;
    if secret.contains(':') {
        return Err(MalformedCredential::ExtraSeparator);
    }
    if secret.is_empty() {
        return Err(MalformedCredential::EmptySecret);
    }
    let identity = ClientId::new(identity).map_err(|_| MalformedCredential::EmptyIdentity)?;
    Ok((identity, secret))
}
