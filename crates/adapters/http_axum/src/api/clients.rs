//! Client registration and token lookup.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::credential::ClientId;

use crate::auth::Authenticated;
use crate::error::{ApiError, BadRequest};
use crate::state::AppState;

/// Query parameters for `GET /check`.
#[derive(Deserialize)]
pub struct CheckQuery {
    pub id: Option<String>,
}

/// Request body for `POST /auth`.
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum CheckBody {
    Missing { exists: bool },
    Found { exists: bool, token: String },
}

#[derive(Serialize)]
pub struct RegisterBody {
    pub status: &'static str,
    pub client: ClientId,
}

/// Possible responses from the check endpoint.
pub enum CheckResponse {
    Ok(Json<CheckBody>),
    BadRequest(BadRequest),
}

impl IntoResponse for CheckResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::BadRequest(rejection) => rejection.into_response(),
        }
    }
}

/// Possible responses from the register endpoint.
pub enum RegisterResponse {
    Ok(Json<RegisterBody>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /check?id=X`
pub async fn check<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(_): Authenticated,
    Query(query): Query<CheckQuery>,
) -> Result<CheckResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        return Ok(CheckResponse::BadRequest(BadRequest(
            "Missing id query parameter",
        )));
    };
    let body = match state.client_service.reveal(&id).await? {
        Some(token) => CheckBody::Found {
            exists: true,
            token,
        },
        None => CheckBody::Missing { exists: false },
    };
    Ok(CheckResponse::Ok(Json(body)))
}

/// `POST /auth`
pub async fn register<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(caller): Authenticated,
    Json(req): Json<RegisterRequest>,
) -> Result<RegisterResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    tracing::debug!(%caller, client_id = %req.id, "register command");
    let client = state.client_service.register(&req.id, &req.token).await?;
    Ok(RegisterResponse::Ok(Json(RegisterBody {
        status: "OK",
        client,
    })))
}
