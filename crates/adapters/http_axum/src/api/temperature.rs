//! Temperature reading and setting.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::field::FieldUpdate;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /temp`.
#[derive(Deserialize)]
pub struct SetTemperatureRequest {
    pub temp: String,
}

/// `{temp}` as stored, text included.
#[derive(Serialize)]
pub struct TemperatureBody {
    pub temp: String,
}

/// Possible responses from the temperature endpoints.
pub enum TemperatureResponse {
    Ok(Json<TemperatureBody>),
}

impl IntoResponse for TemperatureResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /temp`
pub async fn get<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(_): Authenticated,
) -> Result<TemperatureResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let home = state.state_store.get().await?;
    Ok(TemperatureResponse::Ok(Json(TemperatureBody {
        temp: home.temperature,
    })))
}

/// `POST /temp`
pub async fn set<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(client_id): Authenticated,
    Json(req): Json<SetTemperatureRequest>,
) -> Result<TemperatureResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    tracing::debug!(%client_id, temp = %req.temp, "temperature command");
    let home = state
        .state_store
        .set_field(FieldUpdate::Temperature(req.temp))
        .await?;
    Ok(TemperatureResponse::Ok(Json(TemperatureBody {
        temp: home.temperature,
    })))
}
