//! Boolean switches: light, door and heat.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::error::NotFoundError;
use myhouse_domain::field::Switch;
use myhouse_domain::home_state::HomeState;

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// `{<field>: bool}`, keyed by the switch name.
pub enum SwitchResponse {
    Ok(Switch, bool),
}

impl IntoResponse for SwitchResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(switch, on) => {
                let mut body = Map::new();
                body.insert(switch.as_str().to_string(), Value::Bool(on));
                Json(Value::Object(body)).into_response()
            }
        }
    }
}

fn parse_switch(field: &str) -> Result<Switch, ApiError> {
    field.parse().map_err(|_| {
        ApiError::from(myhouse_domain::error::MyHouseError::from(NotFoundError {
            entity: "field",
            id: field.to_string(),
        }))
    })
}

fn respond(switch: Switch, home: &HomeState) -> SwitchResponse {
    SwitchResponse::Ok(switch, home.switch(switch))
}

/// `GET /toggle/{field}`
pub async fn get<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(_): Authenticated,
    Path(field): Path<String>,
) -> Result<SwitchResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let switch = parse_switch(&field)?;
    let home = state.state_store.get().await?;
    Ok(respond(switch, &home))
}

/// `POST /toggle/{field}`
pub async fn toggle<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(client_id): Authenticated,
    Path(field): Path<String>,
) -> Result<SwitchResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let switch = parse_switch(&field)?;
    tracing::debug!(%client_id, %switch, "toggle command");
    let home = state.state_store.toggle_field(switch).await?;
    Ok(respond(switch, &home))
}
