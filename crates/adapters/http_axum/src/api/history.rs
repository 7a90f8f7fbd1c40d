//! Audit trail listing.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::history::{DEFAULT_HISTORY_LIMIT, HistoryEntry};

use crate::auth::Authenticated;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /history`.
#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct HistoryBody {
    pub data: Vec<HistoryEntry>,
    pub count: usize,
    pub status: &'static str,
}

/// Possible responses from the history endpoint.
pub enum ListResponse {
    Ok(Json<HistoryBody>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /history?limit=N`, newest first.
pub async fn list<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    Authenticated(_): Authenticated,
    Query(query): Query<HistoryQuery>,
) -> Result<ListResponse, ApiError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let data = state
        .state_store
        .history(query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await?;
    Ok(ListResponse::Ok(Json(HistoryBody {
        count: data.len(),
        data,
        status: "OK",
    })))
}
