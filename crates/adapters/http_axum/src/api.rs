//! JSON command handlers.
//!
//! Every route here requires an [`Authenticated`](crate::auth::Authenticated)
//! caller.

pub mod clients;
pub mod history;
pub mod temperature;
pub mod toggle;

use axum::Router;
use axum::routing::{get, post};

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};

use crate::state::AppState;

/// Build the command router.
pub fn routes<R, C, K>() -> Router<AppState<R, C, K>>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/temp",
            get(temperature::get::<R, C, K>).post(temperature::set::<R, C, K>),
        )
        .route(
            "/toggle/{field}",
            get(toggle::get::<R, C, K>).post(toggle::toggle::<R, C, K>),
        )
        .route("/history", get(history::list::<R, C, K>))
        .route("/check", get(clients::check::<R, C, K>))
        .route("/auth", post(clients::register::<R, C, K>))
}
