//! WebSocket observer transport.
//!
//! An authenticated connection is attached to the broadcast hub. It receives
//! `INIT` and then one `UPDATE` per state change as JSON text frames. Inbound
//! frames are logged and ignored. The observer is detached when either side
//! closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use myhouse_app::broadcast_hub::BroadcastHub;
use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_domain::credential::ClientId;

use crate::auth::header_credential;
use crate::error::AuthRejection;
use crate::state::AppState;

/// Browsers cannot set headers on a WebSocket handshake, so the credential
/// may also come as `?auth=identity:secret`.
#[derive(Deserialize)]
pub struct WsQuery {
    pub auth: Option<String>,
}

/// `GET /ws`
pub async fn upgrade<R, C, K>(
    State(state): State<AppState<R, C, K>>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let credential = header_credential(&headers)
        .or_else(|| query.auth.as_deref().filter(|auth| !auth.is_empty()));
    let client_id = match state.auth_gate.verify(credential).await {
        Ok(client_id) => client_id,
        Err(err) => return AuthRejection(err).into_response(),
    };
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return rejection.into_response(),
    };

    let hub = Arc::clone(&state.broadcast_hub);
    ws.on_upgrade(move |socket| serve_observer(socket, hub, client_id))
}

async fn serve_observer<R>(socket: WebSocket, hub: Arc<BroadcastHub<R>>, client_id: ClientId)
where
    R: StateRepository + Send + Sync + 'static,
{
    let (mut sink, mut stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let observer_id = hub.attach(tx);
    tracing::info!(%client_id, %observer_id, "websocket connected");

    let outbound = async {
        let mut messages = UnboundedReceiverStream::new(rx);
        while let Some(message) = messages.next().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, %observer_id, "cannot encode observer message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    };

    let inbound = async {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    tracing::debug!(%observer_id, frame = %text.as_str(), "inbound frame ignored");
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    };

    tokio::select! {
        () = outbound => {}
        () = inbound => {}
    }

    hub.detach(observer_id);
    tracing::info!(%client_id, %observer_id, "websocket closed");
}
