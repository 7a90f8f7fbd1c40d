//! Axum router assembly.

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};

use crate::state::AppState;

const BANNER: &str = "MyHouse OS is running";

/// Build the top-level axum [`Router`].
///
/// `/`, `/health` and `/status` are public. Every other route passes the
/// auth gate. Includes a [`TraceLayer`] that logs each HTTP request/response
/// at the `DEBUG` level using the `tracing` ecosystem.
pub fn build<R, C, K>(state: AppState<R, C, K>) -> Router
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .route("/status", get(status::<R, C, K>))
        .route("/ws", get(crate::ws::upgrade::<R, C, K>))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn banner() -> &'static str {
    BANNER
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(Serialize)]
#[serde(untagged)]
enum StatusBody {
    Healthy {
        status: &'static str,
        database: &'static str,
        uptime: f64,
    },
    Unhealthy {
        status: &'static str,
        database: &'static str,
        error: String,
    },
}

enum StatusResponse {
    Ok(Json<StatusBody>),
    Failed(Json<StatusBody>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Failed(json) => (StatusCode::INTERNAL_SERVER_ERROR, json).into_response(),
        }
    }
}

async fn status<R, C, K>(State(state): State<AppState<R, C, K>>) -> StatusResponse
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    match state.state_store.ping().await {
        Ok(()) => StatusResponse::Ok(Json(StatusBody::Healthy {
            status: "OK",
            database: "Connected",
            uptime: state.started_at.elapsed().as_secs_f64(),
        })),
        Err(err) => {
            tracing::error!(error = %err, "storage ping failed");
            StatusResponse::Failed(Json(StatusBody::Unhealthy {
                status: "ERROR",
                database: "Disconnected",
                error: err.to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use myhouse_app::broadcast_hub::BroadcastHub;
    use myhouse_app::event_bus::EventBus;
    use myhouse_app::services::auth_gate::AuthGate;
    use myhouse_app::services::client_service::ClientService;
    use myhouse_app::state_store::StateStore;
    use myhouse_domain::credential::{ClientCredential, ClientId};
    use myhouse_domain::error::{CipherError, MyHouseError};
    use myhouse_domain::field::FieldKind;
    use myhouse_domain::history::HistoryEntry;
    use myhouse_domain::home_state::{HomeState, StatePatch};
    use myhouse_domain::time::now;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    #[derive(Debug, thiserror::Error)]
    #[error("stub storage is offline")]
    struct Offline;

    #[derive(Default)]
    struct StubStateRepo {
        state: Mutex<Option<HomeState>>,
        history: Mutex<Vec<HistoryEntry>>,
        offline: AtomicBool,
    }

    impl StubStateRepo {
        fn check(&self) -> Result<(), MyHouseError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(MyHouseError::Storage(Box::new(Offline)));
            }
            Ok(())
        }
    }

    impl StateRepository for StubStateRepo {
        async fn get_state(&self) -> Result<Option<HomeState>, MyHouseError> {
            self.check()?;
            Ok(self.state.lock().unwrap().clone())
        }

        async fn upsert_state(&self, patch: StatePatch) -> Result<HomeState, MyHouseError> {
            self.check()?;
            let mut state = self.state.lock().unwrap();
            let current = state.get_or_insert_with(HomeState::default);
            current.apply(&patch);
            Ok(current.clone())
        }

        async fn record_mutation(
            &self,
            patch: StatePatch,
            kind: FieldKind,
            value: String,
        ) -> Result<(HomeState, HistoryEntry), MyHouseError> {
            self.check()?;
            let mut state = self.state.lock().unwrap();
            let mut history = self.history.lock().unwrap();
            let current = state.get_or_insert_with(HomeState::default);
            current.apply(&patch);
            let entry = HistoryEntry {
                id: i64::try_from(history.len()).unwrap() + 1,
                kind,
                value,
                created_at: now(),
            };
            history.push(entry.clone());
            Ok((current.clone(), entry))
        }

        async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>, MyHouseError> {
            self.check()?;
            let history = self.history.lock().unwrap();
            Ok(history
                .iter()
                .rev()
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn ping(&self) -> Result<(), MyHouseError> {
            self.check()
        }
    }

    #[derive(Default)]
    struct StubCredentialRepo {
        clients: Mutex<HashMap<String, String>>,
    }

    impl CredentialRepository for StubCredentialRepo {
        async fn find_credential(
            &self,
            client_id: &ClientId,
        ) -> Result<Option<ClientCredential>, MyHouseError> {
            let clients = self.clients.lock().unwrap();
            Ok(clients
                .get(client_id.as_str())
                .map(|token| ClientCredential {
                    client_id: client_id.clone(),
                    encrypted_token: token.clone(),
                }))
        }

        async fn upsert_credential(
            &self,
            credential: ClientCredential,
        ) -> Result<ClientCredential, MyHouseError> {
            self.clients.lock().unwrap().insert(
                credential.client_id.as_str().to_string(),
                credential.encrypted_token.clone(),
            );
            Ok(credential)
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("not sealed")]
    struct NotSealed;

    struct PrefixCipher;

    impl TokenCipher for PrefixCipher {
        fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
            Ok(format!("sealed:{plaintext}"))
        }

        fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
            ciphertext
                .strip_prefix("sealed:")
                .map(str::to_string)
                .ok_or_else(|| CipherError::new(NotSealed))
        }
    }

    type TestState = AppState<Arc<StubStateRepo>, Arc<StubCredentialRepo>, PrefixCipher>;

    struct Harness {
        app: Router,
        repo: Arc<StubStateRepo>,
        credentials: Arc<StubCredentialRepo>,
    }

    fn harness() -> Harness {
        let repo = Arc::new(StubStateRepo::default());
        let credentials = Arc::new(StubCredentialRepo::default());
        credentials
            .clients
            .lock()
            .unwrap()
            .insert("master".to_string(), "sealed:secret".to_string());

        let store = Arc::new(StateStore::new(Arc::clone(&repo), Arc::new(EventBus::new())));
        let hub = BroadcastHub::new(Arc::clone(&store)).start();
        let state: TestState = AppState::from_arcs(
            store,
            hub,
            Arc::new(AuthGate::new(Arc::clone(&credentials), PrefixCipher)),
            Arc::new(ClientService::new(Arc::clone(&credentials), PrefixCipher)),
        );
        Harness {
            app: build(state),
            repo,
            credentials,
        }
    }

    fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = harness().app;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_serve_banner_without_credentials() {
        let response = harness()
            .app
            .oneshot(request("GET", "/", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], BANNER.as_bytes());
    }

    #[tokio::test]
    async fn should_report_connected_status_when_storage_answers() {
        let (status, body) = send(&harness().app, request("GET", "/status", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["database"], "Connected");
        assert!(body["uptime"].is_number());
    }

    #[tokio::test]
    async fn should_report_disconnected_status_when_storage_fails() {
        let harness = harness();
        harness.repo.offline.store(true, Ordering::SeqCst);

        let (status, body) = send(&harness.app, request("GET", "/status", None, None)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "ERROR");
        assert_eq!(body["database"], "Disconnected");
    }

    #[tokio::test]
    async fn should_reject_missing_header_with_exact_message() {
        let (status, body) = send(&harness().app, request("GET", "/temp", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"error": "Authorization header missing", "status": "UNAUTHORIZED"})
        );
    }

    #[tokio::test]
    async fn should_report_missing_when_header_is_empty() {
        let (status, body) = send(&harness().app, request("GET", "/temp", Some(""), None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header missing");
    }

    #[tokio::test]
    async fn should_reject_header_without_separator() {
        let (status, body) =
            send(&harness().app, request("GET", "/temp", Some("mastersecret"), None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"],
            "Invalid authorization format. Expected 'id:token'"
        );
    }

    #[tokio::test]
    async fn should_merge_wrong_secret_and_unknown_identity() {
        let app = harness().app;
        let (wrong_status, wrong) =
            send(&app, request("GET", "/temp", Some("master:nope"), None)).await;
        let (ghost_status, ghost) =
            send(&app, request("GET", "/temp", Some("ghost:secret"), None)).await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(ghost_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, ghost);
        assert_eq!(wrong["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn should_not_touch_state_when_unauthorised() {
        let harness = harness();

        let (status, _) = send(
            &harness.app,
            request("POST", "/toggle/light", Some("master:nope"), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(harness.repo.history.lock().unwrap().is_empty());
        assert_eq!(*harness.repo.state.lock().unwrap(), None);
    }

    #[tokio::test]
    async fn should_set_and_read_temperature() {
        let app = harness().app;

        let (status, body) = send(
            &app,
            request("POST", "/temp", Some("master:secret"), Some(json!({"temp": "21.5"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"temp": "21.5"}));

        let (_, body) = send(&app, request("GET", "/temp", Some("master:secret"), None)).await;
        assert_eq!(body, json!({"temp": "21.5"}));
    }

    #[tokio::test]
    async fn should_toggle_switch_and_key_response_by_field() {
        let app = harness().app;

        let (status, body) = send(
            &app,
            request("POST", "/toggle/door", Some("master:secret"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"door": true}));

        let (_, body) = send(
            &app,
            request("GET", "/toggle/door", Some("master:secret"), None),
        )
        .await;
        assert_eq!(body, json!({"door": true}));
    }

    #[tokio::test]
    async fn should_return_not_found_when_switch_unknown() {
        let (status, body) = send(
            &harness().app,
            request("POST", "/toggle/garage", Some("master:secret"), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn should_list_history_newest_first_with_limit() {
        let app = harness().app;
        for field in ["light", "door", "heat"] {
            send(
                &app,
                request("POST", &format!("/toggle/{field}"), Some("master:secret"), None),
            )
            .await;
        }

        let (status, body) = send(
            &app,
            request("GET", "/history?limit=2", Some("master:secret"), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["type"], "HEAT");
        assert_eq!(body["data"][1]["type"], "DOOR");
    }

    #[tokio::test]
    async fn should_return_server_error_when_storage_fails() {
        let harness = harness();
        harness.repo.offline.store(true, Ordering::SeqCst);

        let (status, body) = send(
            &harness.app,
            request("POST", "/toggle/light", Some("master:secret"), None),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "Internal Server Error", "status": "SERVER_ERROR"})
        );
    }

    #[tokio::test]
    async fn should_register_client_with_encrypted_token() {
        let harness = harness();

        let (status, body) = send(
            &harness.app,
            request(
                "POST",
                "/auth",
                Some("master:secret"),
                Some(json!({"id": "kitchen", "token": "t0k"})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "OK", "client": "kitchen"}));
        assert_eq!(
            harness.credentials.clients.lock().unwrap().get("kitchen"),
            Some(&"sealed:t0k".to_string())
        );
    }

    #[tokio::test]
    async fn should_reject_registration_with_empty_token() {
        let (status, body) = send(
            &harness().app,
            request(
                "POST",
                "/auth",
                Some("master:secret"),
                Some(json!({"id": "kitchen", "token": ""})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn should_reveal_token_when_client_exists() {
        let app = harness().app;

        let (_, found) = send(
            &app,
            request("GET", "/check?id=master", Some("master:secret"), None),
        )
        .await;
        let (_, missing) = send(
            &app,
            request("GET", "/check?id=ghost", Some("master:secret"), None),
        )
        .await;

        assert_eq!(found, json!({"exists": true, "token": "secret"}));
        assert_eq!(missing, json!({"exists": false}));
    }

    #[tokio::test]
    async fn should_require_id_when_checking() {
        let (status, body) = send(
            &harness().app,
            request("GET", "/check", Some("master:secret"), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing id query parameter");
    }

    #[tokio::test]
    async fn should_report_token_corruption_when_stored_token_unreadable() {
        let harness = harness();
        harness
            .credentials
            .clients
            .lock()
            .unwrap()
            .insert("broken".to_string(), "garbage".to_string());

        let (status, body) = send(
            &harness.app,
            request("GET", "/check?id=broken", Some("master:secret"), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Token corruption");
    }

    #[tokio::test]
    async fn should_reject_websocket_without_credentials() {
        let (status, body) = send(&harness().app, request("GET", "/ws", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header missing");
    }

    #[tokio::test]
    async fn should_report_missing_when_websocket_credentials_are_empty() {
        let (status, body) =
            send(&harness().app, request("GET", "/ws?auth=", Some(""), None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Authorization header missing");
    }

    #[tokio::test]
    async fn should_accept_websocket_credential_from_query() {
        let (status, _) = send(
            &harness().app,
            request("GET", "/ws?auth=master:secret", None, None),
        )
        .await;

        assert_ne!(status, StatusCode::UNAUTHORIZED);
    }
}
