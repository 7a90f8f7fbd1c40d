//! MCP listener: `/health` and the JSON-RPC `/mcp` endpoint.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};

use crate::jsonrpc::{self, RpcError, codes};
use crate::state::McpState;
use crate::tools::{Tool, ToolContext, ToolError, content};

const SERVER_NAME: &str = "myhouse-os";
const PROTOCOL_VERSION: &str = "2025-03-26";

/// Build the MCP [`Router`]. CORS is permissive so browser-based MCP
/// clients can reach it.
pub fn build<R, C, K>(state: McpState<R, C, K>) -> Router
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .route("/mcp", post(handle::<R, C, K>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok", "server": "myhouse-os-mcp"}))
}

/// Possible responses from the MCP endpoint.
enum McpResponse {
    Rpc(StatusCode, Json<jsonrpc::Response>),
    Accepted,
    Unauthorized(String),
}

impl IntoResponse for McpResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Rpc(status, json) => (status, json).into_response(),
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
            Self::Unauthorized(error) => {
                (StatusCode::UNAUTHORIZED, Json(json!({"error": error}))).into_response()
            }
        }
    }
}

async fn handle<R, C, K>(
    State(state): State<McpState<R, C, K>>,
    headers: HeaderMap,
    body: Bytes,
) -> McpResponse
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let credential = headers
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_str().unwrap_or_default());
    let client_id = match state.auth_gate.verify(credential).await {
        Ok(client_id) => client_id,
        Err(err) => return McpResponse::Unauthorized(err.to_string()),
    };
    let ctx = ToolContext { client_id };

    let request: jsonrpc::Request = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            tracing::debug!(error = %err, "unparseable mcp request");
            return McpResponse::Rpc(
                StatusCode::BAD_REQUEST,
                Json(jsonrpc::Response::failure(
                    Value::Null,
                    RpcError::new(codes::PARSE_ERROR, "Parse error"),
                )),
            );
        }
    };
    if request.jsonrpc != jsonrpc::VERSION {
        return McpResponse::Rpc(
            StatusCode::BAD_REQUEST,
            Json(jsonrpc::Response::failure(
                request.id.unwrap_or(Value::Null),
                RpcError::new(codes::INVALID_REQUEST, "Invalid Request"),
            )),
        );
    }

    tracing::info!(client_id = %ctx.client_id, method = %request.method, "mcp request");
    let Some(id) = request.id else {
        return McpResponse::Accepted;
    };

    let outcome = dispatch(&state, &ctx, &request.method, request.params.as_ref()).await;
    let response = match outcome {
        Ok(result) => jsonrpc::Response::success(id, result),
        Err(error) => jsonrpc::Response::failure(id, error),
    };
    McpResponse::Rpc(StatusCode::OK, Json(response))
}

async fn dispatch<R, C, K>(
    state: &McpState<R, C, K>,
    ctx: &ToolContext,
    method: &str,
    params: Option<&Value>,
) -> Result<Value, RpcError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    match method {
        "initialize" => {
            let protocol_version = params
                .and_then(|params| params.get("protocolVersion"))
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);
            Ok(json!({
                "protocolVersion": protocol_version,
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
            }))
        }
        "ping" => Ok(json!({})),
        "tools/list" => {
            let tools: Vec<Value> = Tool::ALL.into_iter().map(Tool::descriptor).collect();
            Ok(json!({"tools": tools}))
        }
        "tools/call" => call_tool(state, ctx, params).await,
        other => Err(RpcError::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
        )),
    }
}

async fn call_tool<R, C, K>(
    state: &McpState<R, C, K>,
    ctx: &ToolContext,
    params: Option<&Value>,
) -> Result<Value, RpcError>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    let name = params
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::new(codes::INVALID_PARAMS, "Missing tool name"))?;
    let tool = Tool::from_name(name)
        .ok_or_else(|| RpcError::new(codes::INVALID_PARAMS, format!("Unknown tool: {name}")))?;
    let empty = json!({});
    let arguments = params
        .and_then(|params| params.get("arguments"))
        .unwrap_or(&empty);

    match tool.call(&state.state_store, ctx, arguments).await {
        Ok(value) => Ok(content(Ok(value))),
        Err(ToolError::Failed(err)) => {
            tracing::warn!(error = %err, tool = name, "tool failed");
            Ok(content(Err(err)))
        }
        Err(err @ ToolError::InvalidArguments(_)) => {
            Err(RpcError::new(codes::INVALID_PARAMS, err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use myhouse_adapter_cipher_chacha::ChaChaTokenCipher;
    use myhouse_adapter_storage_sqlite_sqlx::{
        Config, SqliteCredentialRepository, SqliteStateRepository,
    };
    use myhouse_app::event_bus::EventBus;
    use myhouse_app::services::auth_gate::AuthGate;
    use myhouse_app::services::client_service::ClientService;
    use myhouse_app::state_store::StateStore;
    use tower::ServiceExt;

    const AUTH: &str = "assistant:s3cret";

    async fn app() -> Router {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let cipher = ChaChaTokenCipher::from_passphrase("test key");
        let credentials = SqliteCredentialRepository::new(db.pool().clone());
        ClientService::new(credentials.clone(), cipher.clone())
            .register("assistant", "s3cret")
            .await
            .unwrap();

        let store = Arc::new(StateStore::new(
            SqliteStateRepository::new(db.pool().clone()),
            Arc::new(EventBus::new()),
        ));
        let gate = Arc::new(AuthGate::new(credentials, cipher));
        build(McpState::new(store, gate))
    }

    async fn post(app: &Router, auth: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let response = app
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn rpc(app: &Router, method: &str, params: Value) -> Value {
        let body = json!({"jsonrpc": "2.0", "id": 7, "method": method, "params": params});
        let (status, response) = post(app, Some(AUTH), &body.to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["id"], 7);
        response
    }

    fn tool_payload(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn should_report_health_without_credentials() {
        let response = app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok", "server": "myhouse-os-mcp"}));
    }

    #[tokio::test]
    async fn should_reject_unauthenticated_call() {
        let app = app().await;
        let body = json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string();

        let (status, response) = post(&app, None, &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, json!({"error": "Authorization header missing"}));

        let (status, response) = post(&app, Some(""), &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, json!({"error": "Authorization header missing"}));

        let (status, response) = post(&app, Some("assistant:wrong"), &body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response, json!({"error": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn should_answer_initialize_with_tool_capability() {
        let response = rpc(
            &app().await,
            "initialize",
            json!({"protocolVersion": "2025-03-26", "capabilities": {}}),
        )
        .await;

        assert_eq!(response["result"]["protocolVersion"], "2025-03-26");
        assert!(response["result"]["capabilities"]["tools"].is_object());
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn should_accept_initialized_notification_without_body() {
        let body = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();

        let (status, response) = post(&app().await, Some(AUTH), &body).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(response, Value::Null);
    }

    #[tokio::test]
    async fn should_list_all_six_tools() {
        let response = rpc(&app().await, "tools/list", json!({})).await;

        let names: Vec<&str> = response["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "toggle_light",
                "toggle_door",
                "toggle_heat",
                "set_temperature",
                "get_home_state",
                "get_history"
            ]
        );
    }

    #[tokio::test]
    async fn should_toggle_light_through_tool() {
        let app = app().await;

        let response = rpc(&app, "tools/call", json!({"name": "toggle_light"})).await;

        assert_eq!(
            tool_payload(&response),
            json!({"success": true, "light": true, "message": "Light is now ON"})
        );
        let state = rpc(&app, "tools/call", json!({"name": "get_home_state"})).await;
        assert_eq!(tool_payload(&state)["light"], true);
    }

    #[tokio::test]
    async fn should_set_temperature_and_record_history() {
        let app = app().await;

        let response = rpc(
            &app,
            "tools/call",
            json!({"name": "set_temperature", "arguments": {"temp": "23.5"}}),
        )
        .await;
        assert_eq!(tool_payload(&response)["temperature"], "23.5");

        let history = rpc(
            &app,
            "tools/call",
            json!({"name": "get_history", "arguments": {"limit": 10}}),
        )
        .await;
        let payload = tool_payload(&history);
        assert_eq!(payload["count"], 1);
        assert_eq!(payload["events"][0]["type"], "TEMPERATURE");
        assert_eq!(payload["events"][0]["value"], "23.5");
    }

    #[tokio::test]
    async fn should_reject_missing_temperature_argument() {
        let response = rpc(
            &app().await,
            "tools/call",
            json!({"name": "set_temperature", "arguments": {}}),
        )
        .await;

        assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn should_reject_unknown_tool_as_invalid_params() {
        let response = rpc(&app().await, "tools/call", json!({"name": "open_garage"})).await;

        assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn should_reject_unknown_method() {
        let response = rpc(&app().await, "resources/list", json!({})).await;

        assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_malformed_json_with_parse_error() {
        let (status, response) = post(&app().await, Some(AUTH), "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["code"], codes::PARSE_ERROR);
        assert_eq!(response["id"], Value::Null);
    }
}
