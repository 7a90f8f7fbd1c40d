//! Shared application state for axum handlers.

use std::sync::Arc;
use std::time::Instant;

use myhouse_app::broadcast_hub::BroadcastHub;
use myhouse_app::ports::{CredentialRepository, StateRepository, TokenCipher};
use myhouse_app::services::auth_gate::AuthGate;
use myhouse_app::services::client_service::ClientService;
use myhouse_app::state_store::StateStore;

/// Application state shared across all axum handlers.
///
/// Generic over the state repository, credential repository and token cipher
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<R, C, K> {
    /// Sole writer of the home state.
    pub state_store: Arc<StateStore<R>>,
    /// Real-time observer registry fed by the event bus.
    pub broadcast_hub: Arc<BroadcastHub<R>>,
    /// Credential check in front of every command.
    pub auth_gate: Arc<AuthGate<C, K>>,
    /// Client registration and token lookup.
    pub client_service: Arc<ClientService<C, K>>,
    /// Process start, for the uptime report.
    pub started_at: Instant,
}

impl<R, C, K> Clone for AppState<R, C, K> {
    fn clone(&self) -> Self {
        Self {
            state_store: Arc::clone(&self.state_store),
            broadcast_hub: Arc::clone(&self.broadcast_hub),
            auth_gate: Arc::clone(&self.auth_gate),
            client_service: Arc::clone(&self.client_service),
            started_at: self.started_at,
        }
    }
}

impl<R, C, K> AppState<R, C, K>
where
    R: StateRepository + Send + Sync + 'static,
    C: CredentialRepository + Send + Sync + 'static,
    K: TokenCipher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` components.
    ///
    /// The state store and hub are shared with the rule engine and the MCP
    /// bridge, so they are built by the caller.
    pub fn from_arcs(
        state_store: Arc<StateStore<R>>,
        broadcast_hub: Arc<BroadcastHub<R>>,
        auth_gate: Arc<AuthGate<C, K>>,
        client_service: Arc<ClientService<C, K>>,
    ) -> Self {
        Self {
            state_store,
            broadcast_hub,
            auth_gate,
            client_service,
            started_at: Instant::now(),
        }
    }
}
