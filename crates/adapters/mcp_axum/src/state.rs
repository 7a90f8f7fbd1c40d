//! Shared state for the MCP listener.

use std::sync::Arc;

use myhouse_app::services::auth_gate::AuthGate;
use myhouse_app::state_store::StateStore;

/// State shared by the MCP handlers. Only the `Arc`s are cloned.
pub struct McpState<R, C, K> {
    pub state_store: Arc<StateStore<R>>,
    pub auth_gate: Arc<AuthGate<C, K>>,
}

impl<R, C, K> Clone for McpState<R, C, K> {
    fn clone(&self) -> Self {
        Self {
            state_store: Arc::clone(&self.state_store),
            auth_gate: Arc::clone(&self.auth_gate),
        }
    }
}

impl<R, C, K> McpState<R, C, K> {
    pub fn new(state_store: Arc<StateStore<R>>, auth_gate: Arc<AuthGate<C, K>>) -> Self {
        Self {
            state_store,
            auth_gate,
        }
    }
}
