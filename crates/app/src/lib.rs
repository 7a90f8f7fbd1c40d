//! # myhouse-app
//!
//! Application layer: the event-driven core and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StateRepository`: singleton home state + append-only history
//!   - `CredentialRepository`: client credentials keyed by client id
//!   - `TokenCipher`: symmetric encryption of stored tokens
//! - Provide the **core components**:
//!   - `EventBus`: synchronous-dispatch publish/subscribe
//!   - `StateStore`: sole writer of the home state; write, record, publish
//!   - `RuleEngine`: re-evaluates the rule list on every state change
//!   - `BroadcastHub`: pushes snapshots and deltas to real-time observers
//! - Provide **services** used by the driving adapters:
//!   - `AuthGate`: credential verification in front of every command
//!   - `ClientService`: client registration and token lookup
//!
//! ## Dependency rule
//! Depends on `myhouse-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod broadcast_hub;
pub mod event_bus;
pub mod ports;
pub mod rule_engine;
pub mod services;
pub mod state_store;

#[cfg(test)]
mod testing;
