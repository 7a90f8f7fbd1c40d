//! Messages pushed to real-time observers.

use serde::{Deserialize, Serialize};

use crate::event::StateChange;
use crate::home_state::HomeState;

/// `{kind: "INIT", data: HomeState}` on attach, then
/// `{kind: "UPDATE", data: {type, value}}` per state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObserverMessage {
    Init(HomeState),
    Update(StateChange),
}
