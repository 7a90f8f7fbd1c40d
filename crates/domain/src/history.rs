//! Append-only audit trail of field mutations.

use serde::{Deserialize, Serialize};

use crate::field::FieldKind;
use crate::time::Timestamp;

/// Number of entries returned when a caller does not ask for a limit.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// One recorded mutation. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Monotonic, assigned by storage.
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: String,
    pub created_at: Timestamp,
}
