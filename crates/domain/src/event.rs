//! Payloads carried on the in-process event bus.

use serde::{Deserialize, Serialize};

use crate::field::{FieldKind, FieldUpdate};

/// Announces one successful mutation of a single field.
///
/// Only the changed field travels with the event; consumers that need the
/// whole record read it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub value: String,
    /// What produced the mutation. Not part of the wire payload.
    #[serde(skip)]
    pub cause: Cause,
}

impl StateChange {
    #[must_use]
    pub fn new(update: &FieldUpdate, cause: Cause) -> Self {
        Self {
            kind: update.kind(),
            value: update.value_string(),
            cause,
        }
    }

    /// Cascade depth: 0 for a command, `n` for a rule action taken in an
    /// evaluation pass that was itself at depth `n - 1`.
    #[must_use]
    pub fn depth(&self) -> u32 {
        match self.cause {
            Cause::Command => 0,
            Cause::Rule { depth, .. } => depth,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cause {
    /// An inbound command.
    #[default]
    Command,
    /// An action of the named rule.
    Rule { rule_id: &'static str, depth: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_only_type_and_value() {
        let change = StateChange::new(
            &FieldUpdate::Heat(true),
            Cause::Rule {
                rule_id: "HEAT_ON_COLD",
                depth: 1,
            },
        );
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json, serde_json::json!({"type": "HEAT", "value": "true"}));
    }

    #[test]
    fn should_report_depth_from_cause() {
        let command = StateChange::new(&FieldUpdate::Light(true), Cause::Command);
        assert_eq!(command.depth(), 0);
        let rule = StateChange::new(
            &FieldUpdate::Light(true),
            Cause::Rule {
                rule_id: "LIGHT_ON_ENTRY",
                depth: 2,
            },
        );
        assert_eq!(rule.depth(), 2);
    }
}
