//! Home commands exposed as MCP tools.
//!
//! Tools run in-process against the state store. Each call carries the
//! caller verified for that request, never a process-wide credential.

use serde_json::{Value, json};

use myhouse_app::ports::StateRepository;
use myhouse_app::state_store::StateStore;
use myhouse_domain::credential::ClientId;
use myhouse_domain::error::MyHouseError;
use myhouse_domain::field::{FieldUpdate, Switch};
use myhouse_domain::history::DEFAULT_HISTORY_LIMIT;

/// Request-scoped context handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub client_id: ClientId,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The arguments do not match the tool's input schema.
    #[error("{0}")]
    InvalidArguments(String),

    /// The tool ran and the core refused or failed.
    #[error(transparent)]
    Failed(#[from] MyHouseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ToggleLight,
    ToggleDoor,
    ToggleHeat,
    SetTemperature,
    GetHomeState,
    GetHistory,
}

impl Tool {
    pub const ALL: [Self; 6] = [
        Self::ToggleLight,
        Self::ToggleDoor,
        Self::ToggleHeat,
        Self::SetTemperature,
        Self::GetHomeState,
        Self::GetHistory,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ToggleLight => "toggle_light",
            Self::ToggleDoor => "toggle_door",
            Self::ToggleHeat => "toggle_heat",
            Self::SetTemperature => "set_temperature",
            Self::GetHomeState => "get_home_state",
            Self::GetHistory => "get_history",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Self::ToggleLight => "Toggle the light on or off.",
            Self::ToggleDoor => "Open or close the door.",
            Self::ToggleHeat => "Turn the heating on or off.",
            Self::SetTemperature => "Set the current temperature reading (e.g., from a sensor).",
            Self::GetHomeState => {
                "Get the current state of the home including temperature, light, door, and heating status."
            }
            Self::GetHistory => {
                "Get the history of home events (temperature changes, light/door/heat toggles)."
            }
        }
    }

    fn input_schema(self) -> Value {
        match self {
            Self::SetTemperature => json!({
                "type": "object",
                "properties": {
                    "temp": {
                        "type": "string",
                        "description": "Temperature value as string (e.g., '23.5')"
                    }
                },
                "required": ["temp"]
            }),
            Self::GetHistory => json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "number",
                        "default": DEFAULT_HISTORY_LIMIT,
                        "description": "Number of events to retrieve (default: 50)"
                    }
                }
            }),
            _ => json!({"type": "object", "properties": {}}),
        }
    }

    /// `tools/list` entry.
    #[must_use]
    pub fn descriptor(self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": self.input_schema(),
        })
    }

    /// Run the tool for the caller in `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when `arguments` do not fit the
    /// input schema and [`ToolError::Failed`] when the state store fails.
    #[tracing::instrument(skip(self, store, ctx, arguments), fields(tool = self.name(), client_id = %ctx.client_id))]
    pub async fn call<R>(
        self,
        store: &StateStore<R>,
        ctx: &ToolContext,
        arguments: &Value,
    ) -> Result<Value, ToolError>
    where
        R: StateRepository + Send + Sync + 'static,
    {
        match self {
            Self::ToggleLight => toggle(store, Switch::Light, "Light is now ON", "Light is now OFF").await,
            Self::ToggleDoor => toggle(store, Switch::Door, "Door is now OPEN", "Door is now CLOSED").await,
            Self::ToggleHeat => {
                toggle(store, Switch::Heat, "Heating is now ON", "Heating is now OFF").await
            }
            Self::SetTemperature => {
                let temp = arguments
                    .get("temp")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::InvalidArguments("temp must be a string".into()))?;
                let home = store
                    .set_field(FieldUpdate::Temperature(temp.to_string()))
                    .await?;
                Ok(json!({
                    "success": true,
                    "temperature": home.temperature,
                    "message": format!("Temperature set to {}", home.temperature),
                }))
            }
            Self::GetHomeState => {
                let home = store.get().await?;
                Ok(json!({
                    "temperature": home.temperature,
                    "light": home.light,
                    "door": home.door,
                    "heat": home.heat,
                }))
            }
            Self::GetHistory => {
                let limit = history_limit(arguments)?;
                let entries = store.history(limit).await?;
                let events: Vec<Value> = entries
                    .iter()
                    .map(|entry| {
                        json!({
                            "type": entry.kind,
                            "value": entry.value,
                            "createdAt": entry.created_at,
                        })
                    })
                    .collect();
                Ok(json!({"count": events.len(), "events": events}))
            }
        }
    }
}

async fn toggle<R>(
    store: &StateStore<R>,
    switch: Switch,
    on: &str,
    off: &str,
) -> Result<Value, ToolError>
where
    R: StateRepository + Send + Sync + 'static,
{
    let value = store.toggle_field(switch).await?.switch(switch);
    let mut result = json!({
        "success": true,
        "message": if value { on } else { off },
    });
    result[switch.as_str()] = Value::Bool(value);
    Ok(result)
}

fn history_limit(arguments: &Value) -> Result<u32, ToolError> {
    match arguments.get("limit") {
        None | Some(Value::Null) => Ok(DEFAULT_HISTORY_LIMIT),
        Some(limit) => limit
            .as_u64()
            .and_then(|limit| u32::try_from(limit).ok())
            .ok_or_else(|| ToolError::InvalidArguments("limit must be a non-negative integer".into())),
    }
}

/// Wrap a tool outcome as MCP text content. A failed tool is still a
/// successful JSON-RPC call, flagged with `isError`.
#[must_use]
pub fn content(outcome: Result<Value, MyHouseError>) -> Value {
    let (payload, is_error) = match outcome {
        Ok(value) => (value, false),
        Err(err) => (json!({"error": err.to_string()}), true),
    };
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    let mut result = json!({"content": [{"type": "text", "text": text}]});
    if is_error {
        result["isError"] = Value::Bool(true);
    }
    result
}
