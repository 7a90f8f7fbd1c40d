//! `HomeState`: the single household record.
//!
//! Exactly one record exists, keyed by [`HOME_STATE_ID`]. It is created
//! lazily with [`HomeState::default`] on first access and never deleted.

use serde::{Deserialize, Serialize};

use crate::field::{FieldUpdate, Switch};

/// Fixed identity of the singleton record.
pub const HOME_STATE_ID: i64 = 1;

/// Temperature recorded for a freshly created record.
pub const DEFAULT_TEMPERATURE: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeState {
    /// Free-form numeric text. Not parsed or validated on write.
    pub temperature: String,
    pub light: bool,
    pub door: bool,
    pub heat: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE.to_string(),
            light: false,
            door: false,
            heat: false,
        }
    }
}

impl HomeState {
    /// Current value of a boolean field.
    #[must_use]
    pub fn switch(&self, switch: Switch) -> bool {
        match switch {
            Switch::Light => self.light,
            Switch::Door => self.door,
            Switch::Heat => self.heat,
        }
    }

    /// Apply a patch in place, leaving absent fields untouched.
    pub fn apply(&mut self, patch: &StatePatch) {
        if let Some(ref temperature) = patch.temperature {
            self.temperature.clone_from(temperature);
        }
        if let Some(light) = patch.light {
            self.light = light;
        }
        if let Some(door) = patch.door {
            self.door = door;
        }
        if let Some(heat) = patch.heat {
            self.heat = heat;
        }
    }
}

/// Partial write to the singleton record. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub temperature: Option<String>,
    pub light: Option<bool>,
    pub door: Option<bool>,
    pub heat: Option<bool>,
}

impl StatePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.light.is_none()
            && self.door.is_none()
            && self.heat.is_none()
    }
}

impl From<FieldUpdate> for StatePatch {
    fn from(update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Temperature(value) => Self {
                temperature: Some(value),
                ..Self::default()
            },
            FieldUpdate::Light(value) => Self {
                light: Some(value),
                ..Self::default()
            },
            FieldUpdate::Door(value) => Self {
                door: Some(value),
                ..Self::default()
            },
            FieldUpdate::Heat(value) => Self {
                heat: Some(value),
                ..Self::default()
            },
        }
    }
}
