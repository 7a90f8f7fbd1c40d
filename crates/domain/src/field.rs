//! The four mutable fields of [`HomeState`](crate::home_state::HomeState).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Discriminant of a home state field, as recorded in history and carried
/// on state-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Temperature,
    Light,
    Door,
    Heat,
}

impl FieldKind {
    /// Wire name (`TEMPERATURE`, `LIGHT`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "TEMPERATURE",
            Self::Light => "LIGHT",
            Self::Door => "DOOR",
            Self::Heat => "HEAT",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEMPERATURE" => Ok(Self::Temperature),
            "LIGHT" => Ok(Self::Light),
            "DOOR" => Ok(Self::Door),
            "HEAT" => Ok(Self::Heat),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// A boolean field that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    Light,
    Door,
    Heat,
}

impl Switch {
    pub const ALL: [Switch; 3] = [Switch::Light, Switch::Door, Switch::Heat];

    /// Lowercase name used in routes and response bodies.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Door => "door",
            Self::Heat => "heat",
        }
    }

    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Light => FieldKind::Light,
            Self::Door => FieldKind::Door,
            Self::Heat => FieldKind::Heat,
        }
    }

    /// Build the update that writes `value` to this switch.
    #[must_use]
    pub fn set(self, value: bool) -> FieldUpdate {
        match self {
            Self::Light => FieldUpdate::Light(value),
            Self::Door => FieldUpdate::Door(value),
            Self::Heat => FieldUpdate::Heat(value),
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Switch {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "door" => Ok(Self::Door),
            "heat" => Ok(Self::Heat),
            other => Err(ValidationError::UnknownField(other.to_string())),
        }
    }
}

/// An unconditional write of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Free-form numeric text, stored as given.
    Temperature(String),
    Light(bool),
    Door(bool),
    Heat(bool),
}

impl FieldUpdate {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Temperature(_) => FieldKind::Temperature,
            Self::Light(_) => FieldKind::Light,
            Self::Door(_) => FieldKind::Door,
            Self::Heat(_) => FieldKind::Heat,
        }
    }

    /// String form recorded in history and carried on events.
    #[must_use]
    pub fn value_string(&self) -> String {
        match self {
            Self::Temperature(value) => value.clone(),
            Self::Light(value) | Self::Door(value) | Self::Heat(value) => value.to_string(),
        }
    }
}
