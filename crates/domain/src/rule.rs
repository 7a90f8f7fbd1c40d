//! Rules: named condition/action pairs evaluated against a state snapshot.
//!
//! Rules are plain data held in one ordered list. Conditions are pure
//! predicates; actions are a single field write that the rule engine
//! applies through the state store.
//!
//! Rules must be self-disarming: once a rule's action has run, its own
//! condition has to become false, or evaluation will cascade without end.

use crate::field::FieldUpdate;
use crate::home_state::HomeState;

/// Read-only view of the state that rule conditions are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Parsed temperature. `NaN` when the stored text does not start with a
    /// number, which makes every ordered comparison false.
    pub temp: f64,
    pub light: bool,
    pub door: bool,
    pub heat: bool,
}

impl From<&HomeState> for Snapshot {
    fn from(state: &HomeState) -> Self {
        Self {
            temp: parse_leading_float(&state.temperature),
            light: state.light,
            door: state.door,
            heat: state.heat,
        }
    }
}

/// Read the longest numeric prefix of `text` after leading whitespace, so
/// `"18C"` reads as 18 and `"abc"` as `NaN`. `Infinity` is the only
/// non-finite spelling accepted; `inf` and `nan` are not numbers here.
fn parse_leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = digits(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        // "1e" and "1e+" stop before the marker.
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier used in logs and assertions.
    pub id: &'static str,
    pub description: &'static str,
    pub condition: fn(&Snapshot) -> bool,
    pub action: FieldUpdate,
}

impl Rule {
    #[must_use]
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        (self.condition)(snapshot)
    }
}

pub const HEAT_ON_COLD: &str = "HEAT_ON_COLD";
pub const HEAT_OFF_HOT: &str = "HEAT_OFF_HOT";
pub const LIGHT_ON_ENTRY: &str = "LIGHT_ON_ENTRY";
pub const ECO_GUARD_DOOR: &str = "ECO_GUARD_DOOR";

pub const COLD_THRESHOLD: f64 = 19.0;
pub const HOT_THRESHOLD: f64 = 23.0;

fn is_cold_and_closed(s: &Snapshot) -> bool {
    s.temp < COLD_THRESHOLD && !s.heat && !s.door
}

fn is_hot_and_heating(s: &Snapshot) -> bool {
    s.temp > HOT_THRESHOLD && s.heat
}

fn is_entry_in_dark(s: &Snapshot) -> bool {
    s.door && !s.light
}

fn is_heating_with_door_open(s: &Snapshot) -> bool {
    s.door && s.heat
}

/// The household rule set, in evaluation order.
#[must_use]
pub fn canonical_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: HEAT_ON_COLD,
            description: "Turn the heating on when it is cold and the door is closed",
            condition: is_cold_and_closed,
            action: FieldUpdate::Heat(true),
        },
        Rule {
            id: HEAT_OFF_HOT,
            description: "Turn the heating off when it is hot",
            condition: is_hot_and_heating,
            action: FieldUpdate::Heat(false),
        },
        Rule {
            id: LIGHT_ON_ENTRY,
            description: "Turn the light on when the door opens",
            condition: is_entry_in_dark,
            action: FieldUpdate::Light(true),
        },
        Rule {
            id: ECO_GUARD_DOOR,
            description: "Turn the heating off while the door is open",
            condition: is_heating_with_door_open,
            action: FieldUpdate::Heat(false),
        },
    ]
}
