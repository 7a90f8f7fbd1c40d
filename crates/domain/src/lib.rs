//! # myhouse-domain
//!
//! Pure domain model for the myhouse home automation backend.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the singleton **`HomeState`** and its field-level updates
//! - Define **History** entries (append-only audit of every mutation)
//! - Define **Events** announcing state changes and the **observer messages**
//!   pushed to real-time clients
//! - Define **Rules** (condition → action) and the canonical household rule set
//! - Define **Credentials** and their parsing contract
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod credential;
pub mod event;
pub mod field;
pub mod history;
pub mod home_state;
pub mod message;
pub mod rule;
