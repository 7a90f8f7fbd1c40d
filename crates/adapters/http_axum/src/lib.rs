//! # myhouse-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the JSON command surface (`/temp`, `/toggle/{field}`, `/history`,
//!   `/check`, `/auth`) behind the auth gate
//! - Serve `/ws`, the WebSocket transport for broadcast hub observers
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `myhouse-app` (for port traits and services) and
//! `myhouse-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
pub mod ws;
