//! # myhouse-adapter-mcp-axum
//!
//! Model Context Protocol bridge built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve `POST /mcp`, a JSON-RPC 2.0 endpoint speaking the MCP methods
//!   `initialize`, `ping`, `tools/list` and `tools/call`
//! - Verify every request with the auth gate and hand the verified caller to
//!   each tool call as a request-scoped [`tools::ToolContext`]
//! - Run tools in-process against the state store
//!
//! ## Dependency rule
//! Depends on `myhouse-app` and `myhouse-domain` only. Never talks to the
//! HTTP command surface.

pub mod jsonrpc;
pub mod router;
pub mod state;
pub mod tools;
