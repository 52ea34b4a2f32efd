//! Transports for the MCP server.
//!
//! stdio is served directly by rmcp from `main`. This module holds the HTTP
//! transport and the per-session plumbing behind it.

pub mod http;
pub mod session;

pub use http::{router, router_with_sessions, serve, SESSION_HEADER};
pub use session::{SessionError, SessionHandle, SessionStore};
