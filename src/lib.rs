//! # rt-mcp
//!
//! rt-mcp is an MCP (Model Context Protocol) server for Request Tracker (RT).
//!
//! It exposes the RT REST 2.0 API as MCP tools, so assistants can search,
//! read, create and update tickets, post comments, and inspect queues, users,
//! ticket links and attachments.
//!
//! ## Features
//!
//! - **Read operations**: search tickets, ticket details, history, links
//! - **Write operations**: create and update tickets, comment or correspond
//! - **Directory**: list queues and users
//! - **Attachments**: list, inspect and download (base64) attachments
//! - **Transports**: stdio, or HTTP with `mcp-session-id` sessions
//! - **Security**: the RT token is never logged or exposed in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with token redaction
//! - [`rt_client`] - HTTP client for the RT REST 2.0 API
//! - [`models`] - RT wire types and the normalized records tools return
//! - [`tools`] - Tool inputs and tool functions
//! - [`server`] - MCP server implementation with tool routing
//! - [`transport`] - HTTP transport and session handling
//!
//! ## Usage
//!
//! ```bash
//! export RT_BASE_URL=https://rt.example.com
//! export RT_TOKEN=1-23-abcdef
//!
//! # stdio (default)
//! ./rt-mcp
//!
//! # HTTP on 0.0.0.0:3000
//! ./rt-mcp --transport http
//! ```
//!
//! ## Configuration
//!
//! - `RT_BASE_URL`: Base URL of the RT instance (`/REST/2.0` is appended when missing)
//! - `RT_TOKEN`: RT auth token
//!
//! Optional:
//! - `RT_TIMEOUT_SECS`: Per-request timeout in seconds (default 20)
//! - `RUST_LOG`: Log level (e.g., `rt_mcp=debug`)
//!
//! ## Example
//!
//! Calling a tool function directly:
//!
//! ```ignore
//! use rt_mcp::config::Config;
//! use rt_mcp::rt_client::RtClient;
//! use rt_mcp::tools::{self, ToolResponse};
//!
//! async fn example() -> Result<(), rt_mcp::error::RtError> {
//!     let config = Config::from_env()?;
//!     let client = RtClient::new(&config)?;
//!
//!     match tools::search_tickets(&client, "printer jam", 10).await {
//!         ToolResponse::Ok(found) => {
//!             for ticket in found.tickets {
//!                 println!("#{:?}: {:?}", ticket.id, ticket.subject);
//!             }
//!         }
//!         ToolResponse::Err(record) => eprintln!("search failed: {}", record.error),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod rt_client;
pub mod server;
pub mod tools;
pub mod transport;
