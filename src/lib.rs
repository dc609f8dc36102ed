//! MCP API Gateway Library
//!
//! A Model Context Protocol (MCP) server exposing a dozen external REST
//! APIs (weather, Twitter, Reddit, YouTube, Slack, Jira, Gmail, Google
//! Calendar, Google Maps, currency, crypto, DeFiLlama) as thin wrapper
//! tools. Each tool forwards structured parameters upstream and returns
//! the provider's JSON wrapped in a uniform
//! `{"success": ..., "data" | "error": ...}` envelope.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the server handler and the
//!   transport layer (stdio by default; TCP and HTTP behind features)
//! - **domains::tools**: the provider tools themselves, the declarative
//!   parameter specs they are validated against, and the registry that
//!   dispatches `(tool, action, parameters)` calls
//!
//! # Example
//!
//! ```rust,no_run
//! use gateway_mcp_server::{core::Config, core::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
