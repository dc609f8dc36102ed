//! Transport layer for the MCP gateway.
//!
//! Three interchangeable ways to reach the same server:
//! - **STDIO** (feature `stdio`, default): the standard MCP wiring.
//! - **TCP** (feature `tcp`): line-delimited JSON-RPC on a socket.
//! - **HTTP** (feature `http`): JSON-RPC over POST plus health/info routes.
//!
//! Each transport owns only the connection lifecycle; every request ends up
//! in the same `McpServer` handler regardless of how it arrived.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
