//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Every tool is a thin wrapper over one upstream REST API: it validates
//! the structured arguments, makes the call, and returns the provider's
//! JSON inside a uniform `{success, data | error}` envelope.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per provider)
//! - `spec.rs` - Declarative action/parameter tables and validation
//! - `registry.rs` - Central tool registry and dispatch
//! - `router.rs` - Dynamic ToolRouter builder for MCP transports
//! - `client.rs` - Shared outbound HTTP client with error normalization
//! - `envelope.rs` - The `{success, data | error}` response envelope
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_provider.rs`)
//! 2. Declare its `ACTIONS` table and implement `ProviderTool`
//! 3. Export it in `definitions/mod.rs`
//! 4. Register it in `ToolRegistry::new()`
//!
//! The router picks it up from the registry; no transport code changes.

pub mod client;
pub mod definitions;
mod envelope;
mod error;
mod registry;
pub mod router;
pub mod spec;

#[cfg(test)]
pub(crate) mod testing;

pub use envelope::{ActionResult, Envelope};
pub use error::ToolError;
pub use registry::{ProviderTool, ToolRegistry};
pub use router::build_tool_router;
