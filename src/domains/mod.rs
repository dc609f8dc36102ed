//! Domains module containing business logic organized by bounded contexts.
//!
//! The gateway has a single domain: provider-backed tools. Everything under
//! `tools` (definitions, validation, dispatch, the response envelope) is
//! independent of how the server is transported.

pub mod tools;
