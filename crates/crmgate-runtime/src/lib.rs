//! CRMGate runtime
//!
//! The [`Gateway`] resolves a tool, validates its arguments, applies the
//! per-caller rate limit, dispatches to the CRM backend with the caller's own
//! credential and renders the result as text.

pub mod gateway;
pub mod render;

pub use gateway::Gateway;
pub use render::{render_natural_query, render_table, render_tool_result};
