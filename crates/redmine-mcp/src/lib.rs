//! MCP (Model Context Protocol) server for redmine-tools.
//!
//! Exposes the Redmine REST API as MCP tools: attachment download with
//! format-aware rendering, uploads from a path, the clipboard or inline
//! base64, plus read and write tools for projects and their resources.

pub mod args;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod sources;
pub mod transport;

pub use handlers::ToolHandler;
pub use server::McpServer;
