//! Core traits, types, and error handling for redmine-tools.
//!
//! This crate provides the foundational abstractions shared by the REST
//! client, the output formatters and the MCP server.

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use error::{Error, Result};
pub use provider::{
    AttachmentProvider, CatalogProvider, IssueProvider, ProjectProvider, Provider,
};
pub use types::*;
