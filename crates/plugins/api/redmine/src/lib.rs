//! Redmine REST API client for redmine-tools.
//!
//! [`RedmineClient`] implements every provider trait from `redmine-core`
//! and additionally exposes the raw byte transfer used for attachments:
//! [`RedmineClient::fetch_bytes`] and [`RedmineClient::push_bytes`].

mod client;
mod types;

pub use client::RedmineClient;
pub use types::*;

/// Header carrying the static API key on every request.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Page size Redmine applies when no `limit` is sent.
pub const DEFAULT_PAGE_LIMIT: u64 = 25;
