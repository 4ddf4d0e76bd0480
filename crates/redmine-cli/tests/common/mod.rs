//! Shared setup for the end-to-end tests.
//!
//! Each test starts its own [`MockServer`] and drives a [`ToolHandler`]
//! backed by a real [`RedmineClient`], so requests go through the full
//! argument, HTTP and rendering path.

use std::sync::Arc;

use httpmock::MockServer;
use redmine_api::RedmineClient;
use redmine_mcp::protocol::{ToolCallResult, ToolResultContent};
use redmine_mcp::ToolHandler;

pub const API_KEY: &str = "e2e-api-key";

/// Handler talking to the mock Redmine instance.
pub fn handler(server: &MockServer) -> ToolHandler {
    let client = RedmineClient::new(server.base_url(), API_KEY).expect("client");
    ToolHandler::new(Arc::new(client))
}

/// Attachment metadata as Redmine returns it.
pub fn attachment_json(
    server: &MockServer,
    id: u64,
    filename: &str,
    content_type: &str,
    filesize: u64,
) -> serde_json::Value {
    serde_json::json!({
        "attachment": {
            "id": id,
            "filename": filename,
            "filesize": filesize,
            "content_type": content_type,
            "description": "",
            "content_url": server.url(format!("/attachments/download/{}/{}", id, filename)),
            "author": {"id": 1, "name": "Redmine Admin"},
            "created_on": "2024-03-01T10:00:00Z"
        }
    })
}

/// Text of the item at `index`, panicking on anything else.
pub fn text(result: &ToolCallResult, index: usize) -> &str {
    match &result.content[index] {
        ToolResultContent::Text { text } => text,
        other => panic!("expected text at {}, got {:?}", index, other),
    }
}
