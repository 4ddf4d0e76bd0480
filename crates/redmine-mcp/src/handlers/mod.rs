//! Tool handlers for the MCP server.
//!
//! [`ToolHandler::execute`] resolves the tool in the registry, parses its
//! arguments, calls the provider and renders the result. Every failure is
//! turned into an error result here; nothing propagates to the protocol
//! layer.

mod attachments;
mod catalog;
#[cfg(test)]
mod fake;
mod issues;
mod projects;

use std::sync::Arc;

use redmine_core::{Provider, Result};
use serde_json::Value;
use tracing::warn;

use crate::args::{
    self, CreateIssueCategoryArgs, CreateMembershipArgs, CreateVersionArgs,
    DeleteIssueCategoryArgs, IdArgs, ListMembershipsArgs, PageArgs, ProjectArgs,
    UpdateAttachmentArgs, UpdateIssueCategoryArgs, UpdateMembershipArgs, UpdateVersionArgs,
    UploadArgs, UploadFromClipboardArgs, UploadFromPathArgs, UserArgs,
};
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::registry::{self, Tool};
use crate::sources::{ClipboardCapture, ClipboardSource};

/// Executes tools against a Redmine provider.
pub struct ToolHandler {
    provider: Arc<dyn Provider>,
    clipboard: Arc<dyn ClipboardSource>,
}

impl ToolHandler {
    /// Handler using the PowerShell clipboard capture.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            clipboard: Arc::new(ClipboardCapture::powershell()),
        }
    }

    /// Replace the clipboard source.
    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSource>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        registry::definitions()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let Some(tool) = Tool::from_name(name) else {
            warn!(tool = name, "unknown tool");
            return ToolCallResult::error(format!("Unknown tool: {}", name));
        };

        match self.dispatch(tool, arguments.as_ref()).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                ToolCallResult::error(e.to_string())
            }
        }
    }

    async fn dispatch(&self, tool: Tool, a: Option<&Value>) -> Result<ToolCallResult> {
        let p = &*self.provider;
        match tool {
            Tool::DownloadAttachment => attachments::download(p, IdArgs::parse(a)?).await,
            Tool::UploadFileFromPath => {
                attachments::upload_from_path(p, UploadFromPathArgs::parse(a)?).await
            }
            Tool::UploadFileFromClipboard => {
                let args = UploadFromClipboardArgs::parse(a)?;
                attachments::upload_from_clipboard(p, &*self.clipboard, args).await
            }
            Tool::UploadFile => attachments::upload(p, UploadArgs::parse(a)?).await,
            Tool::GetAttachment => attachments::get(p, IdArgs::parse(a)?).await,
            Tool::UpdateAttachment => attachments::update(p, UpdateAttachmentArgs::parse(a)?).await,
            Tool::DeleteAttachment => attachments::delete(p, IdArgs::parse(a)?).await,

            Tool::ListTrackers => {
                args::no_args(a)?;
                catalog::trackers(p).await
            }
            Tool::ListIssueStatuses => {
                args::no_args(a)?;
                catalog::issue_statuses(p).await
            }
            Tool::ListIssuePriorities => {
                args::no_args(a)?;
                catalog::issue_priorities(p).await
            }
            Tool::ListTimeEntryActivities => {
                args::no_args(a)?;
                catalog::time_entry_activities(p).await
            }
            Tool::ListDocumentCategories => {
                args::no_args(a)?;
                catalog::document_categories(p).await
            }
            Tool::ListRoles => {
                args::no_args(a)?;
                catalog::roles(p).await
            }
            Tool::ShowRole => catalog::role(p, IdArgs::parse(a)?).await,

            Tool::ListProjects => projects::list_projects(p, PageArgs::parse(a)?).await,
            Tool::ShowProject => projects::show_project(p, ProjectArgs::parse(a)?).await,
            Tool::ListVersions => projects::list_versions(p, ProjectArgs::parse(a)?).await,
            Tool::ShowVersion => projects::show_version(p, IdArgs::parse(a)?).await,
            Tool::CreateVersion => projects::create_version(p, CreateVersionArgs::parse(a)?).await,
            Tool::UpdateVersion => projects::update_version(p, UpdateVersionArgs::parse(a)?).await,
            Tool::DeleteVersion => projects::delete_version(p, IdArgs::parse(a)?).await,
            Tool::ListMemberships => {
                projects::list_memberships(p, ListMembershipsArgs::parse(a)?).await
            }
            Tool::ShowMembership => projects::show_membership(p, IdArgs::parse(a)?).await,
            Tool::CreateMembership => {
                projects::create_membership(p, CreateMembershipArgs::parse(a)?).await
            }
            Tool::UpdateMembership => {
                projects::update_membership(p, UpdateMembershipArgs::parse(a)?).await
            }
            Tool::DeleteMembership => projects::delete_membership(p, IdArgs::parse(a)?).await,
            Tool::ListIssueCategories => {
                projects::list_issue_categories(p, ProjectArgs::parse(a)?).await
            }
            Tool::ShowIssueCategory => projects::show_issue_category(p, IdArgs::parse(a)?).await,
            Tool::CreateIssueCategory => {
                projects::create_issue_category(p, CreateIssueCategoryArgs::parse(a)?).await
            }
            Tool::UpdateIssueCategory => {
                projects::update_issue_category(p, UpdateIssueCategoryArgs::parse(a)?).await
            }
            Tool::DeleteIssueCategory => {
                projects::delete_issue_category(p, DeleteIssueCategoryArgs::parse(a)?).await
            }

            Tool::ListIssues => issues::list_issues(p, args::parse_issue_filter(a)?).await,
            Tool::ShowIssue => issues::show_issue(p, IdArgs::parse(a)?).await,
            Tool::ListUsers => issues::list_users(p, PageArgs::parse(a)?).await,
            Tool::ShowUser => issues::show_user(p, UserArgs::parse(a)?).await,
            Tool::ListTimeEntries => {
                issues::list_time_entries(p, args::parse_time_entry_filter(a)?).await
            }
        }
    }
}
