//! Static tool registry.
//!
//! Every tool the server offers is a [`Tool`] variant; `tools/list` is
//! produced by walking [`Tool::ALL`].

use serde_json::{json, Map, Value};

use crate::protocol::ToolDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    // Attachments
    DownloadAttachment,
    UploadFileFromPath,
    UploadFileFromClipboard,
    UploadFile,
    GetAttachment,
    UpdateAttachment,
    DeleteAttachment,
    // Catalog
    ListTrackers,
    ListIssueStatuses,
    ListIssuePriorities,
    ListTimeEntryActivities,
    ListDocumentCategories,
    ListRoles,
    ShowRole,
    // Projects
    ListProjects,
    ShowProject,
    // Versions
    ListVersions,
    ShowVersion,
    CreateVersion,
    UpdateVersion,
    DeleteVersion,
    // Memberships
    ListMemberships,
    ShowMembership,
    CreateMembership,
    UpdateMembership,
    DeleteMembership,
    // Issue categories
    ListIssueCategories,
    ShowIssueCategory,
    CreateIssueCategory,
    UpdateIssueCategory,
    DeleteIssueCategory,
    // Issues, users, time entries
    ListIssues,
    ShowIssue,
    ListUsers,
    ShowUser,
    ListTimeEntries,
}

impl Tool {
    pub const ALL: [Tool; 36] = [
        Tool::DownloadAttachment,
        Tool::UploadFileFromPath,
        Tool::UploadFileFromClipboard,
        Tool::UploadFile,
        Tool::GetAttachment,
        Tool::UpdateAttachment,
        Tool::DeleteAttachment,
        Tool::ListTrackers,
        Tool::ListIssueStatuses,
        Tool::ListIssuePriorities,
        Tool::ListTimeEntryActivities,
        Tool::ListDocumentCategories,
        Tool::ListRoles,
        Tool::ShowRole,
        Tool::ListProjects,
        Tool::ShowProject,
        Tool::ListVersions,
        Tool::ShowVersion,
        Tool::CreateVersion,
        Tool::UpdateVersion,
        Tool::DeleteVersion,
        Tool::ListMemberships,
        Tool::ShowMembership,
        Tool::CreateMembership,
        Tool::UpdateMembership,
        Tool::DeleteMembership,
        Tool::ListIssueCategories,
        Tool::ShowIssueCategory,
        Tool::CreateIssueCategory,
        Tool::UpdateIssueCategory,
        Tool::DeleteIssueCategory,
        Tool::ListIssues,
        Tool::ShowIssue,
        Tool::ListUsers,
        Tool::ShowUser,
        Tool::ListTimeEntries,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::DownloadAttachment => "download_attachment",
            Tool::UploadFileFromPath => "upload_file_from_path",
            Tool::UploadFileFromClipboard => "upload_file_from_clipboard",
            Tool::UploadFile => "upload_file",
            Tool::GetAttachment => "get_attachment",
            Tool::UpdateAttachment => "update_attachment",
            Tool::DeleteAttachment => "delete_attachment",
            Tool::ListTrackers => "list_trackers",
            Tool::ListIssueStatuses => "list_issue_statuses",
            Tool::ListIssuePriorities => "list_issue_priorities",
            Tool::ListTimeEntryActivities => "list_time_entry_activities",
            Tool::ListDocumentCategories => "list_document_categories",
            Tool::ListRoles => "list_roles",
            Tool::ShowRole => "show_role",
            Tool::ListProjects => "list_projects",
            Tool::ShowProject => "show_project",
            Tool::ListVersions => "list_versions",
            Tool::ShowVersion => "show_version",
            Tool::CreateVersion => "create_version",
            Tool::UpdateVersion => "update_version",
            Tool::DeleteVersion => "delete_version",
            Tool::ListMemberships => "list_memberships",
            Tool::ShowMembership => "show_membership",
            Tool::CreateMembership => "create_membership",
            Tool::UpdateMembership => "update_membership",
            Tool::DeleteMembership => "delete_membership",
            Tool::ListIssueCategories => "list_issue_categories",
            Tool::ShowIssueCategory => "show_issue_category",
            Tool::CreateIssueCategory => "create_issue_category",
            Tool::UpdateIssueCategory => "update_issue_category",
            Tool::DeleteIssueCategory => "delete_issue_category",
            Tool::ListIssues => "list_issues",
            Tool::ShowIssue => "show_issue",
            Tool::ListUsers => "list_users",
            Tool::ShowUser => "show_user",
            Tool::ListTimeEntries => "list_time_entries",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::DownloadAttachment => {
                "Download an attachment. Spreadsheets (.xlsx/.xls) are returned as parsed \
                 row records, images as an inline image, anything else as base64."
            }
            Tool::UploadFileFromPath => {
                "Upload a local file and get a token to attach it to an issue"
            }
            Tool::UploadFileFromClipboard => {
                "Upload the image currently on the clipboard (Windows only) and get a token \
                 to attach it to an issue"
            }
            Tool::UploadFile => "Upload base64-encoded content and get an attachment token",
            Tool::GetAttachment => "Get attachment metadata by ID",
            Tool::UpdateAttachment => "Change the filename and/or description of an attachment",
            Tool::DeleteAttachment => "Delete an attachment",
            Tool::ListTrackers => "List all trackers",
            Tool::ListIssueStatuses => "List all issue statuses",
            Tool::ListIssuePriorities => "List issue priorities",
            Tool::ListTimeEntryActivities => "List time entry activities",
            Tool::ListDocumentCategories => "List document categories",
            Tool::ListRoles => "List all roles",
            Tool::ShowRole => "Show a role including its permissions",
            Tool::ListProjects => "List projects",
            Tool::ShowProject => "Show a project",
            Tool::ListVersions => "List the versions of a project",
            Tool::ShowVersion => "Show a version",
            Tool::CreateVersion => "Create a version in a project",
            Tool::UpdateVersion => "Update a version",
            Tool::DeleteVersion => "Delete a version",
            Tool::ListMemberships => "List the memberships of a project",
            Tool::ShowMembership => "Show a membership",
            Tool::CreateMembership => "Add a user to a project with the given roles",
            Tool::UpdateMembership => "Replace the roles of a membership",
            Tool::DeleteMembership => "Delete a membership",
            Tool::ListIssueCategories => "List the issue categories of a project",
            Tool::ShowIssueCategory => "Show an issue category",
            Tool::CreateIssueCategory => "Create an issue category in a project",
            Tool::UpdateIssueCategory => "Update an issue category",
            Tool::DeleteIssueCategory => {
                "Delete an issue category, optionally reassigning its issues"
            }
            Tool::ListIssues => "List issues",
            Tool::ShowIssue => "Show an issue including its attachments",
            Tool::ListUsers => "List users (requires admin privileges)",
            Tool::ShowUser => "Show a user; use \"current\" for the API key owner",
            Tool::ListTimeEntries => "List time entries",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            Tool::DownloadAttachment => object(
                [("id", id("Attachment ID"))],
                &["id"],
            ),
            Tool::UploadFileFromPath => object(
                [
                    ("file_path", string("Absolute path of the file to upload")),
                    (
                        "filename",
                        string("Filename to use instead of the path's last segment"),
                    ),
                ],
                &["file_path"],
            ),
            Tool::UploadFileFromClipboard => object(
                [(
                    "filename",
                    string("Filename to use (default: clipboard-image-<timestamp>.png)"),
                )],
                &[],
            ),
            Tool::UploadFile => object(
                [
                    ("filename", string("Filename to store the upload under")),
                    ("content_base64", string("File content encoded as base64")),
                ],
                &["filename", "content_base64"],
            ),
            Tool::GetAttachment | Tool::DeleteAttachment => {
                object([("id", id("Attachment ID"))], &["id"])
            }
            Tool::UpdateAttachment => object(
                [
                    ("id", id("Attachment ID")),
                    ("filename", string("New filename")),
                    ("description", string("New description")),
                ],
                &["id"],
            ),
            Tool::ListTrackers
            | Tool::ListIssueStatuses
            | Tool::ListIssuePriorities
            | Tool::ListTimeEntryActivities
            | Tool::ListDocumentCategories
            | Tool::ListRoles => object([], &[]),
            Tool::ShowRole => object([("id", id("Role ID"))], &["id"]),
            Tool::ListProjects | Tool::ListUsers => object(pagination(), &[]),
            Tool::ShowProject => object([("project_id", project_id())], &["project_id"]),
            Tool::ListVersions | Tool::ListIssueCategories => {
                object([("project_id", project_id())], &["project_id"])
            }
            Tool::ShowVersion | Tool::DeleteVersion => {
                object([("id", id("Version ID"))], &["id"])
            }
            Tool::CreateVersion => {
                let mut props = vec![("project_id", project_id())];
                props.extend(version_fields());
                object(props, &["project_id", "name"])
            }
            Tool::UpdateVersion => {
                let mut props = vec![("id", id("Version ID"))];
                props.extend(version_fields());
                object(props, &["id"])
            }
            Tool::ListMemberships => {
                let mut props = vec![("project_id", project_id())];
                props.extend(pagination());
                object(props, &["project_id"])
            }
            Tool::ShowMembership | Tool::DeleteMembership => {
                object([("id", id("Membership ID"))], &["id"])
            }
            Tool::CreateMembership => object(
                [
                    ("project_id", project_id()),
                    ("user_id", id("User or group ID")),
                    ("role_ids", role_ids()),
                ],
                &["project_id", "user_id", "role_ids"],
            ),
            Tool::UpdateMembership => object(
                [("id", id("Membership ID")), ("role_ids", role_ids())],
                &["id", "role_ids"],
            ),
            Tool::ShowIssueCategory => object([("id", id("Issue category ID"))], &["id"]),
            Tool::CreateIssueCategory => object(
                [
                    ("project_id", project_id()),
                    ("name", string("Category name")),
                    ("assigned_to_id", id("Default assignee user ID")),
                ],
                &["project_id", "name"],
            ),
            Tool::UpdateIssueCategory => object(
                [
                    ("id", id("Issue category ID")),
                    ("name", string("Category name")),
                    ("assigned_to_id", id("Default assignee user ID")),
                ],
                &["id"],
            ),
            Tool::DeleteIssueCategory => object(
                [
                    ("id", id("Issue category ID")),
                    (
                        "reassign_to_id",
                        id("Category to move the deleted category's issues to"),
                    ),
                ],
                &["id"],
            ),
            Tool::ListIssues => {
                let mut props = vec![
                    ("project_id", project_id()),
                    (
                        "status_id",
                        string("Status ID, or \"open\", \"closed\" or \"*\""),
                    ),
                    ("tracker_id", id("Tracker ID")),
                    ("assigned_to_id", string("User ID or \"me\"")),
                ];
                props.extend(pagination());
                object(props, &[])
            }
            Tool::ShowIssue => object([("id", id("Issue ID"))], &["id"]),
            Tool::ShowUser => object(
                [(
                    "id",
                    json!({
                        "type": ["integer", "string"],
                        "description": "User ID or \"current\""
                    }),
                )],
                &["id"],
            ),
            Tool::ListTimeEntries => {
                let mut props = vec![
                    ("project_id", project_id()),
                    ("user_id", string("User ID or \"me\"")),
                    ("from", date("Earliest spent_on date (YYYY-MM-DD)")),
                    ("to", date("Latest spent_on date (YYYY-MM-DD)")),
                ];
                props.extend(pagination());
                object(props, &[])
            }
        }
    }

    pub fn definition(self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Definitions for every registered tool, in registry order.
pub fn definitions() -> Vec<ToolDefinition> {
    Tool::ALL.into_iter().map(Tool::definition).collect()
}

fn object<'a>(properties: impl IntoIterator<Item = (&'a str, Value)>, required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn id(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 1, "description": description })
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn date(description: &str) -> Value {
    json!({ "type": "string", "pattern": "^\\d{4}-\\d{2}-\\d{2}$", "description": description })
}

fn project_id() -> Value {
    json!({
        "type": ["integer", "string"],
        "description": "Project ID or identifier"
    })
}

fn role_ids() -> Value {
    json!({
        "type": "array",
        "items": { "type": "integer" },
        "minItems": 1,
        "description": "Role IDs"
    })
}

fn pagination() -> Vec<(&'static str, Value)> {
    vec![
        (
            "offset",
            json!({
                "type": "integer",
                "minimum": 0,
                "description": "Number of results to skip (default: 0)"
            }),
        ),
        (
            "limit",
            json!({
                "type": "integer",
                "minimum": 1,
                "maximum": 100,
                "description": "Maximum number of results (default: 25)"
            }),
        ),
    ]
}

fn version_fields() -> Vec<(&'static str, Value)> {
    vec![
        ("name", string("Version name")),
        (
            "status",
            json!({ "type": "string", "enum": ["open", "locked", "closed"] }),
        ),
        (
            "sharing",
            json!({
                "type": "string",
                "enum": ["none", "descendants", "hierarchy", "tree", "system"]
            }),
        ),
        ("due_date", date("Due date (YYYY-MM-DD)")),
        ("description", string("Version description")),
        ("wiki_page_title", string("Wiki page title")),
    ]
}
