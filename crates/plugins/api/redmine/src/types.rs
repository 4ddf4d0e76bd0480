//! Redmine JSON envelopes.
//!
//! Redmine wraps every payload in a key named after the resource
//! (`{"attachment": {...}}`, `{"trackers": [...]}`). These types strip
//! that wrapping; the payloads themselves are the `redmine-core` types.

use redmine_core::{
    Attachment, CreateMembershipInput, Enumeration, Issue, IssueCategory, IssueCategoryInput,
    IssueStatus, Membership, Page, Pagination, Project, Role, TimeEntry, Tracker,
    UpdateAttachmentInput, User, Version, VersionInput,
};
use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_LIMIT;

// =============================================================================
// Pagination
// =============================================================================

/// Paging fields Redmine adds next to list payloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl PageMeta {
    /// Combine with the items; missing fields fall back to what was requested.
    pub fn into_page<T>(self, items: Vec<T>, requested: Pagination) -> Page<T> {
        Page {
            total_count: self.total_count.unwrap_or(items.len() as u64),
            offset: self
                .offset
                .or(requested.offset.map(u64::from))
                .unwrap_or(0),
            limit: self
                .limit
                .or(requested.limit.map(u64::from))
                .unwrap_or(DEFAULT_PAGE_LIMIT),
            items,
        }
    }
}

// =============================================================================
// Attachments
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AttachmentResponse {
    pub attachment: Attachment,
}

#[derive(Debug, Serialize)]
pub struct UpdateAttachmentRequest {
    pub attachment: UpdateAttachmentInput,
}

/// Body of `POST /uploads.json`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub upload: UploadedFile,
}

#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub token: String,
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct TrackerList {
    pub trackers: Vec<Tracker>,
}

#[derive(Debug, Deserialize)]
pub struct IssueStatusList {
    pub issue_statuses: Vec<IssueStatus>,
}

#[derive(Debug, Deserialize)]
pub struct IssuePriorityList {
    pub issue_priorities: Vec<Enumeration>,
}

#[derive(Debug, Deserialize)]
pub struct TimeEntryActivityList {
    pub time_entry_activities: Vec<Enumeration>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentCategoryList {
    pub document_categories: Vec<Enumeration>,
}

#[derive(Debug, Deserialize)]
pub struct RoleList {
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize)]
pub struct RoleResponse {
    pub role: Role,
}

// =============================================================================
// Projects and project-scoped resources
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProjectList {
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Deserialize)]
pub struct VersionList {
    pub versions: Vec<Version>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VersionEnvelope<T> {
    pub version: T,
}

#[derive(Debug, Deserialize)]
pub struct MembershipList {
    pub memberships: Vec<Membership>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct MembershipResponse {
    pub membership: Membership,
}

#[derive(Debug, Serialize)]
pub struct CreateMembershipRequest {
    pub membership: CreateMembershipInput,
}

#[derive(Debug, Serialize)]
pub struct UpdateMembershipRequest {
    pub membership: MembershipRoles,
}

#[derive(Debug, Serialize)]
pub struct MembershipRoles {
    pub role_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct IssueCategoryList {
    pub issue_categories: Vec<IssueCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssueCategoryEnvelope<T> {
    pub issue_category: T,
}

/// Request bodies for versions and issue categories.
pub type VersionRequest = VersionEnvelope<VersionInput>;
pub type IssueCategoryRequest = IssueCategoryEnvelope<IssueCategoryInput>;

// =============================================================================
// Issues, users, time entries
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct IssueList {
    pub issues: Vec<Issue>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct IssueResponse {
    pub issue: Issue,
}

#[derive(Debug, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct TimeEntryList {
    pub time_entries: Vec<TimeEntry>,
    #[serde(flatten)]
    pub meta: PageMeta,
}
