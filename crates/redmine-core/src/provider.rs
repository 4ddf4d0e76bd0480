//! Provider traits for the Redmine REST API.
//!
//! The traits are split by resource family so tests can focus on the part
//! they exercise; [`Provider`] bundles all of them.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Attachment, CreateMembershipInput, Enumeration, Issue, IssueCategory, IssueCategoryInput,
    IssueFilter, IssueStatus, Membership, Page, Pagination, Project, Role, TimeEntry,
    TimeEntryFilter, Tracker, UpdateAttachmentInput, UploadToken, User, Version, VersionInput,
};

/// Attachment metadata plus raw byte transfer.
#[async_trait]
pub trait AttachmentProvider: Send + Sync {
    /// Get attachment metadata by ID.
    async fn get_attachment(&self, id: u64) -> Result<Attachment>;

    /// Fetch the attachment bytes through its `content_url`.
    async fn download_content(&self, attachment: &Attachment) -> Result<Vec<u8>>;

    /// Push raw bytes and obtain an upload token.
    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<UploadToken>;

    /// Change filename and/or description.
    async fn update_attachment(&self, id: u64, input: UpdateAttachmentInput) -> Result<()>;

    /// Delete an attachment permanently.
    async fn delete_attachment(&self, id: u64) -> Result<()>;
}

/// Instance-wide, read-only lookup lists.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn get_trackers(&self) -> Result<Vec<Tracker>>;

    async fn get_issue_statuses(&self) -> Result<Vec<IssueStatus>>;

    async fn get_issue_priorities(&self) -> Result<Vec<Enumeration>>;

    async fn get_time_entry_activities(&self) -> Result<Vec<Enumeration>>;

    async fn get_document_categories(&self) -> Result<Vec<Enumeration>>;

    async fn get_roles(&self) -> Result<Vec<Role>>;

    /// Get a single role including its permissions.
    async fn get_role(&self, id: u64) -> Result<Role>;
}

/// Projects and the resources scoped to them.
///
/// `project_id` is either the numeric id or the textual identifier.
#[async_trait]
pub trait ProjectProvider: Send + Sync {
    async fn get_projects(&self, page: Pagination) -> Result<Page<Project>>;

    async fn get_project(&self, project_id: &str) -> Result<Project>;

    async fn get_versions(&self, project_id: &str) -> Result<Vec<Version>>;

    async fn get_version(&self, id: u64) -> Result<Version>;

    async fn create_version(&self, project_id: &str, input: VersionInput) -> Result<Version>;

    async fn update_version(&self, id: u64, input: VersionInput) -> Result<Version>;

    async fn delete_version(&self, id: u64) -> Result<()>;

    async fn get_memberships(&self, project_id: &str, page: Pagination)
        -> Result<Page<Membership>>;

    async fn get_membership(&self, id: u64) -> Result<Membership>;

    async fn create_membership(
        &self,
        project_id: &str,
        input: CreateMembershipInput,
    ) -> Result<Membership>;

    async fn update_membership(&self, id: u64, role_ids: Vec<u64>) -> Result<()>;

    async fn delete_membership(&self, id: u64) -> Result<()>;

    async fn get_issue_categories(&self, project_id: &str) -> Result<Vec<IssueCategory>>;

    async fn get_issue_category(&self, id: u64) -> Result<IssueCategory>;

    async fn create_issue_category(
        &self,
        project_id: &str,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory>;

    async fn update_issue_category(
        &self,
        id: u64,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory>;

    async fn delete_issue_category(&self, id: u64, reassign_to_id: Option<u64>) -> Result<()>;
}

/// Issues, users and time entries.
#[async_trait]
pub trait IssueProvider: Send + Sync {
    async fn get_issues(&self, filter: IssueFilter) -> Result<Page<Issue>>;

    /// Get a single issue with its attachments.
    async fn get_issue(&self, id: u64) -> Result<Issue>;

    async fn get_users(&self, page: Pagination) -> Result<Page<User>>;

    /// Get a user by id, or `"current"` for the API key owner.
    async fn get_user(&self, id: &str) -> Result<User>;

    async fn get_time_entries(&self, filter: TimeEntryFilter) -> Result<Page<TimeEntry>>;
}

/// Full Redmine provider.
pub trait Provider: AttachmentProvider + CatalogProvider + ProjectProvider + IssueProvider {}

impl<T> Provider for T where T: AttachmentProvider + CatalogProvider + ProjectProvider + IssueProvider
{}
