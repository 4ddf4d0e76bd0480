//! In-memory provider and clipboard for handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use redmine_core::{
    Attachment, AttachmentProvider, CatalogProvider, CreateMembershipInput, Enumeration, Error,
    Issue, IssueCategory, IssueCategoryInput, IssueFilter, IssueProvider, IssueStatus, Membership,
    MembershipRole, NamedRef, Page, Pagination, Project, ProjectProvider, Result, Role, TimeEntry,
    TimeEntryFilter, Tracker, UpdateAttachmentInput, UploadToken, User, Version, VersionInput,
    VersionSharing, VersionStatus,
};

use crate::sources::{CaptureOutcome, ClipboardSource};

pub fn attachment(id: u64, filename: &str, content_type: &str) -> Attachment {
    Attachment {
        id,
        filename: filename.into(),
        filesize: 1024,
        content_type: content_type.into(),
        description: None,
        author: None,
        created_on: None,
        content_url: format!("https://redmine.test/attachments/download/{}/{}", id, filename),
        thumbnail_url: None,
    }
}

fn named(id: u64, name: &str) -> NamedRef {
    NamedRef {
        id,
        name: name.into(),
    }
}

fn page<T>(items: Vec<T>, requested: Pagination) -> Page<T> {
    Page {
        total_count: items.len() as u64,
        offset: u64::from(requested.offset.unwrap_or(0)),
        limit: u64::from(requested.limit.unwrap_or(25)),
        items,
    }
}

fn version(id: u64, input: &VersionInput) -> Version {
    Version {
        id,
        project: named(1, "Web"),
        name: input.name.clone().unwrap_or_else(|| "1.0".into()),
        description: input.description.clone(),
        status: input.status.unwrap_or(VersionStatus::Open),
        due_date: input.due_date.clone(),
        sharing: input.sharing.unwrap_or(VersionSharing::None),
        wiki_page_title: input.wiki_page_title.clone(),
        estimated_hours: None,
        spent_hours: None,
        created_on: None,
        updated_on: None,
    }
}

fn membership(id: u64, role_ids: &[u64]) -> Membership {
    Membership {
        id,
        project: named(1, "Web"),
        user: Some(named(5, "Jane Doe")),
        group: None,
        roles: role_ids
            .iter()
            .map(|id| MembershipRole {
                id: *id,
                name: format!("Role {}", id),
                inherited: false,
            })
            .collect(),
    }
}

fn category(id: u64, input: &IssueCategoryInput) -> IssueCategory {
    IssueCategory {
        id,
        project: named(1, "Web"),
        name: input.name.clone().unwrap_or_else(|| "UI".into()),
        assigned_to: input.assigned_to_id.map(|id| named(id, "Jane Doe")),
    }
}

/// Provider backed by maps. Counts every call so tests can assert that
/// validation failures never reach it.
#[derive(Default)]
pub struct FakeProvider {
    attachments: Mutex<HashMap<u64, (Attachment, Vec<u8>)>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    deleted: Mutex<Vec<String>>,
    fail_downloads: Mutex<bool>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attachment(&self, attachment: Attachment, content: Vec<u8>) {
        self.attachments
            .lock()
            .unwrap()
            .insert(attachment.id, (attachment, content));
    }

    pub fn fail_downloads(&self) {
        *self.fail_downloads.lock().unwrap() = true;
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn record_delete(&self, what: String) {
        self.deleted.lock().unwrap().push(what);
    }
}

#[async_trait]
impl AttachmentProvider for FakeProvider {
    async fn get_attachment(&self, id: u64) -> Result<Attachment> {
        self.hit();
        self.attachments
            .lock()
            .unwrap()
            .get(&id)
            .map(|(a, _)| a.clone())
            .ok_or_else(|| Error::NotFound(format!("attachment {}", id)))
    }

    async fn download_content(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        self.hit();
        if *self.fail_downloads.lock().unwrap() {
            return Err(Error::download_failed(404, "Not Found"));
        }
        self.attachments
            .lock()
            .unwrap()
            .get(&attachment.id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| Error::download_failed(404, "Not Found"))
    }

    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<UploadToken> {
        self.hit();
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((filename.to_string(), content));
        Ok(UploadToken(format!("token-{}", uploads.len())))
    }

    async fn update_attachment(&self, id: u64, input: UpdateAttachmentInput) -> Result<()> {
        self.hit();
        let mut attachments = self.attachments.lock().unwrap();
        let (attachment, _) = attachments
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("attachment {}", id)))?;
        if let Some(filename) = input.filename {
            attachment.filename = filename;
        }
        if input.description.is_some() {
            attachment.description = input.description;
        }
        Ok(())
    }

    async fn delete_attachment(&self, id: u64) -> Result<()> {
        self.hit();
        self.attachments
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("attachment {}", id)))
    }
}

#[async_trait]
impl CatalogProvider for FakeProvider {
    async fn get_trackers(&self) -> Result<Vec<Tracker>> {
        self.hit();
        Ok(vec![Tracker {
            id: 1,
            name: "Bug".into(),
            default_status: Some(named(1, "New")),
            description: None,
            enabled_standard_fields: Vec::new(),
        }])
    }

    async fn get_issue_statuses(&self) -> Result<Vec<IssueStatus>> {
        self.hit();
        Ok(vec![IssueStatus {
            id: 5,
            name: "Closed".into(),
            is_closed: true,
        }])
    }

    async fn get_issue_priorities(&self) -> Result<Vec<Enumeration>> {
        self.hit();
        Ok(vec![Enumeration {
            id: 2,
            name: "Normal".into(),
            is_default: true,
        }])
    }

    async fn get_time_entry_activities(&self) -> Result<Vec<Enumeration>> {
        self.hit();
        Ok(vec![Enumeration {
            id: 9,
            name: "Development".into(),
            is_default: false,
        }])
    }

    async fn get_document_categories(&self) -> Result<Vec<Enumeration>> {
        self.hit();
        Ok(Vec::new())
    }

    async fn get_roles(&self) -> Result<Vec<Role>> {
        self.hit();
        Ok(vec![self.get_role(3).await?])
    }

    async fn get_role(&self, id: u64) -> Result<Role> {
        self.hit();
        Ok(Role {
            id,
            name: "Developer".into(),
            assignable: Some(true),
            issues_visibility: None,
            time_entries_visibility: None,
            users_visibility: None,
            permissions: vec!["view_issues".into()],
        })
    }
}

#[async_trait]
impl ProjectProvider for FakeProvider {
    async fn get_projects(&self, requested: Pagination) -> Result<Page<Project>> {
        self.hit();
        Ok(page(vec![self.get_project("web").await?], requested))
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        self.hit();
        Ok(Project {
            id: 1,
            name: "Web".into(),
            identifier: project_id.into(),
            description: None,
            homepage: None,
            status: Some(1),
            is_public: Some(true),
            parent: None,
            created_on: None,
            updated_on: None,
        })
    }

    async fn get_versions(&self, _project_id: &str) -> Result<Vec<Version>> {
        self.hit();
        Ok(vec![version(3, &VersionInput::default())])
    }

    async fn get_version(&self, id: u64) -> Result<Version> {
        self.hit();
        Ok(version(id, &VersionInput::default()))
    }

    async fn create_version(&self, _project_id: &str, input: VersionInput) -> Result<Version> {
        self.hit();
        Ok(version(30, &input))
    }

    async fn update_version(&self, id: u64, input: VersionInput) -> Result<Version> {
        self.hit();
        Ok(version(id, &input))
    }

    async fn delete_version(&self, id: u64) -> Result<()> {
        self.hit();
        self.record_delete(format!("version {}", id));
        Ok(())
    }

    async fn get_memberships(
        &self,
        _project_id: &str,
        requested: Pagination,
    ) -> Result<Page<Membership>> {
        self.hit();
        Ok(page(vec![membership(11, &[3])], requested))
    }

    async fn get_membership(&self, id: u64) -> Result<Membership> {
        self.hit();
        Ok(membership(id, &[3]))
    }

    async fn create_membership(
        &self,
        _project_id: &str,
        input: CreateMembershipInput,
    ) -> Result<Membership> {
        self.hit();
        Ok(membership(12, &input.role_ids))
    }

    async fn update_membership(&self, _id: u64, _role_ids: Vec<u64>) -> Result<()> {
        self.hit();
        Ok(())
    }

    async fn delete_membership(&self, id: u64) -> Result<()> {
        self.hit();
        self.record_delete(format!("membership {}", id));
        Ok(())
    }

    async fn get_issue_categories(&self, _project_id: &str) -> Result<Vec<IssueCategory>> {
        self.hit();
        Ok(vec![category(4, &IssueCategoryInput::default())])
    }

    async fn get_issue_category(&self, id: u64) -> Result<IssueCategory> {
        self.hit();
        Ok(category(id, &IssueCategoryInput::default()))
    }

    async fn create_issue_category(
        &self,
        _project_id: &str,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory> {
        self.hit();
        Ok(category(40, &input))
    }

    async fn update_issue_category(
        &self,
        id: u64,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory> {
        self.hit();
        Ok(category(id, &input))
    }

    async fn delete_issue_category(&self, id: u64, reassign_to_id: Option<u64>) -> Result<()> {
        self.hit();
        self.record_delete(format!("issue_category {} -> {:?}", id, reassign_to_id));
        Ok(())
    }
}

#[async_trait]
impl IssueProvider for FakeProvider {
    async fn get_issues(&self, filter: IssueFilter) -> Result<Page<Issue>> {
        self.hit();
        Ok(page(vec![self.get_issue(100).await?], filter.page))
    }

    async fn get_issue(&self, id: u64) -> Result<Issue> {
        self.hit();
        let attachments = self
            .attachments
            .lock()
            .unwrap()
            .values()
            .map(|(a, _)| a.clone())
            .collect();
        Ok(Issue {
            id,
            project: named(1, "Web"),
            tracker: named(1, "Bug"),
            status: named(1, "New"),
            priority: named(2, "Normal"),
            author: None,
            assigned_to: None,
            category: None,
            fixed_version: None,
            subject: "Export fails".into(),
            description: None,
            start_date: None,
            due_date: None,
            done_ratio: None,
            estimated_hours: None,
            created_on: None,
            updated_on: None,
            closed_on: None,
            attachments,
        })
    }

    async fn get_users(&self, requested: Pagination) -> Result<Page<User>> {
        self.hit();
        Ok(page(vec![self.get_user("5").await?], requested))
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        self.hit();
        Ok(User {
            id: id.parse().unwrap_or(1),
            login: Some("jane".into()),
            firstname: Some("Jane".into()),
            lastname: Some("Doe".into()),
            mail: None,
            admin: None,
            created_on: None,
            last_login_on: None,
        })
    }

    async fn get_time_entries(&self, filter: TimeEntryFilter) -> Result<Page<TimeEntry>> {
        self.hit();
        Ok(page(Vec::new(), filter.page))
    }
}

/// Clipboard returning a fixed outcome.
pub struct FakeClipboard(CaptureOutcome);

impl FakeClipboard {
    pub fn image(bytes: &[u8]) -> Self {
        Self(CaptureOutcome::Captured(bytes.to_vec()))
    }

    pub fn no_image() -> Self {
        Self(CaptureOutcome::NoImage)
    }
}

#[async_trait]
impl ClipboardSource for FakeClipboard {
    async fn capture(&self) -> Result<CaptureOutcome> {
        Ok(self.0.clone())
    }
}
