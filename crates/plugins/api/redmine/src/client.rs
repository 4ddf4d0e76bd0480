//! Redmine API client implementation.

use async_trait::async_trait;
use redmine_core::{
    Attachment, AttachmentProvider, CatalogProvider, CreateMembershipInput, Enumeration, Error,
    Issue, IssueCategory, IssueCategoryInput, IssueFilter, IssueProvider, IssueStatus, Membership,
    Page, Pagination, Project, ProjectProvider, Result, Role, TimeEntry, TimeEntryFilter, Tracker,
    UpdateAttachmentInput, UploadToken, User, Version, VersionInput,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{
    AttachmentResponse, CreateMembershipRequest, DocumentCategoryList, IssueCategoryEnvelope,
    IssueCategoryList, IssueList, IssuePriorityList, IssueResponse, IssueStatusList,
    MembershipList, MembershipResponse, MembershipRoles, ProjectList, ProjectResponse, RoleList,
    RoleResponse, TimeEntryActivityList, TimeEntryList, TrackerList, UpdateAttachmentRequest,
    UpdateMembershipRequest, UploadResponse, UserList, UserResponse, VersionEnvelope, VersionList,
};
use crate::API_KEY_HEADER;

type Query = Vec<(&'static str, String)>;

/// Redmine API client.
pub struct RedmineClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RedmineClient {
    /// Create a client for the Redmine instance at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("redmine-tools")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Build request with the API key header.
    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        builder.send().await.map_err(|e| Error::Http(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T> {
        let url = self.url(path);
        debug!(url = url, "Redmine GET request");

        let response = self
            .send(self.request(Method::GET, &url).query(query))
            .await?;
        self.handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!(url = url, "Redmine POST request");

        let response = self
            .send(self.request(Method::POST, &url).json(body))
            .await?;
        self.handle_response(response).await
    }

    /// PUT/PATCH with a JSON body. Redmine answers these with `204 No Content`.
    async fn write<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!(url = url, method = %method, "Redmine write request");

        let response = self.send(self.request(method, &url).json(body)).await?;
        self.handle_empty_response(response).await
    }

    async fn delete(&self, path: &str, query: &Query) -> Result<()> {
        let url = self.url(path);
        debug!(url = url, "Redmine DELETE request");

        let response = self
            .send(self.request(Method::DELETE, &url).query(query))
            .await?;
        self.handle_empty_response(response).await
    }

    /// Handle response and map errors.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await.map(|_| ())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let message = response.text().await.unwrap_or_default();
        warn!(
            status = status_code,
            message = message,
            "Redmine API error response"
        );
        Err(Error::from_status(status_code, message))
    }

    // =========================================================================
    // Binary transfer
    // =========================================================================

    /// GET the given locator verbatim and return the body bytes.
    pub async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>> {
        debug!(url = locator, "Redmine download request");

        let response = self.send(self.request(Method::GET, locator)).await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = locator, "Download failed");
            return Err(Error::download_failed(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        debug!(size = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }

    /// POST raw bytes to `/uploads.json` and return the upload token.
    pub async fn push_bytes(&self, filename: &str, content: Vec<u8>) -> Result<UploadToken> {
        let url = format!(
            "{}/uploads.json?filename={}",
            self.base_url,
            urlencoding::encode(filename)
        );
        debug!(url = url, size = content.len(), "Redmine upload request");

        let response = self
            .send(
                self.request(Method::POST, &url)
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(content),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = body, "Upload failed");
            return Err(Error::upload_failed(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                body,
            ));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse upload response: {}", e)))?;
        Ok(UploadToken(parsed.upload.token))
    }
}

fn project_path(project_id: &str, resource: &str) -> String {
    format!(
        "projects/{}/{}.json",
        urlencoding::encode(project_id),
        resource
    )
}

fn issue_query(filter: &IssueFilter) -> Query {
    let mut query = Query::new();
    if let Some(project_id) = &filter.project_id {
        query.push(("project_id", project_id.clone()));
    }
    if let Some(status_id) = &filter.status_id {
        query.push(("status_id", status_id.clone()));
    }
    if let Some(tracker_id) = filter.tracker_id {
        query.push(("tracker_id", tracker_id.to_string()));
    }
    if let Some(assigned_to_id) = &filter.assigned_to_id {
        query.push(("assigned_to_id", assigned_to_id.clone()));
    }
    query.extend(filter.page.query_pairs());
    query
}

fn time_entry_query(filter: &TimeEntryFilter) -> Query {
    let mut query = Query::new();
    if let Some(project_id) = &filter.project_id {
        query.push(("project_id", project_id.clone()));
    }
    if let Some(user_id) = &filter.user_id {
        query.push(("user_id", user_id.clone()));
    }
    if let Some(from) = &filter.from {
        query.push(("from", from.clone()));
    }
    if let Some(to) = &filter.to {
        query.push(("to", to.clone()));
    }
    query.extend(filter.page.query_pairs());
    query
}

// =============================================================================
// Provider implementations
// =============================================================================

#[async_trait]
impl AttachmentProvider for RedmineClient {
    async fn get_attachment(&self, id: u64) -> Result<Attachment> {
        let response: AttachmentResponse = self
            .get(&format!("attachments/{}.json", id), &Query::new())
            .await?;
        Ok(response.attachment)
    }

    async fn download_content(&self, attachment: &Attachment) -> Result<Vec<u8>> {
        self.fetch_bytes(&attachment.content_url).await
    }

    async fn upload(&self, filename: &str, content: Vec<u8>) -> Result<UploadToken> {
        self.push_bytes(filename, content).await
    }

    async fn update_attachment(&self, id: u64, input: UpdateAttachmentInput) -> Result<()> {
        self.write(
            Method::PATCH,
            &format!("attachments/{}.json", id),
            &UpdateAttachmentRequest { attachment: input },
        )
        .await
    }

    async fn delete_attachment(&self, id: u64) -> Result<()> {
        self.delete(&format!("attachments/{}.json", id), &Query::new())
            .await
    }
}

#[async_trait]
impl CatalogProvider for RedmineClient {
    async fn get_trackers(&self) -> Result<Vec<Tracker>> {
        let list: TrackerList = self.get("trackers.json", &Query::new()).await?;
        Ok(list.trackers)
    }

    async fn get_issue_statuses(&self) -> Result<Vec<IssueStatus>> {
        let list: IssueStatusList = self.get("issue_statuses.json", &Query::new()).await?;
        Ok(list.issue_statuses)
    }

    async fn get_issue_priorities(&self) -> Result<Vec<Enumeration>> {
        let list: IssuePriorityList = self
            .get("enumerations/issue_priorities.json", &Query::new())
            .await?;
        Ok(list.issue_priorities)
    }

    async fn get_time_entry_activities(&self) -> Result<Vec<Enumeration>> {
        let list: TimeEntryActivityList = self
            .get("enumerations/time_entry_activities.json", &Query::new())
            .await?;
        Ok(list.time_entry_activities)
    }

    async fn get_document_categories(&self) -> Result<Vec<Enumeration>> {
        let list: DocumentCategoryList = self
            .get("enumerations/document_categories.json", &Query::new())
            .await?;
        Ok(list.document_categories)
    }

    async fn get_roles(&self) -> Result<Vec<Role>> {
        let list: RoleList = self.get("roles.json", &Query::new()).await?;
        Ok(list.roles)
    }

    async fn get_role(&self, id: u64) -> Result<Role> {
        let response: RoleResponse = self
            .get(&format!("roles/{}.json", id), &Query::new())
            .await?;
        Ok(response.role)
    }
}

#[async_trait]
impl ProjectProvider for RedmineClient {
    async fn get_projects(&self, page: Pagination) -> Result<Page<Project>> {
        let list: ProjectList = self.get("projects.json", &page.query_pairs()).await?;
        Ok(list.meta.into_page(list.projects, page))
    }

    async fn get_project(&self, project_id: &str) -> Result<Project> {
        let path = format!("projects/{}.json", urlencoding::encode(project_id));
        let response: ProjectResponse = self.get(&path, &Query::new()).await?;
        Ok(response.project)
    }

    async fn get_versions(&self, project_id: &str) -> Result<Vec<Version>> {
        let list: VersionList = self
            .get(&project_path(project_id, "versions"), &Query::new())
            .await?;
        Ok(list.versions)
    }

    async fn get_version(&self, id: u64) -> Result<Version> {
        let response: VersionEnvelope<Version> = self
            .get(&format!("versions/{}.json", id), &Query::new())
            .await?;
        Ok(response.version)
    }

    async fn create_version(&self, project_id: &str, input: VersionInput) -> Result<Version> {
        let response: VersionEnvelope<Version> = self
            .post(
                &project_path(project_id, "versions"),
                &VersionEnvelope { version: input },
            )
            .await?;
        Ok(response.version)
    }

    async fn update_version(&self, id: u64, input: VersionInput) -> Result<Version> {
        self.write(
            Method::PUT,
            &format!("versions/{}.json", id),
            &VersionEnvelope { version: input },
        )
        .await?;
        self.get_version(id).await
    }

    async fn delete_version(&self, id: u64) -> Result<()> {
        self.delete(&format!("versions/{}.json", id), &Query::new())
            .await
    }

    async fn get_memberships(
        &self,
        project_id: &str,
        page: Pagination,
    ) -> Result<Page<Membership>> {
        let list: MembershipList = self
            .get(&project_path(project_id, "memberships"), &page.query_pairs())
            .await?;
        Ok(list.meta.into_page(list.memberships, page))
    }

    async fn get_membership(&self, id: u64) -> Result<Membership> {
        let response: MembershipResponse = self
            .get(&format!("memberships/{}.json", id), &Query::new())
            .await?;
        Ok(response.membership)
    }

    async fn create_membership(
        &self,
        project_id: &str,
        input: CreateMembershipInput,
    ) -> Result<Membership> {
        let response: MembershipResponse = self
            .post(
                &project_path(project_id, "memberships"),
                &CreateMembershipRequest { membership: input },
            )
            .await?;
        Ok(response.membership)
    }

    async fn update_membership(&self, id: u64, role_ids: Vec<u64>) -> Result<()> {
        self.write(
            Method::PUT,
            &format!("memberships/{}.json", id),
            &UpdateMembershipRequest {
                membership: MembershipRoles { role_ids },
            },
        )
        .await
    }

    async fn delete_membership(&self, id: u64) -> Result<()> {
        self.delete(&format!("memberships/{}.json", id), &Query::new())
            .await
    }

    async fn get_issue_categories(&self, project_id: &str) -> Result<Vec<IssueCategory>> {
        let list: IssueCategoryList = self
            .get(&project_path(project_id, "issue_categories"), &Query::new())
            .await?;
        Ok(list.issue_categories)
    }

    async fn get_issue_category(&self, id: u64) -> Result<IssueCategory> {
        let response: IssueCategoryEnvelope<IssueCategory> = self
            .get(&format!("issue_categories/{}.json", id), &Query::new())
            .await?;
        Ok(response.issue_category)
    }

    async fn create_issue_category(
        &self,
        project_id: &str,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory> {
        let response: IssueCategoryEnvelope<IssueCategory> = self
            .post(
                &project_path(project_id, "issue_categories"),
                &IssueCategoryEnvelope {
                    issue_category: input,
                },
            )
            .await?;
        Ok(response.issue_category)
    }

    async fn update_issue_category(
        &self,
        id: u64,
        input: IssueCategoryInput,
    ) -> Result<IssueCategory> {
        self.write(
            Method::PUT,
            &format!("issue_categories/{}.json", id),
            &IssueCategoryEnvelope {
                issue_category: input,
            },
        )
        .await?;
        self.get_issue_category(id).await
    }

    async fn delete_issue_category(&self, id: u64, reassign_to_id: Option<u64>) -> Result<()> {
        let query: Query = reassign_to_id
            .map(|target| vec![("reassign_to_id", target.to_string())])
            .unwrap_or_default();
        self.delete(&format!("issue_categories/{}.json", id), &query)
            .await
    }
}

#[async_trait]
impl IssueProvider for RedmineClient {
    async fn get_issues(&self, filter: IssueFilter) -> Result<Page<Issue>> {
        let list: IssueList = self.get("issues.json", &issue_query(&filter)).await?;
        Ok(list.meta.into_page(list.issues, filter.page))
    }

    async fn get_issue(&self, id: u64) -> Result<Issue> {
        let response: IssueResponse = self
            .get(
                &format!("issues/{}.json", id),
                &vec![("include", "attachments".to_string())],
            )
            .await?;
        Ok(response.issue)
    }

    async fn get_users(&self, page: Pagination) -> Result<Page<User>> {
        let list: UserList = self.get("users.json", &page.query_pairs()).await?;
        Ok(list.meta.into_page(list.users, page))
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let path = format!("users/{}.json", urlencoding::encode(id));
        let response: UserResponse = self.get(&path, &Query::new()).await?;
        Ok(response.user)
    }

    async fn get_time_entries(&self, filter: TimeEntryFilter) -> Result<Page<TimeEntry>> {
        let list: TimeEntryList = self
            .get("time_entries.json", &time_entry_query(&filter))
            .await?;
        Ok(list.meta.into_page(list.time_entries, filter.page))
    }
}
