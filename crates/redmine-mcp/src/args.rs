//! Validated tool arguments.
//!
//! Tool arguments arrive as untyped JSON. Each tool has a typed struct with
//! a `parse` constructor built on [`ArgReader`], which checks every field and
//! reports all violations at once as [`Error::Validation`]. Nothing reaches a
//! provider until parsing succeeded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use redmine_core::{
    CreateMembershipInput, Error, IssueCategoryInput, IssueFilter, Pagination, Result,
    TimeEntryFilter, UpdateAttachmentInput, VersionInput, VersionSharing, VersionStatus,
};
use serde_json::{Map, Value};

pub const MAX_LIMIT: u32 = 100;

/// Field reader that records violations instead of failing on the first.
///
/// Required getters return a default value when the field is invalid; the
/// value is never observed because [`ArgReader::finish`] fails in that case.
pub struct ArgReader<'a> {
    args: Option<&'a Map<String, Value>>,
    violations: Vec<String>,
}

impl<'a> ArgReader<'a> {
    /// A missing argument object is read as `{}`.
    pub fn new(arguments: Option<&'a Value>) -> Self {
        let mut violations = Vec::new();
        let args = match arguments {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                violations.push("Arguments must be an object".to_string());
                None
            }
        };
        Self { args, violations }
    }

    fn field(&self, key: &str) -> Option<&'a Value> {
        self.args
            .and_then(|args| args.get(key))
            .filter(|value| !value.is_null())
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    fn missing(&mut self, key: &str) {
        self.violation(format!("`{}` is required", key));
    }

    pub fn optional_id(&mut self, key: &str) -> Option<u64> {
        let value = self.field(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        match parsed {
            Some(id) if id > 0 => Some(id),
            _ => {
                self.violation(format!("`{}` must be a positive integer", key));
                None
            }
        }
    }

    pub fn required_id(&mut self, key: &str) -> u64 {
        if self.field(key).is_none() {
            self.missing(key);
            return 0;
        }
        self.optional_id(key).unwrap_or_default()
    }

    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.violation(format!("`{}` must be a string", key));
                None
            }
        }
    }

    /// Required string that must not be blank.
    pub fn required_string(&mut self, key: &str) -> String {
        match self.field(key) {
            None => {
                self.missing(key);
                String::new()
            }
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::String(_)) => {
                self.violation(format!("`{}` must not be empty", key));
                String::new()
            }
            Some(_) => {
                self.violation(format!("`{}` must be a string", key));
                String::new()
            }
        }
    }

    /// Required string that may be empty. `None` when missing or mistyped.
    pub fn present_string(&mut self, key: &str) -> Option<String> {
        if self.field(key).is_none() {
            self.missing(key);
            return None;
        }
        self.optional_string(key)
    }

    /// Numeric id or textual key, e.g. a project identifier or `"me"`.
    pub fn optional_key(&mut self, key: &str) -> Option<String> {
        match self.field(key)? {
            Value::Number(n) if n.is_u64() => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => {
                self.violation(format!(
                    "`{}` must be a positive integer or a non-empty string",
                    key
                ));
                None
            }
        }
    }

    pub fn required_key(&mut self, key: &str) -> String {
        if self.field(key).is_none() {
            self.missing(key);
            return String::new();
        }
        self.optional_key(key).unwrap_or_default()
    }

    pub fn optional_date(&mut self, key: &str) -> Option<String> {
        let value = self.optional_string(key)?;
        if value.len() == 10 && NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_ok() {
            Some(value)
        } else {
            self.violation(format!("`{}` must be a date in YYYY-MM-DD format", key));
            None
        }
    }

    /// Non-empty list of ids.
    pub fn required_id_list(&mut self, key: &str) -> Vec<u64> {
        let items = match self.field(key) {
            None => {
                self.missing(key);
                return Vec::new();
            }
            Some(Value::Array(items)) if !items.is_empty() => items,
            Some(_) => {
                self.violation(format!("`{}` must be a non-empty array of integers", key));
                return Vec::new();
            }
        };

        let ids: Vec<u64> = items
            .iter()
            .filter_map(|item| item.as_u64().filter(|id| *id > 0))
            .collect();
        if ids.len() != items.len() {
            self.violation(format!("`{}` must contain only positive integers", key));
        }
        ids
    }

    fn optional_u32(&mut self, key: &str) -> Option<u32> {
        let value = self.field(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        match parsed.and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.violation(format!("`{}` must be a non-negative integer", key));
                None
            }
        }
    }

    /// `offset` ≥ 0 and `limit` in 1..=100.
    pub fn pagination(&mut self) -> Pagination {
        let offset = self.optional_u32("offset");
        let limit = self.optional_u32("limit");
        let limit = match limit {
            Some(n) if !(1..=MAX_LIMIT).contains(&n) => {
                self.violation(format!("`limit` must be between 1 and {}", MAX_LIMIT));
                None
            }
            other => other,
        };
        Pagination { offset, limit }
    }

    /// Record a violation that involves more than one field.
    pub fn check(&mut self, ok: bool, message: &str) {
        if !ok {
            self.violation(message.to_string());
        }
    }

    /// Hand back `value`, or every recorded violation.
    pub fn finish<T>(self, value: T) -> Result<T> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation(self.violations.join("; ")))
        }
    }
}

// =============================================================================
// Shared shapes
// =============================================================================

/// `{ id }` for single-resource tools.
#[derive(Debug, Clone, PartialEq)]
pub struct IdArgs {
    pub id: u64,
}

impl IdArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        r.finish(Self { id })
    }
}

/// `{ project_id }`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectArgs {
    pub project_id: String,
}

impl ProjectArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let project_id = r.required_key("project_id");
        r.finish(Self { project_id })
    }
}

/// `{ offset?, limit? }`
#[derive(Debug, Clone, PartialEq)]
pub struct PageArgs {
    pub page: Pagination,
}

impl PageArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let page = r.pagination();
        r.finish(Self { page })
    }
}

/// Tools without arguments still reject a non-object.
pub fn no_args(arguments: Option<&Value>) -> Result<()> {
    ArgReader::new(arguments).finish(())
}

// =============================================================================
// Attachments
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFromPathArgs {
    pub file_path: String,
    pub filename: Option<String>,
}

impl UploadFromPathArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let file_path = r.required_string("file_path");
        let filename = r.optional_string("filename");
        r.finish(Self {
            file_path,
            filename,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFromClipboardArgs {
    pub filename: Option<String>,
}

impl UploadFromClipboardArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let filename = r.optional_string("filename");
        r.finish(Self { filename })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadArgs {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let filename = r.required_string("filename");
        // Empty content is a zero-byte file.
        let content = match r.present_string("content_base64") {
            Some(encoded) => match STANDARD.decode(encoded.trim()) {
                Ok(bytes) => bytes,
                Err(_) => {
                    r.check(false, "`content_base64` is not valid base64");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        r.finish(Self { filename, content })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttachmentArgs {
    pub id: u64,
    pub input: UpdateAttachmentInput,
}

impl UpdateAttachmentArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        let input = UpdateAttachmentInput {
            filename: r.optional_string("filename"),
            description: r.optional_string("description"),
        };
        r.check(
            !input.is_empty(),
            "at least one of `filename` or `description` is required",
        );
        r.finish(Self { id, input })
    }
}

// =============================================================================
// Versions
// =============================================================================

fn version_input(r: &mut ArgReader<'_>) -> VersionInput {
    let status = r.optional_string("status").and_then(|s| {
        let parsed = VersionStatus::parse(&s);
        r.check(
            parsed.is_some(),
            &format!("`status` must be one of: {}", VersionStatus::ALL.join(", ")),
        );
        parsed
    });
    let sharing = r.optional_string("sharing").and_then(|s| {
        let parsed = VersionSharing::parse(&s);
        r.check(
            parsed.is_some(),
            &format!("`sharing` must be one of: {}", VersionSharing::ALL.join(", ")),
        );
        parsed
    });
    VersionInput {
        name: None,
        status,
        sharing,
        due_date: r.optional_date("due_date"),
        description: r.optional_string("description"),
        wiki_page_title: r.optional_string("wiki_page_title"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateVersionArgs {
    pub project_id: String,
    pub input: VersionInput,
}

impl CreateVersionArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let project_id = r.required_key("project_id");
        let name = r.required_string("name");
        let input = VersionInput {
            name: Some(name),
            ..version_input(&mut r)
        };
        r.finish(Self { project_id, input })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateVersionArgs {
    pub id: u64,
    pub input: VersionInput,
}

impl UpdateVersionArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        let name = r.optional_string("name");
        let input = VersionInput {
            name,
            ..version_input(&mut r)
        };
        r.finish(Self { id, input })
    }
}

// =============================================================================
// Memberships
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ListMembershipsArgs {
    pub project_id: String,
    pub page: Pagination,
}

impl ListMembershipsArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let project_id = r.required_key("project_id");
        let page = r.pagination();
        r.finish(Self { project_id, page })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMembershipArgs {
    pub project_id: String,
    pub input: CreateMembershipInput,
}

impl CreateMembershipArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let project_id = r.required_key("project_id");
        let user_id = r.required_id("user_id");
        let role_ids = r.required_id_list("role_ids");
        r.finish(Self {
            project_id,
            input: CreateMembershipInput { user_id, role_ids },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateMembershipArgs {
    pub id: u64,
    pub role_ids: Vec<u64>,
}

impl UpdateMembershipArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        let role_ids = r.required_id_list("role_ids");
        r.finish(Self { id, role_ids })
    }
}

// =============================================================================
// Issue categories
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIssueCategoryArgs {
    pub project_id: String,
    pub input: IssueCategoryInput,
}

impl CreateIssueCategoryArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let project_id = r.required_key("project_id");
        let name = r.required_string("name");
        let assigned_to_id = r.optional_id("assigned_to_id");
        r.finish(Self {
            project_id,
            input: IssueCategoryInput {
                name: Some(name),
                assigned_to_id,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIssueCategoryArgs {
    pub id: u64,
    pub input: IssueCategoryInput,
}

impl UpdateIssueCategoryArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        let input = IssueCategoryInput {
            name: r.optional_string("name"),
            assigned_to_id: r.optional_id("assigned_to_id"),
        };
        r.finish(Self { id, input })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteIssueCategoryArgs {
    pub id: u64,
    pub reassign_to_id: Option<u64>,
}

impl DeleteIssueCategoryArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_id("id");
        let reassign_to_id = r.optional_id("reassign_to_id");
        r.finish(Self { id, reassign_to_id })
    }
}

// =============================================================================
// Issues, users, time entries
// =============================================================================

pub fn parse_issue_filter(arguments: Option<&Value>) -> Result<IssueFilter> {
    let mut r = ArgReader::new(arguments);
    let filter = IssueFilter {
        project_id: r.optional_key("project_id"),
        status_id: r.optional_key("status_id"),
        tracker_id: r.optional_id("tracker_id"),
        assigned_to_id: r.optional_key("assigned_to_id"),
        page: r.pagination(),
    };
    r.finish(filter)
}

pub fn parse_time_entry_filter(arguments: Option<&Value>) -> Result<TimeEntryFilter> {
    let mut r = ArgReader::new(arguments);
    let filter = TimeEntryFilter {
        project_id: r.optional_key("project_id"),
        user_id: r.optional_key("user_id"),
        from: r.optional_date("from"),
        to: r.optional_date("to"),
        page: r.pagination(),
    };
    r.finish(filter)
}

/// `{ id }` where id is a user id or `"current"`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserArgs {
    pub id: String,
}

impl UserArgs {
    pub fn parse(arguments: Option<&Value>) -> Result<Self> {
        let mut r = ArgReader::new(arguments);
        let id = r.required_key("id");
        r.check(
            id.is_empty() || id == "current" || id.parse::<u64>().is_ok(),
            "`id` must be a user ID or \"current\"",
        );
        r.finish(Self { id })
    }
}
