//! Issues, users and time entries.

use redmine_core::{Issue, Page, TimeEntry, User};

use crate::projects::page_attrs;
use crate::xml::{empty_list, escape_xml, format_file_size, optional_element, ref_element};

pub fn format_issues(page: &Page<Issue>) -> String {
    if page.items.is_empty() {
        return empty_list("issues", "issues");
    }

    let mut out = format!("<issues {}>\n", page_attrs(page));
    for issue in &page.items {
        out.push_str(&format!(
            "  <issue id=\"{}\" tracker=\"{}\" status=\"{}\" priority=\"{}\">\n",
            issue.id,
            escape_xml(&issue.tracker.name),
            escape_xml(&issue.status.name),
            escape_xml(&issue.priority.name)
        ));
        out.push_str(&format!(
            "    <subject>{}</subject>\n",
            escape_xml(&issue.subject)
        ));
        out.push_str(&format!(
            "    <project>{}</project>\n",
            escape_xml(&issue.project.name)
        ));
        if let Some(assignee) = &issue.assigned_to {
            out.push_str(&format!(
                "    <assigned_to>{}</assigned_to>\n",
                escape_xml(&assignee.name)
            ));
        }
        optional_element(&mut out, 4, "updated_on", issue.updated_on.as_deref());
        out.push_str("  </issue>\n");
    }
    out.push_str("</issues>");
    out
}

/// Issue detail including attachment ids usable with `download_attachment`.
pub fn format_issue(issue: &Issue) -> String {
    let mut out = format!("<issue id=\"{}\">\n", issue.id);
    out.push_str(&format!("  <subject>{}</subject>\n", escape_xml(&issue.subject)));
    ref_element(&mut out, 2, "project", issue.project.id, &issue.project.name);
    ref_element(&mut out, 2, "tracker", issue.tracker.id, &issue.tracker.name);
    ref_element(&mut out, 2, "status", issue.status.id, &issue.status.name);
    ref_element(&mut out, 2, "priority", issue.priority.id, &issue.priority.name);
    for (tag, reference) in [
        ("author", &issue.author),
        ("assigned_to", &issue.assigned_to),
        ("category", &issue.category),
        ("fixed_version", &issue.fixed_version),
    ] {
        if let Some(r) = reference {
            ref_element(&mut out, 2, tag, r.id, &r.name);
        }
    }
    optional_element(&mut out, 2, "description", issue.description.as_deref());
    optional_element(&mut out, 2, "start_date", issue.start_date.as_deref());
    optional_element(&mut out, 2, "due_date", issue.due_date.as_deref());
    if let Some(done) = issue.done_ratio {
        out.push_str(&format!("  <done_ratio>{}</done_ratio>\n", done));
    }
    if let Some(hours) = issue.estimated_hours {
        out.push_str(&format!("  <estimated_hours>{}</estimated_hours>\n", hours));
    }
    optional_element(&mut out, 2, "created_on", issue.created_on.as_deref());
    optional_element(&mut out, 2, "updated_on", issue.updated_on.as_deref());
    optional_element(&mut out, 2, "closed_on", issue.closed_on.as_deref());

    if !issue.attachments.is_empty() {
        out.push_str(&format!(
            "  <attachments count=\"{}\">\n",
            issue.attachments.len()
        ));
        for attachment in &issue.attachments {
            out.push_str(&format!(
                "    <attachment id=\"{}\" content_type=\"{}\" filesize=\"{}\">{}</attachment>\n",
                attachment.id,
                escape_xml(&attachment.content_type),
                format_file_size(attachment.filesize),
                escape_xml(&attachment.filename)
            ));
        }
        out.push_str("  </attachments>\n");
    }
    out.push_str("</issue>");
    out
}

pub fn format_users(page: &Page<User>) -> String {
    if page.items.is_empty() {
        return empty_list("users", "users");
    }

    let mut out = format!("<users {}>\n", page_attrs(page));
    for user in &page.items {
        let login = user.login.as_deref().unwrap_or_default();
        out.push_str(&format!(
            "  <user id=\"{}\" login=\"{}\">{}</user>\n",
            user.id,
            escape_xml(login),
            escape_xml(&user.display_name())
        ));
    }
    out.push_str("</users>");
    out
}

pub fn format_user(user: &User) -> String {
    let mut out = format!("<user id=\"{}\">\n", user.id);
    out.push_str(&format!("  <name>{}</name>\n", escape_xml(&user.display_name())));
    optional_element(&mut out, 2, "login", user.login.as_deref());
    optional_element(&mut out, 2, "mail", user.mail.as_deref());
    if let Some(admin) = user.admin {
        out.push_str(&format!("  <admin>{}</admin>\n", admin));
    }
    optional_element(&mut out, 2, "created_on", user.created_on.as_deref());
    optional_element(&mut out, 2, "last_login_on", user.last_login_on.as_deref());
    out.push_str("</user>");
    out
}

pub fn format_time_entries(page: &Page<TimeEntry>) -> String {
    if page.items.is_empty() {
        return empty_list("time_entries", "time entries");
    }

    let mut out = format!("<time_entries {}>\n", page_attrs(page));
    for entry in &page.items {
        out.push_str(&format!(
            "  <time_entry id=\"{}\" hours=\"{}\" spent_on=\"{}\">\n",
            entry.id, entry.hours, entry.spent_on
        ));
        ref_element(&mut out, 4, "project", entry.project.id, &entry.project.name);
        if let Some(issue) = &entry.issue {
            out.push_str(&format!("    <issue id=\"{}\"/>\n", issue.id));
        }
        ref_element(&mut out, 4, "user", entry.user.id, &entry.user.name);
        ref_element(&mut out, 4, "activity", entry.activity.id, &entry.activity.name);
        optional_element(&mut out, 4, "comments", entry.comments.as_deref());
        out.push_str("  </time_entry>\n");
    }
    out.push_str("</time_entries>");
    out
}
