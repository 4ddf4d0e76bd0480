//! Trackers, statuses, enumerations and roles.

use redmine_core::{Enumeration, IssueStatus, Role, Tracker};

use crate::xml::{empty_list, escape_xml, optional_element, ref_element};

pub fn format_trackers(trackers: &[Tracker]) -> String {
    if trackers.is_empty() {
        return empty_list("trackers", "trackers");
    }

    let mut out = format!("<trackers count=\"{}\">\n", trackers.len());
    for tracker in trackers {
        out.push_str(&format!("  <tracker id=\"{}\">\n", tracker.id));
        out.push_str(&format!("    <name>{}</name>\n", escape_xml(&tracker.name)));
        if let Some(status) = &tracker.default_status {
            ref_element(&mut out, 4, "default_status", status.id, &status.name);
        }
        optional_element(&mut out, 4, "description", tracker.description.as_deref());
        let fields = tracker.enabled_standard_fields.join(", ");
        optional_element(&mut out, 4, "enabled_standard_fields", Some(fields.as_str()));
        out.push_str("  </tracker>\n");
    }
    out.push_str("</trackers>");
    out
}

pub fn format_issue_statuses(statuses: &[IssueStatus]) -> String {
    if statuses.is_empty() {
        return empty_list("issue_statuses", "issue statuses");
    }

    let lines: Vec<String> = statuses
        .iter()
        .map(|s| {
            format!(
                "  <status id=\"{}\" is_closed=\"{}\">{}</status>",
                s.id,
                s.is_closed,
                escape_xml(&s.name)
            )
        })
        .collect();
    format!(
        "<issue_statuses count=\"{}\">\n{}\n</issue_statuses>",
        statuses.len(),
        lines.join("\n")
    )
}

pub fn format_issue_priorities(items: &[Enumeration]) -> String {
    format_enumerations(items, "issue_priorities", "priority")
}

pub fn format_time_entry_activities(items: &[Enumeration]) -> String {
    format_enumerations(items, "time_entry_activities", "activity")
}

pub fn format_document_categories(items: &[Enumeration]) -> String {
    format_enumerations(items, "document_categories", "category")
}

fn format_enumerations(items: &[Enumeration], root: &str, item: &str) -> String {
    if items.is_empty() {
        return empty_list(root, "items");
    }

    let lines: Vec<String> = items
        .iter()
        .map(|e| {
            format!(
                "  <{item} id=\"{}\" is_default=\"{}\">{}</{item}>",
                e.id,
                e.is_default,
                escape_xml(&e.name),
                item = item
            )
        })
        .collect();
    format!(
        "<{root} count=\"{}\">\n{}\n</{root}>",
        items.len(),
        lines.join("\n"),
        root = root
    )
}

pub fn format_roles(roles: &[Role]) -> String {
    if roles.is_empty() {
        return empty_list("roles", "roles");
    }

    let lines: Vec<String> = roles
        .iter()
        .map(|r| format!("  <role id=\"{}\">{}</role>", r.id, escape_xml(&r.name)))
        .collect();
    format!(
        "<roles count=\"{}\">\n{}\n</roles>",
        roles.len(),
        lines.join("\n")
    )
}

/// Role with visibility settings and permissions.
pub fn format_role(role: &Role) -> String {
    let mut out = format!("<role id=\"{}\">\n", role.id);
    out.push_str(&format!("  <name>{}</name>\n", escape_xml(&role.name)));
    if let Some(assignable) = role.assignable {
        out.push_str(&format!("  <assignable>{}</assignable>\n", assignable));
    }
    optional_element(&mut out, 2, "issues_visibility", role.issues_visibility.as_deref());
    optional_element(
        &mut out,
        2,
        "time_entries_visibility",
        role.time_entries_visibility.as_deref(),
    );
    optional_element(&mut out, 2, "users_visibility", role.users_visibility.as_deref());
    if !role.permissions.is_empty() {
        out.push_str("  <permissions>\n");
        for permission in &role.permissions {
            out.push_str(&format!(
                "    <permission>{}</permission>\n",
                escape_xml(permission)
            ));
        }
        out.push_str("  </permissions>\n");
    }
    out.push_str("</role>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use redmine_core::NamedRef;

    #[test]
    fn test_format_trackers() {
        let trackers = vec![Tracker {
            id: 1,
            name: "Bug".into(),
            default_status: Some(NamedRef {
                id: 1,
                name: "New".into(),
            }),
            description: None,
            enabled_standard_fields: vec!["assigned_to_id".into(), "due_date".into()],
        }];
        let text = format_trackers(&trackers);
        assert!(text.starts_with("<trackers count=\"1\">\n  <tracker id=\"1\">"));
        assert!(text.contains("<default_status id=\"1\">New</default_status>"));
        assert!(text.contains("<enabled_standard_fields>assigned_to_id, due_date</enabled_standard_fields>"));
        assert!(text.ends_with("  </tracker>\n</trackers>"));

        assert_eq!(format_trackers(&[]), "<trackers>No trackers found</trackers>");
    }

    #[test]
    fn test_format_enumerations() {
        let items = vec![
            Enumeration {
                id: 1,
                name: "Low".into(),
                is_default: false,
            },
            Enumeration {
                id: 2,
                name: "Normal".into(),
                is_default: true,
            },
        ];
        assert_eq!(
            format_issue_priorities(&items),
            "<issue_priorities count=\"2\">\n  <priority id=\"1\" is_default=\"false\">Low</priority>\n  <priority id=\"2\" is_default=\"true\">Normal</priority>\n</issue_priorities>"
        );
        assert_eq!(
            format_document_categories(&[]),
            "<document_categories>No items found</document_categories>"
        );
    }

    #[test]
    fn test_format_issue_statuses() {
        let statuses = vec![IssueStatus {
            id: 5,
            name: "Closed".into(),
            is_closed: true,
        }];
        assert!(format_issue_statuses(&statuses)
            .contains("<status id=\"5\" is_closed=\"true\">Closed</status>"));
    }

    #[test]
    fn test_format_role() {
        let role = Role {
            id: 3,
            name: "Developer".into(),
            assignable: Some(true),
            issues_visibility: Some("default".into()),
            time_entries_visibility: None,
            users_visibility: None,
            permissions: vec!["view_issues".into(), "add_issues".into()],
        };
        let text = format_role(&role);
        assert!(text.contains("<assignable>true</assignable>"));
        assert!(text.contains("<issues_visibility>default</issues_visibility>"));
        assert!(!text.contains("users_visibility"));
        assert!(text.contains("    <permission>add_issues</permission>\n"));
    }
}
