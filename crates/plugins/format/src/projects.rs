//! Projects, versions, memberships and issue categories.

use redmine_core::{IssueCategory, Membership, Page, Project, Version};

use crate::xml::{empty_list, escape_xml, optional_element, ref_element};

/// Opening tag attributes echoing the page window.
pub(crate) fn page_attrs<T>(page: &Page<T>) -> String {
    format!(
        "count=\"{}\" total_count=\"{}\" offset=\"{}\" limit=\"{}\"",
        page.items.len(),
        page.total_count,
        page.offset,
        page.limit
    )
}

// =============================================================================
// Projects
// =============================================================================

pub fn format_projects(page: &Page<Project>) -> String {
    if page.items.is_empty() {
        return empty_list("projects", "projects");
    }

    let mut out = format!("<projects {}>\n", page_attrs(page));
    for project in &page.items {
        out.push_str(&format!(
            "  <project id=\"{}\" identifier=\"{}\">\n",
            project.id,
            escape_xml(&project.identifier)
        ));
        out.push_str(&format!("    <name>{}</name>\n", escape_xml(&project.name)));
        if let Some(parent) = &project.parent {
            ref_element(&mut out, 4, "parent", parent.id, &parent.name);
        }
        out.push_str("  </project>\n");
    }
    out.push_str("</projects>");
    out
}

pub fn format_project(project: &Project) -> String {
    let mut out = format!("<project id=\"{}\">\n", project.id);
    out.push_str(&format!("  <name>{}</name>\n", escape_xml(&project.name)));
    out.push_str(&format!(
        "  <identifier>{}</identifier>\n",
        escape_xml(&project.identifier)
    ));
    optional_element(&mut out, 2, "description", project.description.as_deref());
    optional_element(&mut out, 2, "homepage", project.homepage.as_deref());
    if let Some(status) = project.status {
        out.push_str(&format!("  <status>{}</status>\n", status));
    }
    if let Some(is_public) = project.is_public {
        out.push_str(&format!("  <is_public>{}</is_public>\n", is_public));
    }
    if let Some(parent) = &project.parent {
        ref_element(&mut out, 2, "parent", parent.id, &parent.name);
    }
    optional_element(&mut out, 2, "created_on", project.created_on.as_deref());
    optional_element(&mut out, 2, "updated_on", project.updated_on.as_deref());
    out.push_str("</project>");
    out
}

// =============================================================================
// Versions
// =============================================================================

pub fn format_versions(versions: &[Version]) -> String {
    if versions.is_empty() {
        return empty_list("versions", "versions");
    }

    let mut out = format!("<versions count=\"{}\">\n", versions.len());
    for version in versions {
        out.push_str(&format!(
            "  <version id=\"{}\" status=\"{}\">\n",
            version.id,
            version.status.as_str()
        ));
        out.push_str(&format!("    <name>{}</name>\n", escape_xml(&version.name)));
        out.push_str(&format!(
            "    <project>{}</project>\n",
            escape_xml(&version.project.name)
        ));
        optional_element(&mut out, 4, "due_date", version.due_date.as_deref());
        out.push_str("  </version>\n");
    }
    out.push_str("</versions>");
    out
}

pub fn format_version(version: &Version) -> String {
    let mut out = format!("<version id=\"{}\">\n", version.id);
    out.push_str(&format!("  <name>{}</name>\n", escape_xml(&version.name)));
    ref_element(&mut out, 2, "project", version.project.id, &version.project.name);
    out.push_str(&format!("  <status>{}</status>\n", version.status.as_str()));
    out.push_str(&format!("  <sharing>{}</sharing>\n", version.sharing.as_str()));
    optional_element(&mut out, 2, "description", version.description.as_deref());
    optional_element(&mut out, 2, "due_date", version.due_date.as_deref());
    optional_element(&mut out, 2, "wiki_page_title", version.wiki_page_title.as_deref());
    if let Some(hours) = version.estimated_hours {
        out.push_str(&format!("  <estimated_hours>{}</estimated_hours>\n", hours));
    }
    if let Some(hours) = version.spent_hours {
        out.push_str(&format!("  <spent_hours>{}</spent_hours>\n", hours));
    }
    optional_element(&mut out, 2, "created_on", version.created_on.as_deref());
    optional_element(&mut out, 2, "updated_on", version.updated_on.as_deref());
    out.push_str("</version>");
    out
}

// =============================================================================
// Memberships
// =============================================================================

pub fn format_memberships(page: &Page<Membership>) -> String {
    if page.items.is_empty() {
        return empty_list("memberships", "memberships");
    }

    let mut out = format!("<memberships {}>\n", page_attrs(page));
    for membership in &page.items {
        out.push_str(&format!("  <membership id=\"{}\">\n", membership.id));
        out.push_str(&format!(
            "    <project>{}</project>\n",
            escape_xml(&membership.project.name)
        ));
        if let Some(user) = &membership.user {
            out.push_str(&format!("    <user>{}</user>\n", escape_xml(&user.name)));
        }
        if let Some(group) = &membership.group {
            out.push_str(&format!("    <group>{}</group>\n", escape_xml(&group.name)));
        }
        let roles: Vec<&str> = membership.roles.iter().map(|r| r.name.as_str()).collect();
        out.push_str(&format!(
            "    <roles>{}</roles>\n",
            escape_xml(&roles.join(", "))
        ));
        out.push_str("  </membership>\n");
    }
    out.push_str("</memberships>");
    out
}

pub fn format_membership(membership: &Membership) -> String {
    let mut out = format!("<membership id=\"{}\">\n", membership.id);
    ref_element(
        &mut out,
        2,
        "project",
        membership.project.id,
        &membership.project.name,
    );
    if let Some(user) = &membership.user {
        ref_element(&mut out, 2, "user", user.id, &user.name);
    }
    if let Some(group) = &membership.group {
        ref_element(&mut out, 2, "group", group.id, &group.name);
    }
    out.push_str("  <roles>\n");
    for role in &membership.roles {
        let inherited = if role.inherited {
            " inherited=\"true\""
        } else {
            ""
        };
        out.push_str(&format!(
            "    <role id=\"{}\"{}>{}</role>\n",
            role.id,
            inherited,
            escape_xml(&role.name)
        ));
    }
    out.push_str("  </roles>\n</membership>");
    out
}

// =============================================================================
// Issue categories
// =============================================================================

pub fn format_issue_categories(categories: &[IssueCategory]) -> String {
    if categories.is_empty() {
        return empty_list("issue_categories", "issue categories");
    }

    let mut out = format!("<issue_categories count=\"{}\">\n", categories.len());
    for category in categories {
        out.push_str(&format!("  <issue_category id=\"{}\">\n", category.id));
        out.push_str(&format!("    <name>{}</name>\n", escape_xml(&category.name)));
        if let Some(assignee) = &category.assigned_to {
            out.push_str(&format!(
                "    <assigned_to>{}</assigned_to>\n",
                escape_xml(&assignee.name)
            ));
        }
        out.push_str("  </issue_category>\n");
    }
    out.push_str("</issue_categories>");
    out
}

pub fn format_issue_category(category: &IssueCategory) -> String {
    let mut out = format!("<issue_category id=\"{}\">\n", category.id);
    out.push_str(&format!("  <name>{}</name>\n", escape_xml(&category.name)));
    ref_element(
        &mut out,
        2,
        "project",
        category.project.id,
        &category.project.name,
    );
    if let Some(assignee) = &category.assigned_to {
        ref_element(&mut out, 2, "assigned_to", assignee.id, &assignee.name);
    }
    out.push_str("</issue_category>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{action_result, id_result};
    use redmine_core::{MembershipRole, NamedRef, VersionSharing, VersionStatus};

    fn web() -> NamedRef {
        NamedRef {
            id: 1,
            name: "Web & Mobile".into(),
        }
    }

    fn version() -> Version {
        Version {
            id: 3,
            project: web(),
            name: "1.0".into(),
            description: None,
            status: VersionStatus::Locked,
            due_date: Some("2024-12-31".into()),
            sharing: VersionSharing::Tree,
            wiki_page_title: None,
            estimated_hours: Some(12.5),
            spent_hours: None,
            created_on: Some("2024-01-01T00:00:00Z".into()),
            updated_on: None,
        }
    }

    #[test]
    fn test_format_version() {
        let text = format_version(&version());
        assert!(text.starts_with("<version id=\"3\">\n  <name>1.0</name>\n"));
        assert!(text.contains("<project id=\"1\">Web &amp; Mobile</project>"));
        assert!(text.contains("<status>locked</status>"));
        assert!(text.contains("<sharing>tree</sharing>"));
        assert!(text.contains("<estimated_hours>12.5</estimated_hours>"));
        assert!(!text.contains("spent_hours"));
    }

    #[test]
    fn test_format_versions_summary() {
        let text = format_versions(&[version()]);
        assert!(text.contains("<version id=\"3\" status=\"locked\">"));
        assert!(text.contains("<due_date>2024-12-31</due_date>"));
        assert_eq!(format_versions(&[]), "<versions>No versions found</versions>");
    }

    #[test]
    fn test_version_result_wraps_detail() {
        let text = action_result("created", &format_version(&version()));
        assert!(text.starts_with("<result>\n  <status>success</status>\n  <action>created</action>\n<version id=\"3\">"));
        assert!(text.ends_with("</version>\n</result>"));
        assert!(id_result("deleted", "version_id", 3).contains("<version_id>3</version_id>"));
    }

    #[test]
    fn test_format_membership() {
        let membership = Membership {
            id: 11,
            project: web(),
            user: Some(NamedRef {
                id: 5,
                name: "Jane".into(),
            }),
            group: None,
            roles: vec![
                MembershipRole {
                    id: 3,
                    name: "Developer".into(),
                    inherited: false,
                },
                MembershipRole {
                    id: 4,
                    name: "Reporter".into(),
                    inherited: true,
                },
            ],
        };

        let detail = format_membership(&membership);
        assert!(detail.contains("<user id=\"5\">Jane</user>"));
        assert!(detail.contains("<role id=\"4\" inherited=\"true\">Reporter</role>"));
        assert!(detail.contains("<role id=\"3\">Developer</role>"));

        let page = Page {
            items: vec![membership],
            total_count: 30,
            offset: 25,
            limit: 25,
        };
        let list = format_memberships(&page);
        assert!(list.starts_with(
            "<memberships count=\"1\" total_count=\"30\" offset=\"25\" limit=\"25\">"
        ));
        assert!(list.contains("<roles>Developer, Reporter</roles>"));
    }

    #[test]
    fn test_format_issue_category() {
        let category = IssueCategory {
            id: 4,
            project: web(),
            name: "UI".into(),
            assigned_to: None,
        };
        assert_eq!(
            format_issue_category(&category),
            "<issue_category id=\"4\">\n  <name>UI</name>\n  <project id=\"1\">Web &amp; Mobile</project>\n</issue_category>"
        );
        assert_eq!(
            format_issue_categories(&[]),
            "<issue_categories>No issue categories found</issue_categories>"
        );
    }

    #[test]
    fn test_format_projects() {
        let page = Page {
            items: vec![Project {
                id: 1,
                name: "Web".into(),
                identifier: "web".into(),
                description: None,
                homepage: None,
                status: Some(1),
                is_public: Some(true),
                parent: None,
                created_on: None,
                updated_on: None,
            }],
            total_count: 1,
            offset: 0,
            limit: 25,
        };
        let text = format_projects(&page);
        assert!(text.contains("<project id=\"1\" identifier=\"web\">"));
        assert!(format_project(&page.items[0]).contains("<is_public>true</is_public>"));
    }
}
