//! Projects, versions, memberships and issue categories.

use redmine_core::{ProjectProvider, Result};
use redmine_format::projects::{
    format_issue_categories, format_issue_category, format_membership, format_memberships,
    format_project, format_projects, format_version, format_versions,
};
use redmine_format::xml::{action_result, id_result};
use tracing::info;

use crate::args::{
    CreateIssueCategoryArgs, CreateMembershipArgs, CreateVersionArgs, DeleteIssueCategoryArgs,
    IdArgs, ListMembershipsArgs, PageArgs, ProjectArgs, UpdateIssueCategoryArgs,
    UpdateMembershipArgs, UpdateVersionArgs,
};
use crate::protocol::ToolCallResult;

// =============================================================================
// Projects
// =============================================================================

pub async fn list_projects<P>(provider: &P, args: PageArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let page = provider.get_projects(args.page).await?;
    Ok(ToolCallResult::text(format_projects(&page)))
}

pub async fn show_project<P>(provider: &P, args: ProjectArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let project = provider.get_project(&args.project_id).await?;
    Ok(ToolCallResult::text(format_project(&project)))
}

// =============================================================================
// Versions
// =============================================================================

pub async fn list_versions<P>(provider: &P, args: ProjectArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let versions = provider.get_versions(&args.project_id).await?;
    Ok(ToolCallResult::text(format_versions(&versions)))
}

pub async fn show_version<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let version = provider.get_version(args.id).await?;
    Ok(ToolCallResult::text(format_version(&version)))
}

pub async fn create_version<P>(provider: &P, args: CreateVersionArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let version = provider.create_version(&args.project_id, args.input).await?;
    info!(id = version.id, project = %args.project_id, "created version");
    Ok(ToolCallResult::text(action_result(
        "created",
        &format_version(&version),
    )))
}

pub async fn update_version<P>(provider: &P, args: UpdateVersionArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let version = provider.update_version(args.id, args.input).await?;
    Ok(ToolCallResult::text(action_result(
        "updated",
        &format_version(&version),
    )))
}

pub async fn delete_version<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    provider.delete_version(args.id).await?;
    Ok(ToolCallResult::text(id_result(
        "deleted",
        "version_id",
        args.id,
    )))
}

// =============================================================================
// Memberships
// =============================================================================

pub async fn list_memberships<P>(provider: &P, args: ListMembershipsArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let page = provider.get_memberships(&args.project_id, args.page).await?;
    Ok(ToolCallResult::text(format_memberships(&page)))
}

pub async fn show_membership<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let membership = provider.get_membership(args.id).await?;
    Ok(ToolCallResult::text(format_membership(&membership)))
}

pub async fn create_membership<P>(
    provider: &P,
    args: CreateMembershipArgs,
) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let membership = provider
        .create_membership(&args.project_id, args.input)
        .await?;
    Ok(ToolCallResult::text(action_result(
        "created",
        &format_membership(&membership),
    )))
}

/// Redmine answers the role change with an empty body, so the membership
/// is read back for the result.
pub async fn update_membership<P>(
    provider: &P,
    args: UpdateMembershipArgs,
) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    provider.update_membership(args.id, args.role_ids).await?;
    let membership = provider.get_membership(args.id).await?;
    Ok(ToolCallResult::text(action_result(
        "updated",
        &format_membership(&membership),
    )))
}

pub async fn delete_membership<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    provider.delete_membership(args.id).await?;
    Ok(ToolCallResult::text(id_result(
        "deleted",
        "membership_id",
        args.id,
    )))
}

// =============================================================================
// Issue categories
// =============================================================================

pub async fn list_issue_categories<P>(provider: &P, args: ProjectArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let categories = provider.get_issue_categories(&args.project_id).await?;
    Ok(ToolCallResult::text(format_issue_categories(&categories)))
}

pub async fn show_issue_category<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let category = provider.get_issue_category(args.id).await?;
    Ok(ToolCallResult::text(format_issue_category(&category)))
}

pub async fn create_issue_category<P>(
    provider: &P,
    args: CreateIssueCategoryArgs,
) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let category = provider
        .create_issue_category(&args.project_id, args.input)
        .await?;
    Ok(ToolCallResult::text(action_result(
        "created",
        &format_issue_category(&category),
    )))
}

pub async fn update_issue_category<P>(
    provider: &P,
    args: UpdateIssueCategoryArgs,
) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    let category = provider.update_issue_category(args.id, args.input).await?;
    Ok(ToolCallResult::text(action_result(
        "updated",
        &format_issue_category(&category),
    )))
}

pub async fn delete_issue_category<P>(
    provider: &P,
    args: DeleteIssueCategoryArgs,
) -> Result<ToolCallResult>
where
    P: ProjectProvider + ?Sized,
{
    provider
        .delete_issue_category(args.id, args.reassign_to_id)
        .await?;
    Ok(ToolCallResult::text(id_result(
        "deleted",
        "issue_category_id",
        args.id,
    )))
}
