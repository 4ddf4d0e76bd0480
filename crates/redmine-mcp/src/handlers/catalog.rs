//! Read-only lookup lists.

use redmine_core::{CatalogProvider, Result};
use redmine_format::catalog::{
    format_document_categories, format_issue_priorities, format_issue_statuses, format_role,
    format_roles, format_time_entry_activities, format_trackers,
};

use crate::args::IdArgs;
use crate::protocol::ToolCallResult;

pub async fn trackers<P: CatalogProvider + ?Sized>(provider: &P) -> Result<ToolCallResult> {
    let trackers = provider.get_trackers().await?;
    Ok(ToolCallResult::text(format_trackers(&trackers)))
}

pub async fn issue_statuses<P: CatalogProvider + ?Sized>(provider: &P) -> Result<ToolCallResult> {
    let statuses = provider.get_issue_statuses().await?;
    Ok(ToolCallResult::text(format_issue_statuses(&statuses)))
}

pub async fn issue_priorities<P: CatalogProvider + ?Sized>(
    provider: &P,
) -> Result<ToolCallResult> {
    let items = provider.get_issue_priorities().await?;
    Ok(ToolCallResult::text(format_issue_priorities(&items)))
}

pub async fn time_entry_activities<P: CatalogProvider + ?Sized>(
    provider: &P,
) -> Result<ToolCallResult> {
    let items = provider.get_time_entry_activities().await?;
    Ok(ToolCallResult::text(format_time_entry_activities(&items)))
}

pub async fn document_categories<P: CatalogProvider + ?Sized>(
    provider: &P,
) -> Result<ToolCallResult> {
    let items = provider.get_document_categories().await?;
    Ok(ToolCallResult::text(format_document_categories(&items)))
}

pub async fn roles<P: CatalogProvider + ?Sized>(provider: &P) -> Result<ToolCallResult> {
    let roles = provider.get_roles().await?;
    Ok(ToolCallResult::text(format_roles(&roles)))
}

pub async fn role<P: CatalogProvider + ?Sized>(provider: &P, args: IdArgs) -> Result<ToolCallResult> {
    let role = provider.get_role(args.id).await?;
    Ok(ToolCallResult::text(format_role(&role)))
}
