//! Issues, users and time entries.

use redmine_core::{IssueFilter, IssueProvider, Result, TimeEntryFilter};
use redmine_format::issues::{
    format_issue, format_issues, format_time_entries, format_user, format_users,
};

use crate::args::{IdArgs, PageArgs, UserArgs};
use crate::protocol::ToolCallResult;

pub async fn list_issues<P>(provider: &P, filter: IssueFilter) -> Result<ToolCallResult>
where
    P: IssueProvider + ?Sized,
{
    let page = provider.get_issues(filter).await?;
    Ok(ToolCallResult::text(format_issues(&page)))
}

pub async fn show_issue<P>(provider: &P, args: IdArgs) -> Result<ToolCallResult>
where
    P: IssueProvider + ?Sized,
{
    let issue = provider.get_issue(args.id).await?;
    Ok(ToolCallResult::text(format_issue(&issue)))
}

pub async fn list_users<P>(provider: &P, args: PageArgs) -> Result<ToolCallResult>
where
    P: IssueProvider + ?Sized,
{
    let page = provider.get_users(args.page).await?;
    Ok(ToolCallResult::text(format_users(&page)))
}

pub async fn show_user<P>(provider: &P, args: UserArgs) -> Result<ToolCallResult>
where
    P: IssueProvider + ?Sized,
{
    let user = provider.get_user(&args.id).await?;
    Ok(ToolCallResult::text(format_user(&user)))
}

pub async fn list_time_entries<P>(provider: &P, filter: TimeEntryFilter) -> Result<ToolCallResult>
where
    P: IssueProvider + ?Sized,
{
    let page = provider.get_time_entries(filter).await?;
    Ok(ToolCallResult::text(format_time_entries(&page)))
}
