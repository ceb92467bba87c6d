use chrono::NaiveDate;
use db::models::{
    progress_entry::ProgressEntry, project::Project, user::User, user_alias::UserAlias,
    work_item::WorkItem,
};
use db::types::ProjectStatus;
use db::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::IdentityContext;

/// Optional inclusive bounds applied to a work item's own start/end dates.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportWindow {
    fn is_bounded(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationRow {
    pub email: String,
    pub name: String,
    pub total_tasks: u64,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectStatusRow {
    pub project_id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub total_work_items: u64,
    pub completed_items: u64,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
}

/// Per-user utilization rollup. Admins see every user; everyone else only
/// their own row. Assignment matching is case-insensitive over the user's
/// email and active external alias.
///
/// With date bounds set, users without a single qualifying item are
/// omitted; without bounds every user in scope gets a row, zero-filled.
pub async fn utilization_report<C: ConnectionTrait>(
    db: &C,
    caller: &IdentityContext,
    window: &ReportWindow,
) -> Result<Vec<UtilizationRow>, DbErr> {
    let users = if caller.is_admin() {
        User::find_all(db).await?
    } else {
        match User::find_by_email(db, &caller.email).await? {
            Some(user) => vec![user],
            None => Vec::new(),
        }
    };

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let mut identities = vec![user.email.clone()];
        if let Some(alias) = UserAlias::active_login_for_user(db, user.id).await? {
            identities.push(alias);
        }

        let items = WorkItem::find_assigned_in_window(
            db,
            &identities,
            window.start_date,
            window.end_date,
        )
        .await?;

        if items.is_empty() && window.is_bounded() {
            continue;
        }

        let item_ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
        let percentages =
            ProgressEntry::percentages_for_items_and_user(db, &item_ids, &user.email).await?;
        let avg_progress = if percentages.is_empty() {
            None
        } else {
            Some(percentages.iter().sum::<f64>() / percentages.len() as f64)
        };

        rows.push(UtilizationRow {
            email: user.email,
            name: user.name,
            total_tasks: items.len() as u64,
            total_estimated_hours: items.iter().filter_map(|item| item.estimated_hours).sum(),
            total_actual_hours: items.iter().map(|item| item.actual_hours).sum(),
            avg_progress,
        });
    }

    Ok(rows)
}

/// Per-project completion rollup. Not role-restricted.
pub async fn project_status_report<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<ProjectStatusRow>, DbErr> {
    let projects = Project::find_all(db).await?;

    let mut rows = Vec::with_capacity(projects.len());
    for project in projects {
        let items = WorkItem::find_by_project_id(db, project.id).await?;

        rows.push(ProjectStatusRow {
            project_id: project.id,
            name: project.name,
            status: project.status,
            total_work_items: items.len() as u64,
            completed_items: items
                .iter()
                .filter(|item| item.status.is_completed())
                .count() as u64,
            total_estimated_hours: items.iter().filter_map(|item| item.estimated_hours).sum(),
            total_actual_hours: items.iter().map(|item| item.actual_hours).sum(),
        });
    }

    Ok(rows)
}
