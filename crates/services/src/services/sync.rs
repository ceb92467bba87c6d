use db::models::{
    progress_entry::ProgressEntry,
    project::{CreateProject, Project},
    work_item::{RemoteFields, WorkItem, WorkItemError},
};
use db::types::{ProjectStatus, WorkItemKind, WorkItemStatus};
use db::{ConnectionTrait, DbErr, TransactionSession, TransactionTrait};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::remote_source::{RemoteSourceError, RemoteWorkItem, WiqlFilter, WorkItemSource};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Source(#[from] RemoteSourceError),
}

impl From<WorkItemError> for SyncError {
    fn from(err: WorkItemError) -> Self {
        match err {
            WorkItemError::Database(db_err) => SyncError::Database(db_err),
            other => SyncError::Database(DbErr::Custom(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// Fetches the caller's items from the remote source and merges them into
/// local storage inside one transaction. A source failure aborts before any
/// write; a storage failure rolls the whole batch back.
pub async fn run_sync<C: ConnectionTrait + TransactionTrait>(
    db: &C,
    source: &dyn WorkItemSource,
    filter: &WiqlFilter,
    target_project: &str,
) -> Result<ReconcileResult, SyncError> {
    let items = source.fetch_assigned(filter).await?;
    tracing::debug!(count = items.len(), "Fetched remote work items");

    let tx = db.begin().await?;
    let result = reconcile(&tx, &items, target_project).await?;
    tx.commit().await?;

    tracing::info!(
        created = result.created,
        updated = result.updated,
        skipped = result.skipped,
        "Remote sync completed"
    );
    Ok(result)
}

/// Merges remote work items into local storage, keyed on the remote id.
/// Malformed records are counted and skipped, never fatal to the batch.
pub async fn reconcile<C: ConnectionTrait>(
    db: &C,
    items: &[RemoteWorkItem],
    target_project: &str,
) -> Result<ReconcileResult, SyncError> {
    let mut result = ReconcileResult::default();

    for item in items {
        let Some(fields) = map_remote_fields(item) else {
            tracing::warn!(
                external_id = %item.id,
                kind = item.kind.as_deref().unwrap_or("<missing>"),
                "Skipping remote work item with missing or unmapped fields"
            );
            result.skipped += 1;
            continue;
        };

        match WorkItem::find_by_external_id(db, &item.id).await? {
            Some(existing) => {
                // Local progress tracking is authoritative for actual
                // hours; the remote figure only applies when no entries
                // exist for the item.
                let has_local_progress =
                    ProgressEntry::exists_for_work_item(db, existing.id).await?;
                WorkItem::update_from_remote(db, existing.id, &fields, !has_local_progress)
                    .await?;
                result.updated += 1;
            }
            None => {
                let project = resolve_target_project(db, target_project).await?;
                WorkItem::create_from_remote(db, project.id, &item.id, &fields, Uuid::new_v4())
                    .await?;
                result.created += 1;
            }
        }
    }

    Ok(result)
}

async fn resolve_target_project<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Project, DbErr> {
    if let Some(project) = Project::find_by_name(db, name).await? {
        return Ok(project);
    }

    tracing::info!(project = name, "Creating default project for remote sync");
    Project::create(
        db,
        &CreateProject {
            name: name.to_string(),
            description: Some("Created automatically during remote sync".to_string()),
            start_date: None,
            end_date: None,
            status: Some(ProjectStatus::Active),
        },
        Uuid::new_v4(),
    )
    .await
}

fn map_remote_fields(item: &RemoteWorkItem) -> Option<RemoteFields> {
    if item.id.trim().is_empty() {
        return None;
    }
    let title = item.title.clone()?;
    let kind = WorkItemKind::from_remote_kind(item.kind.as_deref()?)?;
    let status = item
        .state
        .as_deref()
        .and_then(WorkItemStatus::from_remote_state)
        .unwrap_or_default();

    Some(RemoteFields {
        title,
        kind,
        status,
        assigned_to: item.assignee.clone(),
        start_date: item.start_date,
        end_date: item.end_date,
        estimated_hours: item.estimated_hours,
        completed_hours: item.completed_hours,
    })
}
