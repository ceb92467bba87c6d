use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::work_item,
    models::ids,
    types::{TShirtSize, WorkItemKind, WorkItemPriority, WorkItemStatus},
};

#[derive(Debug, Error)]
pub enum WorkItemError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Work item not found")]
    NotFound,
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: WorkItemKind,
    pub priority: WorkItemPriority,
    pub status: WorkItemStatus,
    pub assigned_to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub t_shirt_size: Option<TShirtSize>,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkItem {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub kind: Option<WorkItemKind>,
    pub priority: Option<WorkItemPriority>,
    pub status: Option<WorkItemStatus>,
    pub assigned_to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub t_shirt_size: Option<TShirtSize>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<WorkItemKind>,
    pub priority: Option<WorkItemPriority>,
    pub status: Option<WorkItemStatus>,
    pub assigned_to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub t_shirt_size: Option<TShirtSize>,
}

/// Local projection of a remote work item, produced by the reconciler after
/// state/type mapping. `completed_hours` stays separate from `actual_hours`
/// because local progress tracking wins over the remote figure.
#[derive(Debug, Clone)]
pub struct RemoteFields {
    pub title: String,
    pub kind: WorkItemKind,
    pub status: WorkItemStatus,
    pub assigned_to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub completed_hours: Option<f64>,
}

impl WorkItem {
    async fn from_model<C: ConnectionTrait>(
        db: &C,
        model: work_item::Model,
    ) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            title: model.title,
            description: model.description,
            kind: model.kind,
            priority: model.priority,
            status: model.status,
            assigned_to: model.assigned_to,
            start_date: model.start_date,
            end_date: model.end_date,
            estimated_hours: model.estimated_hours,
            actual_hours: model.actual_hours,
            t_shirt_size: model.t_shirt_size,
            external_id: model.external_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    async fn collect<C: ConnectionTrait>(
        db: &C,
        models: Vec<work_item::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut items = Vec::with_capacity(models.len());
        for model in models {
            items.push(Self::from_model(db, model).await?);
        }
        Ok(items)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = work_item::Entity::find()
            .filter(work_item::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_external_id<C: ConnectionTrait>(
        db: &C,
        external_id: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = work_item::Entity::find()
            .filter(work_item::Column::ExternalId.eq(external_id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(Vec::new());
        };

        let models = work_item::Entity::find()
            .filter(work_item::Column::ProjectId.eq(project_row_id))
            .order_by_desc(work_item::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    /// Items assigned to any of the given identity strings (email or
    /// external alias), compared case-insensitively.
    pub async fn find_assigned<C: ConnectionTrait>(
        db: &C,
        project_id: Option<Uuid>,
        identities: &[String],
    ) -> Result<Vec<Self>, DbErr> {
        let lowered: Vec<String> = identities.iter().map(|s| s.to_lowercase()).collect();

        let mut query = work_item::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col((
                work_item::Entity,
                work_item::Column::AssignedTo,
            ))))
            .is_in(lowered),
        );

        if let Some(project_id) = project_id {
            let project_row_id = ids::project_id_by_uuid(db, project_id)
                .await?
                .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
            query = query.filter(work_item::Column::ProjectId.eq(project_row_id));
        }

        let models = query
            .order_by_desc(work_item::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    /// Assigned-items lookup with inclusive date bounds on the item's own
    /// start/end dates, used by the utilization report.
    pub async fn find_assigned_in_window<C: ConnectionTrait>(
        db: &C,
        identities: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Self>, DbErr> {
        let lowered: Vec<String> = identities.iter().map(|s| s.to_lowercase()).collect();

        let mut query = work_item::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col((
                work_item::Entity,
                work_item::Column::AssignedTo,
            ))))
            .is_in(lowered),
        );

        if let Some(start) = start_date {
            query = query.filter(work_item::Column::StartDate.gte(start));
        }
        if let Some(end) = end_date {
            query = query.filter(work_item::Column::EndDate.lte(end));
        }

        let models = query
            .order_by_desc(work_item::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateWorkItem,
        item_id: Uuid,
    ) -> Result<Self, WorkItemError> {
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(WorkItemError::ProjectNotFound)?;

        let now = Utc::now();
        let active = work_item::ActiveModel {
            uuid: Set(item_id),
            project_id: Set(project_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            kind: Set(data.kind.clone().unwrap_or_default()),
            priority: Set(data.priority.clone().unwrap_or_default()),
            status: Set(data.status.clone().unwrap_or_default()),
            assigned_to: Set(data.assigned_to.clone()),
            start_date: Set(data.start_date),
            end_date: Set(data.end_date),
            estimated_hours: Set(data.estimated_hours),
            actual_hours: Set(0.0),
            t_shirt_size: Set(data.t_shirt_size.clone()),
            external_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        payload: &UpdateWorkItem,
    ) -> Result<Self, WorkItemError> {
        let record = work_item::Entity::find()
            .filter(work_item::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(WorkItemError::NotFound)?;

        let mut active: work_item::ActiveModel = record.into();
        if let Some(title) = payload.title.clone() {
            active.title = Set(title);
        }
        if payload.description.is_some() {
            active.description = Set(payload.description.clone());
        }
        if let Some(kind) = payload.kind.clone() {
            active.kind = Set(kind);
        }
        if let Some(priority) = payload.priority.clone() {
            active.priority = Set(priority);
        }
        if let Some(status) = payload.status.clone() {
            active.status = Set(status);
        }
        if payload.assigned_to.is_some() {
            active.assigned_to = Set(payload.assigned_to.clone());
        }
        if payload.start_date.is_some() {
            active.start_date = Set(payload.start_date);
        }
        if payload.end_date.is_some() {
            active.end_date = Set(payload.end_date);
        }
        if payload.estimated_hours.is_some() {
            active.estimated_hours = Set(payload.estimated_hours);
        }
        if payload.t_shirt_size.is_some() {
            active.t_shirt_size = Set(payload.t_shirt_size.clone());
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    /// Inserts a work item discovered during reconciliation, preserving the
    /// remote identifier verbatim.
    pub async fn create_from_remote<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        external_id: &str,
        fields: &RemoteFields,
        item_id: Uuid,
    ) -> Result<Self, WorkItemError> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(WorkItemError::ProjectNotFound)?;

        let now = Utc::now();
        let active = work_item::ActiveModel {
            uuid: Set(item_id),
            project_id: Set(project_row_id),
            title: Set(fields.title.clone()),
            description: Set(None),
            kind: Set(fields.kind.clone()),
            priority: Set(WorkItemPriority::default()),
            status: Set(fields.status.clone()),
            assigned_to: Set(fields.assigned_to.clone()),
            start_date: Set(fields.start_date),
            end_date: Set(fields.end_date),
            estimated_hours: Set(fields.estimated_hours),
            actual_hours: Set(fields.completed_hours.unwrap_or(0.0)),
            t_shirt_size: Set(None),
            external_id: Set(Some(external_id.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(db, model).await?)
    }

    /// Applies remote field values to an existing item. `actual_hours` is
    /// only taken from the remote record when `overwrite_actual` is set;
    /// otherwise the locally tracked figure stands.
    pub async fn update_from_remote<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        fields: &RemoteFields,
        overwrite_actual: bool,
    ) -> Result<Self, WorkItemError> {
        let record = work_item::Entity::find()
            .filter(work_item::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(WorkItemError::NotFound)?;

        let mut active: work_item::ActiveModel = record.into();
        active.title = Set(fields.title.clone());
        active.kind = Set(fields.kind.clone());
        active.status = Set(fields.status.clone());
        active.assigned_to = Set(fields.assigned_to.clone());
        active.start_date = Set(fields.start_date);
        active.end_date = Set(fields.end_date);
        active.estimated_hours = Set(fields.estimated_hours);
        if overwrite_actual {
            active.actual_hours = Set(fields.completed_hours.unwrap_or(0.0));
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = work_item::Entity::delete_many()
            .filter(work_item::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::project::{CreateProject, Project};

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_project(db: &sea_orm::DatabaseConnection) -> Project {
        Project::create(
            db,
            &CreateProject {
                name: "P1".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                status: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    fn create_payload(project_id: Uuid, assigned_to: Option<&str>) -> CreateWorkItem {
        CreateWorkItem {
            project_id,
            title: "Implement widget".to_string(),
            description: None,
            kind: None,
            priority: None,
            status: None,
            assigned_to: assigned_to.map(str::to_string),
            start_date: None,
            end_date: None,
            estimated_hours: Some(8.0),
            t_shirt_size: None,
        }
    }

    #[tokio::test]
    async fn create_starts_with_zero_actual_hours() {
        let db = setup_db().await;
        let project = seed_project(&db).await;
        let item = WorkItem::create(&db, &create_payload(project.id, None), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(item.actual_hours, 0.0);
        assert_eq!(item.status, WorkItemStatus::New);
        assert!(item.external_id.is_none());
    }

    #[tokio::test]
    async fn find_assigned_matches_case_insensitively() {
        let db = setup_db().await;
        let project = seed_project(&db).await;
        WorkItem::create(
            &db,
            &create_payload(project.id, Some("Dev@Example.com")),
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        WorkItem::create(
            &db,
            &create_payload(project.id, Some("other@example.com")),
            Uuid::new_v4(),
        )
        .await
        .unwrap();

        let items = WorkItem::find_assigned(&db, None, &["dev@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].assigned_to.as_deref(), Some("Dev@Example.com"));

        let scoped = WorkItem::find_assigned(
            &db,
            Some(project.id),
            &["DEV@EXAMPLE.COM".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(scoped.len(), 1);
    }

    #[tokio::test]
    async fn remote_roundtrip_preserves_external_id() {
        let db = setup_db().await;
        let project = seed_project(&db).await;
        let fields = RemoteFields {
            title: "Synced item".to_string(),
            kind: WorkItemKind::Bug,
            status: WorkItemStatus::Active,
            assigned_to: Some("dev@corp.example".to_string()),
            start_date: None,
            end_date: None,
            estimated_hours: Some(4.0),
            completed_hours: Some(1.5),
        };

        let created =
            WorkItem::create_from_remote(&db, project.id, "4711", &fields, Uuid::new_v4())
                .await
                .unwrap();
        assert_eq!(created.external_id.as_deref(), Some("4711"));
        assert_eq!(created.actual_hours, 1.5);

        let found = WorkItem::find_by_external_id(&db, "4711")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn update_from_remote_respects_local_actual_hours() {
        let db = setup_db().await;
        let project = seed_project(&db).await;
        let mut fields = RemoteFields {
            title: "Synced item".to_string(),
            kind: WorkItemKind::Task,
            status: WorkItemStatus::New,
            assigned_to: None,
            start_date: None,
            end_date: None,
            estimated_hours: None,
            completed_hours: Some(2.0),
        };
        let created =
            WorkItem::create_from_remote(&db, project.id, "99", &fields, Uuid::new_v4())
                .await
                .unwrap();

        fields.completed_hours = Some(9.0);
        fields.status = WorkItemStatus::Done;
        let kept = WorkItem::update_from_remote(&db, created.id, &fields, false)
            .await
            .unwrap();
        assert_eq!(kept.actual_hours, 2.0);
        assert_eq!(kept.status, WorkItemStatus::Done);

        let overwritten = WorkItem::update_from_remote(&db, created.id, &fields, true)
            .await
            .unwrap();
        assert_eq!(overwritten.actual_hours, 9.0);
    }

    #[tokio::test]
    async fn delete_reports_rows_affected() {
        let db = setup_db().await;
        let project = seed_project(&db).await;
        let item = WorkItem::create(&db, &create_payload(project.id, None), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(WorkItem::delete(&db, item.id).await.unwrap(), 1);
        assert_eq!(WorkItem::delete(&db, item.id).await.unwrap(), 0);
    }
}
