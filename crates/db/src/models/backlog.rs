use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::backlog, models::ids, types::WorkItemStatus};

#[derive(Debug, Error)]
pub enum BacklogError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Backlog entry not found")]
    NotFound,
    #[error("Project not found")]
    ProjectNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Backlog {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: i32,
    pub status: WorkItemStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBacklog {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<WorkItemStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBacklog {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<WorkItemStatus>,
}

impl Backlog {
    async fn from_model<C: ConnectionTrait>(db: &C, model: backlog::Model) -> Result<Self, DbErr> {
        let project_uuid = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;

        Ok(Self {
            id: model.uuid,
            project_id: project_uuid,
            title: model.title,
            description: model.description,
            priority: model.priority,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = backlog::Entity::find()
            .filter(backlog::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_all<C: ConnectionTrait>(
        db: &C,
        project_id: Option<Uuid>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut query = backlog::Entity::find();
        if let Some(project_id) = project_id {
            let project_row_id = ids::project_id_by_uuid(db, project_id)
                .await?
                .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
            query = query.filter(backlog::Column::ProjectId.eq(project_row_id));
        }

        let models = query
            .order_by_desc(backlog::Column::Priority)
            .order_by_desc(backlog::Column::CreatedAt)
            .all(db)
            .await?;

        let mut entries = Vec::with_capacity(models.len());
        for model in models {
            entries.push(Self::from_model(db, model).await?);
        }
        Ok(entries)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateBacklog,
        created_by: &str,
        backlog_id: Uuid,
    ) -> Result<Self, BacklogError> {
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(BacklogError::ProjectNotFound)?;

        let now = Utc::now();
        let active = backlog::ActiveModel {
            uuid: Set(backlog_id),
            project_id: Set(project_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            priority: Set(data.priority.unwrap_or(0)),
            status: Set(data.status.clone().unwrap_or_default()),
            created_by: Set(created_by.to_string()),
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
        payload: &UpdateBacklog,
    ) -> Result<Self, BacklogError> {
        let record = backlog::Entity::find()
            .filter(backlog::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(BacklogError::NotFound)?;

        let mut active: backlog::ActiveModel = record.into();
        if let Some(title) = payload.title.clone() {
            active.title = Set(title);
        }
        if payload.description.is_some() {
            active.description = Set(payload.description.clone());
        }
        if let Some(priority) = payload.priority {
            active.priority = Set(priority);
        }
        if let Some(status) = payload.status.clone() {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(db).await?;
        Ok(Self::from_model(db, updated).await?)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = backlog::Entity::delete_many()
            .filter(backlog::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
