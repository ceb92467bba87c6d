use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    entities::{progress_entry, work_item},
    models::ids,
};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Work item not found")]
    WorkItemNotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub work_item_id: Uuid,
    pub user_email: String,
    pub hours_worked: f64,
    pub progress_percentage: f64,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgressEntry {
    pub work_item_id: Uuid,
    pub hours_worked: f64,
    pub progress_percentage: f64,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

impl ProgressEntry {
    fn from_model(model: progress_entry::Model, work_item_id: Uuid) -> Self {
        Self {
            id: model.uuid,
            work_item_id,
            user_email: model.user_email,
            hours_worked: model.hours_worked,
            progress_percentage: model.progress_percentage,
            notes: model.notes,
            date: model.entry_date,
            created_at: model.created_at.into(),
        }
    }

    /// Appends a progress entry and recomputes the parent work item's
    /// `actual_hours` as the sum over all its entries. Run inside a
    /// transaction so the entry and the derived figure stay consistent.
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProgressEntry,
        user_email: &str,
        entry_id: Uuid,
    ) -> Result<Self, ProgressError> {
        let work_item_row_id = ids::work_item_id_by_uuid(db, data.work_item_id)
            .await?
            .ok_or(ProgressError::WorkItemNotFound)?;

        let active = progress_entry::ActiveModel {
            uuid: Set(entry_id),
            work_item_id: Set(work_item_row_id),
            user_email: Set(user_email.to_string()),
            hours_worked: Set(data.hours_worked),
            progress_percentage: Set(data.progress_percentage),
            notes: Set(data.notes.clone()),
            entry_date: Set(data.date),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;

        recompute_actual_hours(db, work_item_row_id).await?;

        Ok(Self::from_model(model, data.work_item_id))
    }

    pub async fn find_by_work_item_id<C: ConnectionTrait>(
        db: &C,
        work_item_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(work_item_row_id) = ids::work_item_id_by_uuid(db, work_item_id).await? else {
            return Ok(Vec::new());
        };

        let models = progress_entry::Entity::find()
            .filter(progress_entry::Column::WorkItemId.eq(work_item_row_id))
            .order_by_asc(progress_entry::Column::EntryDate)
            .all(db)
            .await?;

        Ok(models
            .into_iter()
            .map(|model| Self::from_model(model, work_item_id))
            .collect())
    }

    /// Whether any progress has been logged locally against the item. The
    /// reconciler uses this to keep local hour tracking authoritative.
    pub async fn exists_for_work_item<C: ConnectionTrait>(
        db: &C,
        work_item_id: Uuid,
    ) -> Result<bool, DbErr> {
        let Some(work_item_row_id) = ids::work_item_id_by_uuid(db, work_item_id).await? else {
            return Ok(false);
        };

        let count = progress_entry::Entity::find()
            .filter(progress_entry::Column::WorkItemId.eq(work_item_row_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Progress percentages logged by `user_email` against any of the given
    /// work items, used for the utilization average.
    pub async fn percentages_for_items_and_user<C: ConnectionTrait>(
        db: &C,
        work_item_ids: &[Uuid],
        user_email: &str,
    ) -> Result<Vec<f64>, DbErr> {
        let row_ids = ids::work_item_ids_by_uuids(db, work_item_ids).await?;
        if row_ids.is_empty() {
            return Ok(Vec::new());
        }

        progress_entry::Entity::find()
            .select_only()
            .column(progress_entry::Column::ProgressPercentage)
            .filter(progress_entry::Column::WorkItemId.is_in(row_ids))
            .filter(progress_entry::Column::UserEmail.eq(user_email))
            .into_tuple()
            .all(db)
            .await
    }
}

async fn recompute_actual_hours<C: ConnectionTrait>(
    db: &C,
    work_item_row_id: i64,
) -> Result<(), DbErr> {
    let hours: Vec<f64> = progress_entry::Entity::find()
        .select_only()
        .column(progress_entry::Column::HoursWorked)
        .filter(progress_entry::Column::WorkItemId.eq(work_item_row_id))
        .into_tuple()
        .all(db)
        .await?;
    let total: f64 = hours.iter().sum();

    let record = work_item::Entity::find_by_id(work_item_row_id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Work item not found".to_string()))?;
    let mut active: work_item::ActiveModel = record.into();
    active.actual_hours = Set(total);
    active.updated_at = Set(Utc::now().into());
    active.update(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::{
        project::{CreateProject, Project},
        work_item::{CreateWorkItem, WorkItem},
    };

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_work_item(db: &sea_orm::DatabaseConnection) -> WorkItem {
        let project = Project::create(
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
        .unwrap();

        WorkItem::create(
            db,
            &CreateWorkItem {
                project_id: project.id,
                title: "Tracked item".to_string(),
                description: None,
                kind: None,
                priority: None,
                status: None,
                assigned_to: Some("dev@example.com".to_string()),
                start_date: None,
                end_date: None,
                estimated_hours: Some(10.0),
                t_shirt_size: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    fn entry(work_item_id: Uuid, hours: f64) -> CreateProgressEntry {
        CreateProgressEntry {
            work_item_id,
            hours_worked: hours,
            progress_percentage: 50.0,
            notes: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    #[tokio::test]
    async fn actual_hours_tracks_sum_across_inserts() {
        let db = setup_db().await;
        let item = seed_work_item(&db).await;

        let inserts = [3.0, 3.0, 1.5, 0.5];
        let mut expected = 0.0;
        for hours in inserts {
            ProgressEntry::create(&db, &entry(item.id, hours), "dev@example.com", Uuid::new_v4())
                .await
                .unwrap();
            expected += hours;

            let current = WorkItem::find_by_id(&db, item.id).await.unwrap().unwrap();
            assert!((current.actual_hours - expected).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_work_item() {
        let db = setup_db().await;
        let err = ProgressEntry::create(
            &db,
            &entry(Uuid::new_v4(), 1.0),
            "dev@example.com",
            Uuid::new_v4(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProgressError::WorkItemNotFound));
    }

    #[tokio::test]
    async fn exists_for_work_item_flips_after_first_entry() {
        let db = setup_db().await;
        let item = seed_work_item(&db).await;

        assert!(!ProgressEntry::exists_for_work_item(&db, item.id)
            .await
            .unwrap());
        ProgressEntry::create(&db, &entry(item.id, 2.0), "dev@example.com", Uuid::new_v4())
            .await
            .unwrap();
        assert!(ProgressEntry::exists_for_work_item(&db, item.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn percentages_filter_on_user_email() {
        let db = setup_db().await;
        let item = seed_work_item(&db).await;

        ProgressEntry::create(&db, &entry(item.id, 1.0), "dev@example.com", Uuid::new_v4())
            .await
            .unwrap();
        ProgressEntry::create(&db, &entry(item.id, 1.0), "other@example.com", Uuid::new_v4())
            .await
            .unwrap();

        let values =
            ProgressEntry::percentages_for_items_and_user(&db, &[item.id], "dev@example.com")
                .await
                .unwrap();
        assert_eq!(values, vec![50.0]);
    }
}
