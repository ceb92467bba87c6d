use sea_orm::entity::prelude::*;

use crate::types::{TShirtSize, WorkItemKind, WorkItemPriority, WorkItemStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "work_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub project_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: WorkItemKind,
    pub priority: WorkItemPriority,
    pub status: WorkItemStatus,
    pub assigned_to: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub t_shirt_size: Option<TShirtSize>,
    pub external_id: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
