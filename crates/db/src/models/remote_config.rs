use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    TransactionSession, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::remote_config;

#[derive(Debug, Error)]
pub enum RemoteConfigError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Remote source not configured")]
    NotConfigured,
}

/// Connection settings for the external work tracker. The access token is
/// a secret and never serialized back to clients.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteConfig {
    pub id: Uuid,
    pub organization_url: String,
    pub project_name: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRemoteConfig {
    pub organization_url: String,
    pub project_name: String,
    pub access_token: String,
}

impl RemoteConfig {
    fn from_model(model: remote_config::Model) -> Self {
        Self {
            id: model.uuid,
            organization_url: model.organization_url,
            project_name: model.project_name,
            access_token: model.access_token,
            is_active: model.is_active,
            created_at: model.created_at.into(),
        }
    }

    pub async fn find_active<C: ConnectionTrait>(db: &C) -> Result<Option<Self>, DbErr> {
        let record = remote_config::Entity::find()
            .filter(remote_config::Column::IsActive.eq(true))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    /// Replaces the active configuration: deactivates every existing row and
    /// inserts the new one as active, in a single transaction so there is
    /// never a window with zero or two active configs.
    pub async fn set_active<C: ConnectionTrait + TransactionTrait>(
        db: &C,
        data: &CreateRemoteConfig,
        config_id: Uuid,
    ) -> Result<Self, DbErr> {
        let tx = db.begin().await?;

        remote_config::Entity::update_many()
            .col_expr(remote_config::Column::IsActive, Expr::value(false))
            .exec(&tx)
            .await?;

        let active = remote_config::ActiveModel {
            uuid: Set(config_id),
            organization_url: Set(data.organization_url.clone()),
            project_name: Set(data.project_name.clone()),
            access_token: Set(data.access_token.clone()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let model = active.insert(&tx).await?;

        tx.commit().await?;
        Ok(Self::from_model(model))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, PaginatorTrait};
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn config(name: &str) -> CreateRemoteConfig {
        CreateRemoteConfig {
            organization_url: "https://dev.azure.com/acme".to_string(),
            project_name: name.to_string(),
            access_token: "pat-secret".to_string(),
        }
    }

    async fn active_count(db: &sea_orm::DatabaseConnection) -> u64 {
        remote_config::Entity::find()
            .filter(remote_config::Column::IsActive.eq(true))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn set_active_with_no_prior_rows() {
        let db = setup_db().await;
        let saved = RemoteConfig::set_active(&db, &config("Spark"), Uuid::new_v4())
            .await
            .unwrap();
        assert!(saved.is_active);
        assert_eq!(active_count(&db).await, 1);
    }

    #[tokio::test]
    async fn set_active_deactivates_all_priors() {
        let db = setup_db().await;
        for name in ["A", "B", "C"] {
            RemoteConfig::set_active(&db, &config(name), Uuid::new_v4())
                .await
                .unwrap();
        }

        let latest = RemoteConfig::set_active(&db, &config("D"), Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(active_count(&db).await, 1);
        let active = RemoteConfig::find_active(&db).await.unwrap().unwrap();
        assert_eq!(active.id, latest.id);
        assert_eq!(active.project_name, "D");
    }

    #[tokio::test]
    async fn access_token_is_not_serialized() {
        let db = setup_db().await;
        let saved = RemoteConfig::set_active(&db, &config("Spark"), Uuid::new_v4())
            .await
            .unwrap();
        let json = serde_json::to_value(&saved).unwrap();
        assert!(json.get("access_token").is_none());
        assert_eq!(json["project_name"], "Spark");
    }
}
