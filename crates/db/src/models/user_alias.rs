use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{entities::user_alias, models::ids};

#[derive(Debug, Error)]
pub enum UserAliasError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("User not found")]
    UserNotFound,
}

/// Mapping from a local account to the login id the external tracker uses
/// for the same person.
#[derive(Debug, Clone, Serialize)]
pub struct UserAlias {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_login_id: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAlias {
    /// Returns the external login id of the first active mapping for the
    /// user, if any. At most one active mapping is consulted.
    pub async fn active_login_for_user<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Option<String>, DbErr> {
        let Some(user_row_id) = ids::user_id_by_uuid(db, user_id).await? else {
            return Ok(None);
        };

        user_alias::Entity::find()
            .filter(user_alias::Column::UserId.eq(user_row_id))
            .filter(user_alias::Column::Active.eq(true))
            .order_by_asc(user_alias::Column::Id)
            .one(db)
            .await
            .map(|record| record.map(|model| model.external_login_id))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
        external_login_id: &str,
        active: bool,
    ) -> Result<Self, UserAliasError> {
        let user_row_id = ids::user_id_by_uuid(db, user_id)
            .await?
            .ok_or(UserAliasError::UserNotFound)?;

        let alias_id = Uuid::new_v4();
        let active_model = user_alias::ActiveModel {
            uuid: Set(alias_id),
            user_id: Set(user_row_id),
            external_login_id: Set(external_login_id.to_string()),
            active: Set(active),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let model = active_model.insert(db).await?;
        Ok(Self {
            id: model.uuid,
            user_id,
            external_login_id: model.external_login_id,
            active: model.active,
            created_at: model.created_at.into(),
        })
    }
}
