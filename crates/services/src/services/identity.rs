use db::models::{user::User, user_alias::UserAlias};
use db::types::UserRole;
use db::{ConnectionTrait, DbErr};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Unknown user")]
    UnknownUser,
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Caller identity resolved once per request from the verified token plus
/// the user and alias tables. Role and alias are derived server-side and
/// passed explicitly into every authorization decision.
#[derive(Debug, Clone)]
pub struct IdentityContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub external_alias: Option<String>,
}

impl IdentityContext {
    pub async fn resolve<C: ConnectionTrait>(db: &C, email: &str) -> Result<Self, IdentityError> {
        let user = User::find_by_email(db, email)
            .await?
            .ok_or(IdentityError::UnknownUser)?;
        let external_alias = UserAlias::active_login_for_user(db, user.id).await?;

        Ok(Self {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            external_alias,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// The identity strings a work item's `assigned_to` may carry for this
    /// caller: the local email plus the external alias when mapped.
    pub fn assignment_identities(&self) -> Vec<String> {
        let mut identities = vec![self.email.clone()];
        if let Some(alias) = &self.external_alias {
            identities.push(alias.clone());
        }
        identities
    }
}

#[cfg(test)]
mod tests {
    use db::models::user::CreateUser;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_user(db: &sea_orm::DatabaseConnection, email: &str, role: UserRole) -> User {
        User::create(
            db,
            &CreateUser {
                email: email.to_string(),
                name: "Dev One".to_string(),
                password_hash: "hash".to_string(),
                role,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn resolve_includes_active_alias() {
        let db = setup_db().await;
        let user = seed_user(&db, "dev@example.com", UserRole::Developer).await;
        UserAlias::create(&db, user.id, "dev@corp.example", true)
            .await
            .unwrap();

        let identity = IdentityContext::resolve(&db, "dev@example.com")
            .await
            .unwrap();
        assert_eq!(identity.user_id, user.id);
        assert!(!identity.is_admin());
        assert_eq!(identity.external_alias.as_deref(), Some("dev@corp.example"));
        assert_eq!(
            identity.assignment_identities(),
            vec!["dev@example.com".to_string(), "dev@corp.example".to_string()]
        );
    }

    #[tokio::test]
    async fn resolve_without_alias() {
        let db = setup_db().await;
        seed_user(&db, "admin@example.com", UserRole::Admin).await;

        let identity = IdentityContext::resolve(&db, "admin@example.com")
            .await
            .unwrap();
        assert!(identity.is_admin());
        assert!(identity.external_alias.is_none());
        assert_eq!(identity.assignment_identities().len(), 1);
    }

    #[tokio::test]
    async fn resolve_unknown_user_fails() {
        let db = setup_db().await;
        let err = IdentityContext::resolve(&db, "ghost@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::UnknownUser));
    }
}
