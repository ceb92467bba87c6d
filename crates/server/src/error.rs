use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    DbErr,
    models::{
        backlog::BacklogError, progress_entry::ProgressError, project::ProjectError,
        remote_config::RemoteConfigError, user::UserError, work_item::WorkItemError,
    },
};
use services::services::{
    auth::AuthError, identity::IdentityError, remote_source::RemoteSourceError, sync::SyncError,
};
use thiserror::Error;
use utils::response::ApiResponse;
use utils_jwt::TokenError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    WorkItem(#[from] WorkItemError),
    #[error(transparent)]
    Backlog(#[from] BacklogError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    RemoteConfig(#[from] RemoteConfigError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Source(#[from] RemoteSourceError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::User(err) => match err {
                UserError::EmailTaken => (StatusCode::CONFLICT, "UserError"),
                UserError::NotFound => (StatusCode::NOT_FOUND, "UserError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "UserError"),
            },
            ApiError::Project(err) => match err {
                ProjectError::NotFound => (StatusCode::NOT_FOUND, "ProjectError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ProjectError"),
            },
            ApiError::WorkItem(err) => match err {
                WorkItemError::NotFound | WorkItemError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "WorkItemError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "WorkItemError"),
            },
            ApiError::Backlog(err) => match err {
                BacklogError::NotFound | BacklogError::ProjectNotFound => {
                    (StatusCode::NOT_FOUND, "BacklogError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "BacklogError"),
            },
            ApiError::Progress(err) => match err {
                ProgressError::WorkItemNotFound => (StatusCode::NOT_FOUND, "ProgressError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "ProgressError"),
            },
            ApiError::RemoteConfig(err) => match err {
                RemoteConfigError::NotConfigured => {
                    (StatusCode::BAD_REQUEST, "RemoteConfigError")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "RemoteConfigError"),
            },
            ApiError::Identity(err) => match err {
                IdentityError::UnknownUser => (StatusCode::UNAUTHORIZED, "IdentityError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "IdentityError"),
            },
            ApiError::Token(_) => (StatusCode::UNAUTHORIZED, "TokenError"),
            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "AuthError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "AuthError"),
            },
            ApiError::Source(_) => (StatusCode::BAD_GATEWAY, "RemoteSourceError"),
            ApiError::Sync(err) => match err {
                SyncError::Source(_) => (StatusCode::BAD_GATEWAY, "SyncError"),
                SyncError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SyncError"),
            },
            ApiError::Database(db_err) => match db_err {
                DbErr::RecordNotFound(_) => (StatusCode::NOT_FOUND, "DatabaseError"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "DatabaseError"),
            },
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "ConflictError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::User(UserError::EmailTaken) => "Email already registered".to_string(),
            ApiError::Auth(AuthError::InvalidCredentials) => "Invalid credentials".to_string(),
            ApiError::Token(_) => "Invalid token".to_string(),
            _ => format!("{}: {}", error_type, self),
        };

        if status_code.is_server_error() {
            tracing::error!(
                status = %status_code,
                error_type,
                error = %self,
                "API request failed"
            );
        }
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
