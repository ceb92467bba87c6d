use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::user::{CreateUser, User};
use db::types::UserRole;
use serde::{Deserialize, Serialize};
use services::services::auth::{AuthError, hash_password, verify_password};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserInfo,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<ResponseJson<ApiResponse<UserInfo>>, ApiError> {
    let password_hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db().conn,
        &CreateUser {
            email: payload.email,
            name: payload.name,
            password_hash,
            role: payload.role,
        },
        Uuid::new_v4(),
    )
    .await?;

    tracing::info!(email = %user.email, "Registered user");
    Ok(ResponseJson(ApiResponse::success_with_message(
        user.into(),
        "User registered successfully",
    )))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<LoginResponse>>, ApiError> {
    let user = User::find_by_email(&state.db().conn, &payload.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(&payload.password, &user.password_hash)?;

    let access_token = state.jwt().issue(&user.email, &user.role.to_string())?;

    Ok(ResponseJson(ApiResponse::success(LoginResponse {
        access_token,
        token_type: "bearer",
        user: user.into(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
