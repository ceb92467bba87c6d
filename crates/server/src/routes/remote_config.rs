use axum::{
    Json, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::remote_config::{CreateRemoteConfig, RemoteConfig};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Saves a new configuration as the single active one. The deactivate-all
/// plus insert runs atomically in the model layer. The access token never
/// appears in the response.
pub async fn save_remote_config(
    State(state): State<AppState>,
    Json(payload): Json<CreateRemoteConfig>,
) -> Result<ResponseJson<ApiResponse<RemoteConfig>>, ApiError> {
    let config = RemoteConfig::set_active(&state.db().conn, &payload, Uuid::new_v4()).await?;
    tracing::info!(project = %config.project_name, "Saved remote source configuration");
    Ok(ResponseJson(ApiResponse::success_with_message(
        config,
        "Remote source configuration saved",
    )))
}

pub async fn get_remote_config(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Option<RemoteConfig>>>, ApiError> {
    let config = RemoteConfig::find_active(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(config)))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/remote-config",
        get(get_remote_config).post(save_remote_config),
    )
}
