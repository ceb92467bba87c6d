use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, put},
};
use db::models::backlog::{Backlog, CreateBacklog, UpdateBacklog};
use serde::Deserialize;
use services::services::identity::IdentityContext;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_backlog_middleware};

#[derive(Debug, Deserialize)]
pub struct BacklogQuery {
    pub project_id: Option<Uuid>,
}

pub async fn get_backlogs(
    State(state): State<AppState>,
    Query(query): Query<BacklogQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Backlog>>>, ApiError> {
    let entries = Backlog::find_all(&state.db().conn, query.project_id).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// The author is always the resolved caller, never request input.
pub async fn create_backlog(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
    Json(payload): Json<CreateBacklog>,
) -> Result<ResponseJson<ApiResponse<Backlog>>, ApiError> {
    let entry =
        Backlog::create(&state.db().conn, &payload, &identity.email, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn update_backlog(
    Extension(existing_entry): Extension<Backlog>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateBacklog>,
) -> Result<ResponseJson<ApiResponse<Backlog>>, ApiError> {
    let entry = Backlog::update(&state.db().conn, existing_entry.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn delete_backlog(
    Extension(entry): Extension<Backlog>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Backlog::delete(&state.db().conn, entry.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Backlog entry not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let backlog_id_router = Router::new()
        .route("/", put(update_backlog))
        .route("/", delete(delete_backlog))
        .layer(from_fn_with_state(state.clone(), load_backlog_middleware));

    let inner = Router::new()
        .route("/", get(get_backlogs).post(create_backlog))
        .nest("/{backlog_id}", backlog_id_router);

    Router::new().nest("/backlogs", inner)
}
