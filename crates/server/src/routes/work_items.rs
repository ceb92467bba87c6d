use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{delete, get, put},
};
use db::models::work_item::{CreateWorkItem, UpdateWorkItem, WorkItem};
use serde::Deserialize;
use services::services::identity::IdentityContext;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_work_item_middleware};

#[derive(Debug, Deserialize)]
pub struct WorkItemQuery {
    pub project_id: Option<Uuid>,
}

/// Lists the caller's work items: assignment matches the caller's email or
/// external alias, case-insensitively.
pub async fn get_work_items(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
    Query(query): Query<WorkItemQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<WorkItem>>>, ApiError> {
    let items = WorkItem::find_assigned(
        &state.db().conn,
        query.project_id,
        &identity.assignment_identities(),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(items)))
}

pub async fn create_work_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkItem>,
) -> Result<ResponseJson<ApiResponse<WorkItem>>, ApiError> {
    tracing::debug!(
        "Creating work item '{}' in project {}",
        payload.title,
        payload.project_id
    );
    let item = WorkItem::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

pub async fn update_work_item(
    Extension(existing_item): Extension<WorkItem>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkItem>,
) -> Result<ResponseJson<ApiResponse<WorkItem>>, ApiError> {
    let item = WorkItem::update(&state.db().conn, existing_item.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

pub async fn delete_work_item(
    Extension(item): Extension<WorkItem>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = WorkItem::delete(&state.db().conn, item.id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("Work item not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let item_id_router = Router::new()
        .route("/", put(update_work_item))
        .route("/", delete(delete_work_item))
        .layer(from_fn_with_state(state.clone(), load_work_item_middleware));

    let inner = Router::new()
        .route("/", get(get_work_items).post(create_work_item))
        .nest("/{item_id}", item_id_router);

    Router::new().nest("/work-items", inner)
}
