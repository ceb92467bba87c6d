use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::TransactionTrait;
use db::models::{
    progress_entry::{CreateProgressEntry, ProgressEntry},
    work_item::WorkItem,
};
use services::services::identity::IdentityContext;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_work_item_middleware};

/// Inserting the entry and recomputing the parent's actual hours run in one
/// transaction, so the derived figure can never drift from its entries.
pub async fn create_progress(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
    Json(payload): Json<CreateProgressEntry>,
) -> Result<ResponseJson<ApiResponse<ProgressEntry>>, ApiError> {
    let tx = state.db().conn.begin().await?;
    let entry =
        ProgressEntry::create(&tx, &payload, &identity.email, Uuid::new_v4()).await?;
    tx.commit().await?;

    Ok(ResponseJson(ApiResponse::success(entry)))
}

pub async fn get_progress(
    Extension(item): Extension<WorkItem>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ProgressEntry>>>, ApiError> {
    let entries = ProgressEntry::find_by_work_item_id(&state.db().conn, item.id).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let item_router = Router::new()
        .route("/", get(get_progress))
        .layer(from_fn_with_state(state.clone(), load_work_item_middleware));

    let inner = Router::new()
        .route("/", post(create_progress))
        .nest("/{item_id}", item_router);

    Router::new().nest("/progress", inner)
}
