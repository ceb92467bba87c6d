use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::remote_config::{RemoteConfig, RemoteConfigError};
use services::services::{
    identity::IdentityContext,
    remote_source::WiqlFilter,
    sync::{ReconcileResult, run_sync},
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// User-triggered synchronous sync against the configured tracker. The
/// remote call either returns data or fails the whole request; reconciled
/// writes happen in one transaction.
pub async fn sync_remote_items(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<ReconcileResult>>, ApiError> {
    let config = RemoteConfig::find_active(&state.db().conn)
        .await?
        .ok_or(RemoteConfigError::NotConfigured)?;

    // Items in the tracker are assigned under the caller's external alias;
    // fall back to the local email when no mapping exists.
    let assignee = identity
        .external_alias
        .clone()
        .unwrap_or_else(|| identity.email.clone());
    let filter = WiqlFilter {
        project: config.project_name.clone(),
        assignee,
    };

    let client = state.boards_client(&config);
    let result = run_sync(&state.db().conn, &client, &filter, &config.project_name).await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        result,
        "Remote sync completed",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/sync", post(sync_remote_items))
}
