use axum::{
    Extension, Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use services::services::{
    identity::IdentityContext,
    reports::{ProjectStatusRow, ReportWindow, UtilizationRow},
};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn utilization_report(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
    Query(window): Query<ReportWindow>,
) -> Result<ResponseJson<ApiResponse<Vec<UtilizationRow>>>, ApiError> {
    let rows =
        services::services::reports::utilization_report(&state.db().conn, &identity, &window)
            .await?;
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub async fn project_status_report(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectStatusRow>>>, ApiError> {
    let rows = services::services::reports::project_status_report(&state.db().conn).await?;
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/utilization", get(utilization_report))
        .route("/reports/project-status", get(project_status_report))
}
