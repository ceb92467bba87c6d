use axum::{
    Extension, Json, Router,
    extract::State,
    middleware::from_fn_with_state,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::project::{CreateProject, Project, UpdateProject};
use services::services::identity::IdentityContext;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::load_project_middleware};

/// Project listing is an admin view; other roles get an empty list rather
/// than an error.
pub async fn get_projects(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = if identity.is_admin() {
        Project::find_all(&state.db().conn).await?
    } else {
        Vec::new()
    };
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn create_project(
    Extension(identity): Extension<IdentityContext>,
    State(state): State<AppState>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::Unauthorized);
    }

    tracing::debug!("Creating project '{}'", payload.name);
    let project = Project::create(&state.db().conn, &payload, Uuid::new_v4()).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_project(
    Extension(project): Extension<Project>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    Extension(identity): Extension<IdentityContext>,
    Extension(existing_project): Extension<Project>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::Unauthorized);
    }

    let project = Project::update(&state.db().conn, existing_project.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    let project_id_router = Router::new()
        .route("/", get(get_project))
        .route("/", put(update_project))
        .layer(from_fn_with_state(state.clone(), load_project_middleware));

    let inner = Router::new()
        .route("/", get(get_projects).post(create_project))
        .nest("/{project_id}", project_id_router);

    Router::new().nest("/projects", inner)
}
