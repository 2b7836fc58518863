use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use pkg_state::Payload;

use crate::AppState;
use crate::error::ApiError;

/// GET /v3/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Payload>>, ApiError> {
    Ok(Json(state.projects.list().await?))
}

/// GET /v3/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payload>, ApiError> {
    Ok(Json(state.projects.get(&id).await?))
}

/// POST /v3/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(data): Json<Payload>,
) -> Result<(StatusCode, Json<Payload>), ApiError> {
    let created = state.projects.create(data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /v3/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<Payload>,
) -> Result<Json<Payload>, ApiError> {
    Ok(Json(state.projects.update(&id, data).await?))
}

/// DELETE /v3/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payload>, ApiError> {
    Ok(Json(state.projects.delete(&id).await?))
}
