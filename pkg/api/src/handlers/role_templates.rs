use axum::{Json, extract::State, http::StatusCode};
use pkg_types::rbac::RoleTemplate;

use crate::AppState;
use crate::error::ApiError;

/// GET /v3/roletemplates
pub async fn list_role_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleTemplate>>, ApiError> {
    Ok(Json(state.role_templates.list_role_templates().await?))
}

/// POST /v3/roletemplates
pub async fn create_role_template(
    State(state): State<AppState>,
    Json(template): Json<RoleTemplate>,
) -> Result<(StatusCode, Json<RoleTemplate>), ApiError> {
    let created = state.role_templates.create_role_template(template).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
