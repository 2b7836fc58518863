pub mod auth;
pub mod error;
pub mod handlers;
pub mod project_store;
pub mod request_id;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use pkg_state::RoleTemplateStore;

use crate::project_store::ProjectStore;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<ProjectStore>,
    pub role_templates: Arc<dyn RoleTemplateStore>,
    pub token: String,
}
