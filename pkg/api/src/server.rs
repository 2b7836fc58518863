use axum::{Router, middleware, routing::get};
use pkg_constants::project::{DEFAULT_ROLE_TEMPLATES, SYSTEM_PROJECT_LABEL, SYSTEM_PROJECT_NAME};
use pkg_state::{ObjectStore, Payload, Registry, RoleTemplateLister, RoleTemplateStore};
use pkg_types::rbac::RoleTemplate;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::auth::auth_middleware;
use crate::handlers::{projects, role_templates};
use crate::project_store::ProjectStore;
use crate::request_id::request_id_middleware;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
    pub token: String,
    pub cluster_id: String,
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let registry = Arc::new(Registry::open(&config.data_dir).await?);

    seed_role_templates(registry.as_ref()).await?;
    seed_system_project(registry.as_ref(), &config.cluster_id).await?;

    let projects = ProjectStore::new(registry.clone(), registry.clone(), registry.clone());
    let state = AppState {
        projects: Arc::new(projects),
        role_templates: registry,
        token: config.token,
    };

    let app = router(state);

    info!("Starting API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// All API routes behind token auth, with a request id on every response.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v3/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/v3/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route(
            "/v3/roletemplates",
            get(role_templates::list_role_templates).post(role_templates::create_role_template),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Seed the default role templates on startup. Existing templates are kept.
pub async fn seed_role_templates(store: &dyn RoleTemplateStore) -> anyhow::Result<()> {
    let existing = store.list_role_templates().await?;
    for (name, creator_default) in DEFAULT_ROLE_TEMPLATES {
        if existing.iter().any(|rt| rt.name == *name) {
            continue;
        }
        let mut template = RoleTemplate::new(*name);
        template.project_creator_default = *creator_default;
        store.create_role_template(template).await?;
        info!("Seeded role template: {}", name);
    }
    Ok(())
}

/// Seed the protected system project of `cluster_id` if it has none.
///
/// Goes straight to the store: the system project has no creator to bind.
pub async fn seed_system_project(store: &dyn ObjectStore, cluster_id: &str) -> anyhow::Result<()> {
    let projects = store.list().await?;
    if projects.iter().any(|p| is_system_project_of(p, cluster_id)) {
        return Ok(());
    }

    let data = json!({
        "clusterId": cluster_id,
        "displayName": SYSTEM_PROJECT_NAME,
        "labels": { SYSTEM_PROJECT_LABEL: "true" },
    });
    if let Value::Object(data) = data {
        let created = store.create(data).await?;
        let id = created
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        info!("Seeded system project: {}", id);
    }
    Ok(())
}

fn is_system_project_of(project: &Payload, cluster_id: &str) -> bool {
    project.get("clusterId").and_then(Value::as_str) == Some(cluster_id)
        && project
            .get("labels")
            .and_then(|labels| labels.get(SYSTEM_PROJECT_LABEL))
            .and_then(Value::as_str)
            == Some("true")
}
