use async_trait::async_trait;
use pkg_types::project::Project;
use pkg_types::rbac::RoleTemplate;

use crate::error::StoreError;

/// Untyped request/response body of the object API.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Generic create/read/update/delete persistence for one resource type.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Payload>, StoreError>;

    async fn get(&self, id: &str) -> Result<Payload, StoreError>;

    /// Persist a new object; the store assigns its identity.
    async fn create(&self, data: Payload) -> Result<Payload, StoreError>;

    async fn update(&self, id: &str, data: Payload) -> Result<Payload, StoreError>;

    /// Remove an object, returning what was removed.
    async fn delete(&self, id: &str) -> Result<Payload, StoreError>;
}

/// Read access to role templates.
#[async_trait]
pub trait RoleTemplateLister: Send + Sync {
    /// All role templates in listing order.
    async fn list_role_templates(&self) -> Result<Vec<RoleTemplate>, StoreError>;
}

#[async_trait]
pub trait RoleTemplateStore: RoleTemplateLister {
    async fn create_role_template(&self, template: RoleTemplate)
    -> Result<RoleTemplate, StoreError>;
}

/// Typed project lookup by composite key.
#[async_trait]
pub trait ProjectLister: Send + Sync {
    async fn get_project(&self, cluster_id: &str, name: &str) -> Result<Project, StoreError>;
}
