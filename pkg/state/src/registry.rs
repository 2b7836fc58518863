use async_trait::async_trait;
use chrono::Utc;
use pkg_constants::state::{
    PROJECT_NAME_PREFIX, PROJECT_NAME_RANDOM_LEN, PROJECTS_PREFIX, ROLE_TEMPLATES_PREFIX,
};
use pkg_types::project::{Project, split_project_id};
use pkg_types::rbac::RoleTemplate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use slatedb::Db;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{ObjectStore, Payload, ProjectLister, RoleTemplateLister, RoleTemplateStore};

const PROJECT: &str = "project";
const ROLE_TEMPLATE: &str = "roleTemplate";

/// Generated names tried before a create gives up on a free one.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Fields a project update cannot change.
const IMMUTABLE_PROJECT_FIELDS: &[&str] = &["id", "name", "clusterId", "createdAt"];

/// Projects and role templates persisted in SlateDB on a local filesystem.
///
/// Projects live under `/registry/projects/<cluster>/<name>`, role templates
/// under `/registry/roletemplates/<name>`.
#[derive(Clone)]
pub struct Registry {
    db: Db,
}

impl Registry {
    /// Open (or create) a registry rooted at `path` on the local filesystem.
    pub async fn open(path: &str) -> anyhow::Result<Self> {
        info!("Opening SlateDB registry at {}", path);

        std::fs::create_dir_all(path)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory {}: {}", path, e))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(path)
                .map_err(|e| anyhow::anyhow!("Failed to create local object store: {}", e))?,
        );
        let db = Db::open(Path::from("/"), object_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open SlateDB: {}", e))?;
        Ok(Self { db })
    }

    /// Gracefully close the registry.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing SlateDB registry");
        self.db
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB close failed: {}", e))
    }

    async fn read<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let bytes = self
            .db
            .get(key.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB get failed: {}", e))?;
        bytes
            .map(|b| serde_json::from_slice(&b).map_err(|source| StoreError::Codec { kind, source }))
            .transpose()
    }

    async fn write<T: Serialize>(
        &self,
        kind: &'static str,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let data =
            serde_json::to_vec(value).map_err(|source| StoreError::Codec { kind, source })?;
        self.db
            .put(key.as_bytes(), &data)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB put failed: {}", e).into())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.db
            .delete(key.as_bytes())
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB delete failed: {}", e).into())
    }

    /// All values under `prefix`, in key order.
    async fn scan<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError> {
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan_prefix failed: {}", e))?;

        let mut results = Vec::new();
        while let Some(kv) = iter
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan failed: {}", e))?
        {
            let value = serde_json::from_slice(&kv.value)
                .map_err(|source| StoreError::Codec { kind, source })?;
            results.push(value);
        }
        Ok(results)
    }

    /// First name from `names` that is free in `cluster_id`, with its key.
    async fn free_project_name(
        &self,
        cluster_id: &str,
        mut names: impl FnMut() -> String,
    ) -> Result<(String, String), StoreError> {
        let mut name = names();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let key = project_key(cluster_id, &name);
            if self.read::<Project>(PROJECT, &key).await?.is_none() {
                return Ok((name, key));
            }
            if attempt < MAX_NAME_ATTEMPTS {
                debug!("Project name {} taken in {}, retrying", name, cluster_id);
                name = names();
            }
        }
        Err(StoreError::AlreadyExists {
            kind: PROJECT,
            name: format!("{}:{}", cluster_id, name),
        })
    }

    async fn load_project(&self, id: &str) -> Result<(String, Project), StoreError> {
        let (cluster_id, name) = split_project_id(id);
        let key = project_key(cluster_id, name);
        match self.read::<Project>(PROJECT, &key).await? {
            Some(project) => Ok((key, project)),
            None => Err(StoreError::not_found(PROJECT, id)),
        }
    }
}

fn project_key(cluster_id: &str, name: &str) -> String {
    format!("{}{}/{}", PROJECTS_PREFIX, cluster_id, name)
}

fn role_template_key(name: &str) -> String {
    format!("{}{}", ROLE_TEMPLATES_PREFIX, name)
}

/// Generated project name, e.g. `p-3fa9c`.
fn generate_project_name() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", PROJECT_NAME_PREFIX, &random[..PROJECT_NAME_RANDOM_LEN])
}

fn decode_project(data: Payload) -> Result<Project, StoreError> {
    serde_json::from_value(serde_json::Value::Object(data)).map_err(|source| StoreError::Codec {
        kind: PROJECT,
        source,
    })
}

fn encode_project(project: &Project) -> Result<Payload, StoreError> {
    match serde_json::to_value(project) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Invalid {
            kind: PROJECT,
            message: "project did not encode to an object".to_string(),
        }),
        Err(source) => Err(StoreError::Codec {
            kind: PROJECT,
            source,
        }),
    }
}

#[async_trait]
impl ObjectStore for Registry {
    async fn list(&self) -> Result<Vec<Payload>, StoreError> {
        let projects: Vec<Project> = self.scan(PROJECT, PROJECTS_PREFIX).await?;
        projects.iter().map(encode_project).collect()
    }

    async fn get(&self, id: &str) -> Result<Payload, StoreError> {
        let (_, project) = self.load_project(id).await?;
        encode_project(&project)
    }

    async fn create(&self, data: Payload) -> Result<Payload, StoreError> {
        let mut project = decode_project(data)?;
        if project.cluster_id.is_empty() {
            return Err(StoreError::Invalid {
                kind: PROJECT,
                message: "clusterId must not be empty".to_string(),
            });
        }

        let (name, key) = self
            .free_project_name(&project.cluster_id, generate_project_name)
            .await?;
        project.name = name;
        project.id = format!("{}:{}", project.cluster_id, project.name);
        project.created_at = Utc::now();

        self.write(PROJECT, &key, &project).await?;
        info!("Created project {} ({})", project.id, project.display_name);
        encode_project(&project)
    }

    async fn update(&self, id: &str, data: Payload) -> Result<Payload, StoreError> {
        let (key, existing) = self.load_project(id).await?;
        let mut merged = encode_project(&existing)?;
        for (field, value) in data {
            if !IMMUTABLE_PROJECT_FIELDS.contains(&field.as_str()) {
                merged.insert(field, value);
            }
        }

        let project = decode_project(merged)?;
        self.write(PROJECT, &key, &project).await?;
        info!("Updated project {}", project.id);
        encode_project(&project)
    }

    async fn delete(&self, id: &str) -> Result<Payload, StoreError> {
        let (key, project) = self.load_project(id).await?;
        self.remove(&key).await?;
        info!("Deleted project {}", project.id);
        encode_project(&project)
    }
}

#[async_trait]
impl ProjectLister for Registry {
    async fn get_project(&self, cluster_id: &str, name: &str) -> Result<Project, StoreError> {
        self.read(PROJECT, &project_key(cluster_id, name))
            .await?
            .ok_or_else(|| StoreError::not_found(PROJECT, format!("{}:{}", cluster_id, name)))
    }
}

#[async_trait]
impl RoleTemplateLister for Registry {
    async fn list_role_templates(&self) -> Result<Vec<RoleTemplate>, StoreError> {
        self.scan(ROLE_TEMPLATE, ROLE_TEMPLATES_PREFIX).await
    }
}

#[async_trait]
impl RoleTemplateStore for Registry {
    async fn create_role_template(
        &self,
        mut template: RoleTemplate,
    ) -> Result<RoleTemplate, StoreError> {
        if template.name.is_empty() {
            return Err(StoreError::Invalid {
                kind: ROLE_TEMPLATE,
                message: "name must not be empty".to_string(),
            });
        }
        let key = role_template_key(&template.name);
        if self.read::<RoleTemplate>(ROLE_TEMPLATE, &key).await?.is_some() {
            return Err(StoreError::AlreadyExists {
                kind: ROLE_TEMPLATE,
                name: template.name,
            });
        }
        template.created_at = Utc::now();
        self.write(ROLE_TEMPLATE, &key, &template).await?;
        info!("Created role template {}", template.name);
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_constants::project::SYSTEM_PROJECT_LABEL;
    use serde_json::json;

    async fn open_temp() -> (Registry, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("corral-registry-{}", Uuid::new_v4()));
        let registry = Registry::open(dir.to_str().unwrap()).await.unwrap();
        (registry, dir)
    }

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_generated_names_have_prefix() {
        let name = generate_project_name();
        assert!(name.starts_with("p-"));
        assert_eq!(name.len(), 2 + PROJECT_NAME_RANDOM_LEN);
    }

    #[test]
    fn test_keys_follow_registry_layout() {
        assert_eq!(project_key("local", "p-abcde"), "/registry/projects/local/p-abcde");
        assert_eq!(role_template_key("read-only"), "/registry/roletemplates/read-only");
    }

    #[tokio::test]
    async fn test_project_lifecycle() {
        let (registry, dir) = open_temp().await;

        let created = registry
            .create(payload(json!({
                "clusterId": "local",
                "displayName": "web",
                "labels": {SYSTEM_PROJECT_LABEL: "false"},
            })))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("local:p-"));

        let fetched = registry.get(&id).await.unwrap();
        assert_eq!(fetched["displayName"], "web");

        let (cluster, name) = split_project_id(&id);
        let typed = registry.get_project(cluster, name).await.unwrap();
        assert!(!typed.is_system());

        let updated = registry
            .update(&id, payload(json!({"description": "frontend", "clusterId": "other"})))
            .await
            .unwrap();
        assert_eq!(updated["description"], "frontend");
        assert_eq!(updated["clusterId"], "local");
        assert_eq!(registry.list().await.unwrap().len(), 1);

        registry.delete(&id).await.unwrap();
        assert!(registry.get(&id).await.unwrap_err().is_not_found());
        assert!(registry.delete(&id).await.unwrap_err().is_not_found());

        registry.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_create_requires_cluster() {
        let (registry, dir) = open_temp().await;
        let err = registry.create(payload(json!({}))).await.unwrap_err();
        assert!(matches!(err, StoreError::Codec { .. }));

        let err = registry
            .create(payload(json!({"clusterId": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid { .. }));

        registry.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_role_templates_listed_in_key_order() {
        let (registry, dir) = open_temp().await;
        for name in ["read-only", "project-owner", "project-member"] {
            registry
                .create_role_template(RoleTemplate::new(name))
                .await
                .unwrap();
        }
        let err = registry
            .create_role_template(RoleTemplate::new("read-only"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let names: Vec<String> = registry
            .list_role_templates()
            .await
            .unwrap()
            .into_iter()
            .map(|rt| rt.name)
            .collect();
        assert_eq!(names, ["project-member", "project-owner", "read-only"]);

        registry.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_corrupt_role_template_fails_listing() {
        let (registry, dir) = open_temp().await;
        let mut owner = RoleTemplate::new("project-owner");
        owner.project_creator_default = true;
        registry.create_role_template(owner).await.unwrap();
        registry
            .create_role_template(RoleTemplate::new("read-only"))
            .await
            .unwrap();

        registry
            .db
            .put(role_template_key("project-owner").as_bytes(), b"{not json")
            .await
            .unwrap();

        let err = registry.list_role_templates().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Codec {
                kind: ROLE_TEMPLATE,
                ..
            }
        ));

        registry.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_taken_project_name_is_retried() {
        let (registry, dir) = open_temp().await;
        let taken = Project {
            id: "local:p-aaaaa".to_string(),
            name: "p-aaaaa".to_string(),
            cluster_id: "local".to_string(),
            ..decode_project(payload(json!({"clusterId": "local"}))).unwrap()
        };
        registry
            .write(PROJECT, &project_key("local", "p-aaaaa"), &taken)
            .await
            .unwrap();

        let mut candidates = vec!["p-bbbbb", "p-aaaaa"];
        let (name, key) = registry
            .free_project_name("local", || candidates.pop().unwrap().to_string())
            .await
            .unwrap();
        assert_eq!(name, "p-bbbbb");
        assert_eq!(key, project_key("local", "p-bbbbb"));

        let err = registry
            .free_project_name("local", || "p-aaaaa".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        registry.close().await.unwrap();
        let _ = std::fs::remove_dir_all(dir);
    }
}
