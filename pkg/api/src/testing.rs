//! In-memory collaborators for handler and interceptor tests.

use async_trait::async_trait;
use pkg_state::{
    ObjectStore, Payload, ProjectLister, RoleTemplateLister, RoleTemplateStore, StoreError,
};
use pkg_types::project::Project;
use pkg_types::rbac::RoleTemplate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct MemoryStore {
    projects: Mutex<BTreeMap<String, Payload>>,
    role_templates: Mutex<Vec<RoleTemplate>>,
    next_id: AtomicUsize,
    fail_role_templates: bool,
    pub(crate) creates: AtomicUsize,
    pub(crate) updates: AtomicUsize,
    pub(crate) deletes: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn with_role_templates(templates: Vec<RoleTemplate>) -> Self {
        Self {
            role_templates: Mutex::new(templates),
            ..Self::default()
        }
    }

    /// A store whose role-template lookups always fail.
    pub(crate) fn failing_role_templates() -> Self {
        Self {
            fail_role_templates: true,
            ..Self::default()
        }
    }

    /// Insert a project directly, bypassing any interceptor.
    pub(crate) fn insert(&self, id: &str, project: Value) {
        let mut payload = project.as_object().cloned().unwrap_or_default();
        payload.insert("id".to_string(), Value::String(id.to_string()));
        self.projects.lock().unwrap().insert(id.to_string(), payload);
    }

    pub(crate) fn stored(&self, id: &str) -> Option<Payload> {
        self.projects.lock().unwrap().get(id).cloned()
    }
}

pub(crate) fn role_template(name: &str, creator_default: bool, locked: bool) -> RoleTemplate {
    let mut rt = RoleTemplate::new(name);
    rt.project_creator_default = creator_default;
    rt.locked = locked;
    rt
}

pub(crate) fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Payload>, StoreError> {
        Ok(self.projects.lock().unwrap().values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Payload, StoreError> {
        self.stored(id)
            .ok_or_else(|| StoreError::not_found("project", id))
    }

    async fn create(&self, mut data: Payload) -> Result<Payload, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        let cluster = data
            .get("clusterId")
            .and_then(Value::as_str)
            .unwrap_or("local")
            .to_string();
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}:p-{:05}", cluster, n);
        data.insert("id".to_string(), Value::String(id.clone()));
        self.projects.lock().unwrap().insert(id, data.clone());
        Ok(data)
    }

    async fn update(&self, id: &str, data: Payload) -> Result<Payload, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        let mut projects = self.projects.lock().unwrap();
        let existing = projects
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("project", id))?;
        existing.extend(data);
        Ok(existing.clone())
    }

    async fn delete(&self, id: &str) -> Result<Payload, StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.projects
            .lock()
            .unwrap()
            .remove(id)
            .ok_or_else(|| StoreError::not_found("project", id))
    }
}

#[async_trait]
impl ProjectLister for MemoryStore {
    async fn get_project(&self, cluster_id: &str, name: &str) -> Result<Project, StoreError> {
        let id = format!("{}:{}", cluster_id, name);
        let data = self
            .stored(&id)
            .ok_or_else(|| StoreError::not_found("project", id.clone()))?;
        serde_json::from_value(Value::Object(data)).map_err(|source| StoreError::Codec {
            kind: "project",
            source,
        })
    }
}

#[async_trait]
impl RoleTemplateLister for MemoryStore {
    async fn list_role_templates(&self) -> Result<Vec<RoleTemplate>, StoreError> {
        if self.fail_role_templates {
            return Err(anyhow::anyhow!("role template cache unavailable").into());
        }
        Ok(self.role_templates.lock().unwrap().clone())
    }
}

#[async_trait]
impl RoleTemplateStore for MemoryStore {
    async fn create_role_template(
        &self,
        template: RoleTemplate,
    ) -> Result<RoleTemplate, StoreError> {
        let mut templates = self.role_templates.lock().unwrap();
        if templates.iter().any(|t| t.name == template.name) {
            return Err(StoreError::AlreadyExists {
                kind: "roleTemplate",
                name: template.name,
            });
        }
        templates.push(template.clone());
        Ok(template)
    }
}
