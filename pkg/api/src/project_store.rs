use pkg_constants::project::{
    ANNOTATIONS_FIELD, CREATOR_ROLE_BINDINGS_ANNOTATION, NAMESPACE_QUOTA_FIELD, QUOTA_FIELD,
    REQUIRED_ROLE_TEMPLATES_KEY,
};
use pkg_quota::is_quota_fit;
use pkg_state::{ObjectStore, Payload, ProjectLister, RoleTemplateLister};
use pkg_types::project::split_project_id;
use pkg_types::quota::{NamespaceResourceQuota, ProjectResourceQuota};
use pkg_types::rbac::RoleTemplate;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Project store that enforces project write policies before delegating to
/// the underlying object store:
///
/// - creates get the creator role-bindings annotation,
/// - creates and updates must declare both quotas or neither, with the
///   namespace default quota inside the project quota,
/// - system projects cannot be deleted.
///
/// Reads are forwarded unchanged.
pub struct ProjectStore {
    inner: Arc<dyn ObjectStore>,
    projects: Arc<dyn ProjectLister>,
    role_templates: Arc<dyn RoleTemplateLister>,
}

impl ProjectStore {
    pub fn new(
        inner: Arc<dyn ObjectStore>,
        projects: Arc<dyn ProjectLister>,
        role_templates: Arc<dyn RoleTemplateLister>,
    ) -> Self {
        Self {
            inner,
            projects,
            role_templates,
        }
    }

    pub async fn list(&self) -> Result<Vec<Payload>, ApiError> {
        Ok(self.inner.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Payload, ApiError> {
        Ok(self.inner.get(id).await?)
    }

    pub async fn create(&self, mut data: Payload) -> Result<Payload, ApiError> {
        let annotation = self.creator_role_bindings().await?;
        validate_resource_quota(&data, "")?;

        put_annotation(&mut data, CREATOR_ROLE_BINDINGS_ANNOTATION, annotation);
        Ok(self.inner.create(data).await?)
    }

    pub async fn update(&self, id: &str, data: Payload) -> Result<Payload, ApiError> {
        validate_resource_quota(&data, id)?;
        Ok(self.inner.update(id, data).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<Payload, ApiError> {
        let (cluster_id, name) = split_project_id(id);
        let project = self.projects.get_project(cluster_id, name).await?;
        if project.is_system() {
            warn!("Rejected deletion of system project {}", id);
            return Err(ApiError::method_not_allowed(
                "System Project cannot be deleted",
            ));
        }
        Ok(self.inner.delete(id).await?)
    }

    /// Current value of the creator role-bindings annotation.
    async fn creator_role_bindings(&self) -> Result<String, ApiError> {
        let templates = self.role_templates.list_role_templates().await?;
        let annotation = creator_role_bindings_annotation(&templates);
        debug!("Creator role-bindings annotation: {}", annotation);
        Ok(annotation)
    }
}

/// JSON object listing, under `required`, every role template a project
/// creator must be bound to, in listing order. Renders `{}` when none apply.
pub fn creator_role_bindings_annotation(templates: &[RoleTemplate]) -> String {
    let required: Vec<Value> = templates
        .iter()
        .filter(|rt| rt.binds_project_creator())
        .map(|rt| Value::String(rt.name.clone()))
        .collect();

    let mut annotation = Map::new();
    if !required.is_empty() {
        annotation.insert(
            REQUIRED_ROLE_TEMPLATES_KEY.to_string(),
            Value::Array(required),
        );
    }
    Value::Object(annotation).to_string()
}

/// Check the project quota / namespace default quota pair of a payload.
///
/// `id` is the target of an update, empty on create.
pub fn validate_resource_quota(data: &Payload, id: &str) -> Result<(), ApiError> {
    let (quota, ns_quota) = match (field(data, QUOTA_FIELD), field(data, NAMESPACE_QUOTA_FIELD)) {
        (None, None) => return Ok(()),
        (Some(_), None) => return Err(ApiError::missing_required(NAMESPACE_QUOTA_FIELD)),
        (None, Some(_)) => return Err(ApiError::missing_required(QUOTA_FIELD)),
        (Some(quota), Some(ns_quota)) => (quota, ns_quota),
    };

    let ns_quota: NamespaceResourceQuota = convert(NAMESPACE_QUOTA_FIELD, ns_quota)?;
    let project_quota: ProjectResourceQuota = convert(QUOTA_FIELD, quota)?;

    let fit = is_quota_fit(&ns_quota.limit, &[], &project_quota.limit)?;
    if fit.fits() {
        return Ok(());
    }

    info!(
        "Rejected project {} write: {} exceeds {} on {}",
        if id.is_empty() { "<new>" } else { id },
        NAMESPACE_QUOTA_FIELD,
        QUOTA_FIELD,
        fit.message()
    );
    Err(ApiError::MaxLimitExceeded {
        field: NAMESPACE_QUOTA_FIELD.to_string(),
        message: format!("exceeds {} on fields: {}", QUOTA_FIELD, fit.message()),
    })
}

/// A payload field, with explicit `null` treated as absent.
fn field<'a>(data: &'a Payload, name: &str) -> Option<&'a Value> {
    data.get(name).filter(|v| !v.is_null())
}

fn convert<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, ApiError> {
    T::deserialize(value).map_err(|source| ApiError::Conversion {
        field: name.to_string(),
        source,
    })
}

/// Set `data.annotations[key]`, creating the annotation map if needed.
fn put_annotation(data: &mut Payload, key: &str, value: String) {
    let annotations = data
        .entry(ANNOTATIONS_FIELD)
        .or_insert_with(|| Value::Object(Map::new()));
    if !annotations.is_object() {
        *annotations = Value::Object(Map::new());
    }
    if let Value::Object(map) = annotations {
        map.insert(key.to_string(), Value::String(value));
    }
}
