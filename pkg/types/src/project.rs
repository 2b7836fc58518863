use chrono::{DateTime, Utc};
use pkg_constants::project::SYSTEM_PROJECT_LABEL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::quota::{NamespaceResourceQuota, ProjectResourceQuota};

/// A tenant-scoped grouping of namespaces inside a cluster.
///
/// `id` is the composite `<cluster_id>:<name>` key assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub cluster_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_quota: Option<ProjectResourceQuota>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_default_resource_quota: Option<NamespaceResourceQuota>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Whether this is a platform-managed project protected from deletion.
    pub fn is_system(&self) -> bool {
        self.labels
            .get(SYSTEM_PROJECT_LABEL)
            .is_some_and(|v| v == "true")
    }
}

/// Split a project id into `(cluster_id, project_name)`.
///
/// The cluster is the first `:`-separated segment and the project the last,
/// so a bare `p-abcde` resolves to `("p-abcde", "p-abcde")`.
pub fn split_project_id(id: &str) -> (&str, &str) {
    let cluster = id.split(':').next().unwrap_or(id);
    let project = id.rsplit(':').next().unwrap_or(id);
    (cluster, project)
}
