use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named role that can be bound to users of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Bound to the creator of every new project.
    #[serde(default)]
    pub project_creator_default: bool,
    /// Locked templates cannot be used for new bindings.
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl RoleTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            project_creator_default: false,
            locked: false,
            created_at: Utc::now(),
        }
    }

    /// Whether a project creator must receive a binding to this template.
    pub fn binds_project_creator(&self) -> bool {
        self.project_creator_default && !self.locked
    }
}
