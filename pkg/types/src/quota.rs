use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource limits keyed by resource name, with quantity strings as values
/// (`"2Gi"`, `"500m"`, `"10"`).
///
/// The key set is open: besides the well-known camelCase keys
/// (`requestsCpu`, `limitsMemory`, `pods`, ...) any countable resource a
/// cluster defines may appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceQuotaLimit(BTreeMap<String, String>);

impl ResourceQuotaLimit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, resource: impl Into<String>, quantity: impl Into<String>) -> Self {
        self.0.insert(resource.into(), quantity.into());
        self
    }

    pub fn get(&self, resource: &str) -> Option<&str> {
        self.0.get(resource).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceQuotaLimit {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Aggregate quota for a whole project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResourceQuota {
    #[serde(default)]
    pub limit: ResourceQuotaLimit,
}

/// Quota template applied to every namespace created in a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceResourceQuota {
    #[serde(default)]
    pub limit: ResourceQuotaLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_a_plain_json_object() {
        let limit = ResourceQuotaLimit::new()
            .with("limitsMemory", "2Gi")
            .with("pods", "10");
        let json = serde_json::to_value(&limit).unwrap();
        assert_eq!(json, serde_json::json!({"limitsMemory": "2Gi", "pods": "10"}));
    }

    #[test]
    fn test_project_quota_defaults_missing_limit() {
        let quota: ProjectResourceQuota = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(quota.limit.is_empty());

        let quota: NamespaceResourceQuota =
            serde_json::from_value(serde_json::json!({"limit": {"requestsCpu": "500m"}})).unwrap();
        assert_eq!(quota.limit.get("requestsCpu"), Some("500m"));
    }

    #[test]
    fn test_non_string_quantity_is_rejected() {
        let res: Result<NamespaceResourceQuota, _> =
            serde_json::from_value(serde_json::json!({"limit": {"pods": 10}}));
        assert!(res.is_err());
    }
}
