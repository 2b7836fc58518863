//! Project admission constants: annotation/label keys and payload field names.

/// Annotation holding the JSON list of role templates that must produce
/// creator role-bindings, e.g. `{"required":["project-owner"]}`.
pub const CREATOR_ROLE_BINDINGS_ANNOTATION: &str =
    "authz.management.cattle.io/creator-role-bindings";

/// Label marking a platform-managed project that cannot be deleted.
pub const SYSTEM_PROJECT_LABEL: &str = "authz.management.cattle.io/system-project";

/// Key inside the creator role-bindings annotation.
pub const REQUIRED_ROLE_TEMPLATES_KEY: &str = "required";

/// Payload field carrying the project's aggregate quota.
pub const QUOTA_FIELD: &str = "resourceQuota";

/// Payload field carrying the per-namespace default quota.
pub const NAMESPACE_QUOTA_FIELD: &str = "namespaceDefaultResourceQuota";

/// Payload field carrying annotations.
pub const ANNOTATIONS_FIELD: &str = "annotations";

/// Default cluster id used when none is configured.
pub const DEFAULT_CLUSTER_ID: &str = "local";

/// Display name of the seeded system project.
pub const SYSTEM_PROJECT_NAME: &str = "System";

/// Role templates seeded on first start: `(name, project_creator_default)`.
pub const DEFAULT_ROLE_TEMPLATES: &[(&str, bool)] = &[
    ("project-owner", true),
    ("project-member", false),
    ("read-only", false),
];
