//! State store key layout.

/// Key prefix for projects. Full key = `PROJECTS_PREFIX + cluster + "/" + project`.
pub const PROJECTS_PREFIX: &str = "/registry/projects/";

/// Key prefix for role templates. Full key = `ROLE_TEMPLATES_PREFIX + name`.
pub const ROLE_TEMPLATES_PREFIX: &str = "/registry/roletemplates/";

/// Prefix of generated project names (`p-xxxxx`).
pub const PROJECT_NAME_PREFIX: &str = "p-";

/// Number of random characters in a generated project name.
pub const PROJECT_NAME_RANDOM_LEN: usize = 5;
