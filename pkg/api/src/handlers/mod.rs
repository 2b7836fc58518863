pub mod projects;
pub mod role_templates;
