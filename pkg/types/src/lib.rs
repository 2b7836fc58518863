pub mod config;
pub mod project;
pub mod quota;
pub mod rbac;
