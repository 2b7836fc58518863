//! Persistence collaborators for the management API.
//!
//! [`store`] defines the capabilities the API layer depends on;
//! [`registry`] implements them on SlateDB.

pub mod error;
pub mod registry;
pub mod store;

pub use error::StoreError;
pub use registry::Registry;
pub use store::{ObjectStore, Payload, ProjectLister, RoleTemplateLister, RoleTemplateStore};
