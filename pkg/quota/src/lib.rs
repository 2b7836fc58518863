//! Static resource-quota fit checking.
//!
//! Parses Kubernetes-style quantities and decides whether one limit set is
//! bounded by another, per resource name.

pub mod error;
pub mod fit;
pub mod limits;
pub mod quantity;

pub use error::{QuantityError, QuotaError};
pub use fit::{QuotaFit, is_quota_fit};
pub use limits::{ResourceList, to_resource_list};
pub use quantity::Quantity;
