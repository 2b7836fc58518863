use std::collections::btree_map::Entry;

use pkg_types::quota::ResourceQuotaLimit;
use tracing::debug;

use crate::error::QuotaError;
use crate::limits::to_resource_list;

/// Outcome of a fit check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaFit {
    exceeded: Vec<String>,
}

impl QuotaFit {
    pub fn fits(&self) -> bool {
        self.exceeded.is_empty()
    }

    /// Resource names over their bound, in ascending order.
    pub fn exceeded(&self) -> &[String] {
        &self.exceeded
    }

    /// Human-readable list of the exceeded resources.
    pub fn message(&self) -> String {
        self.exceeded.join(", ")
    }
}

/// Check that `child`, together with every `intermediate` tier, stays within
/// `parent` for each resource it declares.
///
/// Tiers are summed per resource before comparing. A resource the parent
/// does not declare is unbounded. All violations are reported, not just the
/// first. Inputs are never modified.
pub fn is_quota_fit(
    child: &ResourceQuotaLimit,
    intermediate: &[ResourceQuotaLimit],
    parent: &ResourceQuotaLimit,
) -> Result<QuotaFit, QuotaError> {
    let mut total = to_resource_list(child)?;
    for tier in intermediate {
        for (name, quantity) in to_resource_list(tier)? {
            match total.entry(name) {
                Entry::Occupied(mut slot) => {
                    let sum = slot.get().checked_add(&quantity).ok_or_else(|| {
                        QuotaError::Overflow {
                            resource: slot.key().clone(),
                        }
                    })?;
                    slot.insert(sum);
                }
                Entry::Vacant(slot) => {
                    slot.insert(quantity);
                }
            }
        }
    }

    let bounds = to_resource_list(parent)?;
    let exceeded: Vec<String> = total
        .iter()
        .filter(|(name, requested)| bounds.get(*name).is_some_and(|bound| *requested > bound))
        .map(|(name, _)| name.clone())
        .collect();

    if !exceeded.is_empty() {
        debug!("Quota does not fit, exceeded: {}", exceeded.join(", "));
    }
    Ok(QuotaFit { exceeded })
}
