use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use pkg_types::quota::ResourceQuotaLimit;

use crate::error::QuotaError;
use crate::quantity::Quantity;

/// Parsed limits keyed by canonical resource name.
pub type ResourceList = BTreeMap<String, Quantity>;

/// camelCase payload keys and the resource names they stand for.
const RESOURCE_NAMES: &[(&str, &str)] = &[
    ("pods", "pods"),
    ("services", "services"),
    ("secrets", "secrets"),
    ("replicationControllers", "replicationcontrollers"),
    ("configMaps", "configmaps"),
    ("persistentVolumeClaims", "persistentvolumeclaims"),
    ("servicesNodePorts", "services.nodeports"),
    ("servicesLoadBalancers", "services.loadbalancers"),
    ("requestsCpu", "requests.cpu"),
    ("requestsMemory", "requests.memory"),
    ("requestsStorage", "requests.storage"),
    ("limitsCpu", "limits.cpu"),
    ("limitsMemory", "limits.memory"),
];

/// Canonical resource name for a limit key. Unknown keys pass through.
pub fn resource_name(key: &str) -> &str {
    RESOURCE_NAMES
        .iter()
        .find(|(from, _)| *from == key)
        .map_or(key, |(_, to)| to)
}

/// Convert a payload limit set into parsed quantities keyed by resource name.
///
/// Empty values are treated as unset. Two keys naming the same resource
/// (`requestsCpu` and `requests.cpu`) are rejected.
pub fn to_resource_list(limit: &ResourceQuotaLimit) -> Result<ResourceList, QuotaError> {
    let mut list = ResourceList::new();
    for (key, value) in limit.iter() {
        if value.is_empty() {
            continue;
        }
        let name = resource_name(key);
        let quantity: Quantity = value
            .parse()
            .map_err(|source| QuotaError::InvalidQuantity {
                resource: name.to_string(),
                source,
            })?;
        match list.entry(name.to_string()) {
            Entry::Occupied(_) => {
                return Err(QuotaError::DuplicateResource {
                    resource: name.to_string(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(quantity);
            }
        }
    }
    Ok(list)
}
