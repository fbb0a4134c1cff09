use serde::Serialize;

use super::{Capability, PermissionSet};

/// Allow/deny decision for one capability. Absent permissions (no
/// successful fetch yet) deny everything except public capabilities, of
/// which the default catalog has none. Pure and O(1); both the navigation
/// projection and page-level gating go through this single function so the
/// two can never disagree.
pub fn is_allowed(permissions: Option<&PermissionSet>, capability: Capability) -> bool {
    match permissions {
        Some(set) => set.allows(capability),
        None => capability.is_public(),
    }
}

/// Render state for a gated page. "Permissions absent" and "capability
/// disabled" both deny; they differ only in the message shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessDecision {
    /// No response from the permission store yet; show a loading
    /// indicator, not a denial.
    Loading,
    Allowed,
    /// Denied after at least one fetch completed; show the
    /// access-restricted message with tenant-administrator guidance.
    Restricted,
}

pub fn page_state(
    permissions: Option<&PermissionSet>,
    is_loading: bool,
    capability: Capability,
) -> AccessDecision {
    if is_allowed(permissions, capability) {
        AccessDecision::Allowed
    } else if permissions.is_none() && is_loading {
        AccessDecision::Loading
    } else {
        AccessDecision::Restricted
    }
}
