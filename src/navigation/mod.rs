use serde::Serialize;

use crate::permissions::{gate, Capability, PermissionSet};

/// One sidebar entry. The catalog is fixed at process start and read-only;
/// entry order is the product's information architecture and is preserved
/// through projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub name: &'static str,
    pub path: &'static str,
    pub required: Capability,
    pub description: &'static str,
}

/// Full navigation catalog, one entry per product area.
pub const CATALOG: &[NavEntry] = &[
    NavEntry {
        name: "Dashboard",
        path: "/dashboard",
        required: Capability::Dashboard,
        description: "Aggregated overview of recent regulatory activity",
    },
    NavEntry {
        name: "Regulatory Updates",
        path: "/regulatory-updates",
        required: Capability::RegulatoryUpdates,
        description: "Notified body and authority announcements",
    },
    NavEntry {
        name: "Legal Cases",
        path: "/legal-cases",
        required: Capability::LegalCases,
        description: "Court decisions relevant to medical devices",
    },
    NavEntry {
        name: "Knowledge Base",
        path: "/knowledge-base",
        required: Capability::KnowledgeBase,
        description: "Curated guidance articles and standards summaries",
    },
    NavEntry {
        name: "Newsletter",
        path: "/newsletters",
        required: Capability::Newsletters,
        description: "Subscription digests and archive",
    },
    NavEntry {
        name: "Analytics",
        path: "/analytics",
        required: Capability::Analytics,
        description: "Usage and coverage analytics",
    },
    NavEntry {
        name: "Reports",
        path: "/reports",
        required: Capability::Reports,
        description: "Exportable compliance reports",
    },
    NavEntry {
        name: "Data Collection",
        path: "/data-collection",
        required: Capability::DataCollection,
        description: "Source ingestion status and controls",
    },
    NavEntry {
        name: "Global Sources",
        path: "/global-sources",
        required: Capability::GlobalSources,
        description: "International regulator and registry coverage",
    },
    NavEntry {
        name: "Historical Data",
        path: "/historical-data",
        required: Capability::HistoricalData,
        description: "Archive beyond the standard retention window",
    },
    NavEntry {
        name: "AI Insights",
        path: "/ai-insights",
        required: Capability::AiInsights,
        description: "Machine-generated impact assessments",
    },
    NavEntry {
        name: "Administration",
        path: "/administration",
        required: Capability::Administration,
        description: "Tenant settings and user administration",
    },
];

/// Filter the catalog through the access gate, preserving catalog order.
/// The previous projection is always discarded wholesale; with a catalog
/// this small, recomputing beats incremental patching.
///
/// An empty result is a real state the caller must render explicitly
/// ("no accessible navigation"), not an error.
pub fn project<'a>(
    catalog: &'a [NavEntry],
    permissions: Option<&PermissionSet>,
) -> Vec<&'a NavEntry> {
    catalog
        .iter()
        .filter(|entry| gate::is_allowed(permissions, entry.required))
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate navigation path: {0}")]
    DuplicatePath(&'static str),
    #[error("duplicate navigation name: {0}")]
    DuplicateName(&'static str),
    #[error("navigation entry with empty {0}")]
    EmptyField(&'static str),
}

/// Startup validation of the static catalog. Configuration mistakes are
/// fatal here, never degraded at request time.
pub fn validate_catalog(catalog: &[NavEntry]) -> Result<(), CatalogError> {
    let mut seen_paths = std::collections::HashSet::new();
    let mut seen_names = std::collections::HashSet::new();
    for entry in catalog {
        if entry.name.is_empty() {
            return Err(CatalogError::EmptyField("name"));
        }
        if entry.path.is_empty() || !entry.path.starts_with('/') {
            return Err(CatalogError::EmptyField("path"));
        }
        if !seen_paths.insert(entry.path) {
            return Err(CatalogError::DuplicatePath(entry.path));
        }
        if !seen_names.insert(entry.name) {
            return Err(CatalogError::DuplicateName(entry.name));
        }
    }
    Ok(())
}
