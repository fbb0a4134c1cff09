use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::permissions::Capability;

/// Logical page identity, decoupled from URL shape. Every page is gated by
/// exactly one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageId {
    Dashboard,
    RegulatoryUpdates,
    LegalCases,
    KnowledgeBase,
    Newsletters,
    Analytics,
    Reports,
    DataCollection,
    GlobalSources,
    HistoricalData,
    AiInsights,
    Administration,
}

impl PageId {
    pub fn required_capability(&self) -> Capability {
        match self {
            PageId::Dashboard => Capability::Dashboard,
            PageId::RegulatoryUpdates => Capability::RegulatoryUpdates,
            PageId::LegalCases => Capability::LegalCases,
            PageId::KnowledgeBase => Capability::KnowledgeBase,
            PageId::Newsletters => Capability::Newsletters,
            PageId::Analytics => Capability::Analytics,
            PageId::Reports => Capability::Reports,
            PageId::DataCollection => Capability::DataCollection,
            PageId::GlobalSources => Capability::GlobalSources,
            PageId::HistoricalData => Capability::HistoricalData,
            PageId::AiInsights => Capability::AiInsights,
            PageId::Administration => Capability::Administration,
        }
    }
}

/// Page rendered when the remainder of a path matches nothing in the
/// table. Deliberate fallback policy: a recognized tenant context always
/// renders something rather than a 404.
pub const DEFAULT_PAGE: PageId = PageId::Dashboard;

/// Route aliases. Several strings may map to the same page (short and long
/// forms); extending this list is the only change needed to add a route.
pub const ROUTE_ALIASES: &[(&str, PageId)] = &[
    ("dashboard", PageId::Dashboard),
    ("customer-dashboard", PageId::Dashboard),
    ("regulatory-updates", PageId::RegulatoryUpdates),
    ("updates", PageId::RegulatoryUpdates),
    ("legal-cases", PageId::LegalCases),
    ("cases", PageId::LegalCases),
    ("knowledge-base", PageId::KnowledgeBase),
    ("newsletters", PageId::Newsletters),
    ("newsletter", PageId::Newsletters),
    ("analytics", PageId::Analytics),
    ("reports", PageId::Reports),
    ("data-collection", PageId::DataCollection),
    ("global-sources", PageId::GlobalSources),
    ("historical-data", PageId::HistoricalData),
    ("archive", PageId::HistoricalData),
    ("ai-insights", PageId::AiInsights),
    ("administration", PageId::Administration),
    ("admin", PageId::Administration),
];

static ROUTE_TABLE: Lazy<HashMap<&'static str, PageId>> =
    Lazy::new(|| ROUTE_ALIASES.iter().copied().collect());

/// Result of resolving an incoming path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    /// Tenant segment if the path used the multi-tenant form.
    pub tenant_id: Option<String>,
    pub page: PageId,
}

/// Resolve a path to a logical page. Supports both URL shapes without the
/// caller knowing which is in effect:
///
/// - `/tenant/{tenantId}/{route...}` (multi-tenant form)
/// - `/{route...}` (legacy/default-tenant form)
///
/// The first segment after the tenant prefix (or the first segment
/// overall) is looked up in the route table; anything unrecognized falls
/// back to [`DEFAULT_PAGE`].
pub fn resolve(path: &str) -> ResolvedRoute {
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    match segments.next() {
        Some("tenant") => {
            let tenant_id = segments.next().map(str::to_string);
            let page = segments
                .next()
                .map(lookup)
                .unwrap_or(DEFAULT_PAGE);
            ResolvedRoute { tenant_id, page }
        }
        Some(route) => ResolvedRoute {
            tenant_id: None,
            page: lookup(route),
        },
        None => ResolvedRoute {
            tenant_id: None,
            page: DEFAULT_PAGE,
        },
    }
}

fn lookup(route: &str) -> PageId {
    ROUTE_TABLE.get(route).copied().unwrap_or(DEFAULT_PAGE)
}

#[derive(Debug, thiserror::Error)]
pub enum RouteTableError {
    #[error("conflicting route alias: {0}")]
    ConflictingAlias(&'static str),
    #[error("empty route alias")]
    EmptyAlias,
}

/// Startup validation of the alias list; a duplicate alias would silently
/// shadow its earlier mapping once collected into the lookup table.
pub fn validate_table(aliases: &[(&'static str, PageId)]) -> Result<(), RouteTableError> {
    let mut seen = HashMap::new();
    for (alias, page) in aliases {
        if alias.is_empty() {
            return Err(RouteTableError::EmptyAlias);
        }
        if let Some(previous) = seen.insert(*alias, *page) {
            if previous != *page {
                return Err(RouteTableError::ConflictingAlias(alias));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table_is_valid() {
        validate_table(ROUTE_ALIASES).unwrap();
    }

    #[test]
    fn test_tenant_prefixed_resolution() {
        let resolved = resolve("/tenant/abc123/legal-cases");
        assert_eq!(resolved.tenant_id.as_deref(), Some("abc123"));
        assert_eq!(resolved.page, PageId::LegalCases);
    }

    #[test]
    fn test_bare_path_resolution() {
        let resolved = resolve("/newsletters");
        assert_eq!(resolved.tenant_id, None);
        assert_eq!(resolved.page, PageId::Newsletters);
    }

    #[test]
    fn test_unknown_route_falls_back_to_default() {
        let resolved = resolve("/tenant/abc123/nonexistent-route");
        assert_eq!(resolved.tenant_id.as_deref(), Some("abc123"));
        assert_eq!(resolved.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_aliases_resolve_to_the_same_page() {
        let short = resolve("/tenant/abc123/dashboard");
        let long = resolve("/tenant/abc123/customer-dashboard");
        assert_eq!(short.page, long.page);

        assert_eq!(resolve("/admin").page, resolve("/administration").page);
    }

    #[test]
    fn test_tenant_prefix_without_route() {
        let resolved = resolve("/tenant/abc123");
        assert_eq!(resolved.tenant_id.as_deref(), Some("abc123"));
        assert_eq!(resolved.page, DEFAULT_PAGE);
    }

    #[test]
    fn test_empty_and_root_paths() {
        assert_eq!(resolve("/").page, DEFAULT_PAGE);
        assert_eq!(resolve("").page, DEFAULT_PAGE);
    }

    #[test]
    fn test_trailing_slash_is_insignificant() {
        assert_eq!(resolve("/reports/").page, PageId::Reports);
        assert_eq!(resolve("/tenant/t1/reports/").page, PageId::Reports);
    }
}
