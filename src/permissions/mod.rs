pub mod gate;

use serde::{Deserialize, Serialize};

/// Named feature flags recognized by the platform. The set is closed:
/// navigation entries and pages reference capabilities through this enum,
/// so a dangling capability reference cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
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
    Administration,
    UserManagement,
    SystemSettings,
    AuditLogs,
    AiInsights,
    AdvancedAnalytics,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::Dashboard,
        Capability::RegulatoryUpdates,
        Capability::LegalCases,
        Capability::KnowledgeBase,
        Capability::Newsletters,
        Capability::Analytics,
        Capability::Reports,
        Capability::DataCollection,
        Capability::GlobalSources,
        Capability::HistoricalData,
        Capability::Administration,
        Capability::UserManagement,
        Capability::SystemSettings,
        Capability::AuditLogs,
        Capability::AiInsights,
        Capability::AdvancedAnalytics,
    ];

    /// Wire name as it appears in `customerPermissions` payloads.
    pub fn as_key(&self) -> &'static str {
        match self {
            Capability::Dashboard => "dashboard",
            Capability::RegulatoryUpdates => "regulatoryUpdates",
            Capability::LegalCases => "legalCases",
            Capability::KnowledgeBase => "knowledgeBase",
            Capability::Newsletters => "newsletters",
            Capability::Analytics => "analytics",
            Capability::Reports => "reports",
            Capability::DataCollection => "dataCollection",
            Capability::GlobalSources => "globalSources",
            Capability::HistoricalData => "historicalData",
            Capability::Administration => "administration",
            Capability::UserManagement => "userManagement",
            Capability::SystemSettings => "systemSettings",
            Capability::AuditLogs => "auditLogs",
            Capability::AiInsights => "aiInsights",
            Capability::AdvancedAnalytics => "advancedAnalytics",
        }
    }

    /// Capabilities reachable without any tenant permissions. The current
    /// catalog has none; everything is deny-by-default until a successful
    /// fetch.
    pub fn is_public(&self) -> bool {
        false
    }
}

impl std::str::FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .iter()
            .find(|c| c.as_key() == s)
            .copied()
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

/// A tenant's full feature-flag assignment. Every recognized capability is
/// always present; unknown wire fields are ignored and missing fields read
/// as disabled. Instances are replaced wholesale on change, never mutated,
/// and `PartialEq` supplies the deep value comparison used for change
/// detection across fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionSet {
    pub dashboard: bool,
    pub regulatory_updates: bool,
    pub legal_cases: bool,
    pub knowledge_base: bool,
    pub newsletters: bool,
    pub analytics: bool,
    pub reports: bool,
    pub data_collection: bool,
    pub global_sources: bool,
    pub historical_data: bool,
    pub administration: bool,
    pub user_management: bool,
    pub system_settings: bool,
    pub audit_logs: bool,
    pub ai_insights: bool,
    pub advanced_analytics: bool,
}

impl PermissionSet {
    /// Conservative fallback used when a reachable tenant record carries no
    /// explicit permissions: the base content areas stay usable, all
    /// administrative and analytics capabilities stay off.
    pub fn baseline() -> Self {
        Self {
            dashboard: true,
            regulatory_updates: true,
            legal_cases: true,
            knowledge_base: true,
            newsletters: true,
            ..Self::default()
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Dashboard => self.dashboard,
            Capability::RegulatoryUpdates => self.regulatory_updates,
            Capability::LegalCases => self.legal_cases,
            Capability::KnowledgeBase => self.knowledge_base,
            Capability::Newsletters => self.newsletters,
            Capability::Analytics => self.analytics,
            Capability::Reports => self.reports,
            Capability::DataCollection => self.data_collection,
            Capability::GlobalSources => self.global_sources,
            Capability::HistoricalData => self.historical_data,
            Capability::Administration => self.administration,
            Capability::UserManagement => self.user_management,
            Capability::SystemSettings => self.system_settings,
            Capability::AuditLogs => self.audit_logs,
            Capability::AiInsights => self.ai_insights,
            Capability::AdvancedAnalytics => self.advanced_analytics,
        }
    }

    /// Capabilities currently enabled, in recognized-key order.
    pub fn enabled(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }
}
