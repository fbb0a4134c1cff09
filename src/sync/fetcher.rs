use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::UpstreamConfig;
use crate::permissions::PermissionSet;

/// Who the tenant is, as reported by the permission store. Populated from
/// the first successful fetch and replaced wholesale on change; never
/// destroyed during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantIdentity {
    pub tenant_id: String,
    pub display_name: String,
}

/// One successful read of the permission store: identity and permissions
/// are always fetched and updated together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantSnapshot {
    pub identity: TenantIdentity,
    pub permissions: PermissionSet,
}

/// Transport failures normalized at the fetch boundary. Nothing here is
/// thrown into consumers; the synchronizer absorbs these into state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FetchError {
    /// Network-level failure (includes an unparseable response body).
    /// Retrying on the next poll is expected to help eventually.
    #[error("permission store unreachable: {detail}")]
    Unreachable { detail: String },
    /// The tenant id resolves to no record; retrying will not help.
    #[error("tenant not found")]
    NotFound,
    /// The store answered with a non-success status.
    #[error("permission store returned status {status}")]
    ServerError { status: u16 },
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Unreachable { .. } => "unreachable",
            FetchError::NotFound => "not_found",
            FetchError::ServerError { .. } => "server_error",
        }
    }
}

/// Read seam over the permission store. The HTTP implementation below is
/// the production source; tests script their own.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// One read of the tenant's current record. No internal retry; retry
    /// policy belongs to the synchronizer.
    async fn fetch(&self, tenant_id: &str) -> Result<TenantSnapshot, FetchError>;
}

/// `GET {base}/api/customer/tenant/{tenantId}` response body. Everything
/// is defaulted so a sparse-but-reachable record still deserializes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TenantRecordPayload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    customer_permissions: Option<PermissionSet>,
}

/// Permission store client against the upstream platform API.
pub struct HttpPermissionSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPermissionSource {
    pub fn new(upstream: &UpstreamConfig) -> anyhow::Result<Self> {
        // Normalize to a trailing slash so Url::join keeps any base path.
        let mut base = upstream.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let client = reqwest::Client::builder()
            .timeout(upstream.fetch_timeout())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn tenant_url(&self, tenant_id: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(&format!("api/customer/tenant/{}", tenant_id))
            .map_err(|e| FetchError::Unreachable {
                detail: format!("invalid tenant URL: {}", e),
            })
    }
}

#[async_trait]
impl PermissionSource for HttpPermissionSource {
    async fn fetch(&self, tenant_id: &str) -> Result<TenantSnapshot, FetchError> {
        // Callers guarantee a non-empty tenant id; fetch is never issued
        // without one.
        debug_assert!(!tenant_id.is_empty());

        let url = self.tenant_url(tenant_id)?;
        let response = self.client.get(url).send().await.map_err(|e| {
            FetchError::Unreachable {
                detail: e.to_string(),
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
            });
        }

        let payload: TenantRecordPayload =
            response
                .json()
                .await
                .map_err(|e| FetchError::Unreachable {
                    detail: format!("invalid response body: {}", e),
                })?;

        // A reachable record without explicit permissions degrades to the
        // baseline set rather than blocking the portal.
        let permissions = payload.customer_permissions.unwrap_or_else(|| {
            tracing::warn!(
                "tenant '{}' record carries no customerPermissions, using baseline set",
                tenant_id
            );
            PermissionSet::baseline()
        });

        let identity = TenantIdentity {
            tenant_id: if payload.id.is_empty() {
                tenant_id.to_string()
            } else {
                payload.id
            },
            display_name: payload.name,
        };

        Ok(TenantSnapshot {
            identity,
            permissions,
        })
    }
}
