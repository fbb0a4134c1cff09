use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub upstream: UpstreamConfig,
    pub sync: SyncConfig,
    pub api: ApiConfig,
    pub portal: PortalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Upstream platform API that owns the tenant permission store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Per-request cap; must stay below the poll interval so a hung
    /// request cannot starve the next scheduled poll.
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub poll_interval_ms: u64,
    /// Consecutive NotFound responses before the synchronizer parks in a
    /// terminal "tenant missing" state instead of polling forever.
    pub not_found_stop_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Tenant assumed for bare (non-tenant-prefixed) paths. Explicit
    /// configuration, never a literal in resolution logic.
    pub default_tenant: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Upstream overrides
        if let Ok(v) = env::var("REGINTEL_UPSTREAM_URL") {
            self.upstream.base_url = v;
        }
        if let Ok(v) = env::var("UPSTREAM_FETCH_TIMEOUT_MS") {
            self.upstream.fetch_timeout_ms = v.parse().unwrap_or(self.upstream.fetch_timeout_ms);
        }

        // Sync overrides
        if let Ok(v) = env::var("SYNC_POLL_INTERVAL_MS") {
            self.sync.poll_interval_ms = v.parse().unwrap_or(self.sync.poll_interval_ms);
        }
        if let Ok(v) = env::var("SYNC_NOT_FOUND_STOP_LIMIT") {
            self.sync.not_found_stop_limit = v.parse().unwrap_or(self.sync.not_found_stop_limit);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Portal overrides
        if let Ok(v) = env::var("PORTAL_DEFAULT_TENANT") {
            self.portal.default_tenant = if v.is_empty() { None } else { Some(v) };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            upstream: UpstreamConfig {
                base_url: "http://localhost:4000".to_string(),
                fetch_timeout_ms: 2_500,
            },
            sync: SyncConfig {
                poll_interval_ms: 3_000,
                not_found_stop_limit: 3,
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                enable_request_logging: true,
            },
            portal: PortalConfig {
                default_tenant: Some("demo-medical".to_string()),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            upstream: UpstreamConfig {
                base_url: "https://platform.staging.example.com".to_string(),
                fetch_timeout_ms: 3_000,
            },
            sync: SyncConfig {
                poll_interval_ms: 5_000,
                not_found_stop_limit: 3,
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec!["https://portal.staging.example.com".to_string()],
                enable_request_logging: true,
            },
            portal: PortalConfig { default_tenant: None },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            upstream: UpstreamConfig {
                base_url: "https://platform.example.com".to_string(),
                fetch_timeout_ms: 4_000,
            },
            sync: SyncConfig {
                poll_interval_ms: 5_000,
                not_found_stop_limit: 5,
            },
            api: ApiConfig {
                enable_cors: true,
                cors_origins: vec!["https://portal.example.com".to_string()],
                enable_request_logging: false,
            },
            portal: PortalConfig { default_tenant: None },
        }
    }

}

impl UpstreamConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
