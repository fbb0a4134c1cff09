use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::fetcher::PermissionSource;
use super::{SyncHandle, SyncOptions};

/// Hands out one shared synchronizer per tenant id. The sidebar and the
/// page body must observe the same state instance; two independent pollers
/// for the same tenant can transiently disagree, so sharing is enforced
/// here by construction rather than by convention.
pub struct SyncRegistry {
    source: Arc<dyn PermissionSource>,
    options: SyncOptions,
    handles: Mutex<HashMap<String, Arc<SyncHandle>>>,
}

impl SyncRegistry {
    pub fn new(source: Arc<dyn PermissionSource>, options: SyncOptions) -> Self {
        Self {
            source,
            options,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Shared handle for a tenant, spawning its synchronizer on first use.
    /// A handle parked in the tenant-missing terminal state is returned
    /// as-is so readers keep seeing the terminal state; only an explicit
    /// [`reactivate`](Self::reactivate) starts over.
    pub async fn handle(&self, tenant_id: &str) -> Arc<SyncHandle> {
        let mut handles = self.handles.lock().await;

        if let Some(existing) = handles.get(tenant_id) {
            return existing.clone();
        }

        let handle = SyncHandle::spawn(tenant_id, self.source.clone(), self.options.clone());
        handles.insert(tenant_id.to_string(), handle.clone());
        handle
    }

    /// Full reactivation: tear down the tenant's synchronizer (if any) and
    /// start a fresh one with clean transient state.
    pub async fn reactivate(&self, tenant_id: &str) -> Arc<SyncHandle> {
        let mut handles = self.handles.lock().await;

        if let Some(existing) = handles.remove(tenant_id) {
            tracing::debug!("replacing synchronizer for tenant '{}'", tenant_id);
            existing.shutdown().await;
        }

        let handle = SyncHandle::spawn(tenant_id, self.source.clone(), self.options.clone());
        handles.insert(tenant_id.to_string(), handle.clone());
        handle
    }

    /// Number of synchronizers currently held, halted ones included.
    pub async fn active_count(&self) -> usize {
        self.handles.lock().await.len()
    }

    /// Stop every synchronizer and wait for the tasks to finish.
    pub async fn shutdown_all(&self) {
        let drained: Vec<Arc<SyncHandle>> = {
            let mut handles = self.handles.lock().await;
            handles.drain().map(|(_, handle)| handle).collect()
        };
        for handle in drained {
            handle.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fetcher::{FetchError, TenantSnapshot};
    use async_trait::async_trait;

    /// Source that never answers; enough for identity tests.
    struct SilentSource;

    #[async_trait]
    impl PermissionSource for SilentSource {
        async fn fetch(&self, _tenant_id: &str) -> Result<TenantSnapshot, FetchError> {
            std::future::pending().await
        }
    }

    fn options() -> SyncOptions {
        SyncOptions {
            poll_interval: std::time::Duration::from_secs(3),
            not_found_stop_limit: 3,
        }
    }

    #[tokio::test]
    async fn test_same_tenant_shares_one_synchronizer() {
        let registry = SyncRegistry::new(Arc::new(SilentSource), options());

        let a = registry.handle("t1").await;
        let b = registry.handle("t1").await;
        assert!(Arc::ptr_eq(&a, &b));

        let other = registry.handle("t2").await;
        assert!(!Arc::ptr_eq(&a, &other));

        registry.shutdown_all().await;
    }

    #[tokio::test]
    async fn test_shutdown_all_clears_the_registry() {
        let registry = SyncRegistry::new(Arc::new(SilentSource), options());
        let before = registry.handle("t1").await;
        registry.shutdown_all().await;

        // A fresh handle is spawned after shutdown.
        let after = registry.handle("t1").await;
        assert!(!Arc::ptr_eq(&before, &after));
        registry.shutdown_all().await;
    }
}
