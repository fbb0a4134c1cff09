pub mod fetcher;
pub mod registry;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::SyncConfig;
use crate::permissions::PermissionSet;

pub use fetcher::{
    FetchError, HttpPermissionSource, PermissionSource, TenantIdentity, TenantSnapshot,
};
pub use registry::SyncRegistry;

/// Everything a consumer can know about one tenant's permission state.
/// Owned exclusively by the synchronizer task; consumers read it through a
/// watch channel and never write it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub permissions: Option<PermissionSet>,
    pub tenant: Option<TenantIdentity>,
    /// True until the first fetch completes, success or failure.
    pub is_loading: bool,
    pub last_error: Option<FetchError>,
    pub last_fetch_at: Option<DateTime<Utc>>,
    /// Terminal: the tenant was missing too many polls in a row and the
    /// synchronizer stopped.
    pub halted: bool,
}

impl SyncState {
    fn initial() -> Self {
        Self {
            permissions: None,
            tenant: None,
            is_loading: true,
            last_error: None,
            last_fetch_at: None,
            halted: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub poll_interval: Duration,
    pub not_found_stop_limit: u32,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            not_found_stop_limit: config.not_found_stop_limit,
        }
    }
}

/// Fold a successful fetch into the state. Returns whether consumers must
/// be notified: permissions and identity each update only when their value
/// actually differs, so identical consecutive fetches stay silent and the
/// UI never re-renders on a no-op poll.
fn apply_success(state: &mut SyncState, snapshot: TenantSnapshot, now: DateTime<Utc>) -> bool {
    // Bookkeeping only; never worth a notification by itself.
    state.last_fetch_at = Some(now);

    let mut changed = false;
    if state.permissions.as_ref() != Some(&snapshot.permissions) {
        state.permissions = Some(snapshot.permissions);
        changed = true;
    }
    if state.tenant.as_ref() != Some(&snapshot.identity) {
        state.tenant = Some(snapshot.identity);
        changed = true;
    }
    if state.is_loading {
        state.is_loading = false;
        changed = true;
    }
    if state.last_error.is_some() {
        state.last_error = None;
        changed = true;
    }
    changed
}

/// Fold a failed fetch into the state. Last-known-good permissions are
/// retained: a transient failure fails open to the previous state, never
/// closed to no-access.
fn apply_failure(state: &mut SyncState, error: FetchError, now: DateTime<Utc>) -> bool {
    state.last_fetch_at = Some(now);

    let mut changed = false;
    if state.is_loading {
        state.is_loading = false;
        changed = true;
    }
    if state.last_error.as_ref() != Some(&error) {
        state.last_error = Some(error);
        changed = true;
    }
    changed
}

/// Live permission synchronizer for one tenant: a single polling task plus
/// the channels to observe and control it. One instance per tenant per
/// session; the registry enforces the sharing.
pub struct SyncHandle {
    tenant_id: String,
    state_rx: watch::Receiver<SyncState>,
    refresh: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl SyncHandle {
    /// Start polling for a tenant. The first fetch is issued immediately,
    /// subsequent ones at the configured interval.
    pub fn spawn(
        tenant_id: impl Into<String>,
        source: Arc<dyn PermissionSource>,
        options: SyncOptions,
    ) -> Arc<Self> {
        let tenant_id = tenant_id.into();
        let (state_tx, state_rx) = watch::channel(SyncState::initial());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());

        let task = tokio::spawn(run(
            tenant_id.clone(),
            source,
            options,
            state_tx,
            shutdown_rx,
            refresh.clone(),
        ));

        Arc::new(Self {
            tenant_id,
            state_rx,
            refresh,
            shutdown_tx,
            task: tokio::sync::Mutex::new(Some(task)),
        })
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Watch receiver for consumers that want change notifications.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state_rx.clone()
    }

    /// Point-in-time copy of the current state.
    pub fn snapshot(&self) -> SyncState {
        self.state_rx.borrow().clone()
    }

    /// Trigger an immediate in-place refetch without waiting for the next
    /// scheduled poll.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn is_halted(&self) -> bool {
        self.state_rx.borrow().halted
    }

    /// Stop polling and wait for the task to finish. After this returns,
    /// no further state updates can occur.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }
}

async fn run(
    tenant_id: String,
    source: Arc<dyn PermissionSource>,
    options: SyncOptions,
    state_tx: watch::Sender<SyncState>,
    mut shutdown_rx: watch::Receiver<bool>,
    refresh: Arc<Notify>,
) {
    let mut interval = tokio::time::interval(options.poll_interval);
    // A tick that fires while a fetch is still outstanding is skipped, not
    // queued; only ever one fetch in flight per tenant.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut consecutive_not_found: u32 = 0;

    tracing::debug!("permission sync started for tenant '{}'", tenant_id);

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = refresh.notified() => {
                // Manual refetch; push the next scheduled poll out a full
                // interval.
                interval.reset();
            }
            _ = interval.tick() => {}
        }
        if *shutdown_rx.borrow() {
            break;
        }

        // Shutdown wins this select and drops the in-flight fetch, so a
        // late completion can never write state after teardown.
        let result = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            result = source.fetch(&tenant_id) => result,
        };
        let now = Utc::now();

        match result {
            Ok(snapshot) => {
                consecutive_not_found = 0;
                let notified =
                    state_tx.send_if_modified(|state| apply_success(state, snapshot, now));
                if notified {
                    tracing::debug!("permission state updated for tenant '{}'", tenant_id);
                }
            }
            Err(error) => {
                if matches!(error, FetchError::NotFound) {
                    consecutive_not_found += 1;
                } else {
                    consecutive_not_found = 0;
                }

                tracing::warn!(
                    "permission fetch failed for tenant '{}' ({}): {}",
                    tenant_id,
                    error.kind(),
                    error
                );
                state_tx.send_if_modified(|state| apply_failure(state, error, now));

                if consecutive_not_found >= options.not_found_stop_limit {
                    tracing::warn!(
                        "tenant '{}' not found after {} consecutive polls, parking synchronizer",
                        tenant_id,
                        consecutive_not_found
                    );
                    state_tx.send_if_modified(|state| {
                        state.halted = true;
                        true
                    });
                    break;
                }
            }
        }
    }

    tracing::debug!("permission sync stopped for tenant '{}'", tenant_id);
}
