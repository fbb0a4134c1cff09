pub mod portal;

use std::sync::Arc;

use crate::sync::SyncRegistry;

/// Shared server state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SyncRegistry>,
}
