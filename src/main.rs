use axum::extract::State;
use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use regintel_portal::handlers::{portal, AppState};
use regintel_portal::sync::{HttpPermissionSource, SyncOptions, SyncRegistry};
use regintel_portal::{config, navigation, routing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up REGINTEL_UPSTREAM_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting regintel portal in {:?} mode", config.environment);

    // Static catalog mistakes are configuration errors: fatal here, never
    // degraded at request time.
    navigation::validate_catalog(navigation::CATALOG)?;
    routing::validate_table(routing::ROUTE_ALIASES)?;

    let source = Arc::new(HttpPermissionSource::new(&config.upstream)?);
    let registry = Arc::new(SyncRegistry::new(source, SyncOptions::from(&config.sync)));

    let app = app(AppState {
        registry: registry.clone(),
    });

    // Allow tests or deployments to override port via env
    let port = std::env::var("REGINTEL_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("regintel portal listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Polling tasks must be gone before the process exits.
    registry.shutdown_all().await;

    Ok(())
}

fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Customer portal surface
        .merge(portal_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config::config().api.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn portal_routes() -> Router<AppState> {
    Router::new()
        .route("/portal/:tenant/state", get(portal::state_get))
        .route("/portal/:tenant/navigation", get(portal::navigation_get))
        .route(
            "/portal/:tenant/access/:capability",
            get(portal::access_get),
        )
        .route("/portal/:tenant/resolve", get(portal::resolve_get))
        .route("/portal/:tenant/refresh", post(portal::refresh_post))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Regintel Portal",
            "version": version,
            "description": "Customer portal backend - live tenant permission sync and access gating",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "state": "/portal/:tenant/state",
                "navigation": "/portal/:tenant/navigation",
                "access": "/portal/:tenant/access/:capability",
                "resolve": "/portal/:tenant/resolve?path=...",
                "refresh": "POST /portal/:tenant/refresh",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> axum::response::Json<Value> {
    let now = chrono::Utc::now();
    let active = state.registry.active_count().await;

    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now,
            "activeTenants": active
        }
    }))
}
