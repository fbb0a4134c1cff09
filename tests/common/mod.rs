use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use reqwest::StatusCode as HttpStatus;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

type TenantTable = Arc<Mutex<HashMap<String, Value>>>;

/// The portal binary under test plus a scripted permission store it polls.
/// Tests mutate the store through `set_tenant`/`remove_tenant` and observe
/// the portal catching up within its poll interval.
pub struct TestServer {
    pub base_url: String,
    tenants: TenantTable,
    #[allow(dead_code)]
    child: Child,
}

async fn tenant_get(
    State(tenants): State<TenantTable>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let table = tenants.lock().unwrap();
    match table.get(&id) {
        Some(record) => (StatusCode::OK, Json(record.clone())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such tenant" })),
        )
            .into_response(),
    }
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick unused ports for isolation
        let upstream_port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let api_port = portpicker::pick_unused_port().context("failed to pick free port")?;

        let tenants: TenantTable = Arc::new(Mutex::new(HashMap::new()));

        // The scripted permission store runs on its own runtime thread so
        // it outlives any single test's runtime.
        {
            let tenants = tenants.clone();
            std::thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("upstream runtime");
                runtime.block_on(async move {
                    let app = Router::new()
                        .route("/api/customer/tenant/:id", get(tenant_get))
                        .with_state(tenants);
                    let listener = tokio::net::TcpListener::bind(("127.0.0.1", upstream_port))
                        .await
                        .expect("bind upstream");
                    axum::serve(listener, app).await.expect("serve upstream");
                });
            });
        }

        // Fast polling keeps the flag-flip scenarios quick
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_regintel-portal"));
        cmd.env("REGINTEL_API_PORT", api_port.to_string())
            .env(
                "REGINTEL_UPSTREAM_URL",
                format!("http://127.0.0.1:{}", upstream_port),
            )
            .env("SYNC_POLL_INTERVAL_MS", "300")
            .env("UPSTREAM_FETCH_TIMEOUT_MS", "250")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", api_port),
            tenants,
            child,
        })
    }

    pub fn set_tenant(&self, id: &str, name: &str, permissions: Value) {
        self.tenants.lock().unwrap().insert(
            id.to_string(),
            json!({ "id": id, "name": name, "customerPermissions": permissions }),
        );
    }

    #[allow(dead_code)]
    pub fn remove_tenant(&self, id: &str) {
        self.tenants.lock().unwrap().remove(id);
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == HttpStatus::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// GET a portal endpoint and parse the JSON body.
#[allow(dead_code)]
pub async fn get_json(url: &str) -> Result<Value> {
    let body = reqwest::Client::new().get(url).send().await?.json().await?;
    Ok(body)
}

/// Poll `url` until `predicate` holds on the body, or fail after `timeout`.
#[allow(dead_code)]
pub async fn wait_for_body(
    url: &str,
    timeout: Duration,
    predicate: impl Fn(&Value) -> bool,
) -> Result<Value> {
    let deadline = Instant::now() + timeout;
    loop {
        let body = get_json(url).await?;
        if predicate(&body) {
            return Ok(body);
        }
        if Instant::now() > deadline {
            anyhow::bail!("condition not reached for {} within {:?}: {}", url, timeout, body);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
