use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config;
use crate::navigation;
use crate::permissions::Capability;
use crate::sync::{HttpPermissionSource, PermissionSource, SyncHandle, SyncOptions};

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Fetch a tenant's permissions and visible navigation once")]
    Inspect {
        #[arg(help = "Tenant ID")]
        tenant: String,
    },

    #[command(about = "Poll a tenant and print every permission change until interrupted")]
    Watch {
        #[arg(help = "Tenant ID")]
        tenant: String,
    },
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Inspect { tenant } => inspect(&tenant, output_format).await,
        TenantCommands::Watch { tenant } => watch(&tenant, output_format).await,
    }
}

async fn inspect(tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    anyhow::ensure!(!tenant.trim().is_empty(), "tenant id must not be empty");

    let source = HttpPermissionSource::new(&config::config().upstream)?;
    let snapshot = source.fetch(tenant).await?;
    let visible = navigation::project(navigation::CATALOG, Some(&snapshot.permissions));

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "tenant": snapshot.identity,
                    "permissions": snapshot.permissions,
                    "navigation": visible
                }))?
            );
        }
        OutputFormat::Text => {
            println!(
                "Tenant: {} ({})",
                snapshot.identity.display_name, snapshot.identity.tenant_id
            );
            println!();
            println!("{:<22} {}", "CAPABILITY", "ENABLED");
            println!("{}", "-".repeat(32));
            for cap in Capability::ALL {
                let enabled = if snapshot.permissions.allows(cap) { "yes" } else { "no" };
                println!("{:<22} {}", cap.as_key(), enabled);
            }
            println!();
            if visible.is_empty() {
                println!("No accessible navigation for this tenant.");
            } else {
                println!("Visible navigation:");
                for entry in visible {
                    println!("  {:<20} {}", entry.name, entry.path);
                }
            }
        }
    }

    Ok(())
}

async fn watch(tenant: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    anyhow::ensure!(!tenant.trim().is_empty(), "tenant id must not be empty");

    let config = config::config();
    let source = Arc::new(HttpPermissionSource::new(&config.upstream)?);
    let handle = SyncHandle::spawn(tenant, source, SyncOptions::from(&config.sync));
    let mut rx = handle.subscribe();

    eprintln!(
        "watching tenant '{}' every {}ms, Ctrl-C to stop",
        tenant, config.sync.poll_interval_ms
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();

                match output_format {
                    OutputFormat::Json => println!("{}", serde_json::to_string(&state)?),
                    OutputFormat::Text => {
                        let stamp = chrono::Utc::now().format("%H:%M:%S");
                        if let Some(error) = &state.last_error {
                            println!("[{}] fetch failed: {}", stamp, error);
                        }
                        if let Some(permissions) = &state.permissions {
                            let enabled: Vec<&str> =
                                permissions.enabled().map(|c| c.as_key()).collect();
                            println!("[{}] enabled: {}", stamp, enabled.join(", "));
                        }
                    }
                }

                if state.halted {
                    eprintln!("tenant '{}' not found, giving up", tenant);
                    break;
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
