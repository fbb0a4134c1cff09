use clap::Subcommand;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::routing;

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Resolve a portal path to its logical page")]
    Resolve {
        #[arg(help = "Path, e.g. /tenant/abc123/dashboard")]
        path: String,
    },

    #[command(about = "List all route aliases")]
    List,
}

pub async fn handle(cmd: RouteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Resolve { path } => {
            let resolved = routing::resolve(&path);
            let required = resolved.page.required_capability();

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "page": resolved.page,
                            "tenant": resolved.tenant_id,
                            "requiredCapability": required
                        }))?
                    );
                }
                OutputFormat::Text => {
                    let page = serde_json::to_value(resolved.page)?;
                    println!("page:     {}", page.as_str().unwrap_or_default());
                    println!(
                        "tenant:   {}",
                        resolved.tenant_id.as_deref().unwrap_or("(default)")
                    );
                    println!("requires: {}", required.as_key());
                }
            }
            Ok(())
        }
        RouteCommands::List => {
            match output_format {
                OutputFormat::Json => {
                    let aliases: Vec<_> = routing::ROUTE_ALIASES
                        .iter()
                        .map(|(alias, page)| json!({ "alias": alias, "page": page }))
                        .collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "aliases": aliases }))?
                    );
                }
                OutputFormat::Text => {
                    println!("{:<20} {}", "ALIAS", "PAGE");
                    println!("{}", "-".repeat(40));
                    for (alias, page) in routing::ROUTE_ALIASES {
                        let page = serde_json::to_value(page)?;
                        println!("{:<20} {}", alias, page.as_str().unwrap_or_default());
                    }
                }
            }
            Ok(())
        }
    }
}
