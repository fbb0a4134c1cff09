mod common;

use anyhow::Result;

#[tokio::test]
async fn unknown_route_resolves_to_default_page() -> Result<()> {
    let server = common::ensure_server().await?;

    let body = common::get_json(&format!(
        "{}/portal/route-t/resolve?path=/tenant/abc123/nonexistent-route",
        server.base_url
    ))
    .await?;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["page"], "dashboard");
    assert_eq!(body["data"]["pathTenant"], "abc123");
    Ok(())
}

#[tokio::test]
async fn route_aliases_resolve_identically() -> Result<()> {
    let server = common::ensure_server().await?;

    let short = common::get_json(&format!(
        "{}/portal/route-t/resolve?path=/tenant/abc123/dashboard",
        server.base_url
    ))
    .await?;
    let long = common::get_json(&format!(
        "{}/portal/route-t/resolve?path=/tenant/abc123/customer-dashboard",
        server.base_url
    ))
    .await?;

    assert_eq!(short["data"]["page"], long["data"]["page"]);
    Ok(())
}

#[tokio::test]
async fn resolution_reports_the_gate_decision() -> Result<()> {
    let server = common::ensure_server().await?;

    // No record exists for this tenant, so every page denies.
    let body = common::get_json(&format!(
        "{}/portal/route-unknown/resolve?path=/legal-cases",
        server.base_url
    ))
    .await?;

    assert_eq!(body["data"]["page"], "legal-cases");
    assert_eq!(body["data"]["requiredCapability"], "legalCases");
    assert_eq!(body["data"]["allowed"], false);

    // A bare path has no tenant segment; the configured default tenant
    // becomes the effective context.
    assert_eq!(body["data"]["pathTenant"], serde_json::Value::Null);
    assert_eq!(body["data"]["effectiveTenant"], "demo-medical");
    Ok(())
}
