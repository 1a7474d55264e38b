//! Monitoring actions – subscriptions, resources, alerts, dashboard summary,
//! log queries and metrics.

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::client::GatewayClient;
use crate::types::{Alert, DashboardSummary, GatewayError, GatewayResult, Resource, Subscription};

pub const LIST_SUBSCRIPTIONS: &str = "list-subscriptions";
pub const LIST_RESOURCES: &str = "list-resources";
pub const GET_ALERTS: &str = "get-alerts";
pub const GET_DASHBOARD_SUMMARY: &str = "get-dashboard-summary";
pub const QUERY_LOGS: &str = "query-logs";
pub const GET_METRICS: &str = "get-metrics";

/// List the subscriptions visible to the backend's service principal.
pub async fn list_subscriptions(client: &GatewayClient) -> GatewayResult<Vec<Subscription>> {
    debug!("list_subscriptions");
    let data = client.invoke(LIST_SUBSCRIPTIONS, &json!({})).await?;
    decode_list(LIST_SUBSCRIPTIONS, data)
}

/// List every resource in a subscription.
pub async fn list_resources(
    client: &GatewayClient,
    subscription_id: &str,
) -> GatewayResult<Vec<Resource>> {
    debug!("list_resources({})", subscription_id);
    let data = client
        .invoke(LIST_RESOURCES, &json!({ "subscriptionId": subscription_id }))
        .await?;
    decode_list(LIST_RESOURCES, data)
}

/// Fired alerts for a subscription, most severe first.
pub async fn get_alerts(client: &GatewayClient, subscription_id: &str) -> GatewayResult<Vec<Alert>> {
    debug!("get_alerts({})", subscription_id);
    let data = client
        .invoke(GET_ALERTS, &json!({ "subscriptionId": subscription_id }))
        .await?;
    let mut alerts: Vec<Alert> = decode_list(GET_ALERTS, data)?;
    alerts.sort_by_key(|a| a.severity);
    Ok(alerts)
}

/// Server-side aggregate for the overview page. `None` when the backend
/// returns no summary.
pub async fn get_dashboard_summary(
    client: &GatewayClient,
    subscription_id: &str,
) -> GatewayResult<Option<DashboardSummary>> {
    debug!("get_dashboard_summary({})", subscription_id);
    let data = client
        .invoke(GET_DASHBOARD_SUMMARY, &json!({ "subscriptionId": subscription_id }))
        .await?;
    if data.is_null() {
        return Ok(None);
    }
    decode(GET_DASHBOARD_SUMMARY, data).map(Some)
}

/// Run a log-analytics query against a workspace. The result is passed
/// through untouched.
pub async fn query_logs(
    client: &GatewayClient,
    workspace_id: &str,
    query: &str,
) -> GatewayResult<serde_json::Value> {
    debug!("query_logs({})", workspace_id);
    client
        .invoke(QUERY_LOGS, &json!({ "workspaceId": workspace_id, "query": query }))
        .await
}

/// Raw metric series for a resource.
pub async fn get_metrics(client: &GatewayClient, resource_id: &str) -> GatewayResult<serde_json::Value> {
    debug!("get_metrics({})", resource_id);
    client
        .invoke(GET_METRICS, &json!({ "resourceId": resource_id }))
        .await
}

// ─── Helpers ────────────────────────────────────────────────────────

/// `null` means an empty collection.
fn decode_list<T: DeserializeOwned>(action: &str, data: serde_json::Value) -> GatewayResult<Vec<T>> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    decode(action, data)
}

fn decode<T: DeserializeOwned>(action: &str, data: serde_json::Value) -> GatewayResult<T> {
    serde_json::from_value(data)
        .map_err(|e| GatewayError::parse(format!("{action}: unexpected response shape: {e}")))
}

// ─── Tests ──────────────────────────────────────────────────────────
