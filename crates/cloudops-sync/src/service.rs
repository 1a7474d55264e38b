//! Dashboard store: state plus the refresh protocol.
//!
//! The subscription-scoped slots (resources, alerts, summary) always belong to
//! the currently selected subscription. Selecting another subscription clears
//! them and advances the selection epoch; a fetch only writes its result if the
//! epoch it started under is still current. Fetches called directly, with or
//! without a selection, are applied like any other as long as no switch
//! happened while they ran.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{watch, Mutex};

use cloudops_gateway::actions;
use cloudops_gateway::GatewayClient;

use crate::notify::{Notice, Notifier};
use crate::state::DashboardState;

struct Tracked {
    state: DashboardState,
    epoch: u64,
    in_flight: u32,
}

impl Tracked {
    /// True if no selection switch happened since `epoch` was taken.
    fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    fn select(&mut self, subscription_id: String) {
        self.epoch += 1;
        self.state.selected_subscription = Some(subscription_id);
        self.state.resources.clear();
        self.state.alerts.clear();
        self.state.summary = None;
        self.state.last_refreshed = None;
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}

struct Inner {
    gateway: GatewayClient,
    notifier: Arc<dyn Notifier>,
    tracked: Mutex<Tracked>,
    snapshots: watch::Sender<DashboardState>,
    activated: AtomicBool,
}

/// Shared dashboard store. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct DashboardStore {
    inner: Arc<Inner>,
}

impl DashboardStore {
    pub fn new(gateway: GatewayClient, notifier: Arc<dyn Notifier>) -> Self {
        let (snapshots, _) = watch::channel(DashboardState::default());
        Self {
            inner: Arc::new(Inner {
                gateway,
                notifier,
                tracked: Mutex::new(Tracked {
                    state: DashboardState::default(),
                    epoch: 0,
                    in_flight: 0,
                }),
                snapshots,
                activated: AtomicBool::new(false),
            }),
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub async fn snapshot(&self) -> DashboardState {
        self.inner.tracked.lock().await.state.clone()
    }

    /// Receiver that sees a new snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.snapshots.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// First activation loads the subscription list (and, through
    /// auto-selection, the first refresh). Later calls do nothing.
    pub async fn activate(&self) {
        if self.inner.activated.swap(true, Ordering::SeqCst) {
            debug!("dashboard store already active");
            return;
        }
        info!("activating dashboard store");
        self.fetch_subscriptions().await;
    }

    /// Select a subscription. A change clears the subscription-scoped slots
    /// and refreshes them; re-selecting the current one does nothing.
    pub async fn select_subscription(&self, subscription_id: impl Into<String>) {
        let subscription_id = subscription_id.into();
        let changed = self
            .update(|t| {
                if t.state.selected_subscription.as_deref() == Some(subscription_id.as_str()) {
                    return false;
                }
                t.select(subscription_id.clone());
                true
            })
            .await;
        if changed {
            info!("selected subscription {}", subscription_id);
            self.refresh().await;
        }
    }

    // ── Fetches ──────────────────────────────────────────────────────

    pub async fn fetch_subscriptions(&self) {
        self.begin().await;
        let result = actions::list_subscriptions(&self.inner.gateway).await;

        let (auto_selected, failure) = self
            .update(|t| {
                t.finish();
                match result {
                    Ok(subs) => {
                        debug!("loaded {} subscriptions", subs.len());
                        t.state.error = None;
                        let first = subs.first().map(|s| s.id.clone());
                        t.state.subscriptions = subs;
                        match first {
                            Some(id) if t.state.selected_subscription.is_none() => {
                                t.select(id.clone());
                                (Some(id), None)
                            }
                            _ => (None, None),
                        }
                    }
                    Err(e) => {
                        let msg = format!("Failed to fetch subscriptions: {}", e.message);
                        t.state.error = Some(msg.clone());
                        (None, Some(msg))
                    }
                }
            })
            .await;

        if let Some(msg) = failure {
            warn!("{}", msg);
            self.inner.notifier.notify(Notice::error("Error", msg));
        }
        if let Some(id) = auto_selected {
            info!("auto-selected subscription {}", id);
            self.refresh().await;
        }
    }

    pub async fn fetch_resources(&self, subscription_id: &str) {
        let epoch = self.begin().await;
        let result = actions::list_resources(&self.inner.gateway, subscription_id).await;

        let failure = self
            .update(|t| {
                t.finish();
                if !t.is_current(epoch) {
                    debug!("discarding resources for {} from a superseded selection", subscription_id);
                    return None;
                }
                match result {
                    Ok(resources) => {
                        t.state.resources = resources;
                        t.state.error = None;
                        None
                    }
                    Err(e) => {
                        let msg = format!("Failed to fetch resources: {}", e.message);
                        t.state.error = Some(msg.clone());
                        Some(msg)
                    }
                }
            })
            .await;

        if let Some(msg) = failure {
            warn!("{}", msg);
            self.inner.notifier.notify(Notice::error("Error", msg));
        }
    }

    /// Alert failures are logged only; the previous alerts stay in place.
    pub async fn fetch_alerts(&self, subscription_id: &str) {
        let epoch = self.begin().await;
        let result = actions::get_alerts(&self.inner.gateway, subscription_id).await;

        self.update(|t| {
            t.finish();
            if !t.is_current(epoch) {
                debug!("discarding alerts for {} from a superseded selection", subscription_id);
                return;
            }
            match result {
                Ok(alerts) => t.state.alerts = alerts,
                Err(e) => warn!("Failed to fetch alerts for {}: {}", subscription_id, e),
            }
        })
        .await;
    }

    /// Summary failures are recorded in `error` without a notification.
    pub async fn fetch_dashboard_summary(&self, subscription_id: &str) {
        let epoch = self.begin().await;
        let result = actions::get_dashboard_summary(&self.inner.gateway, subscription_id).await;

        self.update(|t| {
            t.finish();
            if !t.is_current(epoch) {
                debug!("discarding summary for {} from a superseded selection", subscription_id);
                return;
            }
            match result {
                Ok(summary) => t.state.summary = summary,
                Err(e) => {
                    warn!("Failed to fetch dashboard summary for {}: {}", subscription_id, e);
                    t.state.error = Some(format!("Failed to fetch dashboard summary: {}", e.message));
                }
            }
        })
        .await;
    }

    /// Re-fetch resources, alerts and summary for the selected subscription
    /// concurrently. Each fetch lands on its own; partial success is kept.
    pub async fn refresh(&self) {
        let (selected, epoch) = {
            let t = self.inner.tracked.lock().await;
            (t.state.selected_subscription.clone(), t.epoch)
        };
        let Some(subscription_id) = selected else {
            debug!("refresh skipped: no subscription selected");
            return;
        };

        tokio::join!(
            self.fetch_resources(&subscription_id),
            self.fetch_alerts(&subscription_id),
            self.fetch_dashboard_summary(&subscription_id),
        );

        self.update(|t| {
            if t.is_current(epoch) {
                t.state.last_refreshed = Some(Utc::now());
            }
        })
        .await;
    }

    // ── One-shot queries ─────────────────────────────────────────────

    /// Run a log query. Failures are recorded and notified; `None` is returned.
    pub async fn query_logs(&self, workspace_id: &str, query: &str) -> Option<serde_json::Value> {
        match actions::query_logs(&self.inner.gateway, workspace_id, query).await {
            Ok(v) => Some(v),
            Err(e) => {
                let msg = format!("Failed to query logs: {}", e.message);
                warn!("{}", msg);
                let recorded = msg.clone();
                self.update(move |t| t.state.error = Some(recorded)).await;
                self.inner.notifier.notify(Notice::error("Error", msg));
                None
            }
        }
    }

    /// Metrics for one resource, or `None`. Failures are only logged.
    pub async fn get_resource_metrics(&self, resource_id: &str) -> Option<serde_json::Value> {
        match actions::get_metrics(&self.inner.gateway, resource_id).await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Failed to fetch metrics for {}: {}", resource_id, e);
                None
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Mark a fetch as started and return the epoch it runs under.
    async fn begin(&self) -> u64 {
        self.update(|t| {
            t.in_flight += 1;
            t.epoch
        })
        .await
    }

    /// Apply `f` under the lock, recompute `loading`, publish a snapshot.
    async fn update<R>(&self, f: impl FnOnce(&mut Tracked) -> R) -> R {
        let mut t = self.inner.tracked.lock().await;
        let out = f(&mut t);
        t.state.loading = t.in_flight > 0;
        self.inner.snapshots.send_replace(t.state.clone());
        out
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::CollectingNotifier;
    use cloudops_gateway::actions::{
        GET_ALERTS, GET_DASHBOARD_SUMMARY, GET_METRICS, LIST_RESOURCES, LIST_SUBSCRIPTIONS, QUERY_LOGS,
    };
    use cloudops_gateway::testing::ScriptedTransport;
    use cloudops_gateway::{ActionResponse, GatewayError};
    use serde_json::json;
    use std::time::Duration;

    struct Fixture {
        transport: Arc<ScriptedTransport>,
        notifier: Arc<CollectingNotifier>,
        store: DashboardStore,
    }

    fn fixture() -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let notifier = Arc::new(CollectingNotifier::new());
        let store = DashboardStore::new(GatewayClient::new(transport.clone()), notifier.clone());
        Fixture {
            transport,
            notifier,
            store,
        }
    }

    fn subs(ids: &[&str]) -> ActionResponse {
        let list: Vec<_> = ids
            .iter()
            .map(|id| json!({"subscriptionId": id, "displayName": format!("Sub {id}"), "state": "Enabled"}))
            .collect();
        ActionResponse::ok(json!(list))
    }

    fn resources(sub: &str, names: &[&str]) -> ActionResponse {
        let list: Vec<_> = names
            .iter()
            .map(|n| json!({"id": format!("/{sub}/{n}"), "name": n, "type": "vm", "status": "healthy", "subscriptionId": sub}))
            .collect();
        ActionResponse::ok(json!(list))
    }

    fn alerts(ids: &[&str]) -> ActionResponse {
        let list: Vec<_> = ids
            .iter()
            .map(|id| json!({"id": id, "name": "High CPU", "severity": "Sev2", "alertState": "New"}))
            .collect();
        ActionResponse::ok(json!(list))
    }

    fn summary(total: u64) -> ActionResponse {
        ActionResponse::ok(json!({"totalResources": total, "healthyResources": total}))
    }

    fn script_scope(t: &ScriptedTransport, sub: &str) {
        t.push(LIST_RESOURCES, Ok(resources(sub, &["web-01", "web-02"])));
        t.push(GET_ALERTS, Ok(alerts(&["a1"])));
        t.push(GET_DASHBOARD_SUMMARY, Ok(summary(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn activation_auto_selects_first_subscription_and_refreshes() {
        let f = fixture();
        f.transport.push(LIST_SUBSCRIPTIONS, Ok(subs(&["sub1", "sub2"])));
        script_scope(&f.transport, "sub1");

        f.store.activate().await;

        let s = f.store.snapshot().await;
        assert_eq!(s.selected_subscription.as_deref(), Some("sub1"));
        assert_eq!(s.subscriptions.len(), 2);
        assert_eq!(s.resources.len(), 2);
        assert_eq!(s.alerts.len(), 1);
        assert_eq!(s.summary.as_ref().unwrap().total_resources, 2);
        assert!(!s.loading);
        assert!(s.error.is_none());
        assert!(s.last_refreshed.is_some());
        assert_eq!(f.transport.last_params(LIST_RESOURCES).unwrap()["subscriptionId"], "sub1");
    }

    #[tokio::test(start_paused = true)]
    async fn activation_runs_once() {
        let f = fixture();
        f.transport.always(LIST_SUBSCRIPTIONS, Ok(subs(&[])));
        f.store.activate().await;
        f.store.activate().await;
        assert_eq!(f.transport.calls(LIST_SUBSCRIPTIONS), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn existing_selection_is_kept() {
        let f = fixture();
        script_scope(&f.transport, "sub2");
        f.store.select_subscription("sub2").await;

        f.transport.push(LIST_SUBSCRIPTIONS, Ok(subs(&["sub1", "sub2"])));
        f.store.fetch_subscriptions().await;

        let s = f.store.snapshot().await;
        assert_eq!(s.selected_subscription.as_deref(), Some("sub2"));
        // Only the explicit selection refreshed.
        assert_eq!(f.transport.calls(LIST_RESOURCES), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_subscription_list_selects_nothing() {
        let f = fixture();
        f.transport.push(LIST_SUBSCRIPTIONS, Ok(subs(&[])));
        f.store.fetch_subscriptions().await;
        let s = f.store.snapshot().await;
        assert!(s.selected_subscription.is_none());
        assert_eq!(f.transport.calls(LIST_RESOURCES), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn subscription_failure_keeps_previous_list() {
        let f = fixture();
        f.transport.push(LIST_SUBSCRIPTIONS, Ok(subs(&["sub1"])));
        script_scope(&f.transport, "sub1");
        f.store.fetch_subscriptions().await;

        f.transport.always(LIST_SUBSCRIPTIONS, Ok(ActionResponse::err("Azure credentials not configured")));
        f.store.fetch_subscriptions().await;

        let s = f.store.snapshot().await;
        assert_eq!(s.subscriptions.len(), 1);
        assert!(s.error.as_deref().unwrap().contains("credentials"));
        assert_eq!(f.notifier.notices().len(), 1);
        assert_eq!(f.transport.calls(LIST_SUBSCRIPTIONS), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_resources_surface_after_one_call() {
        let f = fixture();
        f.transport.always(LIST_RESOURCES, Ok(ActionResponse::err("unauthorized")));
        f.transport.always(GET_ALERTS, Ok(alerts(&[])));
        f.transport.always(GET_DASHBOARD_SUMMARY, Ok(summary(0)));

        f.store.select_subscription("sub1").await;

        assert_eq!(f.transport.calls(LIST_RESOURCES), 1);
        let s = f.store.snapshot().await;
        assert!(s.error.as_deref().unwrap().contains("unauthorized"));
        assert!(s.resources.is_empty());
        let notices = f.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("unauthorized"));
    }

    #[tokio::test(start_paused = true)]
    async fn direct_resource_fetch_surfaces_unauthorized() {
        let f = fixture();
        f.transport.always(LIST_RESOURCES, Ok(ActionResponse::err("unauthorized")));

        f.store.fetch_resources("sub1").await;

        assert_eq!(f.transport.calls(LIST_RESOURCES), 1);
        let s = f.store.snapshot().await;
        assert!(s.selected_subscription.is_none());
        assert!(s.error.as_deref().unwrap().contains("unauthorized"));
        let notices = f.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("unauthorized"));
    }

    #[tokio::test(start_paused = true)]
    async fn direct_fetches_apply_without_selection() {
        let f = fixture();
        f.transport.push(LIST_RESOURCES, Ok(resources("sub9", &["web-01"])));
        f.transport.push(GET_ALERTS, Ok(alerts(&["a1", "a2"])));
        f.transport.push(GET_DASHBOARD_SUMMARY, Ok(summary(1)));

        f.store.fetch_resources("sub9").await;
        f.store.fetch_alerts("sub9").await;
        f.store.fetch_dashboard_summary("sub9").await;

        let s = f.store.snapshot().await;
        assert_eq!(s.resources.len(), 1);
        assert_eq!(s.alerts.len(), 2);
        assert_eq!(s.summary.as_ref().unwrap().total_resources, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resource_success_clears_previous_error() {
        let f = fixture();
        f.transport.push(LIST_RESOURCES, Ok(ActionResponse::err("unauthorized")));
        f.transport.push(LIST_RESOURCES, Ok(resources("sub1", &["web-01"])));

        f.store.fetch_resources("sub1").await;
        assert!(f.store.snapshot().await.error.is_some());

        f.store.fetch_resources("sub1").await;
        let s = f.store.snapshot().await;
        assert!(s.error.is_none());
        assert_eq!(s.resources.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_success_keeps_current_error() {
        let f = fixture();
        f.transport.push_delayed(LIST_RESOURCES, Duration::from_secs(5), Ok(resources("sub1", &["old"])));
        f.transport.push(LIST_RESOURCES, Ok(ActionResponse::err("unauthorized")));
        f.transport.always(GET_ALERTS, Ok(alerts(&[])));
        f.transport.always(GET_DASHBOARD_SUMMARY, Ok(summary(0)));

        let slow = {
            let store = f.store.clone();
            tokio::spawn(async move { store.select_subscription("sub1").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        f.store.select_subscription("sub2").await;
        assert!(f.store.snapshot().await.error.is_some());

        slow.await.unwrap();
        let s = f.store.snapshot().await;
        assert_eq!(s.selected_subscription.as_deref(), Some("sub2"));
        assert!(s.resources.is_empty());
        assert!(s.error.as_deref().unwrap().contains("unauthorized"));
    }

    #[tokio::test(start_paused = true)]
    async fn unrecognised_alert_values_still_load() {
        let f = fixture();
        f.transport.push(LIST_RESOURCES, Ok(resources("sub1", &["web-01"])));
        f.transport.push(
            GET_ALERTS,
            Ok(ActionResponse::ok(json!([
                {"id": "a1", "severity": "Sev1", "alertState": "New"},
                {"id": "a2", "severity": "Sev2", "alertState": "Resolved"},
                {"id": "a3", "severity": "Sev5", "alertState": "Suppressed"}
            ]))),
        );
        f.transport.push(GET_DASHBOARD_SUMMARY, Ok(summary(1)));

        f.store.select_subscription("sub1").await;

        let s = f.store.snapshot().await;
        assert_eq!(s.alerts.len(), 3);
        assert_eq!(s.alerts[0].id, "a1");
        assert_eq!(f.transport.calls(GET_ALERTS), 1);
        assert!(s.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried_to_success() {
        let f = fixture();
        f.transport.push(LIST_RESOURCES, Ok(ActionResponse::err("Temporary error")));
        f.transport.push(LIST_RESOURCES, Ok(ActionResponse::err("Temporary error")));
        f.transport.push(LIST_RESOURCES, Ok(resources("sub1", &["web-01"])));
        f.transport.push(GET_ALERTS, Ok(alerts(&[])));
        f.transport.push(GET_DASHBOARD_SUMMARY, Ok(summary(1)));

        f.store.select_subscription("sub1").await;

        assert_eq!(f.transport.calls(LIST_RESOURCES), 3);
        let s = f.store.snapshot().await;
        assert_eq!(s.resources.len(), 1);
        assert!(s.error.is_none());
        assert!(f.notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn alert_failure_is_silent_and_partial_success_kept() {
        let f = fixture();
        script_scope(&f.transport, "sub1");
        f.store.select_subscription("sub1").await;
        assert_eq!(f.store.snapshot().await.alerts.len(), 1);

        f.transport.push(LIST_RESOURCES, Ok(resources("sub1", &["web-03"])));
        f.transport.always(GET_ALERTS, Ok(ActionResponse::err("unauthorized")));
        f.transport.push(GET_DASHBOARD_SUMMARY, Ok(summary(1)));
        f.store.refresh().await;

        let s = f.store.snapshot().await;
        assert_eq!(s.resources[0].name, "web-03");
        // Stale-but-valid alerts remain.
        assert_eq!(s.alerts.len(), 1);
        assert!(s.error.is_none());
        assert!(f.notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn summary_failure_records_error_without_notice() {
        let f = fixture();
        f.transport.push(LIST_RESOURCES, Ok(resources("sub1", &["web-01"])));
        f.transport.push(GET_ALERTS, Ok(alerts(&[])));
        f.transport.always(GET_DASHBOARD_SUMMARY, Ok(ActionResponse::err("not configured")));
        f.store.select_subscription("sub1").await;

        let s = f.store.snapshot().await;
        assert_eq!(s.resources.len(), 1);
        assert!(s.summary.is_none());
        assert!(s.error.as_deref().unwrap().contains("dashboard summary"));
        assert!(f.notifier.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_without_selection_does_nothing() {
        let f = fixture();
        f.store.refresh().await;
        assert_eq!(f.transport.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reselecting_same_subscription_does_not_refetch() {
        let f = fixture();
        script_scope(&f.transport, "sub1");
        f.store.select_subscription("sub1").await;
        f.store.select_subscription("sub1").await;
        assert_eq!(f.transport.calls(LIST_RESOURCES), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_selection_results_are_discarded() {
        let f = fixture();
        f.transport.push_delayed(LIST_RESOURCES, Duration::from_secs(5), Ok(resources("sub1", &["old"])));
        f.transport.push_delayed(GET_ALERTS, Duration::from_secs(5), Ok(alerts(&["old-alert"])));
        f.transport.push_delayed(GET_DASHBOARD_SUMMARY, Duration::from_secs(5), Ok(summary(99)));
        script_scope(&f.transport, "sub2");

        let slow = {
            let store = f.store.clone();
            tokio::spawn(async move { store.select_subscription("sub1").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        f.store.select_subscription("sub2").await;
        slow.await.unwrap();

        let s = f.store.snapshot().await;
        assert_eq!(s.selected_subscription.as_deref(), Some("sub2"));
        assert!(s.resources.iter().all(|r| r.subscription_id == "sub2"));
        assert_eq!(s.alerts[0].id, "a1");
        assert_eq!(s.summary.as_ref().unwrap().total_resources, 2);
        assert!(!s.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_change_clears_scoped_slots() {
        let f = fixture();
        script_scope(&f.transport, "sub1");
        f.store.select_subscription("sub1").await;

        let mut rx = f.store.subscribe();
        let later = Duration::from_secs(2);
        f.transport.push_delayed(LIST_RESOURCES, later, Ok(resources("sub2", &["x"])));
        f.transport.push_delayed(GET_ALERTS, later, Ok(alerts(&[])));
        f.transport.push_delayed(GET_DASHBOARD_SUMMARY, later, Ok(summary(1)));
        let store = f.store.clone();
        let handle = tokio::spawn(async move { store.select_subscription("sub2").await });

        rx.changed().await.unwrap();
        let cleared = rx.borrow_and_update().clone();
        assert_eq!(cleared.selected_subscription.as_deref(), Some("sub2"));
        assert!(cleared.resources.is_empty());
        assert!(cleared.alerts.is_empty());
        assert!(cleared.summary.is_none());

        handle.await.unwrap();
        assert_eq!(f.store.snapshot().await.resources[0].name, "x");
    }

    #[tokio::test(start_paused = true)]
    async fn loading_flag_tracks_in_flight_fetches() {
        let f = fixture();
        f.transport.push_delayed(LIST_RESOURCES, Duration::from_secs(3), Ok(resources("sub1", &["a"])));
        f.transport.push(GET_ALERTS, Ok(alerts(&[])));
        f.transport.push(GET_DASHBOARD_SUMMARY, Ok(summary(1)));

        let store = f.store.clone();
        let handle = tokio::spawn(async move { store.select_subscription("sub1").await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(f.store.snapshot().await.loading);

        handle.await.unwrap();
        assert!(!f.store.snapshot().await.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn query_logs_failure_is_surfaced() {
        let f = fixture();
        f.transport.always(QUERY_LOGS, Ok(ActionResponse::err("Log Analytics workspace not configured")));
        assert!(f.store.query_logs("ws1", "Heartbeat").await.is_none());
        assert_eq!(f.transport.calls(QUERY_LOGS), 1);
        let s = f.store.snapshot().await;
        assert!(s.error.as_deref().unwrap().contains("not configured"));
        assert_eq!(f.notifier.notices().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn query_logs_success_returns_raw() {
        let f = fixture();
        f.transport.push(QUERY_LOGS, Ok(ActionResponse::ok(json!({"tables": []}))));
        let v = f.store.query_logs("ws1", "Heartbeat").await.unwrap();
        assert_eq!(v, json!({"tables": []}));
    }

    #[tokio::test(start_paused = true)]
    async fn metrics_failure_is_swallowed() {
        let f = fixture();
        f.transport.always(GET_METRICS, Err(GatewayError::network("connection refused")));
        assert!(f.store.get_resource_metrics("r1").await.is_none());
        assert_eq!(f.transport.calls(GET_METRICS), 3);
        let s = f.store.snapshot().await;
        assert!(s.error.is_none());
        assert!(f.notifier.notices().is_empty());
    }
}
