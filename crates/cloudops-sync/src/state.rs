//! Dashboard state snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudops_gateway::types::{Alert, DashboardSummary, Resource, Subscription};

/// Everything the dashboard pages render from. Published as a whole after
/// every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub subscriptions: Vec<Subscription>,
    pub selected_subscription: Option<String>,
    pub resources: Vec<Resource>,
    pub alerts: Vec<Alert>,
    pub summary: Option<DashboardSummary>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl DashboardState {
    pub fn selected(&self) -> Option<&Subscription> {
        let id = self.selected_subscription.as_deref()?;
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.is_active())
    }
}
