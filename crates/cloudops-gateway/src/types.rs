//! Core types for the CloudOps action gateway: the error model and the
//! monitoring payloads returned by the backend actions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Error types ─────────────────────────────────────────────────────

/// Substrings that mark a failure as terminal. Matched case-insensitively.
pub const TERMINAL_MARKERS: &[&str] = &["credentials", "not configured", "unauthorized"];

/// Categorised error kinds for gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorKind {
    /// Missing or invalid credentials / backend configuration.
    Configuration,
    /// Transport-level failure (DNS, connect, TLS, reset).
    Network,
    Timeout,
    /// The backend answered with an error payload or a non-2xx status.
    Server,
    Parse,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration error"),
            Self::Network => write!(f, "Network error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::Server => write!(f, "Server error"),
            Self::Parse => write!(f, "Parse error"),
        }
    }
}

/// Main error type for gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(kind: GatewayErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: Some(status),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Configuration, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Server, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Parse, message)
    }

    /// Build an error from a non-2xx HTTP response.
    ///
    /// The body is searched for a backend error message (`{"error": "..."}` or
    /// `{"error": {"message": "..."}}`); the raw body is used otherwise.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => GatewayErrorKind::Configuration,
            408 | 504 => GatewayErrorKind::Timeout,
            _ => GatewayErrorKind::Server,
        };
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| error_message_from_value(&v))
            .unwrap_or_else(|| body.trim().to_string());
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status");
        let message = if detail.is_empty() {
            format!("HTTP {status} {reason}")
        } else {
            format!("HTTP {status} {reason}: {detail}")
        };
        Self::with_status(kind, message, status)
    }

    /// Terminal errors are never retried.
    pub fn is_terminal(&self) -> bool {
        if self.kind == GatewayErrorKind::Configuration {
            return true;
        }
        let lower = self.message.to_lowercase();
        TERMINAL_MARKERS.iter().any(|m| lower.contains(m))
    }
}

/// Pull a human-readable message out of an error value shaped either as a
/// plain string or as an object with a `message` (or `error`) field.
pub(crate) fn error_message_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => map
            .get("error")
            .and_then(error_message_from_value)
            .or_else(|| map.get("message").and_then(|m| m.as_str()).map(String::from)),
        _ => None,
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for String {
    fn from(e: GatewayError) -> String {
        e.to_string()
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::new(GatewayErrorKind::Timeout, format!("{e}"))
        } else if e.is_decode() {
            GatewayError::parse(format!("{e}"))
        } else {
            GatewayError::network(format!("{e}"))
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::parse(format!("JSON parse: {e}"))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

// ─── Subscriptions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "subscriptionId", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

// ─── Resources ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Vm,
    Database,
    Storage,
    Cdn,
    Container,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Healthy,
    Warning,
    Critical,
    Degraded,
    Maintenance,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: ResourceKind,
    /// Provider type tag, e.g. `Microsoft.Compute/virtualMachines`.
    #[serde(default)]
    pub resource_type: String,
    #[serde(default, alias = "location")]
    pub region: String,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub uptime: Option<f64>,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: f64,
    #[serde(default)]
    pub subscription_id: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Resource {
    pub fn is_healthy(&self) -> bool {
        self.status == ResourceStatus::Healthy
    }
}

// ─── Alerts ─────────────────────────────────────────────────────────

/// Alert severity. Declared most severe first, so ascending order sorts
/// the most severe alerts to the front and unrecognised ones to the back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AlertSeverity {
    Sev0,
    Sev1,
    Sev2,
    Sev3,
    Sev4,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AlertSeverity {
    /// Sev0 and Sev1 count as critical incidents.
    pub fn is_critical(self) -> bool {
        self <= AlertSeverity::Sev1
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AlertState {
    New,
    Acknowledged,
    #[serde(alias = "Resolved")]
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub severity: AlertSeverity,
    #[serde(default, rename = "alertState", alias = "state")]
    pub state: AlertState,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub target_resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "firedDateTime")]
    pub fired_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.state != AlertState::Closed
    }
}

// ─── Dashboard summary ──────────────────────────────────────────────

/// Server-side aggregate. Fields the portal does not know about are kept in
/// `extra` so the value round-trips untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_resources: u64,
    #[serde(default)]
    pub healthy_resources: u64,
    #[serde(default)]
    pub active_incidents: u64,
    #[serde(default)]
    pub critical_incidents: u64,
    #[serde(default)]
    pub resource_types: BTreeMap<String, u64>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DashboardSummary {
    /// Healthy share of all resources, 0–100. `None` when there are no resources.
    pub fn health_percentage(&self) -> Option<f64> {
        if self.total_resources == 0 {
            return None;
        }
        Some(self.healthy_resources as f64 * 100.0 / self.total_resources as f64)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
