//! # CloudOps Portal – Dashboard State
//!
//! Owns the observable dashboard state (subscriptions, selected subscription,
//! resources, alerts, summary, loading and error) and the refresh protocol
//! that re-fetches the subscription-scoped collections whenever the selected
//! subscription changes.
//!
//! All remote data flows through [`cloudops_gateway::GatewayClient`]; user
//! facing failures go to an injected [`notify::Notifier`].

pub mod state;
pub mod notify;
pub mod service;

pub use notify::{CollectingNotifier, LogNotifier, Notice, NoticeLevel, Notifier};
pub use service::DashboardStore;
pub use state::DashboardState;
