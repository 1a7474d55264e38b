//! # CloudOps Portal – Gateway Client
//!
//! Every call the portal makes to the monitoring backend goes through a single
//! RPC-style dispatch endpoint: the request body is `{"action": name, ...params}`
//! and the response is a `{data, error}` envelope.
//!
//! ## Features
//!
//! - **Transport seam** – [`transport::ActionTransport`] is injected at
//!   composition time; [`transport::HttpActionTransport`] is the reqwest one
//! - **Retry** – bounded attempts with exponential backoff (1 s, 2 s, 4 s, …)
//! - **Classification** – credentials / configuration / authorization failures
//!   are terminal, everything else is retried
//! - **Typed actions** – subscriptions, resources, alerts, dashboard summary,
//!   log queries, metrics

pub mod types;
pub mod transport;
pub mod client;
pub mod actions;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::{GatewayClient, RetryPolicy};
pub use transport::{ActionResponse, ActionTransport, HttpActionTransport};
pub use types::{GatewayError, GatewayErrorKind, GatewayResult};
