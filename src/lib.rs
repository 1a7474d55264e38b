//! # CloudOps Portal
//!
//! Wires the gateway client, the dashboard store and the PKCE sign-in flow
//! together from a [`config::PortalConfig`].

pub mod config;
pub mod logging;
pub mod portal;

pub use config::PortalConfig;
pub use portal::Portal;
