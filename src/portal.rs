//! Composition root: builds the transports from configuration and hands them
//! to the gateway clients, the dashboard store and the login flow.

use std::sync::Arc;

use log::info;

use cloudops_auth::{LoginFlow, PkceStore, SessionStorage};
use cloudops_gateway::{ActionTransport, GatewayClient, GatewayResult, HttpActionTransport};
use cloudops_sync::{DashboardStore, Notifier};

use crate::config::PortalConfig;

pub struct Portal {
    pub store: DashboardStore,
    pub login: LoginFlow,
}

impl Portal {
    /// Production wiring over HTTP.
    pub fn from_config(
        config: &PortalConfig,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionStorage>,
    ) -> GatewayResult<Self> {
        config.validate()?;
        let monitor = HttpActionTransport::new(
            &config.api_url,
            &config.monitor_function,
            &config.api_key,
            config.request_timeout(),
        )?;
        let auth = HttpActionTransport::new(
            &config.api_url,
            &config.auth_function,
            &config.api_key,
            config.request_timeout(),
        )?;
        info!("portal backend {}", monitor.endpoint());
        Ok(Self::with_transports(
            Arc::new(monitor),
            Arc::new(auth),
            config,
            notifier,
            session,
        ))
    }

    /// Wiring over caller-supplied transports.
    pub fn with_transports(
        monitor: Arc<dyn ActionTransport>,
        auth: Arc<dyn ActionTransport>,
        config: &PortalConfig,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionStorage>,
    ) -> Self {
        let policy = config.retry_policy();
        let store = DashboardStore::new(GatewayClient::with_policy(monitor, policy), notifier);
        let login = LoginFlow::new(
            GatewayClient::with_policy(auth, policy),
            PkceStore::new(session),
            config.redirect_uri.clone(),
        );
        Self { store, login }
    }
}
