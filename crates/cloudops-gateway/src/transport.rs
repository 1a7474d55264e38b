//! Transport seam for the action-dispatch endpoint.
//!
//! [`ActionTransport`] performs exactly one remote call per invocation and
//! knows nothing about retries. [`HttpActionTransport`] is the production
//! implementation: it POSTs `{"action": name, ...params}` to a backend function
//! and decodes the `{data, error}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{error_message_from_value, GatewayError, GatewayResult};

/// Parameters sent alongside the action name.
pub type ActionParams = serde_json::Map<String, serde_json::Value>;

/// Default per-request timeout for the HTTP transport.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The `{data, error}` envelope returned by every backend action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ActionResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl ActionResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(serde_json::json!({ "message": message.into() })),
        }
    }

    /// Interpret a decoded response body. Bodies that carry neither `data`
    /// nor `error` are treated as bare data.
    pub fn from_body(body: serde_json::Value) -> Self {
        match body {
            serde_json::Value::Object(ref map)
                if map.contains_key("data") || map.contains_key("error") =>
            {
                serde_json::from_value(body.clone()).unwrap_or_else(|_| Self::ok(body))
            }
            serde_json::Value::Null => Self::default(),
            other => Self::ok(other),
        }
    }

    /// Normalise the envelope into a single `Result`. A non-null `error`
    /// field wins over any `data`.
    pub fn into_result(self) -> GatewayResult<serde_json::Value> {
        match self.error {
            Some(err) if !err.is_null() => {
                let message = error_message_from_value(&err)
                    .unwrap_or_else(|| err.to_string());
                Err(GatewayError::server(message))
            }
            _ => Ok(self.data.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// One remote call to the dispatch endpoint.
#[async_trait]
pub trait ActionTransport: Send + Sync {
    async fn call(&self, action: &str, params: &ActionParams) -> GatewayResult<ActionResponse>;
}

/// reqwest-backed transport targeting `{base_url}/functions/v1/{function}`.
#[derive(Clone)]
pub struct HttpActionTransport {
    http: Client,
    endpoint: Url,
    headers: HeaderMap,
}

impl HttpActionTransport {
    pub fn new(
        base_url: &str,
        function: &str,
        api_key: &str,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        if base_url.trim().is_empty() {
            return Err(GatewayError::configuration("Backend URL not configured"));
        }
        if api_key.trim().is_empty() {
            return Err(GatewayError::configuration("Backend API key not configured"));
        }
        if function.trim().is_empty() {
            return Err(GatewayError::configuration("Backend function name not configured"));
        }

        let endpoint = function_url(base_url, function)?;
        let headers = auth_headers(api_key)?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("HTTP client not configured: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            headers,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ActionTransport for HttpActionTransport {
    async fn call(&self, action: &str, params: &ActionParams) -> GatewayResult<ActionResponse> {
        let body = request_body(action, params);
        debug!("gateway POST {} action={}", self.endpoint, action);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), &text));
        }
        if text.trim().is_empty() {
            return Ok(ActionResponse::default());
        }
        let value: serde_json::Value = serde_json::from_str(&text)?;
        Ok(ActionResponse::from_body(value))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn function_url(base_url: &str, function: &str) -> GatewayResult<Url> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&base)
        .and_then(|b| b.join(&format!("functions/v1/{}", function)))
        .map_err(|e| GatewayError::configuration(format!("Backend URL not configured correctly: {e}")))
}

fn auth_headers(api_key: &str) -> GatewayResult<HeaderMap> {
    let invalid =
        |e: reqwest::header::InvalidHeaderValue| GatewayError::configuration(format!("Invalid API key credentials: {e}"));
    let mut headers = HeaderMap::new();
    headers.insert("apikey", HeaderValue::from_str(api_key).map_err(invalid)?);
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(invalid)?,
    );
    Ok(headers)
}

/// `{"action": action, ...params}`. An `action` key inside `params` never
/// overrides the dispatched action.
pub(crate) fn request_body(action: &str, params: &ActionParams) -> serde_json::Value {
    let mut body = params.clone();
    body.insert("action".into(), serde_json::Value::String(action.to_string()));
    serde_json::Value::Object(body)
}

// ─── Tests ──────────────────────────────────────────────────────────
