//! Authorization-code + PKCE sign-in.
//!
//! The provider's client id, secret and tenant stay on the backend. The portal
//! asks the auth function for the authorize URL (passing only the challenge)
//! and later hands it the returned `code` together with the stored verifier.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use cloudops_gateway::GatewayClient;

use crate::error::{classify_error, AuthError, AuthErrorKind, AuthResult, ProviderError};
use crate::pkce::{self, CHALLENGE_METHOD};
use crate::storage::PkceStore;

pub const GET_AUTHORIZE_URL: &str = "get-authorize-url";
pub const EXCHANGE_CODE: &str = "exchange-code";

/// Query parameters delivered to the redirect URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse the full callback URL.
    pub fn from_url(callback_url: &str) -> AuthResult<Self> {
        let url = Url::parse(callback_url)
            .map_err(|e| AuthError::authentication(format!("Invalid callback URL: {e}")))?;
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(params)
    }
}

/// What the backend returned for a successful exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SignInOutcome {
    /// One-time sign-in link the browser must follow.
    MagicLink(String),
    /// Direct user/session payload.
    Session(serde_json::Value),
}

impl SignInOutcome {
    fn from_value(data: serde_json::Value) -> AuthResult<Self> {
        let link = ["magicLink", "magic_link", "actionLink"]
            .iter()
            .find_map(|k| data.get(*k).and_then(|v| v.as_str()))
            .map(String::from);
        if let Some(link) = link {
            Url::parse(&link)
                .map_err(|e| AuthError::authentication(format!("Invalid sign-in link: {e}")))?;
            return Ok(Self::MagicLink(link));
        }
        if data.get("session").is_some() || data.get("user").is_some() {
            return Ok(Self::Session(data));
        }
        Err(AuthError::authentication("Unexpected response from the sign-in service"))
    }
}

/// The authorize URL, either as `{"url": ...}` or a bare string.
fn authorize_url_from(data: serde_json::Value) -> AuthResult<String> {
    let url = data
        .get("url")
        .and_then(|v| v.as_str())
        .or_else(|| data.as_str())
        .ok_or_else(|| AuthError::authentication("Sign-in service returned no authorize URL"))?;
    Url::parse(url).map_err(|e| AuthError::authentication(format!("Invalid authorize URL: {e}")))?;
    Ok(url.to_string())
}

/// One sign-in attempt per tab.
pub struct LoginFlow {
    gateway: GatewayClient,
    pkce: PkceStore,
    redirect_uri: String,
}

impl LoginFlow {
    /// `gateway` targets the backend auth function.
    pub fn new(gateway: GatewayClient, pkce: PkceStore, redirect_uri: impl Into<String>) -> Self {
        Self {
            gateway,
            pkce,
            redirect_uri: redirect_uri.into(),
        }
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Generate and store a fresh pair, then return the provider URL the
    /// browser should be sent to.
    pub async fn begin(&self) -> AuthResult<String> {
        let pair = pkce::generate();
        self.pkce.store(&pair);

        let params = json!({
            "codeChallenge": pair.code_challenge,
            "codeChallengeMethod": CHALLENGE_METHOD,
            "redirectUri": self.redirect_uri,
        });
        let url = self
            .gateway
            .invoke(GET_AUTHORIZE_URL, &params)
            .await
            .map_err(AuthError::from)
            .and_then(authorize_url_from);
        let url = match url {
            Ok(url) => url,
            Err(e) => {
                self.pkce.clear();
                return Err(e);
            }
        };

        info!("sign-in started, redirecting to identity provider");
        Ok(url)
    }

    /// Handle the redirect back from the provider. The stored pair is
    /// consumed before the exchange, so a code can only be redeemed once.
    pub async fn complete(&self, callback: &CallbackParams) -> AuthResult<SignInOutcome> {
        if let Some(code) = callback.error.as_deref() {
            self.pkce.clear();
            let err = classify_error(&ProviderError::new(code, callback.error_description.clone()));
            if err.is_user_cancelled() {
                info!("sign-in cancelled by user");
            } else {
                warn!("identity provider returned {}: {}", code, err.message);
            }
            return Err(err);
        }

        let code = callback
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::authentication("No authorization code received"))?;

        let pair = self.pkce.retrieve().ok_or_else(|| {
            AuthError::new(
                AuthErrorKind::TokenExpired,
                "Sign-in session expired or was started in another tab. Please sign in again.",
            )
        })?;
        self.pkce.clear();

        debug!("exchanging authorization code");
        let params = json!({
            "code": code,
            "codeVerifier": pair.code_verifier,
            "redirectUri": self.redirect_uri,
        });
        let data = self
            .gateway
            .invoke_with_attempts(EXCHANGE_CODE, &params, 1)
            .await?;

        let outcome = SignInOutcome::from_value(data)?;
        info!("sign-in code exchanged");
        Ok(outcome)
    }
}
