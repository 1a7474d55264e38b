//! Sign-in error types.
//!
//! Provider error codes are mapped to a small set of kinds so the UI can tell
//! a user who cancelled apart from a real failure.

use std::fmt;

use serde::{Deserialize, Serialize};

use cloudops_gateway::{GatewayError, GatewayErrorKind};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorKind {
    UserCancelled,
    TokenExpired,
    ConfigurationError,
    AuthenticationError,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserCancelled => write!(f, "USER_CANCELLED"),
            Self::TokenExpired => write!(f, "TOKEN_EXPIRED"),
            Self::ConfigurationError => write!(f, "CONFIGURATION_ERROR"),
            Self::AuthenticationError => write!(f, "AUTHENTICATION_ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub message: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::AuthenticationError, message)
    }

    /// Cancellation is not a failure worth alarming the user about.
    pub fn is_user_cancelled(&self) -> bool {
        self.kind == AuthErrorKind::UserCancelled
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for String {
    fn from(e: AuthError) -> String {
        e.to_string()
    }
}

/// Error parameters returned by the identity provider on the redirect, or in
/// a token endpoint error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ProviderError {
    pub fn new(error: impl Into<String>, description: Option<String>) -> Self {
        Self {
            error: error.into(),
            error_description: description,
        }
    }
}

pub const ACCESS_DENIED: &str = "access_denied";
pub const INVALID_GRANT: &str = "invalid_grant";
pub const UNAUTHORIZED_CLIENT: &str = "unauthorized_client";

/// Map a provider error code to a semantic kind and user-facing message.
pub fn classify_error(provider: &ProviderError) -> AuthError {
    match provider.error.as_str() {
        ACCESS_DENIED => AuthError::new(AuthErrorKind::UserCancelled, "Sign-in was cancelled."),
        INVALID_GRANT => AuthError::new(
            AuthErrorKind::TokenExpired,
            "The sign-in code has expired. Please sign in again.",
        ),
        UNAUTHORIZED_CLIENT => AuthError::new(
            AuthErrorKind::ConfigurationError,
            "This application is not authorized with the identity provider. Contact your administrator.",
        ),
        other => AuthError::authentication(
            provider
                .error_description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format!("Authentication failed: {other}")),
        ),
    }
}

impl From<GatewayError> for AuthError {
    /// Backend failures during the exchange. A known provider code inside the
    /// message is classified like a redirect error.
    fn from(e: GatewayError) -> Self {
        for code in [ACCESS_DENIED, INVALID_GRANT, UNAUTHORIZED_CLIENT] {
            if e.message.contains(code) {
                return classify_error(&ProviderError::new(code, Some(e.message.clone())));
            }
        }
        if e.kind == GatewayErrorKind::Configuration || e.is_terminal() {
            return AuthError::new(AuthErrorKind::ConfigurationError, e.message);
        }
        AuthError::authentication(e.message)
    }
}
