//! # CloudOps Portal – Sign-in
//!
//! Authorization-code + PKCE login against the identity provider fronted by
//! the backend's auth function.
//!
//! - [`pkce`] – verifier/challenge generation (RFC 7636, S256)
//! - [`storage`] – tab-scoped persistence of the pending pair
//! - [`error`] – provider error codes mapped to user-facing kinds
//! - [`flow`] – login initiation and callback handling

pub mod error;
pub mod pkce;
pub mod storage;
pub mod flow;

pub use error::{classify_error, AuthError, AuthErrorKind, AuthResult, ProviderError};
pub use flow::{CallbackParams, LoginFlow, SignInOutcome};
pub use pkce::PkcePair;
pub use storage::{MemorySessionStorage, PkceStore, SessionStorage};
