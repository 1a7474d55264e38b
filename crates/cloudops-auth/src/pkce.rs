//! PKCE code pair generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Verifier length; the maximum RFC 7636 allows.
pub const VERIFIER_LENGTH: usize = 128;

/// RFC 7636 unreserved characters: `[A-Za-z0-9-._~]`.
pub const UNRESERVED: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

pub const CHALLENGE_METHOD: &str = "S256";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkcePair {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Generate a fresh pair from the OS CSPRNG.
pub fn generate() -> PkcePair {
    let mut rng = OsRng;
    let code_verifier: String = (0..VERIFIER_LENGTH)
        .map(|_| UNRESERVED[rng.gen_range(0..UNRESERVED.len())] as char)
        .collect();
    let code_challenge = challenge_for(&code_verifier);
    PkcePair {
        code_verifier,
        code_challenge,
    }
}

/// S256 challenge: base64url (no padding) of SHA-256 over the ASCII verifier.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
