//! Bearer-token credentials and JWT expiry inspection
//!
//! The backend authenticates every request with an opaque bearer token.
//! Credentials are resolved once at startup and passed explicitly into each
//! request-issuing component; there is no global token store.
//!
//! Tokens issued by this backend happen to be JWTs, so the console can read
//! the `exp` claim (payload decode only, no signature verification) and
//! refuse to start a job with a token the backend is guaranteed to reject.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque bearer credential for the CRM backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Value for the `Authorization` request header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Expiry instant (Unix seconds) if the token is a decodable JWT with an
    /// `exp` claim; `None` for opaque tokens.
    pub fn expiry(&self) -> Option<i64> {
        token_expiry(&self.token)
    }

    /// Whether the token carries an `exp` claim that has already passed.
    ///
    /// Opaque (non-JWT) tokens are never considered expired here; the
    /// backend remains the authority and answers 401/403.
    pub fn is_expired(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        matches!(self.expiry(), Some(exp) if exp <= now)
    }
}

/// Extract the `exp` claim (Unix seconds) from a JWT without verifying it.
///
/// Returns `None` when the token is not structured as a JWT, the payload is
/// not valid base64/JSON, or no numeric `exp` claim is present.
pub fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = decode_base64_segment(payload)?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}

/// JWT segments are base64url without padding; tolerate standard-alphabet
/// encoders as well.
fn decode_base64_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}
