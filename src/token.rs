// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token inspection.
//!
//! Tokens issued by the laundry backend are JWTs. The client never verifies
//! the signature (it has no key); it only reads the `exp` claim from the
//! payload segment to avoid a round trip with a token that is already dead.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the client cares about. Everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Expiration time (Unix timestamp, seconds)
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued at (Unix timestamp, seconds)
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Shape,

    #[error("token payload is not base64url: {0}")]
    Encoding(String),

    #[error("token payload is not a JSON claims object: {0}")]
    Claims(String),
}

/// Decode the payload segment of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Shape),
    };

    // Some issuers keep the padding; base64url-no-pad rejects it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Whether `token` should be considered dead at `now`.
///
/// A token that cannot be decoded counts as expired. A token without an `exp`
/// claim never expires client-side; the backend remains the authority.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(TokenClaims { exp: Some(exp), .. }) => {
            exp.saturating_mul(1000) < now.timestamp_millis()
        }
        Ok(_) => false,
        Err(e) => {
            tracing::debug!(error = %e, "Treating undecodable token as expired");
            true
        }
    }
}
