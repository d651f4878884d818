//! Bearer credential with its locally decoded expiry.
//!
//! DESIGN
//! ======
//! The token is a JWT issued by the backend. Only the payload's `exp` claim is
//! read; the signature is never verified here. The decoded expiry schedules
//! the watchdog and is not an authorization decision. The backend rejects
//! stale tokens on every call.

use std::fmt;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("token is not a three-part JWT")]
    Shape,
    #[error("token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token claims are not valid JSON: {0}")]
    Claims(#[from] serde_json::Error),
    #[error("token expiry {0} is out of range")]
    ExpiryRange(i64),
    #[error("token already expired")]
    Expired,
}

#[derive(serde::Deserialize)]
struct Claims {
    exp: i64,
}

/// An opaque bearer token plus the expiry instant embedded in it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: OffsetDateTime,
}

impl Credential {
    /// Decode the `exp` claim of `token`.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] when the token is not a JWT or carries no
    /// usable `exp` claim.
    pub fn parse(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let expires_at = decode_expiry(&token)?;
        Ok(Self { token, expires_at })
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// True when `now` has reached or passed the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Delay until the watchdog should fire: `expiry - now - lead`, floored at zero.
    #[must_use]
    pub fn watchdog_delay(&self, now: OffsetDateTime, lead: Duration) -> Duration {
        let remaining = self.expires_at - now;
        Duration::try_from(remaining)
            .ok()
            .and_then(|d| d.checked_sub(lead))
            .unwrap_or(Duration::ZERO)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn decode_expiry(token: &str) -> Result<OffsetDateTime, CredentialError> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CredentialError::Shape);
    };
    if payload.is_empty() {
        return Err(CredentialError::Shape);
    }

    // Some issuers pad base64url; the JWT form drops it.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;
    OffsetDateTime::from_unix_timestamp(claims.exp).map_err(|_| CredentialError::ExpiryRange(claims.exp))
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;
