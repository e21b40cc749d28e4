//! Token endpoint wire types and the refresh-token exchange.
//!
//! Refresh tokens may be single-use and rotated by the provider, so the
//! client serializes refresh attempts per session (see
//! `CustomerAccountClient::is_logged_in`). This module owns the wire call
//! itself plus the expiry arithmetic shared with the authorization-code
//! exchange.

use crate::auth::error::AuthError;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

/// Safety margin subtracted from the provider's `expires_in`, in seconds.
///
/// Tokens are treated as expired two minutes early so a request issued just
/// before the real expiry cannot race the provider's clock.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 120;

/// Upper bound on waiting for the per-session refresh guard.
///
/// A hung refresh exchange would otherwise stall every caller on the same
/// session indefinitely; callers that exceed this bound report logged-out
/// instead.
pub(crate) const REFRESH_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful response from the token endpoint.
///
/// Returned by both the `authorization_code` and `refresh_token` grants;
/// the refresh response may omit the ID token.
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// Access token for Customer Account API calls.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// ID token binding the login attempt; absent on refresh.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Rotated refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Computes the absolute expiry instant for a token issued now.
///
/// The result is epoch milliseconds encoded as a string, with the safety
/// margin already subtracted from `expires_in`.
#[must_use]
pub fn expires_at_epoch_ms(expires_in: i64) -> String {
    let expires_at =
        Utc::now().timestamp_millis() + (expires_in - EXPIRY_SAFETY_MARGIN_SECS) * 1000;
    expires_at.to_string()
}

/// Outcome of checking a stored expiry instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Expiry {
    /// The token is still within its lifetime.
    Fresh,
    /// The expiry instant has passed.
    Expired,
    /// The stored value is not a parseable epoch-millisecond instant.
    Unparsable,
}

/// Checks the stored expiry instant against the current time.
pub(crate) fn check_expiry(expires_at: &str) -> Expiry {
    expires_at.parse::<i64>().map_or(Expiry::Unparsable, |at| {
        if Utc::now().timestamp_millis() >= at {
            Expiry::Expired
        } else {
            Expiry::Fresh
        }
    })
}

/// Exchanges a refresh token for a fresh access token.
///
/// POSTs `grant_type=refresh_token` to the token endpoint as a form-encoded
/// body with the HTTPS storefront origin.
///
/// # Errors
///
/// - [`AuthError::Network`] on transport failure
/// - [`AuthError::Provider`] on a non-success response (body verbatim) or an
///   unparsable success body
pub(crate) async fn refresh_access_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    origin: &str,
    refresh_token: &str,
) -> Result<AccessTokenResponse, AuthError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("client_id", client_id),
        ("refresh_token", refresh_token),
    ];

    let response = http
        .post(token_url)
        .header("Origin", origin)
        .form(&params)
        .send()
        .await?;

    let status = response.status().as_u16();
    let body = response.text().await?;

    if !(200..300).contains(&status) {
        return Err(AuthError::Provider { status, body });
    }

    serde_json::from_str(&body).map_err(|e| AuthError::Provider {
        status,
        body: format!("Failed to parse token response: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expires_at_subtracts_safety_margin() {
        let before = Utc::now().timestamp_millis();
        let expires_at: i64 = expires_at_epoch_ms(3600).parse().unwrap();
        let after = Utc::now().timestamp_millis();

        assert!(expires_at >= before + 3_480_000);
        assert!(expires_at <= after + 3_480_000);
    }

    #[test]
    fn test_short_lifetimes_expire_immediately() {
        let expires_at: i64 = expires_at_epoch_ms(60).parse().unwrap();
        assert!(expires_at < Utc::now().timestamp_millis());
    }

    #[test]
    fn test_check_expiry_for_past_and_future_instants() {
        let past = (Utc::now().timestamp_millis() - 1000).to_string();
        assert_eq!(check_expiry(&past), Expiry::Expired);

        let future = (Utc::now().timestamp_millis() + 60_000).to_string();
        assert_eq!(check_expiry(&future), Expiry::Fresh);
    }

    #[test]
    fn test_check_expiry_flags_unparsable_instants() {
        assert_eq!(check_expiry("not-a-number"), Expiry::Unparsable);
        assert_eq!(check_expiry(""), Expiry::Unparsable);
        assert_eq!(check_expiry("1.5e9"), Expiry::Unparsable);
    }

    #[test]
    fn test_access_token_response_tolerates_missing_optional_fields() {
        let response: AccessTokenResponse = serde_json::from_str(
            r#"{"access_token": "token", "expires_in": 3600}"#,
        )
        .unwrap();

        assert_eq!(response.access_token, "token");
        assert_eq!(response.expires_in, 3600);
        assert!(response.id_token.is_none());
        assert!(response.refresh_token.is_none());
    }

    #[test]
    fn test_access_token_response_parses_full_payload() {
        let response: AccessTokenResponse = serde_json::from_str(
            r#"{
                "access_token": "access",
                "expires_in": 3600,
                "id_token": "id",
                "refresh_token": "refresh"
            }"#,
        )
        .unwrap();

        assert_eq!(response.id_token.as_deref(), Some("id"));
        assert_eq!(response.refresh_token.as_deref(), Some("refresh"));
    }
}
