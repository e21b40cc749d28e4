//! Authorization callback handling ("authorize").
//!
//! Completes the code exchange after the provider redirects the customer
//! back: verifies the `state` binding against the session, exchanges the
//! code with the stored PKCE verifier, verifies the ID token's `nonce`, and
//! persists the long-lived tokens. Check ordering mirrors the provider's
//! documented flow: `state` before verifier, verifier before exchange.

use crate::auth::pkce;
use crate::auth::token_exchange::exchange_access_token;
use crate::auth::token_refresh::expires_at_epoch_ms;
use crate::auth::{AccessTokenResponse, AuthError};
use crate::clients::customer::client::CustomerAccountClient;
use crate::clients::redirect::Redirect;
use crate::clients::sub_request::SubRequestEvent;
use crate::session::{clear_session, CustomerAccountAuth};
use chrono::Utc;
use std::time::Instant;

impl CustomerAccountClient {
    /// Completes the authorization-code flow.
    ///
    /// Expects the inbound request to carry the provider's `code` and
    /// `state` query parameters. On success the session holds the token
    /// record and the returned redirect sends the customer back to the path
    /// captured at login (or the configured default).
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the configured identity
    ///   cannot produce provider URLs
    /// - [`AuthError::Unauthorized`] when `code` or `state` is missing
    ///   (session cleared), the session state does not match (session
    ///   cleared), no code verifier is present, or the ID token's nonce
    ///   does not match the session nonce
    /// - [`AuthError::Provider`] when the token endpoint responds non-2xx;
    ///   the raw response body is propagated verbatim
    /// - [`AuthError::Network`] on transport failure
    pub async fn authorize(&self) -> Result<Redirect, AuthError> {
        let urls = self.account_urls()?;

        let mut code = None;
        let mut state = None;
        for (key, value) in self.request().url().query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        let (Some(code), Some(state)) = (code, state) else {
            clear_session(self.session());
            return Err(AuthError::Unauthorized {
                reason: "No code or state parameter found in the redirect URL.".to_string(),
            });
        };

        let auth = CustomerAccountAuth::read(self.session());

        let state_matches = auth
            .state
            .as_deref()
            .is_some_and(|session_state| pkce::binding_matches(session_state, &state));
        if !state_matches {
            clear_session(self.session());
            return Err(AuthError::Unauthorized {
                reason: "The session state does not match the state parameter. Make sure that \
                         the session is configured correctly and passed to the client."
                    .to_string(),
            });
        }

        let Some(code_verifier) = auth.code_verifier.as_deref() else {
            return Err(AuthError::Unauthorized {
                reason: "No code verifier found in the session. Make sure that the session is \
                         configured correctly and passed to the client."
                    .to_string(),
            });
        };

        let token_url = urls.token_url();
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config().client_id().as_ref()),
            ("redirect_uri", self.redirect_uri()),
            ("code", code.as_str()),
            ("code_verifier", code_verifier),
        ];

        let started_at = Utc::now();
        let timer = Instant::now();

        let response = self
            .http()
            .post(&token_url)
            .header("Origin", self.https_origin())
            .form(&params)
            .send()
            .await?;

        let status = response.status().as_u16();

        self.report_sub_request(&SubRequestEvent {
            url: token_url.clone(),
            display_name: Some("Customer Account API: authorize".to_string()),
            started_at,
            elapsed: timer.elapsed(),
            status: Some(status),
            request_id: response
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string),
            purpose: self.request().header("purpose").map(ToString::to_string),
        });

        let body = response.text().await?;

        if !(200..300).contains(&status) {
            // Propagate the provider-side failure verbatim.
            return Err(AuthError::Provider { status, body });
        }

        let tokens: AccessTokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Provider {
                status,
                body: format!("Failed to parse token response: {e}"),
            })?;

        let id_token = tokens.id_token.ok_or_else(|| AuthError::Unauthorized {
            reason: "The token endpoint response contained no ID token.".to_string(),
        })?;

        let session_nonce = auth.nonce.clone().unwrap_or_default();
        let response_nonce = pkce::id_token_nonce(&id_token)?;
        if !pkce::binding_matches(&session_nonce, &response_nonce) {
            return Err(AuthError::Unauthorized {
                reason: format!(
                    "Returned nonce does not match: {session_nonce} !== {response_nonce}"
                ),
            });
        }

        let mut access_token = tokens.access_token;
        if urls.is_legacy() {
            access_token = exchange_access_token(
                self.http(),
                &token_url,
                self.config().client_id().as_ref(),
                self.https_origin(),
                &access_token,
            )
            .await?;
        }

        let redirect_path = auth.redirect_path.clone();

        // Written wholesale: the flow state never outlives one login attempt.
        CustomerAccountAuth {
            access_token: Some(access_token),
            expires_at: Some(expires_at_epoch_ms(tokens.expires_in)),
            refresh_token: tokens.refresh_token,
            id_token: Some(id_token),
            ..CustomerAccountAuth::default()
        }
        .write(self.session());

        if let Err(error) = self.exchange_storefront_customer_access_token().await {
            tracing::warn!(%error, "Storefront customer access token exchange failed after authorization.");
        }

        Ok(Redirect::to(redirect_path.unwrap_or_else(|| {
            self.config().default_redirect_path().to_string()
        })))
    }
}
