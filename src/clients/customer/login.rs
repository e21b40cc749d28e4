//! Authorization initiation ("login").
//!
//! Builds the provider authorization URL, persists the ephemeral flow state
//! (PKCE verifier, state, nonce, return path) to the session, and hands the
//! caller a redirect. Each call overwrites the prior flow state.

use crate::auth::pkce;
use crate::auth::{local_return_to_url, AuthError};
use crate::clients::customer::client::CustomerAccountClient;
use crate::clients::redirect::Redirect;
use crate::session::CustomerAccountAuth;
use url::Url;

/// Options for [`CustomerAccountClient::login`].
#[derive(Clone, Debug, Default)]
pub struct LoginOptions {
    /// UI locale hint forwarded to the provider login page, e.g. `fr-CA`.
    pub ui_locales: Option<String>,
}

impl CustomerAccountClient {
    /// Initiates the authorization-code flow.
    ///
    /// Generates fresh `state`, `nonce`, and PKCE verifier values, persists
    /// them to the session together with the path to return the customer to
    /// afterwards, and returns a redirect to the provider's authorization
    /// endpoint. The return path is the first of: a same-origin `return_to`
    /// query parameter on the current request, the `Referer` header, or the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the configured
    /// identity cannot produce provider URLs.
    pub fn login(&self, options: &LoginOptions) -> Result<Redirect, AuthError> {
        let urls = self.account_urls()?;
        let mut login_url =
            Url::parse(&urls.authorization_url()).map_err(|_| AuthError::InvalidCredentials)?;

        let state = pkce::generate_state();
        let nonce = pkce::generate_nonce();
        let code_verifier = pkce::generate_code_verifier();
        let code_challenge = pkce::code_challenge(&code_verifier);

        let redirect_path = local_return_to_url(self.request().url())
            .or_else(|| self.request().header("Referer").map(ToString::to_string))
            .unwrap_or_else(|| self.config().default_redirect_path().to_string());

        let mut auth = CustomerAccountAuth::read(self.session());
        auth.code_verifier = Some(code_verifier);
        auth.state = Some(state.clone());
        auth.nonce = Some(nonce.clone());
        auth.redirect_path = Some(redirect_path);
        auth.write(self.session());

        {
            let mut pairs = login_url.query_pairs_mut();
            pairs.append_pair("client_id", self.config().client_id().as_ref());
            pairs.append_pair("scope", urls.login_scope());
            pairs.append_pair("response_type", "code");
            pairs.append_pair("redirect_uri", self.redirect_uri());
            pairs.append_pair("state", &state);
            pairs.append_pair("nonce", &nonce);

            if let Some(locale) = options.ui_locales.as_deref().map(normalize_ui_locales) {
                pairs.append_pair("ui_locales", &locale);
            }

            pairs.append_pair("code_challenge", &code_challenge);
            pairs.append_pair("code_challenge_method", "S256");
        }

        Ok(Redirect::to(login_url))
    }
}

/// Normalizes a locale hint: language lower-cased, region upper-cased.
fn normalize_ui_locales(locale: &str) -> String {
    match locale.split_once('-') {
        Some((language, region)) => format!(
            "{}-{}",
            language.to_lowercase(),
            region.to_uppercase()
        ),
        None => locale.to_lowercase(),
    }
}
