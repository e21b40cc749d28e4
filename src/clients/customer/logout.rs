//! Logout handling.
//!
//! Clears the session and sends the customer to the provider's logout
//! endpoint when an ID token is on hand, or straight to the post-logout
//! target otherwise. The post-logout target is same-origin confined like
//! every other externally-supplied redirect.

use crate::auth::{ensure_local_redirect_url, AuthError};
use crate::clients::customer::client::CustomerAccountClient;
use crate::clients::redirect::Redirect;
use crate::session::{clear_session, CustomerAccountAuth};
use std::collections::HashMap;

/// Options for [`CustomerAccountClient::logout`].
#[derive(Clone, Debug, Default)]
pub struct LogoutOptions {
    /// Where to send the customer after the provider-side logout.
    ///
    /// Must be same-origin with the storefront; anything else falls back to
    /// the storefront origin.
    pub post_logout_redirect_uri: Option<String>,
    /// Extra headers to attach to the redirect response (e.g. `Set-Cookie`).
    pub headers: HashMap<String, String>,
}

impl CustomerAccountClient {
    /// Logs the customer out.
    ///
    /// With an ID token in the session, the returned redirect targets the
    /// provider logout endpoint carrying `id_token_hint` and
    /// `post_logout_redirect_uri`, so the provider-side session ends too.
    /// Without one, the redirect goes directly to the post-logout target.
    /// The session is cleared in both cases.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the configured
    /// identity cannot produce provider URLs.
    pub fn logout(&self, options: &LogoutOptions) -> Result<Redirect, AuthError> {
        let urls = self.account_urls()?;

        let id_token = CustomerAccountAuth::read(self.session()).id_token;
        let post_logout_redirect_uri = ensure_local_redirect_url(
            self.https_origin(),
            self.https_origin(),
            options.post_logout_redirect_uri.as_deref(),
        );

        let location = id_token.map_or_else(
            || post_logout_redirect_uri.clone(),
            |id_token| {
                format!(
                    "{}?id_token_hint={}&post_logout_redirect_uri={}",
                    urls.logout_url(),
                    urlencoding::encode(&id_token),
                    urlencoding::encode(&post_logout_redirect_uri)
                )
            },
        );

        clear_session(self.session());

        let mut redirect = Redirect::to(location);
        for (name, value) in &options.headers {
            redirect = redirect.with_header(name.clone(), value.clone());
        }

        Ok(redirect)
    }
}
