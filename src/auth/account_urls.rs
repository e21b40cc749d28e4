//! Provider endpoint derivation.
//!
//! All Customer Account API endpoints derive from one of two roots. With a
//! shop id, the API root is `https://shopify.com/{shop_id}` and the auth
//! root is `https://shopify.com/authentication/{shop_id}`. In the legacy
//! URL-identified mode, the configured account URL is the API root and
//! `{url}/auth` is the auth root.

use crate::auth::error::AuthError;
use crate::config::CustomerAccountConfig;
use url::Url;

/// Login scope requested in shop-id mode.
const LOGIN_SCOPE: &str = "openid email customer-account-api:full";

/// Login scope requested in the legacy URL-identified mode.
const LEGACY_LOGIN_SCOPE: &str = "openid email https://api.customers.com/auth/customer.graphql";

/// Resolved provider endpoints for one configured identity.
///
/// Construction validates that both roots parse as URLs, so a client that
/// holds an `AccountUrls` can build every endpoint infallibly.
///
/// # Example
///
/// ```rust
/// use customer_account::{CustomerAccountConfig, ClientId, ShopId};
/// use customer_account::auth::AccountUrls;
///
/// let config = CustomerAccountConfig::builder()
///     .client_id(ClientId::new("shp_1234").unwrap())
///     .shop_id(ShopId::new("12345678").unwrap())
///     .build()
///     .unwrap();
///
/// let urls = AccountUrls::resolve(&config).unwrap();
/// assert_eq!(
///     urls.authorization_url(),
///     "https://shopify.com/authentication/12345678/oauth/authorize"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountUrls {
    base_url: String,
    auth_base_url: String,
    api_version: String,
    legacy: bool,
}

impl AccountUrls {
    /// Resolves provider endpoints from the configured identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if neither a shop id nor a
    /// parseable legacy account URL is configured.
    pub fn resolve(config: &CustomerAccountConfig) -> Result<Self, AuthError> {
        let (base_url, auth_base_url, legacy) = if let Some(shop_id) = config.shop_id() {
            (
                format!("https://shopify.com/{}", shop_id.as_ref()),
                format!("https://shopify.com/authentication/{}", shop_id.as_ref()),
                false,
            )
        } else if let Some(account_url) = config.customer_account_url() {
            let account_url = account_url.trim_end_matches('/');
            (account_url.to_string(), format!("{account_url}/auth"), true)
        } else {
            return Err(AuthError::InvalidCredentials);
        };

        // A fatal misconfiguration must never reach the network.
        if Url::parse(&base_url).is_err() || Url::parse(&auth_base_url).is_err() {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Self {
            base_url,
            auth_base_url,
            api_version: config.api_version().to_string(),
            legacy,
        })
    }

    /// Returns the API root URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the authentication root URL.
    #[must_use]
    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    /// Returns `true` when the identity is URL-identified (legacy mode).
    ///
    /// Legacy identities require an extra access-token exchange after the
    /// authorization-code exchange.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// Authorization endpoint, targeted via browser redirect.
    #[must_use]
    pub fn authorization_url(&self) -> String {
        format!("{}/oauth/authorize", self.auth_base_url)
    }

    /// Token endpoint, accepting form-encoded grant requests.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_base_url)
    }

    /// Logout endpoint, targeted via browser redirect.
    #[must_use]
    pub fn logout_url(&self) -> String {
        format!("{}/logout", self.auth_base_url)
    }

    /// Customer Account GraphQL endpoint.
    #[must_use]
    pub fn graphql_url(&self) -> String {
        format!(
            "{}/account/customer/api/{}/graphql",
            self.base_url, self.api_version
        )
    }

    /// Scope string requested at login.
    #[must_use]
    pub const fn login_scope(&self) -> &'static str {
        if self.legacy {
            LEGACY_LOGIN_SCOPE
        } else {
            LOGIN_SCOPE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientId, ShopId};

    fn shop_id_config() -> CustomerAccountConfig {
        CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .shop_id(ShopId::new("12345678").unwrap())
            .build()
            .unwrap()
    }

    fn legacy_config(url: &str) -> CustomerAccountConfig {
        CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .customer_account_url(url)
            .build()
            .unwrap()
    }

    #[test]
    fn test_shop_id_mode_derives_shopify_com_roots() {
        let urls = AccountUrls::resolve(&shop_id_config()).unwrap();

        assert_eq!(urls.base_url(), "https://shopify.com/12345678");
        assert_eq!(
            urls.auth_base_url(),
            "https://shopify.com/authentication/12345678"
        );
        assert!(!urls.is_legacy());
    }

    #[test]
    fn test_shop_id_mode_endpoints() {
        let urls = AccountUrls::resolve(&shop_id_config()).unwrap();

        assert_eq!(
            urls.authorization_url(),
            "https://shopify.com/authentication/12345678/oauth/authorize"
        );
        assert_eq!(
            urls.token_url(),
            "https://shopify.com/authentication/12345678/oauth/token"
        );
        assert_eq!(
            urls.logout_url(),
            "https://shopify.com/authentication/12345678/logout"
        );
        assert_eq!(
            urls.graphql_url(),
            "https://shopify.com/12345678/account/customer/api/2025-10/graphql"
        );
    }

    #[test]
    fn test_legacy_mode_derives_auth_suffix_root() {
        let urls = AccountUrls::resolve(&legacy_config("https://shopify.example.com")).unwrap();

        assert_eq!(urls.base_url(), "https://shopify.example.com");
        assert_eq!(urls.auth_base_url(), "https://shopify.example.com/auth");
        assert!(urls.is_legacy());
        assert_eq!(
            urls.token_url(),
            "https://shopify.example.com/auth/oauth/token"
        );
    }

    #[test]
    fn test_legacy_mode_trims_trailing_slash() {
        let urls = AccountUrls::resolve(&legacy_config("https://shopify.example.com/")).unwrap();
        assert_eq!(urls.base_url(), "https://shopify.example.com");
    }

    #[test]
    fn test_login_scope_per_mode() {
        let shop = AccountUrls::resolve(&shop_id_config()).unwrap();
        assert_eq!(shop.login_scope(), "openid email customer-account-api:full");

        let legacy = AccountUrls::resolve(&legacy_config("https://shopify.example.com")).unwrap();
        assert!(legacy.login_scope().contains("customer.graphql"));
    }

    #[test]
    fn test_missing_identity_is_invalid_credentials() {
        let config = CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .build()
            .unwrap();

        let result = AccountUrls::resolve(&config);
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_unparseable_legacy_url_is_invalid_credentials() {
        let result = AccountUrls::resolve(&legacy_config("not a url"));
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }
}
