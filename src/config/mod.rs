//! Configuration types for the Customer Account API client.
//!
//! This module provides the core configuration types used to initialize
//! and configure the client for communication with the Customer Account API.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`CustomerAccountConfig`]: The main configuration struct holding all client settings
//! - [`CustomerAccountConfigBuilder`]: A builder for constructing [`CustomerAccountConfig`] instances
//! - [`ClientId`]: A validated client id newtype
//! - [`ShopId`]: A validated numeric shop id
//! - [`CustomerApiVersion`]: The Customer Account API version to use
//!
//! # Example
//!
//! ```rust
//! use customer_account::{CustomerAccountConfig, ClientId, ShopId, CustomerApiVersion};
//!
//! let config = CustomerAccountConfig::builder()
//!     .client_id(ClientId::new("shp_1234").unwrap())
//!     .shop_id(ShopId::new("12345678").unwrap())
//!     .api_version(CustomerApiVersion::latest())
//!     .build()
//!     .unwrap();
//! ```

mod newtypes;
mod version;

pub use newtypes::{ClientId, ShopId};
pub use version::CustomerApiVersion;

use crate::clients::{AuthStatusHandler, SubRequestReporter};
use crate::error::ConfigError;
use std::fmt;
use std::sync::Arc;

/// Configuration for the Customer Account API client.
///
/// This struct holds all configuration needed for client operations: the
/// identity-provider ids, API version, the storefront paths involved in the
/// login round-trip, and feature flags. It is resolved once per client
/// construction and read-only afterwards.
///
/// # Thread Safety
///
/// `CustomerAccountConfig` is `Clone`, `Send`, and `Sync`, making it safe to
/// share across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use customer_account::{CustomerAccountConfig, ClientId, ShopId};
///
/// let config = CustomerAccountConfig::builder()
///     .client_id(ClientId::new("shp_1234").unwrap())
///     .shop_id(ShopId::new("12345678").unwrap())
///     .login_path("/customer/login")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.login_path(), "/customer/login");
/// ```
#[derive(Clone)]
pub struct CustomerAccountConfig {
    client_id: ClientId,
    shop_id: Option<ShopId>,
    customer_account_url: Option<String>,
    api_version: CustomerApiVersion,
    login_path: String,
    authorize_path: String,
    default_redirect_path: String,
    auth_redirect_url: Option<String>,
    log_errors: bool,
    b2b_token_exchange: bool,
    user_agent_prefix: Option<String>,
    auth_status_handler: Option<AuthStatusHandler>,
    sub_request_reporter: Option<Arc<dyn SubRequestReporter>>,
}

impl CustomerAccountConfig {
    /// Creates a new builder for constructing a `CustomerAccountConfig`.
    #[must_use]
    pub fn builder() -> CustomerAccountConfigBuilder {
        CustomerAccountConfigBuilder::new()
    }

    /// Returns the client id.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the shop id, if configured.
    #[must_use]
    pub const fn shop_id(&self) -> Option<&ShopId> {
        self.shop_id.as_ref()
    }

    /// Returns the legacy customer account URL, if configured.
    ///
    /// This is the deprecated identification mode; prefer [`shop_id`].
    ///
    /// [`shop_id`]: Self::shop_id
    #[must_use]
    pub fn customer_account_url(&self) -> Option<&str> {
        self.customer_account_url.as_deref()
    }

    /// Returns the API version.
    #[must_use]
    pub const fn api_version(&self) -> &CustomerApiVersion {
        &self.api_version
    }

    /// Returns the storefront path that initiates login.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the storefront path that receives the authorization callback.
    #[must_use]
    pub fn authorize_path(&self) -> &str {
        &self.authorize_path
    }

    /// Returns the default post-authorization redirect path.
    #[must_use]
    pub fn default_redirect_path(&self) -> &str {
        &self.default_redirect_path
    }

    /// Returns the callback URL override, if configured.
    #[must_use]
    pub fn auth_redirect_url(&self) -> Option<&str> {
        self.auth_redirect_url.as_deref()
    }

    /// Returns whether API-level GraphQL errors are logged.
    #[must_use]
    pub const fn log_errors(&self) -> bool {
        self.log_errors
    }

    /// Returns whether the B2B storefront token exchange is enabled.
    #[must_use]
    pub const fn b2b_token_exchange(&self) -> bool {
        self.b2b_token_exchange
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the custom auth-status handler, if configured.
    #[must_use]
    pub const fn auth_status_handler(&self) -> Option<&AuthStatusHandler> {
        self.auth_status_handler.as_ref()
    }

    /// Returns the sub-request reporter, if configured.
    #[must_use]
    pub const fn sub_request_reporter(&self) -> Option<&Arc<dyn SubRequestReporter>> {
        self.sub_request_reporter.as_ref()
    }
}

impl fmt::Debug for CustomerAccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerAccountConfig")
            .field("client_id", &self.client_id)
            .field("shop_id", &self.shop_id)
            .field("customer_account_url", &self.customer_account_url)
            .field("api_version", &self.api_version)
            .field("login_path", &self.login_path)
            .field("authorize_path", &self.authorize_path)
            .field("default_redirect_path", &self.default_redirect_path)
            .field("auth_redirect_url", &self.auth_redirect_url)
            .field("log_errors", &self.log_errors)
            .field("b2b_token_exchange", &self.b2b_token_exchange)
            .field("user_agent_prefix", &self.user_agent_prefix)
            .field(
                "auth_status_handler",
                &self.auth_status_handler.as_ref().map(|_| "<custom>"),
            )
            .field(
                "sub_request_reporter",
                &self.sub_request_reporter.as_ref().map(|_| "<custom>"),
            )
            .finish()
    }
}

// Verify CustomerAccountConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CustomerAccountConfig>();
};

/// Builder for constructing [`CustomerAccountConfig`] instances.
///
/// The only required field is `client_id`. All other fields have the same
/// defaults the Customer Account API expects for a standard storefront.
///
/// # Defaults
///
/// - `api_version`: the version this crate was built for
/// - `login_path`: `/account/login`
/// - `authorize_path`: `/account/authorize`
/// - `default_redirect_path`: `/account`
/// - `log_errors`: `true`
/// - `b2b_token_exchange`: `false`
#[derive(Default)]
pub struct CustomerAccountConfigBuilder {
    client_id: Option<ClientId>,
    shop_id: Option<ShopId>,
    customer_account_url: Option<String>,
    api_version: Option<CustomerApiVersion>,
    login_path: Option<String>,
    authorize_path: Option<String>,
    default_redirect_path: Option<String>,
    auth_redirect_url: Option<String>,
    log_errors: Option<bool>,
    b2b_token_exchange: Option<bool>,
    user_agent_prefix: Option<String>,
    auth_status_handler: Option<AuthStatusHandler>,
    sub_request_reporter: Option<Arc<dyn SubRequestReporter>>,
}

impl CustomerAccountConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the client id (required).
    #[must_use]
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the shop id used to derive provider URLs.
    #[must_use]
    pub fn shop_id(mut self, shop_id: ShopId) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    /// Sets the legacy customer account URL.
    ///
    /// Only needed when no shop id is available; stores identified by URL go
    /// through an extra token exchange after authorization.
    #[must_use]
    pub fn customer_account_url(mut self, url: impl Into<String>) -> Self {
        self.customer_account_url = Some(url.into());
        self
    }

    /// Sets the API version.
    #[must_use]
    pub fn api_version(mut self, version: CustomerApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the storefront login path.
    #[must_use]
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Sets the storefront authorization-callback path.
    #[must_use]
    pub fn authorize_path(mut self, path: impl Into<String>) -> Self {
        self.authorize_path = Some(path.into());
        self
    }

    /// Sets the default post-authorization redirect path.
    #[must_use]
    pub fn default_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.default_redirect_path = Some(path.into());
        self
    }

    /// Overrides the callback URL registered with the provider.
    #[must_use]
    pub fn auth_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.auth_redirect_url = Some(url.into());
        self
    }

    /// Sets whether API-level GraphQL errors are logged.
    #[must_use]
    pub const fn log_errors(mut self, log_errors: bool) -> Self {
        self.log_errors = Some(log_errors);
        self
    }

    /// Enables or disables the B2B storefront token exchange.
    #[must_use]
    pub const fn b2b_token_exchange(mut self, enabled: bool) -> Self {
        self.b2b_token_exchange = Some(enabled);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a custom handler invoked when a request requires authentication.
    ///
    /// The default handler redirects to the login path with the original
    /// path carried as a `return_to` query parameter.
    #[must_use]
    pub fn auth_status_handler(mut self, handler: AuthStatusHandler) -> Self {
        self.auth_status_handler = Some(handler);
        self
    }

    /// Sets a sink that receives a diagnostic event per provider round-trip.
    #[must_use]
    pub fn sub_request_reporter(mut self, reporter: Arc<dyn SubRequestReporter>) -> Self {
        self.sub_request_reporter = Some(reporter);
        self
    }

    /// Builds the [`CustomerAccountConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `client_id` is not set.
    pub fn build(self) -> Result<CustomerAccountConfig, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;

        Ok(CustomerAccountConfig {
            client_id,
            shop_id: self.shop_id,
            customer_account_url: self.customer_account_url,
            api_version: self.api_version.unwrap_or_else(CustomerApiVersion::latest),
            login_path: self
                .login_path
                .unwrap_or_else(|| "/account/login".to_string()),
            authorize_path: self
                .authorize_path
                .unwrap_or_else(|| "/account/authorize".to_string()),
            default_redirect_path: self
                .default_redirect_path
                .unwrap_or_else(|| "/account".to_string()),
            auth_redirect_url: self.auth_redirect_url,
            log_errors: self.log_errors.unwrap_or(true),
            b2b_token_exchange: self.b2b_token_exchange.unwrap_or(false),
            user_agent_prefix: self.user_agent_prefix,
            auth_status_handler: self.auth_status_handler,
            sub_request_reporter: self.sub_request_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_client_id() {
        let result = CustomerAccountConfigBuilder::new()
            .shop_id(ShopId::new("12345678").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "client_id" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.api_version(), &CustomerApiVersion::latest());
        assert_eq!(config.login_path(), "/account/login");
        assert_eq!(config.authorize_path(), "/account/authorize");
        assert_eq!(config.default_redirect_path(), "/account");
        assert!(config.log_errors());
        assert!(!config.b2b_token_exchange());
        assert!(config.shop_id().is_none());
        assert!(config.customer_account_url().is_none());
        assert!(config.auth_status_handler().is_none());
        assert!(config.sub_request_reporter().is_none());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .shop_id(ShopId::new("12345678").unwrap())
            .api_version(CustomerApiVersion::V2025_04)
            .login_path("/customer/login")
            .authorize_path("/customer/authorize")
            .default_redirect_path("/customer")
            .auth_redirect_url("https://shop.example.com/customer/authorize")
            .log_errors(false)
            .b2b_token_exchange(true)
            .user_agent_prefix("MyStore/1.0")
            .build()
            .unwrap();

        assert_eq!(config.api_version(), &CustomerApiVersion::V2025_04);
        assert_eq!(config.login_path(), "/customer/login");
        assert_eq!(config.authorize_path(), "/customer/authorize");
        assert_eq!(config.default_redirect_path(), "/customer");
        assert_eq!(
            config.auth_redirect_url(),
            Some("https://shop.example.com/customer/authorize")
        );
        assert!(!config.log_errors());
        assert!(config.b2b_token_exchange());
        assert_eq!(config.user_agent_prefix(), Some("MyStore/1.0"));
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = CustomerAccountConfig::builder()
            .client_id(ClientId::new("shp_1234").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.client_id(), config.client_id());

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("CustomerAccountConfig"));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CustomerAccountConfig>();
    }
}
