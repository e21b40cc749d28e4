//! The Customer Account API client.
//!
//! One client is constructed per inbound request and composes the
//! authentication flows with an authenticated GraphQL executor. Login,
//! authorize, and logout live in sibling modules; this module owns
//! construction, credential validation, the token lifecycle, and the
//! GraphQL transport.

use crate::auth::token_exchange::exchange_access_token;
use crate::auth::token_refresh::{
    check_expiry, expires_at_epoch_ms, refresh_access_token, Expiry, REFRESH_LOCK_TIMEOUT,
};
use crate::auth::{AccountUrls, AuthError};
use crate::clients::customer::errors::{
    parse_error_body, ApiError, ClientError, OperationError, ProtocolError,
};
use crate::clients::customer::graphql::{assert_operation_kind, minify_operation, OperationKind};
use crate::clients::customer::response::{CustomerApiResponse, RawApiResponse};
use crate::clients::redirect::{default_auth_status_redirect, Redirect};
use crate::clients::request::IncomingRequest;
use crate::clients::sub_request::SubRequestEvent;
use crate::config::{CustomerAccountConfig, CustomerApiVersion};
use crate::session::{clear_session, Buyer, CustomerAccountAuth, SessionStore};
use chrono::Utc;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mutation performed for the B2B storefront token exchange.
const STOREFRONT_CUSTOMER_ACCESS_TOKEN_CREATE: &str = "mutation storefrontCustomerAccessTokenCreate { storefrontCustomerAccessTokenCreate { customerAccessToken } }";

/// Client for the Customer Account API, scoped to one inbound request.
///
/// The client reads and writes tokens through the [`SessionStore`]
/// capability, authenticates customers via the OAuth2
/// Authorization-Code-with-PKCE flow, and executes GraphQL operations with
/// transparent refresh of expiring credentials.
///
/// # Thread Safety
///
/// `CustomerAccountClient` is `Send + Sync`. Concurrent operations on one
/// client (one session) serialize their token refreshes so a rotating
/// refresh token is never redeemed twice.
///
/// # Example
///
/// ```rust,ignore
/// use customer_account::{
///     CustomerAccountClient, CustomerAccountConfig, ClientId, ShopId, IncomingRequest,
/// };
/// use customer_account::session::MemorySessionStore;
/// use std::sync::Arc;
///
/// let config = CustomerAccountConfig::builder()
///     .client_id(ClientId::new("shp_1234").unwrap())
///     .shop_id(ShopId::new("12345678").unwrap())
///     .build()
///     .unwrap();
///
/// let session = Arc::new(MemorySessionStore::new());
/// let request = IncomingRequest::new("https://shop.example.com/account")?;
/// let client = CustomerAccountClient::new(config, session, request);
///
/// if client.is_logged_in().await {
///     let response = client.query("query { customer { firstName } }", None).await?;
/// }
/// ```
pub struct CustomerAccountClient {
    config: CustomerAccountConfig,
    session: Arc<dyn SessionStore>,
    request: IncomingRequest,
    https_origin: String,
    redirect_uri: String,
    http: reqwest::Client,
    refresh_guard: Mutex<()>,
}

// Verify CustomerAccountClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CustomerAccountClient>();
};

impl CustomerAccountClient {
    /// Creates a new client for one inbound request.
    ///
    /// Credential validation is deferred to the individual operations so a
    /// misconfigured client can still report `is_logged_in() == false`
    /// instead of failing construction.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS
    /// initialization failure).
    #[must_use]
    pub fn new(
        config: CustomerAccountConfig,
        session: Arc<dyn SessionStore>,
        request: IncomingRequest,
    ) -> Self {
        if config.api_version() != &CustomerApiVersion::latest() {
            tracing::warn!(
                configured = %config.api_version(),
                built_for = %CustomerApiVersion::latest(),
                "Using a Customer Account API version this client was not built for."
            );
        }

        if config.customer_account_url().is_some() && config.shop_id().is_none() {
            tracing::warn!(
                "The customer account URL identification mode is deprecated; supply a shop id instead."
            );
        }

        let https_origin = request.https_origin();
        let redirect_uri = crate::auth::ensure_local_redirect_url(
            &https_origin,
            config.authorize_path(),
            config.auth_redirect_url(),
        );

        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!(
            "{user_agent_prefix}Shopify Customer Account API Client v{SDK_VERSION} | Rust {rust_version}"
        );

        let mut default_headers = reqwest::header::HeaderMap::new();
        default_headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_str(&user_agent).unwrap_or_else(|_| {
                reqwest::header::HeaderValue::from_static("Shopify Customer Account API Client")
            }),
        );
        default_headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(default_headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            session,
            request,
            https_origin,
            redirect_uri,
            http,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &CustomerAccountConfig {
        &self.config
    }

    /// Returns the inbound request this client is scoped to.
    #[must_use]
    pub const fn request(&self) -> &IncomingRequest {
        &self.request
    }

    /// Returns the callback URL sent to the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the inbound request origin with the scheme forced to HTTPS.
    #[must_use]
    pub fn https_origin(&self) -> &str {
        &self.https_origin
    }

    /// Confirms the configured identity can produce provider URLs.
    ///
    /// Called at the start of every public operation; a fatal
    /// misconfiguration must never reach the network.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when it cannot.
    pub fn validate_credentials(&self) -> Result<(), AuthError> {
        self.account_urls().map(drop)
    }

    /// Returns the Customer Account GraphQL endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the configured
    /// identity cannot produce provider URLs.
    pub fn api_url(&self) -> Result<String, AuthError> {
        Ok(self.account_urls()?.graphql_url())
    }

    pub(crate) fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn account_urls(&self) -> Result<AccountUrls, AuthError> {
        AccountUrls::resolve(&self.config).map_err(|error| {
            tracing::error!(
                "Invalid Customer Account API credentials: no shop id or parseable \
                 customer account URL is configured."
            );
            error
        })
    }

    pub(crate) fn auth_status_redirect(&self) -> Redirect {
        self.config.auth_status_handler().map_or_else(
            || default_auth_status_redirect(&self.request, self.config.login_path()),
            |handler| handler(&self.request),
        )
    }

    /// Returns `true` when the session holds a usable access token.
    ///
    /// An expired token is refreshed transparently; refresh failures are
    /// treated as "not logged in", never raised. Concurrent callers on one
    /// session share a single in-flight refresh.
    pub async fn is_logged_in(&self) -> bool {
        let Ok(urls) = AccountUrls::resolve(&self.config) else {
            return false;
        };

        let auth = CustomerAccountAuth::read(self.session.as_ref());
        let (Some(_), Some(expires_at)) = (auth.access_token.as_ref(), auth.expires_at.as_ref())
        else {
            return false;
        };

        match check_expiry(expires_at) {
            Expiry::Fresh => true,
            Expiry::Unparsable => {
                tracing::warn!("Stored token expiry is unparsable; clearing the session.");
                clear_session(self.session.as_ref());
                false
            }
            Expiry::Expired => self.refresh_with_lock(&urls).await,
        }
    }

    /// Gates a protected flow on authentication.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRequired`] carrying the auth-status
    /// handler's redirect when the customer is not logged in.
    pub async fn handle_auth_status(&self) -> Result<(), ClientError> {
        if self.is_logged_in().await {
            Ok(())
        } else {
            Err(ClientError::AuthRequired(self.auth_status_redirect()))
        }
    }

    /// Returns the current access token, refreshing it first if expired.
    pub async fn get_access_token(&self) -> Option<String> {
        if self.is_logged_in().await {
            CustomerAccountAuth::read(self.session.as_ref()).access_token
        } else {
            None
        }
    }

    /// Executes a GraphQL query.
    ///
    /// The operation is minified and asserted to be a query before any
    /// network activity.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] on invalid credentials or transport failure
    /// - [`ClientError::InvalidOperation`] if `operation` is not a query
    /// - [`ClientError::AuthRequired`] when no usable token exists, or the
    ///   provider rejects the token with a 401 (session cleared)
    /// - [`ClientError::Protocol`] on other non-2xx responses or bodies that
    ///   cannot be understood
    pub async fn query(
        &self,
        operation: &str,
        variables: Option<Value>,
    ) -> Result<CustomerApiResponse, ClientError> {
        let urls = self.account_urls()?;
        let operation = minify_operation(operation);
        assert_operation_kind(&operation, OperationKind::Query)?;

        self.fetch_customer_api(&urls, &operation, OperationKind::Query, variables)
            .await
    }

    /// Executes a GraphQL mutation.
    ///
    /// The operation is minified and asserted to be a mutation before any
    /// network activity.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query), with
    /// [`ClientError::InvalidOperation`] raised if `operation` is not a
    /// mutation.
    pub async fn mutate(
        &self,
        operation: &str,
        variables: Option<Value>,
    ) -> Result<CustomerApiResponse, ClientError> {
        let urls = self.account_urls()?;
        let operation = minify_operation(operation);
        assert_operation_kind(&operation, OperationKind::Mutation)?;

        self.fetch_customer_api(&urls, &operation, OperationKind::Mutation, variables)
            .await
    }

    /// Merges fields into the stored buyer record.
    pub fn set_buyer(&self, buyer: &Buyer) {
        buyer.merge_into(self.session.as_ref());
    }

    /// Returns the stored buyer record for a logged-in customer.
    ///
    /// Triggers a token refresh first when the access token has expired;
    /// returns `None` when the customer is not logged in.
    pub async fn get_buyer(&self) -> Option<Buyer> {
        if self.is_logged_in().await {
            Some(Buyer::read(self.session.as_ref()))
        } else {
            None
        }
    }

    /// Obtains a storefront-compatible customer access token for B2B buyers.
    ///
    /// A no-op unless the `b2b_token_exchange` feature flag is enabled. On
    /// success the token is stored on the buyer record.
    ///
    /// Returns a boxed future: the exchange runs a mutation, whose token
    /// lookup can itself trigger a refresh that re-runs the exchange, so one
    /// link in that call cycle must erase its future type.
    pub(crate) fn exchange_storefront_customer_access_token(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<(), ClientError>> + Send + '_>> {
        Box::pin(async move {
            if !self.config.b2b_token_exchange() {
                return Ok(());
            }

            let response = self
                .mutate(STOREFRONT_CUSTOMER_ACCESS_TOKEN_CREATE, None)
                .await?;

            let token = response
                .data
                .as_ref()
                .and_then(|data| data.get("storefrontCustomerAccessTokenCreate"))
                .and_then(|payload| payload.get("customerAccessToken"))
                .and_then(Value::as_str);

            if let Some(token) = token {
                self.set_buyer(&Buyer {
                    customer_access_token: Some(token.to_string()),
                    company_location_id: None,
                });
            }

            Ok(())
        })
    }

    /// Serialized refresh: at most one token-endpoint exchange per session
    /// at a time; late arrivals observe the refreshed record instead of
    /// redeeming the (possibly rotated) refresh token a second time.
    async fn refresh_with_lock(&self, urls: &AccountUrls) -> bool {
        let Ok(guard) = tokio::time::timeout(REFRESH_LOCK_TIMEOUT, self.refresh_guard.lock()).await
        else {
            tracing::warn!("Timed out waiting for an in-flight token refresh.");
            return false;
        };

        // Re-check under the lock: a waiter that joined a completed refresh
        // sees a fresh expiry and performs no second exchange.
        let auth = CustomerAccountAuth::read(self.session.as_ref());
        match auth.expires_at.as_deref().map(check_expiry) {
            Some(Expiry::Fresh) => return true,
            Some(Expiry::Expired) => {}
            Some(Expiry::Unparsable) | None => {
                clear_session(self.session.as_ref());
                return false;
            }
        }

        if let Err(error) = self.perform_refresh(urls, &auth).await {
            tracing::warn!(%error, "Token refresh failed; treating the session as logged out.");
            return false;
        }
        drop(guard);

        // The buyer token is bound to the access token, so re-derive it.
        if let Err(error) = self.exchange_storefront_customer_access_token().await {
            tracing::warn!(%error, "Storefront customer access token exchange failed after refresh.");
            return false;
        }

        true
    }

    /// Performs the refresh-token exchange and rewrites the session record.
    ///
    /// Any failure clears the session: the refresh token may already have
    /// been consumed, so keeping the record would strand the session.
    async fn perform_refresh(
        &self,
        urls: &AccountUrls,
        auth: &CustomerAccountAuth,
    ) -> Result<(), AuthError> {
        let Some(refresh_token) = auth.refresh_token.as_deref() else {
            clear_session(self.session.as_ref());
            return Err(AuthError::Unauthorized {
                reason: "No refresh token found in the session.".to_string(),
            });
        };

        let started_at = Utc::now();
        let timer = Instant::now();
        let token_url = urls.token_url();

        let result = refresh_access_token(
            &self.http,
            &token_url,
            self.config.client_id().as_ref(),
            &self.https_origin,
            refresh_token,
        )
        .await;

        self.report_sub_request(&SubRequestEvent {
            url: token_url.clone(),
            display_name: Some("Customer Account API: access token refresh".to_string()),
            started_at,
            elapsed: timer.elapsed(),
            status: match &result {
                Ok(_) => Some(200),
                Err(AuthError::Provider { status, .. }) => Some(*status),
                Err(_) => None,
            },
            request_id: None,
            purpose: self.request.header("purpose").map(ToString::to_string),
        });

        let tokens = match result {
            Ok(tokens) => tokens,
            Err(error) => {
                clear_session(self.session.as_ref());
                return Err(error);
            }
        };

        let mut access_token = tokens.access_token.clone();
        if urls.is_legacy() {
            let exchanged = exchange_access_token(
                &self.http,
                &token_url,
                self.config.client_id().as_ref(),
                &self.https_origin,
                &tokens.access_token,
            )
            .await;

            access_token = match exchanged {
                Ok(token) => token,
                Err(error) => {
                    clear_session(self.session.as_ref());
                    return Err(error);
                }
            };
        }

        CustomerAccountAuth {
            access_token: Some(access_token),
            expires_at: Some(expires_at_epoch_ms(tokens.expires_in)),
            refresh_token: tokens
                .refresh_token
                .or_else(|| auth.refresh_token.clone()),
            id_token: tokens.id_token.or_else(|| auth.id_token.clone()),
            ..CustomerAccountAuth::default()
        }
        .write(self.session.as_ref());

        Ok(())
    }

    /// Executes one authenticated GraphQL round-trip.
    async fn fetch_customer_api(
        &self,
        urls: &AccountUrls,
        query: &str,
        kind: OperationKind,
        variables: Option<Value>,
    ) -> Result<CustomerApiResponse, ClientError> {
        let Some(access_token) = self.get_access_token().await else {
            return Err(ClientError::AuthRequired(self.auth_status_redirect()));
        };

        let variables = variables.unwrap_or_else(|| json!({}));
        let api_url = urls.graphql_url();
        let started_at = Utc::now();
        let timer = Instant::now();

        let response = self
            .http
            .post(&api_url)
            .header("Origin", &self.https_origin)
            .header("Authorization", &access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(AuthError::from)?;

        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        self.report_sub_request(&SubRequestEvent {
            url: api_url.clone(),
            display_name: Some(format!("Customer Account API: {kind}")),
            started_at,
            elapsed: timer.elapsed(),
            status: Some(status),
            request_id: request_id.clone(),
            purpose: self.request.header("purpose").map(ToString::to_string),
        });

        let body = response.text().await.map_err(AuthError::from)?;

        if !(200..300).contains(&status) {
            if status == 401 {
                // The provider manifestly rejected the token: hard reset.
                clear_session(self.session.as_ref());
                return Err(ClientError::AuthRequired(self.auth_status_redirect()));
            }

            return Err(ClientError::Protocol(Box::new(ProtocolError {
                url: api_url,
                kind,
                query: query.to_string(),
                query_variables: variables,
                status: Some(status),
                errors: parse_error_body(&body),
            })));
        }

        let Ok(raw) = serde_json::from_str::<RawApiResponse>(&body) else {
            return Err(ClientError::Protocol(Box::new(ProtocolError {
                url: api_url,
                kind,
                query: query.to_string(),
                query_variables: variables,
                status: Some(status),
                errors: vec![ApiError {
                    message: body,
                    ..ApiError::default()
                }],
            })));
        };

        let errors = raw.errors.map(|entries| {
            entries
                .into_iter()
                .map(|entry| OperationError {
                    message: entry.message,
                    locations: entry.locations,
                    path: entry.path,
                    extensions: entry.extensions,
                    client_operation: kind.client_operation().to_string(),
                    request_id: request_id.clone(),
                    query: query.to_string(),
                    query_variables: variables.clone(),
                })
                .collect::<Vec<_>>()
        });

        if self.config.log_errors() {
            if let Some(errors) = &errors {
                for error in errors {
                    tracing::error!(
                        operation = error.client_operation.as_str(),
                        request_id = error.request_id.as_deref(),
                        "{}",
                        error.message
                    );
                }
            }
        }

        Ok(CustomerApiResponse {
            data: raw.data,
            errors,
        })
    }

    /// Emits a diagnostic event for one provider round-trip.
    pub(crate) fn report_sub_request(&self, event: &SubRequestEvent) {
        tracing::debug!(
            url = %event.url,
            display_name = event.display_name.as_deref(),
            elapsed_ms = event.elapsed.as_millis() as u64,
            status = event.status,
            request_id = event.request_id.as_deref(),
            "Customer Account API sub-request"
        );

        if let Some(reporter) = self.config.sub_request_reporter() {
            reporter.report(event);
        }
    }
}
