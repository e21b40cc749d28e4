//! Legacy access-token exchange for URL-identified stores.
//!
//! Stores identified by a customer account URL rather than a shop id
//! receive an identity-provider access token that is not directly usable
//! against the Customer Account GraphQL API. It must be exchanged once more
//! (RFC 8693 token exchange) for a customer-API-scoped access token before
//! storage. Shop-id-identified stores skip this step entirely.

use crate::auth::error::AuthError;
use serde::Deserialize;

/// Grant type for token exchange (RFC 8693).
const TOKEN_EXCHANGE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:token-exchange";

/// Subject token type for the identity-provider access token.
const ACCESS_TOKEN_SUBJECT_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";

/// Fixed audience of the Customer Account API.
const CUSTOMER_API_AUDIENCE: &str = "30243aa5-17c1-465a-8493-944bcc4e88aa";

/// Scope granted to the exchanged token.
const CUSTOMER_API_SCOPE: &str = "https://api.customers.com/auth/customer.graphql";

/// Exchange response; the provider reports errors in-band as JSON fields.
#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges an identity-provider access token for a customer-API token.
///
/// # Errors
///
/// - [`AuthError::Network`] on transport failure
/// - [`AuthError::Provider`] on a non-success response or an unparsable body
/// - [`AuthError::Unauthorized`] when the provider reports an in-band error
pub(crate) async fn exchange_access_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    origin: &str,
    access_token: &str,
) -> Result<String, AuthError> {
    let params = [
        ("grant_type", TOKEN_EXCHANGE_GRANT_TYPE),
        ("client_id", client_id),
        ("audience", CUSTOMER_API_AUDIENCE),
        ("subject_token", access_token),
        ("subject_token_type", ACCESS_TOKEN_SUBJECT_TYPE),
        ("scopes", CUSTOMER_API_SCOPE),
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

    let exchange: ExchangeResponse =
        serde_json::from_str(&body).map_err(|e| AuthError::Provider {
            status,
            body: format!("Failed to parse token exchange response: {e}"),
        })?;

    if let Some(error) = exchange.error {
        let reason = exchange.error_description.unwrap_or(error);
        return Err(AuthError::Unauthorized { reason });
    }

    exchange.access_token.ok_or_else(|| AuthError::Provider {
        status,
        body: "Token exchange response contained no access token.".to_string(),
    })
}
