//! Integration tests for the token lifecycle.
//!
//! These tests verify transparent refresh of expired tokens, the
//! single-flight guarantee for concurrent callers, and the logged-out
//! recovery path on refresh failure.

use chrono::Utc;
use customer_account::session::{CustomerAccountAuth, MemorySessionStore};
use customer_account::{ClientId, CustomerAccountClient, CustomerAccountConfig, IncomingRequest};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_client(mock_base: &str) -> (CustomerAccountClient, Arc<MemorySessionStore>) {
    // Legacy URL identification points every endpoint at the mock server.
    let config = CustomerAccountConfig::builder()
        .client_id(ClientId::new("shp_test-client").unwrap())
        .customer_account_url(mock_base)
        .build()
        .unwrap();

    let session = Arc::new(MemorySessionStore::new());
    let client = CustomerAccountClient::new(
        config,
        session.clone(),
        IncomingRequest::new("https://shop.example.com/account").unwrap(),
    );
    (client, session)
}

fn seed_expired_token(session: &MemorySessionStore) {
    CustomerAccountAuth {
        access_token: Some("stale-access-token".to_string()),
        expires_at: Some((Utc::now().timestamp_millis() - 1000).to_string()),
        refresh_token: Some("refresh-token-1".to_string()),
        id_token: Some("stored-id-token".to_string()),
        ..CustomerAccountAuth::default()
    }
    .write(session);
}

/// Mounts a token endpoint answering the refresh-token grant exactly
/// `expected_calls` times.
async fn mount_refresh(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-idp-token",
            "expires_in": 3600,
            "refresh_token": "refresh-token-2",
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mounts the legacy customer-API token exchange that follows a refresh.
async fn mount_legacy_exchange(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_string_contains("token-exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-customer-api-token",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_expired_token_is_refreshed_transparently() {
    let server = MockServer::start().await;
    mount_refresh(&server, 1).await;
    mount_legacy_exchange(&server).await;

    let (client, session) = create_client(&server.uri());
    seed_expired_token(session.as_ref());

    let before = Utc::now().timestamp_millis();
    assert!(client.is_logged_in().await);

    let auth = CustomerAccountAuth::read(session.as_ref());
    assert_eq!(
        auth.access_token.as_deref(),
        Some("fresh-customer-api-token")
    );
    // The rotated refresh token replaces the consumed one.
    assert_eq!(auth.refresh_token.as_deref(), Some("refresh-token-2"));
    // The ID token survives the refresh for later logout.
    assert_eq!(auth.id_token.as_deref(), Some("stored-id-token"));

    let expires_at: i64 = auth.expires_at.unwrap().parse().unwrap();
    assert!(expires_at >= before + 3_480_000);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    // `.expect(1)` is the assertion: two racing callers, one exchange.
    mount_refresh(&server, 1).await;
    mount_legacy_exchange(&server).await;

    let (client, session) = create_client(&server.uri());
    seed_expired_token(session.as_ref());

    let (first, second) = tokio::join!(client.is_logged_in(), client.is_logged_in());

    assert!(first);
    assert!(second);
    // The `.expect(1)` on the refresh mock is verified when the server drops.
}

#[tokio::test]
async fn test_refresh_failure_clears_session_and_reports_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let (client, session) = create_client(&server.uri());
    seed_expired_token(session.as_ref());

    // No error escapes: the caller sees "not logged in".
    assert!(!client.is_logged_in().await);
    assert_eq!(
        CustomerAccountAuth::read(session.as_ref()),
        CustomerAccountAuth::default()
    );
}

#[tokio::test]
async fn test_missing_refresh_token_reports_logged_out() {
    let server = MockServer::start().await;

    let (client, session) = create_client(&server.uri());
    CustomerAccountAuth {
        access_token: Some("stale-access-token".to_string()),
        expires_at: Some((Utc::now().timestamp_millis() - 1000).to_string()),
        refresh_token: None,
        ..CustomerAccountAuth::default()
    }
    .write(session.as_ref());

    assert!(!client.is_logged_in().await);
    assert_eq!(
        CustomerAccountAuth::read(session.as_ref()),
        CustomerAccountAuth::default()
    );
}

#[tokio::test]
async fn test_unparsable_expiry_reports_logged_out_without_refresh() {
    let server = MockServer::start().await;
    // No refresh mock mounted: any token-endpoint call would 404 and panic
    // the wiremock verification below.
    let (client, session) = create_client(&server.uri());
    CustomerAccountAuth {
        access_token: Some("token".to_string()),
        expires_at: Some("not-a-timestamp".to_string()),
        refresh_token: Some("refresh-token-1".to_string()),
        ..CustomerAccountAuth::default()
    }
    .write(session.as_ref());

    assert!(!client.is_logged_in().await);
    assert_eq!(
        CustomerAccountAuth::read(session.as_ref()),
        CustomerAccountAuth::default()
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fresh_token_skips_the_network() {
    let server = MockServer::start().await;

    let (client, session) = create_client(&server.uri());
    CustomerAccountAuth {
        access_token: Some("valid-token".to_string()),
        expires_at: Some((Utc::now().timestamp_millis() + 600_000).to_string()),
        refresh_token: Some("refresh-token-1".to_string()),
        ..CustomerAccountAuth::default()
    }
    .write(session.as_ref());

    assert!(client.is_logged_in().await);
    assert_eq!(
        client.get_access_token().await.as_deref(),
        Some("valid-token")
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}
