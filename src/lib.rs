//! # Shopify Customer Account API Client
//!
//! A Rust client for the Shopify Customer Account API, providing the OAuth2
//! Authorization-Code-with-PKCE login flow, per-request session handling,
//! and an authenticated GraphQL client with transparent token refresh.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`CustomerAccountConfig`] and its builder
//! - Validated newtypes for the provider identity ([`ClientId`], [`ShopId`])
//! - The end-to-end login round-trip: `login` → provider → `authorize`
//! - Strict security bindings: `state` matching, ID-token `nonce` matching,
//!   PKCE (S256) verification, and open-redirect prevention
//! - A session capability ([`session::SessionStore`]) the caller backs with
//!   any key-value store
//! - Transparent, single-flighted refresh of expiring access tokens
//! - Authenticated GraphQL `query`/`mutate` with structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use customer_account::{CustomerAccountConfig, ClientId, ShopId};
//!
//! let config = CustomerAccountConfig::builder()
//!     .client_id(ClientId::new("shp_11111111-2222-3333-4444-555555555555").unwrap())
//!     .shop_id(ShopId::new("12345678").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## The Login Round-Trip
//!
//! ```rust,ignore
//! use customer_account::{
//!     CustomerAccountClient, CustomerAccountConfig, IncomingRequest, LoginOptions,
//! };
//! use std::sync::Arc;
//!
//! // One client per inbound request; the session is your store.
//! let client = CustomerAccountClient::new(config, session, request);
//!
//! // Step 1: /account/login handler — redirect the customer to the provider.
//! let redirect = client.login(&LoginOptions::default())?;
//!
//! // Step 2: /account/authorize handler — complete the code exchange.
//! let redirect = client.authorize().await?;
//!
//! // Step 3: anywhere — run authenticated operations.
//! if client.is_logged_in().await {
//!     let response = client
//!         .query("query { customer { firstName } }", None)
//!         .await?;
//! }
//! ```
//!
//! ## Sessions
//!
//! The client never owns session persistence. It reads and writes two
//! logical slots through [`session::SessionStore`]; committing the session
//! back to the response (cookies or otherwise) is the embedding server's
//! job. An in-memory implementation ships for tests and simple embeddings.
//!
//! ## Token Refresh
//!
//! Access tokens are stored with a 120-second safety margin subtracted from
//! the provider's `expires_in`. Expired tokens are refreshed transparently
//! on the next authenticated call. Refresh tokens may be single-use, so
//! concurrent callers on one session share a single in-flight refresh
//! rather than racing the rotation; refresh failures surface as "not
//! logged in", never as errors.
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: newtypes and credentials validate before the network
//! - **Session as capability**: any key-value backend satisfies the store trait
//! - **Thread-safe**: all types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio async runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod session;

// Re-export public types at crate root for convenience
pub use clients::{
    ApiError, AuthStatusHandler, ClientError, CustomerAccountClient, CustomerApiResponse,
    IncomingRequest, LoginOptions, LogoutOptions, OperationError, OperationKind, ProtocolError,
    Redirect, SubRequestEvent, SubRequestReporter,
};
pub use config::{
    ClientId, CustomerAccountConfig, CustomerAccountConfigBuilder, CustomerApiVersion, ShopId,
};
pub use error::ConfigError;

// Re-export auth types for convenience
pub use auth::{AccessTokenResponse, AccountUrls, AuthError};
pub use session::{Buyer, MemorySessionStore};
