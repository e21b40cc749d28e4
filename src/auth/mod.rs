//! OAuth 2.0 Authorization-Code-with-PKCE support for the Customer Account API.
//!
//! This module carries the protocol pieces the client composes into the
//! end-to-end login: provider endpoint derivation, login-attempt binding
//! values (state, nonce, PKCE pair), open-redirect prevention, the token
//! endpoint exchanges, and the authentication error taxonomy.
//!
//! # Flow Overview
//!
//! 1. **Login**: generate `state`, `nonce`, and a PKCE verifier; persist
//!    them to the session; redirect the customer to the authorization
//!    endpoint with the S256 challenge.
//! 2. **Authorize**: verify `state` against the session, exchange the code
//!    (with the stored verifier) at the token endpoint, verify the ID
//!    token's `nonce`, persist the resulting tokens.
//! 3. **Refresh**: before each authenticated call, expired tokens are
//!    refreshed via `grant_type=refresh_token`, serialized per session
//!    because refresh tokens may rotate.
//!
//! The client methods realizing the flow live in
//! [`crate::clients::CustomerAccountClient`]; this module is the toolbox
//! they are built from.

mod account_urls;
mod error;
pub mod pkce;
mod redirect;
pub(crate) mod token_exchange;
pub(crate) mod token_refresh;

pub use account_urls::AccountUrls;
pub use error::AuthError;
pub use redirect::{ensure_local_redirect_url, local_return_to_url};
pub use token_refresh::{expires_at_epoch_ms, AccessTokenResponse, EXPIRY_SAFETY_MARGIN_SECS};
