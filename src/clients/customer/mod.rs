//! The Customer Account API client and its supporting types.
//!
//! [`CustomerAccountClient`] is constructed once per inbound request and
//! exposes the full surface: `login`/`authorize`/`logout` for the OAuth
//! round-trips, `is_logged_in`/`get_access_token`/`handle_auth_status` for
//! the token lifecycle, and `query`/`mutate` for authenticated GraphQL.

mod authorize;
mod client;
mod errors;
mod graphql;
mod login;
mod logout;
mod response;

pub use client::{CustomerAccountClient, SDK_VERSION};
pub use errors::{ApiError, ClientError, OperationError, ProtocolError};
pub use graphql::{minify_operation, OperationKind};
pub use login::LoginOptions;
pub use logout::LogoutOptions;
pub use response::CustomerApiResponse;
