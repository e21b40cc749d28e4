//! Error types for the Customer Account API client.
//!
//! The taxonomy separates four situations a caller handles differently:
//! flow-level authentication errors ([`ClientError::Auth`]), "send the
//! customer to login" outcomes ([`ClientError::AuthRequired`]), caller
//! programming errors ([`ClientError::InvalidOperation`]), and provider
//! protocol failures with full diagnostics ([`ClientError::Protocol`]).
//! API-level GraphQL errors on successful responses are not errors at this
//! level; they ride alongside `data` in the response value.

use crate::auth::AuthError;
use crate::clients::customer::graphql::OperationKind;
use crate::clients::redirect::Redirect;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single error entry from a provider response body.
///
/// Deserialization is tolerant: a missing `message` becomes empty rather
/// than failing the whole response.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    /// The error message.
    #[serde(default)]
    pub message: String,
    /// Source locations within the operation, when reported.
    #[serde(default)]
    pub locations: Option<Value>,
    /// The response path the error applies to, when reported.
    #[serde(default)]
    pub path: Option<Value>,
    /// Provider-specific extensions (error codes etc.).
    #[serde(default)]
    pub extensions: Option<Value>,
}

/// A GraphQL error returned alongside a successful response, enriched with
/// the operation it came from.
///
/// These are business-level errors for the caller to handle; they are
/// optionally logged based on the configured `log_errors` flag.
#[derive(Clone, Debug)]
pub struct OperationError {
    /// The error message.
    pub message: String,
    /// Source locations within the operation, when reported.
    pub locations: Option<Value>,
    /// The response path the error applies to, when reported.
    pub path: Option<Value>,
    /// Provider-specific extensions.
    pub extensions: Option<Value>,
    /// The client operation label, e.g. `customerAccount.query`.
    pub client_operation: String,
    /// The provider's `x-request-id` for the response.
    pub request_id: Option<String>,
    /// The minified operation that produced the error.
    pub query: String,
    /// The variables the operation ran with.
    pub query_variables: Value,
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.client_operation, self.message)
    }
}

/// A provider protocol failure: non-2xx (other than 401) or a body that
/// could not be understood.
///
/// Carries the request URL, operation kind, and variables for diagnostics.
#[derive(Debug, Error)]
#[error("Customer Account API {kind} request failed at {url}: {}", summarize(.errors))]
pub struct ProtocolError {
    /// The endpoint URL that was called.
    pub url: String,
    /// The kind of operation that failed.
    pub kind: OperationKind,
    /// The minified operation.
    pub query: String,
    /// The variables the operation ran with.
    pub query_variables: Value,
    /// The HTTP status, when a response was received.
    pub status: Option<u16>,
    /// The conformed error entries from the response body.
    pub errors: Vec<ApiError>,
}

fn summarize(errors: &[ApiError]) -> String {
    if errors.is_empty() {
        return "no error detail provided".to_string();
    }

    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced by `query` and `mutate`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A flow-level authentication error (credentials, provider endpoints).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The caller must authenticate; the payload is the redirect to emit.
    ///
    /// Produced when no access token is available and when the provider
    /// rejects the current token with a 401 (session cleared first).
    #[error("Authentication required; redirect to {}", .0.location())]
    AuthRequired(Redirect),

    /// The operation string does not match the declared kind.
    ///
    /// A caller programming error, reported before any network activity.
    #[error("Expected a {expected} operation, received: {operation}")]
    InvalidOperation {
        /// The kind the called method expected.
        expected: OperationKind,
        /// A truncated rendering of the offending operation.
        operation: String,
    },

    /// A provider protocol failure with diagnostics attached.
    #[error(transparent)]
    Protocol(#[from] Box<ProtocolError>),
}

/// Conforms a provider error body to a list of [`ApiError`] entries.
///
/// The provider may return a JSON `{errors: [...]}` document, a bare error
/// array, an `{error, error_description}` object, or a plain-text body. The
/// shape is decided by a parse attempt, never by inspecting content-type;
/// anything unrecognized becomes a single raw-message entry.
pub(crate) fn parse_error_body(body: &str) -> Vec<ApiError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return vec![raw_message(body)];
    };

    match value {
        Value::Array(entries) => entries.into_iter().map(conform_entry).collect(),
        Value::Object(mut object) => {
            if let Some(Value::Array(entries)) = object.remove("errors") {
                return entries.into_iter().map(conform_entry).collect();
            }
            if let Some(description) = object.get("error_description").and_then(Value::as_str) {
                return vec![raw_message(description)];
            }
            if let Some(error) = object.get("error").and_then(Value::as_str) {
                return vec![raw_message(error)];
            }
            if object.contains_key("message") {
                return vec![conform_entry(Value::Object(object))];
            }
            vec![raw_message(body)]
        }
        _ => vec![raw_message(body)],
    }
}

fn conform_entry(entry: Value) -> ApiError {
    match entry {
        Value::String(message) => raw_message(&message),
        other => serde_json::from_value(other.clone())
            .unwrap_or_else(|_| raw_message(&other.to_string())),
    }
}

fn raw_message(message: &str) -> ApiError {
    ApiError {
        message: message.to_string(),
        ..ApiError::default()
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientError>();
    assert_send_sync::<ProtocolError>();
    assert_send_sync::<OperationError>();
};
