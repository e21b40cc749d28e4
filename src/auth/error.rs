//! Authentication-specific error types.
//!
//! This module contains error types for the OAuth flows: credential
//! validation, callback verification, and provider endpoint failures.
//!
//! # Error Types
//!
//! - [`AuthError::InvalidCredentials`]: the configured identity cannot produce provider URLs
//! - [`AuthError::Unauthorized`]: missing or mismatched `code`, `state`, `nonce`, or verifier
//! - [`AuthError::Provider`]: non-success response from a provider endpoint, body verbatim
//! - [`AuthError::Network`]: wrapped transport error
//!
//! # Example
//!
//! ```rust
//! use customer_account::auth::AuthError;
//!
//! let error = AuthError::Unauthorized {
//!     reason: "No code or state parameter found in the redirect URL.".to_string(),
//! };
//! assert_eq!(error.status(), 400);
//! ```

use thiserror::Error;

/// Errors that can occur during authentication operations.
///
/// Each variant maps to an HTTP response semantic via [`status`]: fatal
/// misconfiguration is an internal server error, flow verification failures
/// are bad requests, and provider-side failures carry the provider's own
/// status.
///
/// # Thread Safety
///
/// `AuthError` is `Send + Sync`, making it safe to use across async boundaries.
///
/// [`status`]: Self::status
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured identity cannot produce well-formed provider URLs.
    ///
    /// Raised before any network activity when the client id is absent or
    /// the provider base/auth URLs cannot be constructed. Full detail is
    /// logged server-side; this message is safe to show a client.
    #[error("You do not have the valid credentials to use the Customer Account API.")]
    InvalidCredentials,

    /// A security binding failed during the authorization flow.
    ///
    /// Covers missing or mismatched `code`, `state`, `nonce`, and
    /// `code_verifier` values at the callback.
    #[error("Unauthorized: {reason}")]
    Unauthorized {
        /// Description of the failed binding.
        reason: String,
    },

    /// A provider endpoint returned a non-success response.
    ///
    /// The body is propagated verbatim so provider-side failure detail is
    /// not lost.
    #[error("Provider endpoint returned status {status}: {body}")]
    Provider {
        /// The HTTP status code returned.
        status: u16,
        /// The raw response body.
        body: String,
    },

    /// Wrapped transport error.
    #[error(transparent)]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    /// Returns the HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidCredentials => 500,
            Self::Unauthorized { .. } => 400,
            Self::Provider { status, .. } => *status,
            Self::Network(_) => 502,
        }
    }
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_maps_to_internal_error() {
        let error = AuthError::InvalidCredentials;
        assert_eq!(error.status(), 500);
        assert!(error.to_string().contains("Customer Account API"));
    }

    #[test]
    fn test_unauthorized_maps_to_bad_request() {
        let error = AuthError::Unauthorized {
            reason: "The session state does not match the state parameter.".to_string(),
        };
        assert_eq!(error.status(), 400);
        assert!(error.to_string().contains("Unauthorized"));
        assert!(error.to_string().contains("does not match"));
    }

    #[test]
    fn test_provider_error_carries_status_and_body() {
        let error = AuthError::Provider {
            status: 403,
            body: "<html>forbidden</html>".to_string(),
        };
        assert_eq!(error.status(), 403);
        assert!(error.to_string().contains("403"));
        assert!(error.to_string().contains("<html>forbidden</html>"));
    }

    #[test]
    fn test_auth_error_implements_std_error() {
        let error: &dyn std::error::Error = &AuthError::InvalidCredentials;
        let _ = error;
    }
}
