//! Inbound request collaborator.
//!
//! The client reads the inbound request but never owns it: the URL drives
//! callback parameters and origin derivation, and a handful of headers
//! (`Referer`, `purpose`, `request-id`) feed redirects and diagnostics.

use crate::error::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Read-only view of the inbound storefront request.
///
/// Carries the absolute request URL plus any headers the caller chooses to
/// expose. Header lookup is case-insensitive.
///
/// # Example
///
/// ```rust
/// use customer_account::IncomingRequest;
///
/// let request = IncomingRequest::new("https://shop.example.com/account/login")
///     .unwrap()
///     .with_header("Referer", "https://shop.example.com/products/widget");
///
/// assert_eq!(request.url().path(), "/account/login");
/// assert_eq!(
///     request.header("referer"),
///     Some("https://shop.example.com/products/widget")
/// );
/// ```
#[derive(Clone, Debug)]
pub struct IncomingRequest {
    url: Url,
    headers: HashMap<String, String>,
}

impl IncomingRequest {
    /// Creates a request view from an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRequestUrl`] if the URL does not parse
    /// or is not absolute.
    pub fn new(url: impl AsRef<str>) -> Result<Self, ConfigError> {
        let raw = url.as_ref();
        let url = Url::parse(raw).map_err(|_| ConfigError::InvalidRequestUrl {
            url: raw.to_string(),
        })?;

        if !url.has_host() {
            return Err(ConfigError::InvalidRequestUrl {
                url: raw.to_string(),
            });
        }

        Ok(Self {
            url,
            headers: HashMap::new(),
        })
    }

    /// Attaches a header to the request view.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Returns the request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Looks up a header value, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the request origin (scheme, host, port).
    #[must_use]
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Returns the request origin with the scheme forced to HTTPS.
    ///
    /// The provider rejects plain-HTTP origins, so local development
    /// requests present themselves as their HTTPS equivalent.
    #[must_use]
    pub fn https_origin(&self) -> String {
        let origin = self.origin();
        origin
            .strip_prefix("http://")
            .map_or(origin.clone(), |rest| format!("https://{rest}"))
    }
}

// Verify IncomingRequest is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<IncomingRequest>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_relative_urls() {
        let result = IncomingRequest::new("/account/login");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRequestUrl { .. })
        ));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = IncomingRequest::new("https://shop.example.com/")
            .unwrap()
            .with_header("Referer", "https://shop.example.com/cart");

        assert_eq!(request.header("referer"), Some("https://shop.example.com/cart"));
        assert_eq!(request.header("REFERER"), Some("https://shop.example.com/cart"));
        assert_eq!(request.header("purpose"), None);
    }

    #[test]
    fn test_origin_excludes_path_and_query() {
        let request =
            IncomingRequest::new("https://shop.example.com/account?return_to=/orders").unwrap();
        assert_eq!(request.origin(), "https://shop.example.com");
    }

    #[test]
    fn test_https_origin_forces_scheme() {
        let request = IncomingRequest::new("http://localhost:3000/account").unwrap();
        assert_eq!(request.https_origin(), "https://localhost:3000");

        let request = IncomingRequest::new("https://shop.example.com/account").unwrap();
        assert_eq!(request.https_origin(), "https://shop.example.com");
    }
}
