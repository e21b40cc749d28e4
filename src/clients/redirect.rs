//! HTTP redirect values returned by the authentication flows.
//!
//! The crate never writes to a response directly; flows return a
//! [`Redirect`] value and the embedding server translates it into its own
//! response type.

use crate::clients::request::IncomingRequest;
use std::collections::HashMap;
use std::sync::Arc;

/// An HTTP redirect to emit to the customer's browser.
///
/// # Example
///
/// ```rust
/// use customer_account::Redirect;
///
/// let redirect = Redirect::to("/account");
/// assert_eq!(redirect.location(), "/account");
/// assert_eq!(redirect.status(), 302);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    location: String,
    status: u16,
    headers: HashMap<String, String>,
}

impl Redirect {
    /// Creates a `302 Found` redirect to `location`.
    #[must_use]
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status: 302,
            headers: HashMap::new(),
        }
    }

    /// Overrides the redirect status code.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches an extra response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the redirect target.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the redirect status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the extra response headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }
}

/// Handler producing the response for an unauthenticated request.
///
/// Invoked whenever an operation that requires a logged-in customer finds
/// none; the returned redirect becomes the operation's error outcome.
pub type AuthStatusHandler = Arc<dyn Fn(&IncomingRequest) -> Redirect + Send + Sync>;

/// Default auth-status handling: redirect to the login path, carrying the
/// original path as a `return_to` parameter.
pub(crate) fn default_auth_status_redirect(request: &IncomingRequest, login_path: &str) -> Redirect {
    let return_to = urlencoding::encode(request.url().path());
    Redirect::to(format!("{login_path}?return_to={return_to}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_defaults_to_found() {
        let redirect = Redirect::to("https://shop.example.com/account");
        assert_eq!(redirect.status(), 302);
        assert_eq!(redirect.location(), "https://shop.example.com/account");
        assert!(redirect.headers().is_empty());
    }

    #[test]
    fn test_redirect_with_status_and_headers() {
        let redirect = Redirect::to("/account")
            .with_status(303)
            .with_header("Set-Cookie", "session=abc");

        assert_eq!(redirect.status(), 303);
        assert_eq!(
            redirect.headers().get("Set-Cookie").map(String::as_str),
            Some("session=abc")
        );
    }

    #[test]
    fn test_default_auth_status_redirect_carries_return_to() {
        let request = IncomingRequest::new("https://shop.example.com/account/orders").unwrap();
        let redirect = default_auth_status_redirect(&request, "/account/login");

        assert_eq!(
            redirect.location(),
            "/account/login?return_to=%2Faccount%2Forders"
        );
    }
}
