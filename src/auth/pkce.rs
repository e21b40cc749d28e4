//! Login-attempt binding values: PKCE pair, state, and nonce.
//!
//! Every login attempt generates three secrets. The `state` round-trips
//! through the provider and must match at the callback; the `nonce` is
//! embedded in the returned ID token; the PKCE verifier stays in the session
//! while its S256 challenge travels in the authorization URL. All
//! comparisons against returned values are constant-time.

use crate::auth::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const STATE_LEN: usize = 32;
const NONCE_LEN: usize = 24;
const VERIFIER_BYTES: usize = 32;

/// Generates the CSRF `state` value for one login attempt.
#[must_use]
pub fn generate_state() -> String {
    random_alphanumeric(STATE_LEN)
}

/// Generates the `nonce` bound into the ID token for one login attempt.
#[must_use]
pub fn generate_nonce() -> String {
    random_alphanumeric(NONCE_LEN)
}

/// Generates a PKCE code verifier (RFC 7636).
///
/// The verifier is the base64url (unpadded) encoding of 32 random bytes,
/// which keeps it within the 43-128 character range the RFC requires.
#[must_use]
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Derives the S256 code challenge from a verifier.
#[must_use]
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Compares a stored binding value against a returned one in constant time.
///
/// Length differences short-circuit, which is acceptable here: the secret is
/// the content, not the length.
#[must_use]
pub fn binding_matches(expected: &str, received: &str) -> bool {
    expected.len() == received.len()
        && expected.as_bytes().ct_eq(received.as_bytes()).into()
}

/// Extracts the `nonce` claim from an ID token.
///
/// The payload is read without signature verification: the token was just
/// received over TLS from the token endpoint in exchange for the PKCE-bound
/// authorization code, which is what authenticates it.
///
/// # Errors
///
/// Returns [`AuthError::Unauthorized`] if the token is not a decodable JWT
/// or carries no `nonce` claim.
pub fn id_token_nonce(id_token: &str) -> Result<String, AuthError> {
    let payload = id_token.split('.').nth(1).ok_or_else(malformed_id_token)?;
    let decoded = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| malformed_id_token())?;
    let claims: serde_json::Value =
        serde_json::from_slice(&decoded).map_err(|_| malformed_id_token())?;

    claims
        .get("nonce")
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(malformed_id_token)
}

fn malformed_id_token() -> AuthError {
    AuthError::Unauthorized {
        reason: "The ID token returned by the provider could not be decoded.".to_string(),
    }
}

fn random_alphanumeric(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Builds an unsigned JWT with the given payload claims.
    fn test_jwt(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_state_and_nonce_are_alphanumeric() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

        let nonce = generate_nonce();
        assert_eq!(nonce.len(), 24);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_values_are_unique() {
        assert_ne!(generate_state(), generate_state());
        assert_ne!(generate_nonce(), generate_nonce());
        assert_ne!(generate_code_verifier(), generate_code_verifier());
    }

    #[test]
    fn test_verifier_length_is_within_rfc_range() {
        let verifier = generate_code_verifier();
        assert!(verifier.len() >= 43 && verifier.len() <= 128);
    }

    #[test]
    fn test_challenge_is_base64url_sha256_of_verifier() {
        // RFC 7636 Appendix B test vector.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_challenge_has_no_padding() {
        let challenge = code_challenge(&generate_code_verifier());
        assert!(!challenge.contains('='));
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
    }

    #[test]
    fn test_binding_matches() {
        assert!(binding_matches("same-value", "same-value"));
        assert!(!binding_matches("same-value", "other-value"));
        assert!(!binding_matches("short", "longer-value"));
        assert!(binding_matches("", ""));
    }

    #[test]
    fn test_id_token_nonce_extraction() {
        let token = test_jwt(&json!({"nonce": "expected-nonce", "sub": "customer"}));
        assert_eq!(id_token_nonce(&token).unwrap(), "expected-nonce");
    }

    #[test]
    fn test_id_token_without_nonce_is_unauthorized() {
        let token = test_jwt(&json!({"sub": "customer"}));
        let result = id_token_nonce(&token);
        assert!(matches!(result, Err(AuthError::Unauthorized { .. })));
    }

    #[test]
    fn test_malformed_id_token_is_unauthorized() {
        assert!(id_token_nonce("not-a-jwt").is_err());
        assert!(id_token_nonce("a.!!!not-base64!!!.c").is_err());
        assert!(id_token_nonce("").is_err());
    }
}
