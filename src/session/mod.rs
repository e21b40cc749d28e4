//! Session capability and the records stored in it.
//!
//! The client never owns session persistence. It only reads and writes two
//! logical slots through the [`SessionStore`] trait: the authentication
//! record under [`CUSTOMER_ACCOUNT_SESSION_KEY`] and the buyer record under
//! [`BUYER_SESSION_KEY`]. Any key-value backend (cookie-encoded, in-memory,
//! distributed) satisfies the trait; committing the session back to the
//! response is the caller's responsibility.
//!
//! # Example
//!
//! ```rust
//! use customer_account::session::{MemorySessionStore, SessionStore, CUSTOMER_ACCOUNT_SESSION_KEY};
//! use serde_json::json;
//!
//! let store = MemorySessionStore::new();
//! store.set(CUSTOMER_ACCOUNT_SESSION_KEY, json!({"accessToken": "token"}));
//! assert!(store.get(CUSTOMER_ACCOUNT_SESSION_KEY).is_some());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Session slot holding authentication flow state and tokens.
pub const CUSTOMER_ACCOUNT_SESSION_KEY: &str = "customerAccountAuth";

/// Session slot holding the buyer record.
pub const BUYER_SESSION_KEY: &str = "buyer";

/// Key-value session capability scoped to one request/response cycle.
///
/// Implementations must be safe to share across concurrent tasks handling
/// the same request. No transactional guarantees are assumed.
pub trait SessionStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// Writing [`Value::Null`] clears the slot; readers treat `Null` as
    /// absent.
    fn set(&self, key: &str, value: Value);
}

/// Clears both client-owned session slots.
pub fn clear_session(session: &dyn SessionStore) {
    session.set(CUSTOMER_ACCOUNT_SESSION_KEY, Value::Null);
    session.set(BUYER_SESSION_KEY, Value::Null);
}

/// The record stored under [`CUSTOMER_ACCOUNT_SESSION_KEY`].
///
/// One struct covers both phases of the record's life: during a login
/// attempt it carries the ephemeral flow state (`code_verifier`, `state`,
/// `nonce`, `redirect_path`); after a successful authorization it carries
/// only the token fields. `expires_at` is an absolute epoch-millisecond
/// instant encoded as a string, matching the cookie-session wire shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerAccountAuth {
    /// PKCE code verifier persisted between login and callback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    /// CSRF state round-tripped through the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Nonce bound into the ID token for this login attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Path to return the customer to after authorization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_path: Option<String>,
    /// Access token for Customer Account API calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Absolute expiry instant, epoch milliseconds encoded as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Refresh token; may be single-use and rotated by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// ID token from the code exchange, used for logout and nonce binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl CustomerAccountAuth {
    /// Reads the record from the session, tolerating an absent or cleared slot.
    #[must_use]
    pub fn read(session: &dyn SessionStore) -> Self {
        session
            .get(CUSTOMER_ACCOUNT_SESSION_KEY)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Writes the record back to the session.
    pub fn write(&self, session: &dyn SessionStore) {
        let value = serde_json::to_value(self).unwrap_or(Value::Null);
        session.set(CUSTOMER_ACCOUNT_SESSION_KEY, value);
    }
}

/// The record stored under [`BUYER_SESSION_KEY`].
///
/// Present only when the B2B storefront token exchange runs; `set_buyer`
/// merges fields so partial updates never drop the other field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Buyer {
    /// Storefront-compatible customer access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_access_token: Option<String>,
    /// Selected company location for B2B buyers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_location_id: Option<String>,
}

impl Buyer {
    /// Reads the record from the session, tolerating an absent or cleared slot.
    #[must_use]
    pub fn read(session: &dyn SessionStore) -> Self {
        session
            .get(BUYER_SESSION_KEY)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Merges `self` over the stored record and writes the result back.
    pub fn merge_into(&self, session: &dyn SessionStore) {
        let mut stored = Self::read(session);
        if let Some(token) = &self.customer_access_token {
            stored.customer_access_token = Some(token.clone());
        }
        if let Some(location) = &self.company_location_id {
            stored.company_location_id = Some(location.clone());
        }

        let value = serde_json::to_value(&stored).unwrap_or(Value::Null);
        session.set(BUYER_SESSION_KEY, value);
    }
}

/// In-memory [`SessionStore`] for embedding and tests.
///
/// # Example
///
/// ```rust
/// use customer_account::session::{MemorySessionStore, SessionStore};
/// use serde_json::json;
///
/// let store = MemorySessionStore::new();
/// store.set("key", json!("value"));
/// assert_eq!(store.get("key"), Some(json!("value")));
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slots: Mutex<HashMap<String, Value>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
    }
}

// Verify session types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CustomerAccountAuth>();
    assert_send_sync::<Buyer>();
    assert_send_sync::<MemorySessionStore>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_record_round_trips_in_camel_case() {
        let auth = CustomerAccountAuth {
            access_token: Some("token".to_string()),
            expires_at: Some("1700000000000".to_string()),
            refresh_token: Some("refresh".to_string()),
            id_token: Some("id".to_string()),
            ..CustomerAccountAuth::default()
        };

        let value = serde_json::to_value(&auth).unwrap();
        assert_eq!(
            value,
            json!({
                "accessToken": "token",
                "expiresAt": "1700000000000",
                "refreshToken": "refresh",
                "idToken": "id",
            })
        );

        let restored: CustomerAccountAuth = serde_json::from_value(value).unwrap();
        assert_eq!(restored, auth);
    }

    #[test]
    fn test_read_tolerates_missing_slot() {
        let store = MemorySessionStore::new();
        assert_eq!(CustomerAccountAuth::read(&store), CustomerAccountAuth::default());
        assert_eq!(Buyer::read(&store), Buyer::default());
    }

    #[test]
    fn test_read_tolerates_cleared_slot() {
        let store = MemorySessionStore::new();
        store.set(CUSTOMER_ACCOUNT_SESSION_KEY, Value::Null);
        assert_eq!(CustomerAccountAuth::read(&store), CustomerAccountAuth::default());
    }

    #[test]
    fn test_read_tolerates_malformed_slot() {
        let store = MemorySessionStore::new();
        store.set(CUSTOMER_ACCOUNT_SESSION_KEY, json!("not-an-object"));
        assert_eq!(CustomerAccountAuth::read(&store), CustomerAccountAuth::default());
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let store = MemorySessionStore::new();
        let auth = CustomerAccountAuth {
            state: Some("state".to_string()),
            nonce: Some("nonce".to_string()),
            code_verifier: Some("verifier".to_string()),
            redirect_path: Some("/account/orders".to_string()),
            ..CustomerAccountAuth::default()
        };

        auth.write(&store);
        assert_eq!(CustomerAccountAuth::read(&store), auth);
    }

    #[test]
    fn test_clear_session_clears_both_slots() {
        let store = MemorySessionStore::new();
        CustomerAccountAuth {
            access_token: Some("token".to_string()),
            ..CustomerAccountAuth::default()
        }
        .write(&store);
        Buyer {
            customer_access_token: Some("buyer-token".to_string()),
            ..Buyer::default()
        }
        .merge_into(&store);

        clear_session(&store);

        assert_eq!(CustomerAccountAuth::read(&store), CustomerAccountAuth::default());
        assert_eq!(Buyer::read(&store), Buyer::default());
        // Slots are nulled rather than removed so cookie backends see the change.
        assert_eq!(store.get(CUSTOMER_ACCOUNT_SESSION_KEY), Some(Value::Null));
        assert_eq!(store.get(BUYER_SESSION_KEY), Some(Value::Null));
    }

    #[test]
    fn test_buyer_merge_preserves_existing_fields() {
        let store = MemorySessionStore::new();
        Buyer {
            customer_access_token: Some("token-1".to_string()),
            company_location_id: Some("gid://shopify/CompanyLocation/1".to_string()),
        }
        .merge_into(&store);

        Buyer {
            customer_access_token: Some("token-2".to_string()),
            company_location_id: None,
        }
        .merge_into(&store);

        let merged = Buyer::read(&store);
        assert_eq!(merged.customer_access_token, Some("token-2".to_string()));
        assert_eq!(
            merged.company_location_id,
            Some("gid://shopify/CompanyLocation/1".to_string())
        );
    }
}
