//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A validated Customer Account API client id.
///
/// This newtype ensures the client id is non-empty and provides type safety
/// to prevent accidental misuse of raw strings.
///
/// # Example
///
/// ```rust
/// use customer_account::ClientId;
///
/// let client_id = ClientId::new("shp_11111111-2222-3333-4444-555555555555").unwrap();
/// assert!(client_id.as_ref().starts_with("shp_"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a new validated client id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyClientId`] if the id is empty.
    pub fn new(client_id: impl Into<String>) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(Self(client_id))
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated shop id.
///
/// Shop ids identify the store against the Customer Account identity
/// provider and are purely numeric. The newtype rejects anything else so
/// malformed ids never reach URL construction.
///
/// # Serialization
///
/// `ShopId` serializes to and deserializes from the numeric string:
///
/// ```rust
/// use customer_account::ShopId;
///
/// let shop_id = ShopId::new("12345678").unwrap();
/// let json = serde_json::to_string(&shop_id).unwrap();
/// assert_eq!(json, r#""12345678""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopId(String);

impl ShopId {
    /// Creates a new validated shop id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopId`] if the id is empty or contains
    /// non-digit characters.
    pub fn new(shop_id: impl Into<String>) -> Result<Self, ConfigError> {
        let shop_id = shop_id.into();
        let shop_id = shop_id.trim().to_string();

        if shop_id.is_empty() || !shop_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidShopId { shop_id });
        }

        Ok(Self(shop_id))
    }
}

impl AsRef<str> for ShopId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for ShopId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ShopId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_rejects_empty_string() {
        let result = ClientId::new("");
        assert!(matches!(result, Err(ConfigError::EmptyClientId)));
    }

    #[test]
    fn test_client_id_rejects_whitespace_only() {
        let result = ClientId::new("   ");
        assert!(matches!(result, Err(ConfigError::EmptyClientId)));
    }

    #[test]
    fn test_client_id_accepts_valid_id() {
        let client_id = ClientId::new("shp_11111111-2222-3333-4444-555555555555").unwrap();
        assert_eq!(
            client_id.as_ref(),
            "shp_11111111-2222-3333-4444-555555555555"
        );
    }

    #[test]
    fn test_shop_id_accepts_numeric_id() {
        let shop_id = ShopId::new("12345678").unwrap();
        assert_eq!(shop_id.as_ref(), "12345678");
    }

    #[test]
    fn test_shop_id_trims_whitespace() {
        let shop_id = ShopId::new("  12345678  ").unwrap();
        assert_eq!(shop_id.as_ref(), "12345678");
    }

    #[test]
    fn test_shop_id_rejects_invalid_ids() {
        assert!(ShopId::new("").is_err());
        assert!(ShopId::new("shop-name").is_err());
        assert!(ShopId::new("1234abcd").is_err());
        assert!(ShopId::new("12 34").is_err());
    }

    #[test]
    fn test_shop_id_serializes_to_string() {
        let shop_id = ShopId::new("98765").unwrap();
        let json = serde_json::to_string(&shop_id).unwrap();
        assert_eq!(json, r#""98765""#);
    }

    #[test]
    fn test_shop_id_deserializes_from_string() {
        let shop_id: ShopId = serde_json::from_str(r#""98765""#).unwrap();
        assert_eq!(shop_id.as_ref(), "98765");
    }

    #[test]
    fn test_shop_id_deserialization_rejects_invalid() {
        let result: Result<ShopId, _> = serde_json::from_str(r#""not-numeric""#);
        assert!(result.is_err());
    }
}
