//! Customer Account API version definitions.
//!
//! This module provides the [`CustomerApiVersion`] enum for specifying which
//! version of the Customer Account API to use.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Customer Account API version.
///
/// Shopify releases new API versions quarterly (January, April, July, October).
/// This enum provides variants for known stable versions, plus an `Unstable`
/// variant for development and a `Custom` variant for future versions.
///
/// # Example
///
/// ```rust
/// use customer_account::CustomerApiVersion;
///
/// // Use the latest stable version
/// let version = CustomerApiVersion::latest();
/// assert!(version.is_stable());
///
/// // Parse from string
/// let version: CustomerApiVersion = "2025-07".parse().unwrap();
/// assert_eq!(version, CustomerApiVersion::V2025_07);
///
/// // Display as string
/// assert_eq!(format!("{}", CustomerApiVersion::V2025_07), "2025-07");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CustomerApiVersion {
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Custom version string for future or unrecognized versions.
    Custom(String),
}

impl CustomerApiVersion {
    /// Returns the API version this crate was built for.
    ///
    /// This should be updated when new stable versions are released.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V2025_10
    }

    /// Returns `true` if this is a known stable API version.
    ///
    /// Returns `false` for `Unstable` and `Custom` variants.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        !matches!(self, Self::Unstable | Self::Custom(_))
    }

    /// Returns the version string used in API URLs.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(version) => version,
        }
    }

    /// Validates that a custom version string has the `YYYY-MM` shape.
    fn is_valid_version_format(version: &str) -> bool {
        let bytes = version.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return false;
        }

        let year_ok = bytes[..4].iter().all(u8::is_ascii_digit);
        let month_ok = bytes[5..].iter().all(u8::is_ascii_digit);
        if !year_ok || !month_ok {
            return false;
        }

        matches!(&version[5..], "01" | "04" | "07" | "10")
    }
}

impl FromStr for CustomerApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            other if Self::is_valid_version_format(other) => {
                Ok(Self::Custom(other.to_string()))
            }
            other => Err(ConfigError::InvalidApiVersion {
                version: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CustomerApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
