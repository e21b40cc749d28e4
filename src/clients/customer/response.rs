//! Response value returned by `query` and `mutate`.

use crate::clients::customer::errors::{ApiError, OperationError};
use serde::Deserialize;
use serde_json::Value;

/// Wire shape of a Customer Account GraphQL response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawApiResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<ApiError>>,
}

/// A Customer Account API response.
///
/// GraphQL-level errors are not fatal: they are returned here alongside any
/// `data` the provider produced, enriched with the operation that caused
/// them. Callers decide how to handle them.
///
/// # Example
///
/// ```rust,ignore
/// let response = client.query("query { customer { firstName } }", None).await?;
///
/// if let Some(errors) = &response.errors {
///     for error in errors {
///         eprintln!("API error: {error}");
///     }
/// }
///
/// if let Some(data) = &response.data {
///     println!("Customer: {}", data["customer"]["firstName"]);
/// }
/// ```
#[derive(Debug, Default)]
pub struct CustomerApiResponse {
    /// The `data` document, when the provider produced one.
    pub data: Option<Value>,
    /// API-level errors returned alongside the response.
    pub errors: Option<Vec<OperationError>>,
}

impl CustomerApiResponse {
    /// Returns `true` when the response carries API-level errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_parses_data_and_errors() {
        let raw: RawApiResponse = serde_json::from_str(
            r#"{
                "data": {"customer": null},
                "errors": [{"message": "Access denied"}]
            }"#,
        )
        .unwrap();

        assert_eq!(raw.data, Some(json!({"customer": null})));
        assert_eq!(raw.errors.unwrap()[0].message, "Access denied");
    }

    #[test]
    fn test_raw_response_tolerates_missing_fields() {
        let raw: RawApiResponse = serde_json::from_str("{}").unwrap();
        assert!(raw.data.is_none());
        assert!(raw.errors.is_none());
    }

    #[test]
    fn test_has_errors() {
        let empty = CustomerApiResponse::default();
        assert!(!empty.has_errors());

        let with_empty_list = CustomerApiResponse {
            data: None,
            errors: Some(Vec::new()),
        };
        assert!(!with_empty_list.has_errors());
    }
}
