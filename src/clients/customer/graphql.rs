//! GraphQL operation normalization and kind assertions.
//!
//! Operations are minified before hitting the wire, and the declared kind
//! (query vs mutation) is asserted up front so a mis-routed operation is a
//! synchronous caller error rather than a provider round-trip.

use crate::clients::customer::errors::ClientError;
use std::fmt;

/// The kind of GraphQL operation being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    /// A read-only query.
    Query,
    /// A mutation.
    Mutation,
}

impl OperationKind {
    /// Returns the GraphQL keyword for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }

    /// Returns the client operation label used in error diagnostics.
    #[must_use]
    pub const fn client_operation(self) -> &'static str {
        match self {
            Self::Query => "customerAccount.query",
            Self::Mutation => "customerAccount.mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minifies a GraphQL operation string.
///
/// Strips `#` comments and collapses runs of whitespace to single spaces,
/// so persisted diagnostics stay compact and wire payloads small.
#[must_use]
pub fn minify_operation(source: &str) -> String {
    let without_comments: String = source
        .lines()
        .map(|line| line.split('#').next().unwrap_or(line))
        .collect::<Vec<_>>()
        .join(" ");

    without_comments.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Asserts that a minified operation matches its declared kind.
///
/// Anonymous operations (starting with `{`) count as queries. A mismatch is
/// a caller programming error and is reported before any network activity.
pub(crate) fn assert_operation_kind(
    operation: &str,
    kind: OperationKind,
) -> Result<(), ClientError> {
    let matches = match kind {
        OperationKind::Query => operation.starts_with("query") || operation.starts_with('{'),
        OperationKind::Mutation => operation.starts_with("mutation"),
    };

    if matches {
        Ok(())
    } else {
        Err(ClientError::InvalidOperation {
            expected: kind,
            operation: operation.chars().take(80).collect(),
        })
    }
}
