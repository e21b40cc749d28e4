//! Client types for Customer Account API communication.
//!
//! This module provides the request/response collaborators the client is
//! built around and the client itself:
//!
//! - [`CustomerAccountClient`]: the per-request API client
//! - [`IncomingRequest`]: read-only view of the inbound storefront request
//! - [`Redirect`]: HTTP redirect values the flows return
//! - [`SubRequestEvent`] / [`SubRequestReporter`]: injectable diagnostics

pub mod customer;
mod redirect;
mod request;
mod sub_request;

pub use customer::{
    ApiError, ClientError, CustomerAccountClient, CustomerApiResponse, LoginOptions,
    LogoutOptions, OperationError, OperationKind, ProtocolError,
};
pub use redirect::{AuthStatusHandler, Redirect};
pub use request::IncomingRequest;
pub use sub_request::{SubRequestEvent, SubRequestReporter};
