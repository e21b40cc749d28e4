//! Diagnostic events for provider round-trips.
//!
//! Every call the client makes to a provider endpoint emits one event:
//! useful for request waterfalls in development tooling, never required for
//! correctness. The sink is injectable configuration, not global state.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// One provider round-trip, as observed by the client.
#[derive(Clone, Debug)]
pub struct SubRequestEvent {
    /// The endpoint URL that was called.
    pub url: String,
    /// Human-readable label, e.g. `Customer Account API: authorize`.
    pub display_name: Option<String>,
    /// When the request started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the round-trip.
    pub elapsed: Duration,
    /// HTTP status of the response, when one was received.
    pub status: Option<u16>,
    /// The provider's `x-request-id` response header, when present.
    pub request_id: Option<String>,
    /// The inbound request's `purpose` header (e.g. `prefetch`).
    pub purpose: Option<String>,
}

/// Sink receiving one [`SubRequestEvent`] per provider round-trip.
///
/// # Example
///
/// ```rust
/// use customer_account::clients::{SubRequestEvent, SubRequestReporter};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl SubRequestReporter for Recorder {
///     fn report(&self, event: &SubRequestEvent) {
///         self.0.lock().unwrap().push(event.url.clone());
///     }
/// }
/// ```
pub trait SubRequestReporter: Send + Sync {
    /// Receives one completed round-trip.
    fn report(&self, event: &SubRequestEvent);
}

// Verify event type is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SubRequestEvent>();
};
