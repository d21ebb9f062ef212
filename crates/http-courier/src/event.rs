//! Response notification events
//!
//! One event is published per completed `send`, fire-and-forget, over a
//! broadcast channel injected at construction. Listener results never feed
//! back into the call that produced the event.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::response::ResponseType;

/// Name under which response events are published
pub const RESPONSE_CREATED: &str = "networking.response.created";

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Payload published after each completed exchange
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEvent {
    /// HTTP status code, when the transport produced one
    pub status_code: Option<u16>,
    /// Normalized response body
    pub response_body: Value,
    /// Fields the caller supplied, regardless of placement
    pub request_body: Value,
    /// Full request URL
    pub url: String,
    /// Response headers
    pub response_headers: HashMap<String, String>,
    /// Request headers in effect for the call
    pub request_headers: HashMap<String, String>,
    /// Cookies set during the exchange
    pub cookies: HashMap<String, String>,
    /// Wall-clock duration of the exchange
    pub elapsed: Duration,
    /// How the response body was interpreted
    pub response_type: ResponseType,
    /// HTTP method used
    pub method: String,
}

/// Fire-and-forget publisher for [`ResponseEvent`]s
///
/// Wraps a broadcast sender; publishing with no live subscribers is not an
/// error. Clone freely: clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: broadcast::Sender<ResponseEvent>,
}

impl EventSink {
    /// A sink whose channel buffers up to `capacity` undelivered events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published through this sink
    pub fn subscribe(&self) -> broadcast::Receiver<ResponseEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, event: ResponseEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("{RESPONSE_CREATED} event dropped: no subscribers");
        }
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
