//! Delivery event types and event bus
//!
//! One `DeliveryEvent` is pushed by the backend per recipient per state
//! transition; the same email can appear multiple times across a job (once as
//! `sending`, later as `sent` or `failed`). Events are broadcast internally
//! via [`EventBus`] and appended to the active job's log in arrival order.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Per-recipient, point-in-time delivery status.
///
/// Not a final state: `sending` marks an in-flight recipient whose terminal
/// `sent`/`failed` event normally follows later in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sending,
    Sent,
    Failed,
}

impl DeliveryStatus {
    /// Whether this status is a terminal outcome for the recipient
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Sent | DeliveryStatus::Failed)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DeliveryStatus::Sending => "sending",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// One unit pushed by the backend over the progress stream.
///
/// Carries the job identifier so the consumer can partition interleaved
/// events by job instead of relying on log-clear timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEvent {
    /// Job this event belongs to, as returned by the start acknowledgement
    pub job_id: Uuid,
    /// Recipient identity as reported by the backend
    pub name: String,
    pub email: String,
    pub status: DeliveryStatus,
    /// Present only when `status == failed`; free-text failure cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Broadcast bus carrying delivery events from the stream consumer to
/// however many views are following.
///
/// Events emitted before subscription are not received. A single subscriber
/// observes events in emit order, which for the stream consumer equals
/// arrival order.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DeliveryEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity.
    ///
    /// A subscriber that falls more than `capacity` events behind observes a
    /// `Lagged` error and loses the overwritten events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the subscriber count, or an error when nobody is listening
    /// (the event is dropped; the caller decides whether that is worth a
    /// warning).
    pub fn emit(&self, event: DeliveryEvent) -> Result<usize, Box<DeliveryEvent>> {
        self.tx
            .send(event)
            .map_err(|broadcast::error::SendError(event)| Box::new(event))
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
