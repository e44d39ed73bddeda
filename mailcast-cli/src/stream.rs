//! Progress stream consumer
//!
//! Maintains the console's single server-push channel: connects to the
//! backend's SSE endpoint, parses inbound messages one at a time in arrival
//! order, and publishes each `DeliveryEvent` to the [`EventBus`]. The bus's
//! emit order therefore equals network arrival order, which is the ordering
//! guarantee the delivery log relies on.
//!
//! Connection failures trigger a bounded exponential-backoff reconnect; once
//! the attempt budget for an outage is exhausted the channel closes for the
//! rest of the session. That closure is logged, never surfaced as a
//! user-facing error: the progress display simply stops updating.

use futures::StreamExt;
use mailcast_common::sse::SseParser;
use mailcast_common::{DeliveryEvent, EventBus};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::client::ApiClient;

/// Push-channel lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Open,
    ClosedError,
}

/// Bounded reconnect policy for the push channel
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Reconnect attempts per outage; the counter resets once a connection
    /// opens
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given reconnect attempt (1-based), capped at
    /// `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// Run the progress stream consumer until the reconnect budget is exhausted.
///
/// Spawned once per console session; the channel is shared across however
/// many send jobs are triggered during that session.
pub async fn run_progress_stream(client: ApiClient, bus: EventBus, policy: ReconnectPolicy) {
    let mut attempt: u32 = 0;

    loop {
        debug!(state = ?StreamState::Connecting, attempt, "Opening progress stream");

        match client.open_event_stream().await {
            Ok(response) => {
                info!(state = ?StreamState::Open, url = %client.events_url(), "Progress stream connected");
                attempt = 0;

                match consume(response, &bus).await {
                    Ok(()) => debug!("Progress stream ended"),
                    Err(e) => warn!("Progress stream transport error: {e}"),
                }
            }
            Err(e) => {
                warn!("Progress stream connection failed: {e}");
            }
        }

        attempt += 1;
        if attempt > policy.max_attempts {
            warn!(
                state = ?StreamState::ClosedError,
                "Progress stream closed for this session; delivery progress will no longer update"
            );
            return;
        }

        let delay = policy.delay_for(attempt);
        debug!(attempt, "Reconnecting progress stream in {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

/// Drain one open connection, publishing each parsed event in arrival order
async fn consume(response: reqwest::Response, bus: &EventBus) -> reqwest::Result<()> {
    let mut parser = SseParser::new();
    let mut chunks = response.bytes_stream();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        for message in parser.push(&chunk) {
            match serde_json::from_str::<DeliveryEvent>(&message.data) {
                Ok(event) => {
                    debug!(job_id = %event.job_id, email = %event.email, status = %event.status,
                           "Delivery event");
                    if bus.emit(event).is_err() {
                        debug!("No subscribers for delivery event; dropped");
                    }
                }
                Err(e) => {
                    warn!("Skipping unparseable stream message: {e}");
                }
            }
        }
    }

    Ok(())
}
