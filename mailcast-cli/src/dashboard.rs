//! Send-flow orchestration
//!
//! Drives one bulk-send job end to end: validate the selections, clear the
//! delivery log, request the job, then follow the shared progress stream
//! until the derived summary reports completion. Per job the observed state
//! machine is: idle, job-requested, per-recipient pending then sent or
//! failed, complete. Completion is inferred from the log, never signaled by
//! the backend.

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use mailcast_common::filter::FilterSelection;
use mailcast_common::EventBus;

use crate::client::{ApiClient, ApiError};
use crate::job::{DeliveryLog, JobProgressSummary};
use crate::report;

/// Errors of the send flow
#[derive(Debug, Error)]
pub enum SendFlowError {
    /// Local validation failure; never reaches the network layer
    #[error("Invalid filter: {0}")]
    InvalidFilter(&'static str),

    /// Start-request failure; the delivery log is left empty and the user
    /// must re-trigger manually
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Console-side state of the send view: the API client, the shared event
/// bus, and the active job's delivery log.
pub struct Dashboard {
    client: ApiClient,
    bus: EventBus,
    log: DeliveryLog,
}

impl Dashboard {
    pub fn new(client: ApiClient, bus: EventBus) -> Self {
        Self {
            client,
            bus,
            log: DeliveryLog::new(),
        }
    }

    /// The active job's delivery log
    pub fn log(&self) -> &DeliveryLog {
        &self.log
    }

    /// Start a bulk-send job and follow it to completion.
    ///
    /// Prints each of the job's delivery events as it arrives and returns
    /// the final derived summary. Events carrying a different job id are
    /// counted and ignored. The follow loop ends at the first instant the
    /// completion condition holds over a non-empty log, or when the event
    /// bus shuts down.
    pub async fn run_send(
        &mut self,
        selection: &FilterSelection,
    ) -> Result<JobProgressSummary, SendFlowError> {
        if !selection.is_valid() {
            return Err(SendFlowError::InvalidFilter(
                "the selected sub-filter is missing its required value",
            ));
        }

        let descriptor = selection.descriptor();

        // Subscribe before the start request so no event can slip between
        // acceptance and the first recv
        let mut rx = self.bus.subscribe();

        // Clear stale events from any prior job before the request is issued
        self.log.begin_job();

        let ack = self.client.start_send(&descriptor).await?;
        self.log.attach(ack.job_id);
        info!(job_id = %ack.job_id, filter = %descriptor.filter_name, "Following delivery progress");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    if self.log.offer(event.clone()) {
                        report::print_event(&event);
                    } else {
                        debug!(job_id = %event.job_id, "Ignoring event from another job");
                    }

                    let summary = self.log.summary();
                    if !self.log.is_empty() && summary.is_complete {
                        return Ok(summary);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Overwritten events are lost to this view; the log and
                    // summary will undercount them
                    warn!(skipped, "Delivery event consumer lagged; progress may be incomplete");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Event bus closed before completion was inferred");
                    return Ok(self.log.summary());
                }
            }
        }
    }
}

/// Follow the delivery event stream without starting a job, printing every
/// event from every job until the last bus handle drops or the process is
/// interrupted.
pub async fn watch(mut rx: broadcast::Receiver<mailcast_common::DeliveryEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => report::print_event(&event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Delivery event consumer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Event bus closed; watch ending");
                return;
            }
        }
    }
}
