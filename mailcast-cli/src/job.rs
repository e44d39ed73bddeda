//! Per-job delivery log and derived progress summary
//!
//! The log is append-only for the lifetime of one job: events are stored in
//! arrival order and never mutated or removed. The summary is derived, never
//! stored; it is recomputed from the full log on every change rather than
//! kept as incremental counters.

use mailcast_common::{DeliveryEvent, DeliveryStatus};
use std::collections::HashMap;
use uuid::Uuid;

/// Append-only log of one send job's delivery events.
///
/// Events are partitioned by job id: until a job is attached every inbound
/// event is foreign, and after attachment only events carrying the attached
/// id are appended. Foreign events are counted so the report can say how
/// many were observed and ignored.
#[derive(Debug, Default)]
pub struct DeliveryLog {
    job_id: Option<Uuid>,
    events: Vec<DeliveryEvent>,
    foreign_events: u64,
}

impl DeliveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new job.
    ///
    /// Called immediately before the start request is issued, so stale
    /// events from a prior job are never mixed with the new job's events.
    pub fn begin_job(&mut self) {
        self.job_id = None;
        self.events.clear();
        self.foreign_events = 0;
    }

    /// Bind the log to the job id returned by the start acknowledgement
    pub fn attach(&mut self, job_id: Uuid) {
        self.job_id = Some(job_id);
    }

    /// Append the event if it belongs to the attached job.
    ///
    /// Returns whether the event was appended. Append order equals call
    /// order, which the stream consumer guarantees equals arrival order.
    pub fn offer(&mut self, event: DeliveryEvent) -> bool {
        if self.job_id == Some(event.job_id) {
            self.events.push(event);
            true
        } else {
            self.foreign_events += 1;
            false
        }
    }

    pub fn job_id(&self) -> Option<Uuid> {
        self.job_id
    }

    /// Events of the attached job, in arrival order
    pub fn events(&self) -> &[DeliveryEvent] {
        &self.events
    }

    /// Events observed for other jobs since `begin_job`
    pub fn foreign_events(&self) -> u64 {
        self.foreign_events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Recompute the summary from the full log
    pub fn summary(&self) -> JobProgressSummary {
        JobProgressSummary::from_events(&self.events)
    }
}

/// Derived aggregate of a job's delivery events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgressSummary {
    /// Terminal outcomes recorded so far; in-flight `sending` events are
    /// excluded
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// True when no email's latest status is `sending`. Vacuously true for
    /// an empty log; the follow loop additionally requires a non-empty log
    /// before inferring completion.
    pub is_complete: bool,
}

impl JobProgressSummary {
    pub fn from_events(events: &[DeliveryEvent]) -> Self {
        let mut sent = 0;
        let mut failed = 0;
        let mut latest: HashMap<&str, DeliveryStatus> = HashMap::new();

        for event in events {
            match event.status {
                DeliveryStatus::Sent => sent += 1,
                DeliveryStatus::Failed => failed += 1,
                DeliveryStatus::Sending => {}
            }
            latest.insert(event.email.as_str(), event.status);
        }

        let is_complete = latest
            .values()
            .all(|status| *status != DeliveryStatus::Sending);

        Self {
            total: sent + failed,
            sent,
            failed,
            is_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(job_id: Uuid, email: &str, status: DeliveryStatus) -> DeliveryEvent {
        DeliveryEvent {
            job_id,
            name: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            status,
            reason: match status {
                DeliveryStatus::Failed => Some("bounced".to_string()),
                _ => None,
            },
        }
    }

    fn attached_log() -> (DeliveryLog, Uuid) {
        let job_id = Uuid::new_v4();
        let mut log = DeliveryLog::new();
        log.begin_job();
        log.attach(job_id);
        (log, job_id)
    }

    #[test]
    fn test_log_preserves_arrival_order() {
        let (mut log, job_id) = attached_log();

        let arrivals = vec![
            event(job_id, "a@x.io", DeliveryStatus::Sending),
            event(job_id, "b@x.io", DeliveryStatus::Sending),
            event(job_id, "a@x.io", DeliveryStatus::Sent),
            event(job_id, "b@x.io", DeliveryStatus::Failed),
        ];
        for e in &arrivals {
            assert!(log.offer(e.clone()));
        }

        assert_eq!(log.events().len(), arrivals.len());
        for (stored, arrived) in log.events().iter().zip(&arrivals) {
            assert_eq!(stored, arrived);
        }
    }

    #[test]
    fn test_foreign_job_events_counted_not_appended() {
        let (mut log, job_id) = attached_log();
        let other_job = Uuid::new_v4();

        assert!(log.offer(event(job_id, "a@x.io", DeliveryStatus::Sent)));
        assert!(!log.offer(event(other_job, "z@x.io", DeliveryStatus::Sent)));

        assert_eq!(log.events().len(), 1);
        assert_eq!(log.foreign_events(), 1);
    }

    #[test]
    fn test_events_before_attach_are_foreign() {
        let mut log = DeliveryLog::new();
        log.begin_job();

        assert!(!log.offer(event(Uuid::new_v4(), "a@x.io", DeliveryStatus::Sent)));
        assert!(log.is_empty());
        assert_eq!(log.foreign_events(), 1);
    }

    #[test]
    fn test_begin_job_clears_accumulated_state() {
        let (mut log, job_id) = attached_log();
        log.offer(event(job_id, "a@x.io", DeliveryStatus::Sent));
        log.offer(event(Uuid::new_v4(), "z@x.io", DeliveryStatus::Sent));
        assert!(!log.is_empty());

        log.begin_job();

        assert!(log.is_empty());
        assert_eq!(log.foreign_events(), 0);
        assert_eq!(log.job_id(), None);
    }

    #[test]
    fn test_summary_counts_terminal_outcomes_only() {
        let job_id = Uuid::nil();
        let events = vec![
            event(job_id, "a@x.io", DeliveryStatus::Sending),
            event(job_id, "b@x.io", DeliveryStatus::Sending),
            event(job_id, "a@x.io", DeliveryStatus::Sent),
            event(job_id, "b@x.io", DeliveryStatus::Failed),
            event(job_id, "c@x.io", DeliveryStatus::Sending),
        ];

        let summary = JobProgressSummary::from_events(&events);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete);
    }

    #[test]
    fn test_summary_recomputation_is_idempotent() {
        let job_id = Uuid::nil();
        let events = vec![
            event(job_id, "a@x.io", DeliveryStatus::Sending),
            event(job_id, "a@x.io", DeliveryStatus::Sent),
            event(job_id, "b@x.io", DeliveryStatus::Failed),
        ];

        let first = JobProgressSummary::from_events(&events);
        let second = JobProgressSummary::from_events(&events);
        assert_eq!(first, second);
    }

    #[test]
    fn test_completion_requires_every_latest_status_terminal() {
        let job_id = Uuid::nil();

        // e2 is still in flight
        let incomplete = vec![
            event(job_id, "e1@x.io", DeliveryStatus::Sending),
            event(job_id, "e2@x.io", DeliveryStatus::Sending),
            event(job_id, "e1@x.io", DeliveryStatus::Sent),
        ];
        assert!(!JobProgressSummary::from_events(&incomplete).is_complete);

        // Every recipient's latest status is terminal
        let complete = vec![
            event(job_id, "e1@x.io", DeliveryStatus::Sending),
            event(job_id, "e1@x.io", DeliveryStatus::Sent),
            event(job_id, "e2@x.io", DeliveryStatus::Failed),
        ];
        assert!(JobProgressSummary::from_events(&complete).is_complete);
    }

    #[test]
    fn test_all_recipients_failing_still_completes() {
        let job_id = Uuid::nil();
        let events = vec![
            event(job_id, "a@x.io", DeliveryStatus::Sending),
            event(job_id, "a@x.io", DeliveryStatus::Failed),
            event(job_id, "b@x.io", DeliveryStatus::Failed),
        ];

        let summary = JobProgressSummary::from_events(&events);
        assert!(summary.is_complete);
        assert_eq!(summary.failed, summary.total);
    }

    #[test]
    fn test_empty_log_summary() {
        let summary = JobProgressSummary::from_events(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.is_complete);
    }
}
