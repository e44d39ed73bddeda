//! mailcast console library interface
//!
//! Exposes the send-flow components for integration testing: the backend
//! API client, the progress-stream consumer, the per-job delivery log, and
//! the dashboard orchestration.

pub mod client;
pub mod dashboard;
pub mod job;
pub mod report;
pub mod stream;

pub use client::{ApiClient, ApiError};
pub use dashboard::{Dashboard, SendFlowError};
pub use job::{DeliveryLog, JobProgressSummary};
pub use stream::{run_progress_stream, ReconnectPolicy};
