//! # Mailcast Common Library
//!
//! Shared code for the mailcast console:
//! - Audience filter model (FilterDescriptor builder and validity check)
//! - Delivery event types (DeliveryEvent) and EventBus
//! - API request/response types
//! - SSE wire-format parsing
//! - CSV serialization of delivery logs
//! - Bearer-token credentials
//! - Configuration loading

pub mod api;
pub mod auth;
pub mod config;
pub mod csv;
pub mod error;
pub mod events;
pub mod filter;
pub mod sse;

pub use error::{Error, Result};
pub use events::{DeliveryEvent, DeliveryStatus, EventBus};
pub use filter::{AgeComparator, AudienceClass, FilterDescriptor, FilterSelection, SubFilterKind};
