//! API module for shared HTTP wire types
//!
//! Request and response bodies exchanged with the CRM backend. This module
//! contains ONLY serializable types, no HTTP client dependencies;
//! `mailcast-cli` wraps these with the actual reqwest calls.

pub mod types;

pub use types::{
    ClientRecord, ErrorResponse, FilteredClients, ProductInfo, ProductsResponse, SendAccepted,
    TemplateInfo,
};
