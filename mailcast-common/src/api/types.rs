//! Shared API request/response types
//!
//! Bodies for the bulk-send start endpoint, the audience preview endpoint,
//! and the template/product directories. Field names follow the backend's
//! camelCase JSON convention.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Acknowledgement returned by the bulk-send start endpoint.
///
/// Acceptance of the job, not completion: recipient-level outcomes arrive
/// on the progress stream, tagged with this `job_id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAccepted {
    pub job_id: Uuid,
}

/// Error body returned by the backend on a rejected request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One entry of the template directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    pub template_id: u64,
    pub template_name: String,
}

/// One entry of the product directory
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub product_id: u64,
    pub product_name: String,
}

/// Envelope of the product directory response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductInfo>,
}

/// One client row returned by the audience preview endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub client_id: u64,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_gender: Option<String>,
    /// Date of birth as reported by the backend; rendered verbatim
    #[serde(default)]
    pub client_dob: Option<String>,
    /// Comma-separated product names, when the backend includes them
    #[serde(default)]
    pub client_products: Option<String>,
    #[serde(default)]
    pub family_head: bool,
}

/// Envelope of the audience preview response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilteredClients {
    pub clients: Vec<ClientRecord>,
}
