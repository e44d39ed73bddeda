//! CRM backend API client
//!
//! Wraps the four backend surfaces the console consumes: the bulk-send start
//! endpoint, the audience preview endpoint, the template/product
//! directories, and the delivery event stream. Credentials are passed in
//! explicitly; nothing here reads global state.

use mailcast_common::api::{
    ClientRecord, ErrorResponse, FilteredClients, ProductInfo, ProductsResponse, SendAccepted,
    TemplateInfo,
};
use mailcast_common::auth::Credentials;
use mailcast_common::filter::FilterDescriptor;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("mailcast/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Backend client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    /// 401/403: the token is missing, expired, or revoked
    #[error("Authentication rejected (HTTP {0}); log in again to obtain a fresh token")]
    AuthRejected(u16),

    /// Backend refused the request and said why
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Authenticated client for the CRM backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// Separate client for the event stream: a whole-request timeout would
    /// sever the long-lived SSE connection
    stream_http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let stream_http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            stream_http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// URL of the delivery event stream
    pub fn events_url(&self) -> String {
        format!("{}/stream-mail-status", self.base_url)
    }

    /// Request the backend start an asynchronous bulk-send job.
    ///
    /// The acknowledgement means the job was accepted, not that any mail was
    /// sent; recipient-level outcomes arrive on the event stream tagged with
    /// the returned job id.
    pub async fn start_send(&self, descriptor: &FilterDescriptor) -> Result<SendAccepted, ApiError> {
        tracing::debug!(filter = %descriptor.filter_name, "Requesting bulk-send job");

        let response = self
            .http
            .post(format!("{}/sendEmails", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .json(descriptor)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let ack: SendAccepted = Self::decode(response).await?;
        tracing::info!(job_id = %ack.job_id, "Bulk-send job accepted");
        Ok(ack)
    }

    /// Fetch the clients the given filter selects, without sending anything
    pub async fn preview_clients(
        &self,
        descriptor: &FilterDescriptor,
    ) -> Result<Vec<ClientRecord>, ApiError> {
        let response = self
            .http
            .post(format!("{}/api/clientsFilter", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .json(descriptor)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let page: FilteredClients = Self::decode(response).await?;
        Ok(page.clients)
    }

    /// Fetch the template directory
    pub async fn list_templates(&self) -> Result<Vec<TemplateInfo>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/templates", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetch the product directory
    pub async fn list_products(&self) -> Result<Vec<ProductInfo>, ApiError> {
        let response = self
            .http
            .get(format!("{}/api/products", self.base_url))
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let envelope: ProductsResponse = Self::decode(response).await?;
        Ok(envelope.products)
    }

    /// Open the delivery event stream.
    ///
    /// Returns the raw response; the caller drives `bytes_stream` through
    /// the SSE parser.
    pub async fn open_event_stream(&self) -> Result<reqwest::Response, ApiError> {
        let response = self
            .stream_http
            .get(self.events_url())
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::AUTHORIZATION, self.credentials.authorization())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::AuthRejected(status.as_u16()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Map a response to the expected JSON body or the matching error
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ApiError::AuthRejected(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The backend reports rejections as {"error": "..."}
            if let Ok(rejection) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(ApiError::Rejected(rejection.error));
            }
            return Err(ApiError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:3000", Credentials::new("t"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_events_url_handles_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/", Credentials::new("t")).unwrap();
        assert_eq!(client.events_url(), "http://localhost:3000/stream-mail-status");
    }
}
