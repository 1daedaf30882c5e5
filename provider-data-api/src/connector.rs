//! Data API connector implementation
//!
//! Implements `CatalogConnector` and `RemoteCatalog` for the binary-data
//! HTTP/JSON API.

use async_trait::async_trait;
use base64::Engine as _;
use bridge_traits::catalog::{
    ApiCredentials, BinaryId, CatalogConnector, CatalogFilter, CatalogPage, PageCursor,
    RemoteCatalog, RemoteObjectMetadata,
};
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::DataApiError;
use crate::types::{ByFilterRequest, ByFilterResponse, ByIdsRequest, ByIdsResponse, WireFilter};

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://app.viam.com/api";

/// Objects requested per listing page
pub const PAGE_LIMIT: u32 = 50;

const BY_FILTER_PATH: &str = "/v1/binary-data/by-filter";
const BY_IDS_PATH: &str = "/v1/binary-data/by-ids";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connects to the data API with an API key pair.
///
/// # Example
///
/// ```ignore
/// use provider_data_api::DataApiConnector;
/// use bridge_traits::catalog::{ApiCredentials, CatalogConnector};
///
/// let connector = DataApiConnector::new(http_client);
/// let catalog = connector.connect(&ApiCredentials::new("key-id", "key")).await?;
/// ```
#[derive(Clone)]
pub struct DataApiConnector {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl DataApiConnector {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_API_BASE.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the API endpoint. A trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogConnector for DataApiConnector {
    #[instrument(skip(self, credentials), fields(base_url = %self.base_url, key_id = %credentials.api_key_id))]
    async fn connect(&self, credentials: &ApiCredentials) -> Result<Arc<dyn RemoteCatalog>> {
        let catalog = DataApiCatalog {
            http_client: Arc::clone(&self.http_client),
            base_url: self.base_url.clone(),
            credentials: credentials.clone(),
            retry_policy: self.retry_policy.clone(),
        };

        catalog.verify_credentials().await?;
        info!("Connected to data API");

        Ok(Arc::new(catalog))
    }
}

/// Authenticated data API client.
pub struct DataApiCatalog {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    credentials: ApiCredentials,
    retry_policy: RetryPolicy,
}

impl DataApiCatalog {
    /// Issues a one-object listing so bad keys fail at connect time.
    async fn verify_credentials(&self) -> Result<()> {
        let body = ByFilterRequest {
            filter: WireFilter::default(),
            include_binary_data: false,
            last: None,
            limit: 1,
        };
        self.post(BY_FILTER_PATH, &body).await?;
        Ok(())
    }

    /// POST `body` as JSON, retrying on 429, 5xx and transport errors.
    #[instrument(skip(self, body))]
    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, path);
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::new(HttpMethod::Post, url.clone())
                .api_key(&self.credentials.api_key_id, &self.credentials.api_key)
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT)
                .json(body)?;

            let retry_reason = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => {
                    debug!(status = response.status, attempt, "API request succeeded");
                    return Ok(response);
                }
                Ok(response) if response.status == 401 || response.status == 403 => {
                    return Err(DataApiError::AuthenticationFailed(format!(
                        "API key rejected with status {}",
                        response.status
                    ))
                    .into());
                }
                Ok(response) if response.status == 429 || response.is_server_error() => {
                    if attempt >= max_attempts {
                        return Err(DataApiError::RetriesExhausted {
                            endpoint: path.to_string(),
                            attempts: attempt,
                            status_code: response.status,
                        }
                        .into());
                    }
                    format!("status {}", response.status)
                }
                Ok(response) => {
                    warn!(status = response.status, "API request rejected");
                    return Err(DataApiError::ApiError {
                        status_code: response.status,
                        message: response.text_lossy(),
                    }
                    .into());
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!(error = %e, attempts = attempt, "API request failed");
                        return Err(e);
                    }
                    e.to_string()
                }
            };

            let delay = self.retry_policy.delay_for(attempt);
            warn!(
                attempt,
                max_attempts,
                reason = %retry_reason,
                delay_ms = delay.as_millis() as u64,
                "API request failed, retrying"
            );
            core_async::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl RemoteCatalog for DataApiCatalog {
    #[instrument(skip(self, filter, cursor), fields(cursor = cursor.as_ref().map(|c| c.as_str())))]
    async fn list_by_filter(
        &self,
        filter: &CatalogFilter,
        cursor: Option<PageCursor>,
    ) -> Result<CatalogPage> {
        let body = ByFilterRequest {
            filter: WireFilter::from(filter),
            include_binary_data: false,
            last: cursor.as_ref().map(|c| c.as_str()),
            limit: PAGE_LIMIT,
        };

        let response = self.post(BY_FILTER_PATH, &body).await?;
        let parsed: ByFilterResponse = serde_json::from_slice(&response.body).map_err(|e| {
            DataApiError::ParseError(format!("Failed to parse listing page: {}", e))
        })?;

        let objects: Vec<RemoteObjectMetadata> = parsed
            .data
            .into_iter()
            .map(|entry| entry.metadata.into())
            .collect();

        debug!(
            returned = objects.len(),
            total = parsed.count,
            "Listed catalog page"
        );

        Ok(CatalogPage::new(objects, PageCursor::from_token(parsed.last)))
    }

    #[instrument(skip(self, id), fields(object = %id))]
    async fn fetch_content(&self, id: &BinaryId) -> Result<Bytes> {
        let body = ByIdsRequest {
            binary_ids: vec![id],
            include_binary: true,
        };

        let response = self.post(BY_IDS_PATH, &body).await?;
        let parsed: ByIdsResponse = serde_json::from_slice(&response.body).map_err(|e| {
            DataApiError::ParseError(format!("Failed to parse content response: {}", e))
        })?;

        let payload = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| DataApiError::ObjectNotFound(id.to_string()))?;

        let content = base64::engine::general_purpose::STANDARD
            .decode(payload.binary.as_bytes())
            .map_err(|e| DataApiError::ParseError(format!("Invalid base64 payload: {}", e)))?;

        debug!(size = content.len(), "Fetched object content");
        Ok(Bytes::from(content))
    }
}
