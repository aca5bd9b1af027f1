//! HTTP client for the image processing backend
//!
//! Endpoints:
//! - `GET  /api/v1/analytics`
//! - `GET  /api/v1/images[?limit=&last_key=&status=]`
//! - `GET  /api/v1/images/{id}`
//! - `POST /api/v1/images`
//!
//! No client-side timeout is configured; requests settle when the backend or
//! the transport does.

use avp_common::api::{
    ErrorResponse, ImageDetailResponse, ImageListResponse, ListImagesQuery, UploadRequest,
    UploadResponse,
};
use avp_common::models::Analytics;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

const USER_AGENT: &str = concat!("avp-dash/", env!("CARGO_PKG_VERSION"));

/// Backend API client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http_client: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    /// Create a client for the given base URL (e.g. `https://host/prod`)
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ClientError::Network(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Network(format!("Invalid base URL '{}'", base_url)));
        }
        // Path segments are appended, so the base must not end with '/'
        let trimmed = base_url.path().trim_end_matches('/').to_string();
        base_url.set_path(&trimmed);

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `<base>/api/v1/<segments...>`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Network(format!("Invalid base URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// Fetch aggregate analytics
    pub async fn get_analytics(&self) -> Result<Analytics, ClientError> {
        let url = self.endpoint(&["analytics"])?;
        tracing::debug!(url = %url, "Fetching analytics");

        let response = self.send(self.http_client.get(url)).await?;
        read_json(response).await
    }

    /// Fetch one page of raw image records
    pub async fn list_images(&self, query: &ListImagesQuery) -> Result<ImageListResponse, ClientError> {
        let url = self.endpoint(&["images"])?;
        tracing::debug!(url = %url, ?query, "Fetching images");

        let response = self
            .send(self.http_client.get(url).query(&query.to_pairs()))
            .await?;
        let list: ImageListResponse = read_json(response).await?;

        tracing::debug!(count = list.images.len(), has_more = list.has_more, "Fetched images");
        Ok(list)
    }

    /// Fetch a single image record
    ///
    /// A 404 maps to [`ClientError::NotFound`].
    pub async fn get_image(&self, image_id: &str) -> Result<ImageDetailResponse, ClientError> {
        let url = self.endpoint(&["images", image_id])?;
        tracing::debug!(url = %url, image_id = %image_id, "Fetching image detail");

        match self.send(self.http_client.get(url)).await {
            Err(ClientError::Api(404, _)) => Err(ClientError::NotFound(image_id.to_string())),
            Err(e) => Err(e),
            Ok(response) => read_json(response).await,
        }
    }

    /// Submit an upload
    ///
    /// A 2xx body is decoded and merged with `success: true`; an undecodable
    /// 2xx body is a [`ClientError::Parse`].
    pub async fn upload_image(&self, request: &UploadRequest) -> Result<UploadResponse, ClientError> {
        let url = self.endpoint(&["images"])?;
        tracing::debug!(
            url = %url,
            filename = %request.filename,
            payload_len = request.image_data.len(),
            "Submitting upload"
        );

        let response = self.send(self.http_client.post(url).json(request)).await?;
        let body: Value = read_json(response).await?;
        Ok(UploadResponse::from_body(body))
    }

    /// Send a request, turning transport failures and non-2xx statuses into errors
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = ErrorResponse::message_from_body(&error_text)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        tracing::debug!(status = status.as_u16(), message = %message, "Backend returned error status");
        Err(ClientError::Api(status.as_u16(), message))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_segments() {
        let client = DashboardClient::new("https://host.example/prod/").unwrap();
        assert_eq!(
            client.endpoint(&["analytics"]).unwrap().as_str(),
            "https://host.example/prod/api/v1/analytics"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let client = DashboardClient::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            client.endpoint(&["images", "a b/c"]).unwrap().as_str(),
            "http://127.0.0.1:8080/api/v1/images/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(DashboardClient::new("not a url").is_err());
        assert!(DashboardClient::new("mailto:someone@example.com").is_err());
    }
}
