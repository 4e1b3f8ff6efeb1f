//! Typed client for the gallery service HTTP API.
//!
//! The service is a black box: list/upload/delete endpoints plus static
//! raster hosting. Every call is a single attempt; retry policy belongs to
//! the caller.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use geosnap_core::{GalleryImage, Geotag};

use crate::error::{ClientError, ClientResult};

/// Suggested filename for uploaded rasters.
pub const UPLOAD_FILENAME: &str = "annotated_image.png";

/// Pagination parameters for the image listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery {
    /// Records to skip from the newest end.
    pub skip: Option<u32>,
    /// Maximum records to return.
    pub limit: Option<u32>,
}

/// Response returned by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    /// Service-reported status, `success` on acceptance.
    pub status: String,
    /// Human-readable acceptance message.
    pub message: String,
    /// URL of the stored raster.
    pub url: String,
    /// Stored record identifier.
    pub id: String,
}

/// Service health report.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    /// `healthy` or `unhealthy`.
    pub status: String,
    /// Backing database connectivity.
    pub database: String,
}

/// Typed client for the gallery service.
#[derive(Debug, Clone)]
pub struct GalleryApi {
    http: Client,
    base: Url,
}

impl GalleryApi {
    /// Create a client for the given service base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the base URL is malformed
    /// and [`ClientError::Http`] when the HTTP client fails to build.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let base =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(concat!("geosnap/", env!("CARGO_PKG_VERSION")))
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy()
            .build()?;

        Ok(Self { http, base })
    }

    /// List stored images, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or
    /// an unparseable payload.
    pub async fn list_images(&self, query: ListQuery) -> ClientResult<Vec<GalleryImage>> {
        let mut url = self.endpoint("images")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(skip) = query.skip {
                pairs.append_pair("skip", &skip.to_string());
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }

        let response = self.http.get(url).send().await?;
        Self::parse_json(response).await
    }

    /// List images within `max_distance_km` of a position.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or
    /// an unparseable payload.
    pub async fn nearby_images(
        &self,
        position: Geotag,
        max_distance_km: f64,
    ) -> ClientResult<Vec<GalleryImage>> {
        let mut url = self.endpoint("images/nearby")?;
        url.query_pairs_mut()
            .append_pair("latitude", &position.latitude.to_string())
            .append_pair("longitude", &position.longitude.to_string())
            .append_pair("max_distance", &max_distance_km.to_string());

        let response = self.http.get(url).send().await?;
        Self::parse_json(response).await
    }

    /// Upload an annotated raster with its geotag.
    ///
    /// One multipart request: `file` (PNG blob named
    /// [`UPLOAD_FILENAME`]), `latitude`, `longitude`, and `description`
    /// when provided. Exactly one attempt; no automatic retry.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or
    /// an unparseable receipt.
    pub async fn upload_image(
        &self,
        png: Vec<u8>,
        geotag: Geotag,
        description: Option<&str>,
    ) -> ClientResult<UploadReceipt> {
        let part = Part::bytes(png)
            .file_name(UPLOAD_FILENAME)
            .mime_str("image/png")?;

        let mut form = Form::new()
            .part("file", part)
            .text("latitude", geotag.latitude.to_string())
            .text("longitude", geotag.longitude.to_string());
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }

        let response = self
            .http
            .post(self.endpoint("upload")?)
            .multipart(form)
            .send()
            .await?;
        Self::parse_json(response).await
    }

    /// Delete a stored image by its server-side filename.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-success status.
    pub async fn delete_image(&self, filename: &str) -> ClientResult<()> {
        let url = self.endpoint(&format!("images/{filename}"))?;
        let response = self.http.delete(url).send().await?;
        Self::expect_success(response)?;
        Ok(())
    }

    /// Probe service health.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, non-success status, or
    /// an unparseable payload.
    pub async fn health(&self) -> ClientResult<HealthReport> {
        let response = self.http.get(self.endpoint("health")?).send().await?;
        Self::parse_json(response).await
    }

    /// Fetch the raw bytes of a stored raster, for an item's deferred
    /// load.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the item URL is malformed
    /// and [`ClientError`] transport/status variants otherwise.
    pub async fn fetch_image_bytes(&self, url: &str) -> ClientResult<Vec<u8>> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let response = self.http.get(url).send().await?;
        Ok(Self::expect_success(response)?.bytes().await?.to_vec())
    }

    /// Check the status, then decode the body. Payload-shape failures
    /// surface as [`ClientError::Json`], distinct from transport errors.
    async fn parse_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let body = Self::expect_success(response)?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    fn expect_success(response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::warn!(%status, "gallery request rejected");
            Err(ClientError::Status(status))
        }
    }
}
