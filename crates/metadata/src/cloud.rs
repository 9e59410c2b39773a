//! Rated-poster storage backed by the render service.
//!
//! Rendered posters are served from `<store_base_url>/<key>.jpg`. Creation is a
//! `POST <render_base_url>/api/posters/rated` call which renders the rating
//! overlay, uploads the result and answers `{ "success": bool, "url": "…" }`.

use serde::Serialize;
use tracing::debug;

use crate::MetadataError;
use crate::config::PosterConfig;
use crate::provider::{CloudPosterStore, RenderResponse};

/// Deterministic storage key for a rendered poster: `<id>-<rating>`.
pub fn cloud_key(content_id: i64, formatted_rating: &str) -> String {
    format!("{content_id}-{formatted_rating}")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    image_url: &'a str,
    rating: &'a str,
    key: &'a str,
}

pub struct HttpPosterStore {
    render_base_url: String,
    store_base_url: String,
    lookup_client: reqwest::Client,
    render_client: reqwest::Client,
}

impl HttpPosterStore {
    pub fn new(config: &PosterConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            render_base_url: config.render_base_url.trim_end_matches('/').to_string(),
            store_base_url: config.store_base_url.trim_end_matches('/').to_string(),
            lookup_client: crate::http_client(config.store_timeout)?,
            render_client: crate::http_client(config.render_timeout)?,
        })
    }

    fn public_url(&self, cloud_key: &str) -> String {
        format!("{}/{}.jpg", self.store_base_url, urlencoding::encode(cloud_key))
    }
}

#[async_trait::async_trait]
impl CloudPosterStore for HttpPosterStore {
    async fn existing_url(&self, cloud_key: &str) -> Result<Option<String>, MetadataError> {
        let url = self.public_url(cloud_key);
        let resp = self
            .lookup_client
            .head(&url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status().is_success() {
            Ok(Some(url))
        } else if resp.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(MetadataError::Provider(format!(
                "poster store returned {}",
                resp.status()
            )))
        }
    }

    async fn create_rated_poster(
        &self,
        source_url: &str,
        rating: &str,
        cloud_key: &str,
    ) -> Result<RenderResponse, MetadataError> {
        let url = format!("{}/api/posters/rated", self.render_base_url);
        debug!(url = %url, key = cloud_key, "requesting rated poster");

        let resp = self
            .render_client
            .post(&url)
            .json(&RenderRequest {
                image_url: source_url,
                rating,
                key: cloud_key,
            })
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(MetadataError::Provider(format!(
                "render service returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Provider(format!("parse render response: {e}")))
    }
}
