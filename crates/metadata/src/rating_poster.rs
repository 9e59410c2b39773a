//! Paid rating-poster service (RPDB) URLs and the HEAD existence probe.

use std::time::Duration;

use discoverfin_core::types::{Kind, primary_subtag};
use tracing::debug;

use crate::MetadataError;
use crate::provider::PosterProbe;

pub const RPDB_BASE: &str = "https://api.ratingposterdb.com";

/// Key tiers that serve a single, language-less poster.
const LANGUAGELESS_TIERS: &[&str] = &["t0", "t1"];

/// Service tier encoded as the first dash-delimited segment of the key.
pub fn key_tier(api_key: &str) -> &str {
    api_key.split('-').next().unwrap_or(api_key)
}

/// Candidate poster URL for a content id.
pub fn poster_url(api_key: &str, kind: Kind, id: i64, language: &str) -> String {
    let mut url = format!(
        "{RPDB_BASE}/{api_key}/tmdb/poster-default/{}-{id}.jpg?fallback=true",
        kind.content_type()
    );
    if !LANGUAGELESS_TIERS.contains(&key_tier(api_key)) {
        url.push_str("&lang=");
        url.push_str(primary_subtag(language));
    }
    url
}

/// HEAD-request probe with a bounded timeout.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Result<Self, MetadataError> {
        Ok(Self {
            client: crate::http_client(timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl PosterProbe for HttpProbe {
    async fn exists(&self, url: &str) -> Result<bool, MetadataError> {
        let resp = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;
        debug!(status = %resp.status(), "poster probe");
        Ok(resp.status().is_success())
    }
}
