//! TMDB (The Movie Database) client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use std::time::Duration;

use discoverfin_core::types::{CatalogItem, Kind, primary_subtag};
use tracing::debug;

use crate::MetadataError;
use crate::provider::{DiscoverQuery, LogoProvider, MediaDatabase};

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// TMDB pages discover results in fixed pages of 20.
const PAGE_SIZE: u32 = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct GenreEntry {
    pub id: i64,
    pub name: String,
}

pub struct TmdbClient {
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new() -> Result<Self, MetadataError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, MetadataError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: crate::http_client(REQUEST_TIMEOUT)?,
        })
    }

    async fn get_json(
        &self,
        path: &str,
        api_key: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, MetadataError> {
        let mut all_params = vec![("api_key", api_key.to_string())];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }

        if !resp.status().is_success() {
            return Err(MetadataError::Provider(format!(
                "TMDB returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Provider(format!("parse JSON: {e}")))
    }

    /// Official genre list for a media kind in one language.
    pub async fn genre_list(
        &self,
        kind: Kind,
        language: &str,
        api_key: &str,
    ) -> Result<Vec<GenreEntry>, MetadataError> {
        let data = self
            .get_json(
                &format!("/genre/{}/list", kind.media_type()),
                api_key,
                &[("language", language.to_string())],
            )
            .await?;

        Ok(data["genres"]
            .as_array()
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|g| {
                        Some(GenreEntry {
                            id: g["id"].as_i64()?,
                            name: g["name"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl MediaDatabase for TmdbClient {
    async fn discover(
        &self,
        query: &DiscoverQuery,
        api_key: &str,
    ) -> Result<Vec<CatalogItem>, MetadataError> {
        let data = self
            .get_json(
                &format!("/discover/{}", query.kind.media_type()),
                api_key,
                &discover_params(query),
            )
            .await?;

        parse_discover_results(&data)
    }

    async fn external_id(
        &self,
        kind: Kind,
        id: i64,
        api_key: &str,
    ) -> Result<Option<String>, MetadataError> {
        let data = self
            .get_json(
                &format!("/{}/{id}/external_ids", kind.media_type()),
                api_key,
                &[],
            )
            .await?;

        Ok(data["imdb_id"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()))
    }
}

#[async_trait::async_trait]
impl LogoProvider for TmdbClient {
    async fn fetch_logo(
        &self,
        kind: Kind,
        id: i64,
        language: &str,
        api_key: &str,
    ) -> Result<Option<String>, MetadataError> {
        let lang = primary_subtag(language);
        let data = self
            .get_json(
                &format!("/{}/{id}/images", kind.media_type()),
                api_key,
                &[("include_image_language", format!("{lang},en,null"))],
            )
            .await?;

        Ok(pick_logo(&data, lang).map(|p| format!("{IMAGE_BASE}/original{p}")))
    }
}

fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("language", query.language.clone()),
        ("sort_by", query.sort_by.clone()),
        ("page", (query.offset / PAGE_SIZE + 1).to_string()),
        ("watch_region", query.region.clone()),
        ("include_adult", "false".to_string()),
    ];

    if !query.providers.is_empty() {
        let providers: Vec<String> = query.providers.iter().map(|p| p.to_string()).collect();
        params.push(("with_watch_providers", providers.join("|")));
    }
    if let Some(genre) = query.genre {
        params.push(("with_genres", genre.to_string()));
    }
    if query.kind == Kind::Movies {
        if let Some(cert) = query.age_rating.as_deref() {
            params.push(("certification_country", query.region.clone()));
            params.push(("certification.lte", cert.to_string()));
        }
    }

    params
}

fn parse_discover_results(data: &serde_json::Value) -> Result<Vec<CatalogItem>, MetadataError> {
    let results = data
        .get("results")
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));
    serde_json::from_value(results)
        .map_err(|e| MetadataError::Provider(format!("parse discover results: {e}")))
}

/// Preferred language first, then English, then whatever is first.
fn pick_logo<'a>(data: &'a serde_json::Value, lang: &str) -> Option<&'a str> {
    let logos = data["logos"].as_array()?;
    let by_lang = |wanted: &str| {
        logos
            .iter()
            .find(|l| l["iso_639_1"].as_str() == Some(wanted))
            .and_then(|l| l["file_path"].as_str())
    };
    by_lang(lang)
        .or_else(|| by_lang("en"))
        .or_else(|| logos.first().and_then(|l| l["file_path"].as_str()))
}
