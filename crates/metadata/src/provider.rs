//! Collaborator seams used by poster resolution and metadata assembly.

use discoverfin_core::types::{CatalogItem, Kind};
use serde::{Deserialize, Serialize};

use crate::MetadataError;

/// Parameters of a discover request against the media database.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub kind: Kind,
    pub providers: Vec<u32>,
    /// Maximum certification for movies (e.g. `PG-13`). Ignored for series.
    pub age_rating: Option<String>,
    pub sort_by: String,
    pub genre: Option<i64>,
    pub language: String,
    pub offset: u32,
    pub region: String,
}

/// A media database that can list catalog items and cross-reference ids.
#[async_trait::async_trait]
pub trait MediaDatabase: Send + Sync {
    async fn discover(
        &self,
        query: &DiscoverQuery,
        api_key: &str,
    ) -> Result<Vec<CatalogItem>, MetadataError>;

    /// IMDb id for a content id, if the database knows one.
    async fn external_id(
        &self,
        kind: Kind,
        id: i64,
        api_key: &str,
    ) -> Result<Option<String>, MetadataError>;
}

#[async_trait::async_trait]
pub trait LogoProvider: Send + Sync {
    async fn fetch_logo(
        &self,
        kind: Kind,
        id: i64,
        language: &str,
        api_key: &str,
    ) -> Result<Option<String>, MetadataError>;
}

/// Genre reference data. Errors from the backing store are propagated.
#[async_trait::async_trait]
pub trait GenreLookup: Send + Sync {
    async fn genre_name(
        &self,
        genre_id: i64,
        kind: Kind,
        language: &str,
    ) -> Result<Option<String>, MetadataError>;

    async fn genre_id(&self, name: &str, kind: Kind) -> Result<Option<i64>, MetadataError>;
}

/// Key-value cache of resolved poster URLs.
#[async_trait::async_trait]
pub trait PosterCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, MetadataError>;
    async fn set(&self, key: &str, url: &str) -> Result<(), MetadataError>;
}

/// Existence check for a remote image.
#[async_trait::async_trait]
pub trait PosterProbe: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool, MetadataError>;
}

/// Storage of pre-rendered rated posters, addressed by cloud key.
#[async_trait::async_trait]
pub trait CloudPosterStore: Send + Sync {
    async fn existing_url(&self, cloud_key: &str) -> Result<Option<String>, MetadataError>;

    async fn create_rated_poster(
        &self,
        source_url: &str,
        rating: &str,
        cloud_key: &str,
    ) -> Result<RenderResponse, MetadataError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
}
