//! SQLite-backed implementations of the poster cache and genre lookup.

use discoverfin_core::types::Kind;
use sqlx::SqlitePool;

use crate::MetadataError;
use crate::provider::{GenreLookup, PosterCache};

#[derive(Clone)]
pub struct SqlitePosterCache {
    pool: SqlitePool,
}

impl SqlitePosterCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PosterCache for SqlitePosterCache {
    async fn get(&self, key: &str) -> Result<Option<String>, MetadataError> {
        Ok(discoverfin_db::repo::poster_cache::get(&self.pool, key).await?)
    }

    async fn set(&self, key: &str, url: &str) -> Result<(), MetadataError> {
        Ok(discoverfin_db::repo::poster_cache::set(&self.pool, key, url).await?)
    }
}

#[derive(Clone)]
pub struct SqliteGenreLookup {
    pool: SqlitePool,
    fallback_language: Option<String>,
}

impl SqliteGenreLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            fallback_language: None,
        }
    }

    /// Language tried when the requested one has no synced row.
    pub fn with_fallback_language(mut self, language: impl Into<String>) -> Self {
        self.fallback_language = Some(language.into());
        self
    }
}

#[async_trait::async_trait]
impl GenreLookup for SqliteGenreLookup {
    async fn genre_name(
        &self,
        genre_id: i64,
        kind: Kind,
        language: &str,
    ) -> Result<Option<String>, MetadataError> {
        let media_type = kind.media_type();
        let name =
            discoverfin_db::repo::genres::lookup_name(&self.pool, genre_id, media_type, language)
                .await?;
        match (name, self.fallback_language.as_deref()) {
            (None, Some(fallback)) if fallback != language => Ok(
                discoverfin_db::repo::genres::lookup_name(&self.pool, genre_id, media_type, fallback)
                    .await?,
            ),
            (name, _) => Ok(name),
        }
    }

    async fn genre_id(&self, name: &str, kind: Kind) -> Result<Option<i64>, MetadataError> {
        Ok(discoverfin_db::repo::genres::lookup_id(&self.pool, name, kind.media_type()).await?)
    }
}
